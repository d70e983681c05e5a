#![no_std]

//! Guard helpers shared by the pool contracts: owner authorization, the
//! pause gate, and storage TTL bookkeeping.

pub mod ownable;
pub mod pausable;
pub mod ttl;
