use common::ttl;
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::accrual::StakerAccount;
use crate::ledger::RewardsLedger;
use crate::StakingError;

// ── Storage key constants ───────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const LEDGER: Symbol = symbol_short!("LEDGER");

// Per-account persistent storage uses tuple keys: (prefix, account)
const ACCOUNT: Symbol = symbol_short!("ACCOUNT");

// ── Types ───────────────────────────────────────────────────────────────────

/// Deployment parameters fixed at `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// Asset stakers lock into the pool.
    pub staking_token: Address,
    /// Asset distributed as rewards.
    pub rewards_token: Address,
}

// ── Helpers ─────────────────────────────────────────────────────────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}

pub fn set_config(env: &Env, config: &PoolConfig) {
    env.storage().instance().set(&CONFIG, config);
}

pub fn get_config(env: &Env) -> Result<PoolConfig, StakingError> {
    env.storage()
        .instance()
        .get(&CONFIG)
        .ok_or(StakingError::NotInitialized)
}

pub fn get_ledger(env: &Env) -> Result<RewardsLedger, StakingError> {
    env.storage()
        .instance()
        .get(&LEDGER)
        .ok_or(StakingError::NotInitialized)
}

pub fn set_ledger(env: &Env, ledger: &RewardsLedger) {
    env.storage().instance().set(&LEDGER, ledger);
    ttl::extend_instance_ttl(env);
}

fn account_key(account: &Address) -> (Symbol, Address) {
    (ACCOUNT, account.clone())
}

/// Returns the account's record, or a zeroed one if it was never touched.
pub fn get_account(env: &Env, account: &Address) -> StakerAccount {
    env.storage()
        .persistent()
        .get(&account_key(account))
        .unwrap_or_default()
}

pub fn set_account(env: &Env, account: &Address, record: &StakerAccount) {
    let key = account_key(account);
    env.storage().persistent().set(&key, record);
    ttl::extend_persistent_ttl(env, &key);
}
