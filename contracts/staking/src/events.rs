use soroban_sdk::{contracttype, symbol_short, Address, Env};

// ── Payloads ────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub staking_token: Address,
    pub rewards_token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub account: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub account: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaidEvent {
    pub account: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardAddedEvent {
    pub amount: i128,
    /// Rate in force after the allocation, scaled by `rewards::PRECISION`.
    pub reward_rate: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewPeriodSetEvent {
    pub start: u64,
    pub end: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecoveredEvent {
    pub asset: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseChangedEvent {
    pub caller: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferredEvent {
    pub previous: Address,
    pub new_owner: Address,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    owner: Address,
    staking_token: Address,
    rewards_token: Address,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            staking_token,
            rewards_token,
        },
    );
}

pub fn publish_staked(env: &Env, account: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("STAKED"), account.clone()),
        StakedEvent { account, amount },
    );
}

pub fn publish_withdrawn(env: &Env, account: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), account.clone()),
        WithdrawnEvent { account, amount },
    );
}

pub fn publish_reward_paid(env: &Env, account: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RWD_PAID"), account.clone()),
        RewardPaidEvent { account, amount },
    );
}

pub fn publish_reward_added(env: &Env, amount: i128, reward_rate: i128) {
    env.events().publish(
        (symbol_short!("RWD_ADD"),),
        RewardAddedEvent {
            amount,
            reward_rate,
        },
    );
}

pub fn publish_new_period_set(env: &Env, start: u64, end: u64) {
    env.events().publish(
        (symbol_short!("NEW_PRD"),),
        NewPeriodSetEvent { start, end },
    );
}

pub fn publish_recovered(env: &Env, asset: Address, to: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RECOVERED"), asset.clone()),
        RecoveredEvent { asset, to, amount },
    );
}

pub fn publish_paused(env: &Env, caller: Address) {
    env.events()
        .publish((symbol_short!("PAUSED"),), PauseChangedEvent { caller });
}

pub fn publish_unpaused(env: &Env, caller: Address) {
    env.events()
        .publish((symbol_short!("UNPAUSED"),), PauseChangedEvent { caller });
}

pub fn publish_ownership_transferred(env: &Env, previous: Address, new_owner: Address) {
    env.events().publish(
        (symbol_short!("OWN_XFER"),),
        OwnershipTransferredEvent {
            previous,
            new_owner,
        },
    );
}
