#![no_std]

//! Time-weighted staking rewards pool.
//!
//! Stakers lock the staking token and earn the rewards token pro rata to
//! stake × time. The owner schedules non-overlapping reward periods and funds
//! them; funding is spread evenly over whatever remains of the period.
//! All accounting lives in the pure [`ledger::RewardsLedger`]; this module
//! only moves it in and out of storage, moves tokens, and emits events.

pub mod accrual;
pub mod events;
pub mod ledger;
pub mod period;
pub mod rewards;
mod storage;

pub use storage::PoolConfig;

use accrual::StakerAccount;
use common::{ownable, pausable, ttl};
use ledger::RewardsLedger;
use soroban_sdk::{contract, contractimpl, log, token, Address, Env};

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum StakingError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotOwner = 3,
    InvalidAmount = 4,
    InsufficientBalance = 5,
    Paused = 6,
    InvalidStartTime = 7,
    InvalidEndTime = 8,
    PeriodOngoing = 9,
    PeriodNotStarted = 10,
    DisallowedAsset = 11,
    FundingMismatch = 12,
    ArithmeticOverflow = 13,
    InvalidConfiguration = 14,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingContract;

#[contractimpl]
impl StakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the pool.
    ///
    /// * `staking_token`  – SAC address of the token users stake.
    /// * `rewards_token`  – SAC address of the token distributed as rewards.
    /// * `initial_period` – optional `(start, end)` window; may lie in the past.
    pub fn initialize(
        env: Env,
        owner: Address,
        staking_token: Address,
        rewards_token: Address,
        initial_period: Option<(u64, u64)>,
    ) -> Result<(), StakingError> {
        if storage::is_initialized(&env) {
            return Err(StakingError::AlreadyInitialized);
        }
        if staking_token == rewards_token {
            return Err(StakingError::InvalidConfiguration);
        }

        let ledger = RewardsLedger::new(initial_period)?;

        storage::set_config(
            &env,
            &PoolConfig {
                staking_token: staking_token.clone(),
                rewards_token: rewards_token.clone(),
            },
        );
        storage::set_ledger(&env, &ledger);
        ownable::set_owner(&env, &owner);
        pausable::set_paused(&env, false);

        log!(
            &env,
            "pool initialized: period {}..{}",
            ledger.period.start,
            ledger.period.end
        );
        events::publish_initialized(&env, owner, staking_token, rewards_token);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` staking tokens from `account`.
    ///
    /// Rewards are checkpointed first, so the new tokens earn nothing
    /// retroactively.
    pub fn stake(env: Env, account: Address, amount: i128) -> Result<(), StakingError> {
        let config = storage::get_config(&env)?;
        account.require_auth();

        if amount <= 0 {
            return Err(StakingError::InvalidAmount);
        }
        if pausable::is_paused(&env) {
            return Err(StakingError::Paused);
        }

        let mut ledger = storage::get_ledger(&env)?;
        let mut record = storage::get_account(&env, &account);
        ledger.stake(&mut record, amount, env.ledger().timestamp())?;

        storage::set_ledger(&env, &ledger);
        storage::set_account(&env, &account, &record);

        token::Client::new(&env, &config.staking_token).transfer(
            &account,
            &env.current_contract_address(),
            &amount,
        );

        events::publish_staked(&env, account, amount);

        Ok(())
    }

    /// Return `amount` staking tokens to `account`. Available while paused.
    pub fn withdraw(env: Env, account: Address, amount: i128) -> Result<(), StakingError> {
        let config = storage::get_config(&env)?;
        account.require_auth();

        let mut ledger = storage::get_ledger(&env)?;
        let mut record = storage::get_account(&env, &account);
        ledger.withdraw(&mut record, amount, env.ledger().timestamp())?;

        storage::set_ledger(&env, &ledger);
        storage::set_account(&env, &account, &record);

        token::Client::new(&env, &config.staking_token).transfer(
            &env.current_contract_address(),
            &account,
            &amount,
        );

        events::publish_withdrawn(&env, account, amount);

        Ok(())
    }

    /// Pay out everything `account` has earned. Returns the amount paid,
    /// which may be zero.
    pub fn get_reward(env: Env, account: Address) -> Result<i128, StakingError> {
        let config = storage::get_config(&env)?;
        account.require_auth();

        let mut ledger = storage::get_ledger(&env)?;
        let mut record = storage::get_account(&env, &account);
        let owed = ledger.claim(&mut record, env.ledger().timestamp())?;

        storage::set_ledger(&env, &ledger);
        storage::set_account(&env, &account, &record);

        if owed > 0 {
            Self::pay_reward(&env, &config, &account, owed);
        }

        Ok(owed)
    }

    /// Withdraw the whole stake and claim all rewards. Returns the reward paid.
    pub fn exit(env: Env, account: Address) -> Result<i128, StakingError> {
        let config = storage::get_config(&env)?;
        account.require_auth();

        let mut ledger = storage::get_ledger(&env)?;
        let mut record = storage::get_account(&env, &account);
        let outcome = ledger.exit(&mut record, env.ledger().timestamp())?;

        storage::set_ledger(&env, &ledger);
        storage::set_account(&env, &account, &record);

        token::Client::new(&env, &config.staking_token).transfer(
            &env.current_contract_address(),
            &account,
            &outcome.withdrawn,
        );
        events::publish_withdrawn(&env, account.clone(), outcome.withdrawn);

        if outcome.reward > 0 {
            Self::pay_reward(&env, &config, &account, outcome.reward);
        }

        Ok(outcome.reward)
    }

    /// Flush the global accumulator. Anyone may call this.
    pub fn update_reward(env: Env) -> Result<(), StakingError> {
        let mut ledger = storage::get_ledger(&env)?;
        ledger.update_reward(None, env.ledger().timestamp())?;
        storage::set_ledger(&env, &ledger);
        Ok(())
    }

    /// Credit `account` with everything earned so far without paying it out.
    /// Anyone may call this. It writes `account`'s record, and extends that
    /// record's lifetime, even though `account` never signed.
    pub fn update_reward_for(env: Env, account: Address) -> Result<(), StakingError> {
        let mut ledger = storage::get_ledger(&env)?;
        let mut record = storage::get_account(&env, &account);
        ledger.update_reward(Some(&mut record), env.ledger().timestamp())?;

        storage::set_ledger(&env, &ledger);
        storage::set_account(&env, &account, &record);
        Ok(())
    }

    // ── Period management ───────────────────────────────────────────────────

    /// Schedule the next reward period. Only allowed before the current
    /// period starts or after it has ended. The reward rate restarts at zero.
    pub fn set_new_period(
        env: Env,
        caller: Address,
        start: u64,
        end: u64,
    ) -> Result<(), StakingError> {
        Self::require_owner(&env, &caller)?;

        let mut ledger = storage::get_ledger(&env)?;
        ledger.set_new_period(start, end, env.ledger().timestamp())?;
        storage::set_ledger(&env, &ledger);

        log!(&env, "new reward period {}..{}", start, end);
        events::publish_new_period_set(&env, start, end);

        Ok(())
    }

    /// Pull `amount` rewards tokens from `caller` and spread them over what
    /// remains of the current period.
    ///
    /// Funding a period that has already ended leaves the rate at zero; the
    /// tokens stay in custody and are never emitted.
    pub fn add_to_rewards_allocation(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<(), StakingError> {
        let config = storage::get_config(&env)?;
        Self::require_owner(&env, &caller)?;

        let mut ledger = storage::get_ledger(&env)?;
        let reward_rate = ledger.add_to_rewards_allocation(amount, env.ledger().timestamp())?;

        let rewards = token::Client::new(&env, &config.rewards_token);
        let custody = env.current_contract_address();
        let before = rewards.balance(&custody);
        rewards.transfer(&caller, &custody, &amount);
        let received = rewards
            .balance(&custody)
            .checked_sub(before)
            .ok_or(StakingError::ArithmeticOverflow)?;
        if received != amount {
            return Err(StakingError::FundingMismatch);
        }

        storage::set_ledger(&env, &ledger);

        log!(&env, "rewards added: {} at rate {}", amount, reward_rate);
        events::publish_reward_added(&env, amount, reward_rate);

        Ok(())
    }

    // ── Owner functions ─────────────────────────────────────────────────────

    /// Send tokens that were mistakenly transferred to the pool back out.
    /// The staking and rewards tokens can never leave through here.
    pub fn recover_unsupported_token(
        env: Env,
        caller: Address,
        asset: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), StakingError> {
        let config = storage::get_config(&env)?;
        Self::require_owner(&env, &caller)?;

        if asset == config.staking_token || asset == config.rewards_token {
            return Err(StakingError::DisallowedAsset);
        }
        if amount <= 0 {
            return Err(StakingError::InvalidAmount);
        }

        token::Client::new(&env, &asset).transfer(&env.current_contract_address(), &to, &amount);

        log!(&env, "recovered {} of {} to {}", amount, asset, to);
        events::publish_recovered(&env, asset, to, amount);

        Ok(())
    }

    /// Halt staking. Withdrawals and claims stay available.
    pub fn pause(env: Env, caller: Address) -> Result<(), StakingError> {
        Self::require_owner(&env, &caller)?;
        pausable::set_paused(&env, true);
        ttl::extend_instance_ttl(&env);
        events::publish_paused(&env, caller);
        Ok(())
    }

    /// Reopen staking.
    pub fn unpause(env: Env, caller: Address) -> Result<(), StakingError> {
        Self::require_owner(&env, &caller)?;
        pausable::set_paused(&env, false);
        ttl::extend_instance_ttl(&env);
        events::publish_unpaused(&env, caller);
        Ok(())
    }

    /// Hand the owner role to `new_owner`.
    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), StakingError> {
        Self::require_owner(&env, &caller)?;
        ownable::set_owner(&env, &new_owner);
        ttl::extend_instance_ttl(&env);
        events::publish_ownership_transferred(&env, caller, new_owner);
        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Address allowed to call the privileged entry points.
    pub fn owner(env: Env) -> Result<Address, StakingError> {
        ownable::get_owner(&env).ok_or(StakingError::NotInitialized)
    }

    /// Whether `stake` is currently halted.
    pub fn is_paused(env: Env) -> bool {
        pausable::is_paused(&env)
    }

    /// Token stakers lock into the pool.
    pub fn staking_token(env: Env) -> Result<Address, StakingError> {
        Ok(storage::get_config(&env)?.staking_token)
    }

    /// Token paid out as rewards.
    pub fn rewards_token(env: Env) -> Result<Address, StakingError> {
        Ok(storage::get_config(&env)?.rewards_token)
    }

    /// Sum of every account's stake.
    pub fn total_staked(env: Env) -> Result<i128, StakingError> {
        Ok(storage::get_ledger(&env)?.accrual.total_staked)
    }

    /// Principal `account` currently has staked.
    pub fn balance_of(env: Env, account: Address) -> i128 {
        storage::get_account(&env, &account).staked
    }

    /// The raw checkpoint record for `account`.
    pub fn account(env: Env, account: Address) -> StakerAccount {
        storage::get_account(&env, &account)
    }

    /// Rewards `account` could claim right now.
    pub fn earned(env: Env, account: Address) -> Result<i128, StakingError> {
        let ledger = storage::get_ledger(&env)?;
        ledger.earned(
            &storage::get_account(&env, &account),
            env.ledger().timestamp(),
        )
    }

    /// Current emission rate, scaled by [`rewards::PRECISION`].
    pub fn reward_rate(env: Env) -> Result<i128, StakingError> {
        Ok(storage::get_ledger(&env)?.period.reward_rate)
    }

    /// Accumulator value as of the last checkpoint.
    pub fn reward_per_token_stored(env: Env) -> Result<i128, StakingError> {
        Ok(storage::get_ledger(&env)?.accrual.reward_per_token_stored)
    }

    /// Reward per staked unit accrued up to now, including time not yet
    /// checkpointed.
    pub fn accrued_reward_per_token(env: Env) -> Result<i128, StakingError> {
        storage::get_ledger(&env)?.reward_per_token(env.ledger().timestamp())
    }

    /// Instant the stored accumulator is valid for.
    pub fn last_update_time(env: Env) -> Result<u64, StakingError> {
        Ok(storage::get_ledger(&env)?.accrual.last_update_time)
    }

    /// Latest instant rewards can be attributed up to: `now` clamped to the
    /// period end, or the last endpoint reached before the period starts.
    pub fn last_time_reward_applicable(env: Env) -> Result<u64, StakingError> {
        Ok(storage::get_ledger(&env)?.last_time_reward_applicable(env.ledger().timestamp()))
    }

    /// Start of the configured period.
    pub fn period_start_time(env: Env) -> Result<u64, StakingError> {
        Ok(storage::get_ledger(&env)?.period.start)
    }

    /// End of the configured period.
    pub fn period_end_time(env: Env) -> Result<u64, StakingError> {
        Ok(storage::get_ledger(&env)?.period.end)
    }

    /// Length of the configured period in seconds.
    pub fn period_duration(env: Env) -> Result<u64, StakingError> {
        Ok(storage::get_ledger(&env)?.period.duration())
    }

    /// Whether the configured period has begun.
    pub fn has_started(env: Env) -> Result<bool, StakingError> {
        Ok(storage::get_ledger(&env)?
            .period
            .has_started(env.ledger().timestamp()))
    }

    /// Whether the configured period is over.
    pub fn has_ended(env: Env) -> Result<bool, StakingError> {
        Ok(storage::get_ledger(&env)?
            .period
            .has_ended(env.ledger().timestamp()))
    }

    /// Seconds left in the current period; fails before it has started.
    pub fn time_remaining_in_period(env: Env) -> Result<u64, StakingError> {
        storage::get_ledger(&env)?.time_remaining_in_period(env.ledger().timestamp())
    }

    /// Rewards ever allocated, including any stranded after a period ended.
    pub fn total_funded(env: Env) -> Result<i128, StakingError> {
        Ok(storage::get_ledger(&env)?.total_funded)
    }

    /// Rewards ever paid out.
    pub fn total_paid(env: Env) -> Result<i128, StakingError> {
        Ok(storage::get_ledger(&env)?.accrual.total_paid)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert unless `caller` signed and is the recorded owner.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), StakingError> {
        if !storage::is_initialized(env) {
            return Err(StakingError::NotInitialized);
        }
        caller.require_auth();
        if !ownable::is_owner(env, caller) {
            return Err(StakingError::NotOwner);
        }
        Ok(())
    }

    fn pay_reward(env: &Env, config: &PoolConfig, account: &Address, amount: i128) {
        token::Client::new(env, &config.rewards_token).transfer(
            &env.current_contract_address(),
            account,
            &amount,
        );
        events::publish_reward_paid(env, account.clone(), amount);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
