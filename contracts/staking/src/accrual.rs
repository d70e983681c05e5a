use soroban_sdk::contracttype;

use crate::period::RewardSchedule;
use crate::rewards;
use crate::StakingError;

/// Per-staker checkpoint. Created on first touch and never removed; a
/// zero-balance record is valid.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakerAccount {
    /// Principal currently staked.
    pub staked: i128,
    /// Global reward-per-token as of this account's last checkpoint.
    pub reward_per_token_paid: i128,
    /// Credited but not yet paid out.
    pub rewards: i128,
}

/// Global accrual state of the pool.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccrualState {
    /// Always equals the sum of every `StakerAccount::staked`.
    pub total_staked: i128,
    /// Monotonically non-decreasing, scaled by [`rewards::PRECISION`].
    pub reward_per_token_stored: i128,
    /// Instant as of which `reward_per_token_stored` is valid.
    pub last_update_time: u64,
    /// Cumulative rewards ever paid out.
    pub total_paid: i128,
}

impl AccrualState {
    /// The accumulator value a checkpoint at `now` would store.
    pub fn reward_per_token<S: RewardSchedule>(
        &self,
        schedule: &S,
        now: u64,
    ) -> Result<i128, StakingError> {
        rewards::compute_reward_per_token(
            self.reward_per_token_stored,
            schedule.reward_rate(),
            schedule.emitting_seconds(now, self.last_update_time),
            self.total_staked,
        )
    }

    /// What `account` would be owed after a checkpoint at `now`.
    pub fn earned<S: RewardSchedule>(
        &self,
        schedule: &S,
        account: &StakerAccount,
        now: u64,
    ) -> Result<i128, StakingError> {
        rewards::earned(
            account.staked,
            self.reward_per_token(schedule, now)?,
            account.reward_per_token_paid,
            account.rewards,
        )
    }

    /// Brings the accumulator, and `account` if given, up to date as of `now`.
    ///
    /// Must run before any change to a stake or to the schedule's rate.
    /// Nothing is written unless every step succeeds.
    pub fn checkpoint<S: RewardSchedule>(
        &mut self,
        schedule: &S,
        now: u64,
        account: Option<&mut StakerAccount>,
    ) -> Result<(), StakingError> {
        let rpt = self.reward_per_token(schedule, now)?;
        let applicable = schedule.last_time_reward_applicable(now, self.last_update_time);

        if let Some(account) = account {
            account.rewards = rewards::earned(
                account.staked,
                rpt,
                account.reward_per_token_paid,
                account.rewards,
            )?;
            account.reward_per_token_paid = rpt;
        }

        self.reward_per_token_stored = rpt;
        self.last_update_time = applicable;
        Ok(())
    }

    /// Adds `amount` to `account`'s stake. The caller must have checkpointed
    /// `account` first.
    pub fn deposit(&mut self, account: &mut StakerAccount, amount: i128) -> Result<(), StakingError> {
        if amount <= 0 {
            return Err(StakingError::InvalidAmount);
        }
        let total = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::ArithmeticOverflow)?;
        let staked = account
            .staked
            .checked_add(amount)
            .ok_or(StakingError::ArithmeticOverflow)?;

        self.total_staked = total;
        account.staked = staked;
        Ok(())
    }

    /// Removes `amount` from `account`'s stake. The caller must have
    /// checkpointed `account` first.
    pub fn remove(&mut self, account: &mut StakerAccount, amount: i128) -> Result<(), StakingError> {
        if amount <= 0 {
            return Err(StakingError::InvalidAmount);
        }
        if amount > account.staked {
            return Err(StakingError::InsufficientBalance);
        }

        self.total_staked -= amount;
        account.staked -= amount;
        Ok(())
    }

    /// Zeroes `account`'s credited rewards and returns them. The caller must
    /// have checkpointed `account` first.
    pub fn take_rewards(&mut self, account: &mut StakerAccount) -> Result<i128, StakingError> {
        let owed = account.rewards;
        if owed <= 0 {
            return Ok(0);
        }
        self.total_paid = self
            .total_paid
            .checked_add(owed)
            .ok_or(StakingError::ArithmeticOverflow)?;
        account.rewards = 0;
        Ok(owed)
    }
}
