use soroban_sdk::contracttype;

use crate::rewards;
use crate::StakingError;

/// Source of the emission parameters the accrual engine consumes.
pub trait RewardSchedule {
    /// Scaled reward units emitted per second.
    fn reward_rate(&self) -> i128;

    /// Latest instant up to which rewards may be attributed, given that the
    /// accumulator is already valid as of `last_update`. Never earlier than
    /// `last_update`.
    fn last_time_reward_applicable(&self, now: u64, last_update: u64) -> u64;

    /// Seconds of actual emission between `last_update` and `now`. Time
    /// outside the emitting window contributes nothing.
    fn emitting_seconds(&self, now: u64, last_update: u64) -> u64;
}

/// The currently configured reward period and its emission rate.
///
/// Phases are never stored: whether the period is pending, live or over is
/// derived from `now` against `start` and `end` on every query.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardPeriod {
    pub start: u64,
    pub end: u64,
    /// Scaled by [`rewards::PRECISION`].
    pub reward_rate: i128,
}

impl RewardPeriod {
    /// A fresh, unfunded period. `end` must be strictly after `start`.
    pub fn new(start: u64, end: u64) -> Result<Self, StakingError> {
        if end <= start {
            return Err(StakingError::InvalidEndTime);
        }
        Ok(Self {
            start,
            end,
            reward_rate: 0,
        })
    }

    /// True from `start` onward.
    pub fn has_started(&self, now: u64) -> bool {
        now >= self.start
    }

    /// True strictly after `end`; the period is still live at `end` itself.
    pub fn has_ended(&self, now: u64) -> bool {
        now > self.end
    }

    /// Started and not yet ended. A live period cannot be replaced.
    pub fn is_live(&self, now: u64) -> bool {
        self.has_started(now) && !self.has_ended(now)
    }

    /// Configured length of the window in seconds.
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Seconds left until `end`; zero once the period is over.
    pub fn time_remaining(&self, now: u64) -> Result<u64, StakingError> {
        if !self.has_started(now) {
            return Err(StakingError::PeriodNotStarted);
        }
        Ok(self.end.saturating_sub(now))
    }

    /// Seconds over which newly allocated funding will be emitted.
    ///
    /// Before the start that is the whole configured duration; while live it
    /// is what is left of it; after the end nothing can be emitted.
    pub fn emission_window(&self, now: u64) -> u64 {
        if !self.has_started(now) {
            self.duration()
        } else if self.has_ended(now) {
            0
        } else {
            self.end - now
        }
    }

    /// Checks that `[start, end]` may replace this period at `now`.
    pub fn check_replacement(&self, now: u64, start: u64, end: u64) -> Result<(), StakingError> {
        if start < now {
            return Err(StakingError::InvalidStartTime);
        }
        if end <= start {
            return Err(StakingError::InvalidEndTime);
        }
        if self.is_live(now) {
            return Err(StakingError::PeriodOngoing);
        }
        Ok(())
    }

    /// Installs a new window with a zero rate. Unspent funding of the old
    /// window is not carried over.
    pub fn replace(&mut self, now: u64, start: u64, end: u64) -> Result<(), StakingError> {
        self.check_replacement(now, start, end)?;
        *self = Self::new(start, end)?;
        Ok(())
    }

    /// Spreads `amount` (plus whatever the current rate still owes) over the
    /// emission window and returns the new rate.
    pub fn fund(&mut self, now: u64, amount: i128) -> Result<i128, StakingError> {
        if amount <= 0 {
            return Err(StakingError::InvalidAmount);
        }
        self.reward_rate =
            rewards::compute_reward_rate(self.reward_rate, self.emission_window(now), amount)?;
        Ok(self.reward_rate)
    }
}

impl RewardSchedule for RewardPeriod {
    fn reward_rate(&self) -> i128 {
        self.reward_rate
    }

    fn last_time_reward_applicable(&self, now: u64, last_update: u64) -> u64 {
        if self.has_started(now) {
            now.min(self.end).max(last_update)
        } else {
            // Nothing has been emitted since the last endpoint reached.
            last_update
        }
    }

    fn emitting_seconds(&self, now: u64, last_update: u64) -> u64 {
        if !self.has_started(now) {
            return 0;
        }
        now.min(self.end)
            .saturating_sub(last_update.max(self.start))
    }
}
