use soroban_sdk::contracttype;

use crate::accrual::{AccrualState, StakerAccount};
use crate::period::{RewardPeriod, RewardSchedule};
use crate::StakingError;

/// The complete pool: accrual engine plus the timed-rate period feeding it.
///
/// Pure state machine. Every transition takes the current time explicitly,
/// starts with a checkpoint, and either applies completely or leaves both
/// the ledger and the touched account exactly as they were.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardsLedger {
    pub accrual: AccrualState,
    pub period: RewardPeriod,
    /// Cumulative rewards ever allocated through funding.
    pub total_funded: i128,
}

/// What a full exit moved out of the pool.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExitOutcome {
    pub withdrawn: i128,
    pub reward: i128,
}

impl RewardsLedger {
    /// An empty pool, optionally with an initial `(start, end)` period.
    /// The initial period may already lie in the past.
    pub fn new(initial_period: Option<(u64, u64)>) -> Result<Self, StakingError> {
        let period = match initial_period {
            Some((start, end)) => RewardPeriod::new(start, end)?,
            None => RewardPeriod::default(),
        };
        Ok(Self {
            period,
            ..Default::default()
        })
    }

    // ── Views ───────────────────────────────────────────────────────────────

    pub fn last_time_reward_applicable(&self, now: u64) -> u64 {
        self.period
            .last_time_reward_applicable(now, self.accrual.last_update_time)
    }

    pub fn reward_per_token(&self, now: u64) -> Result<i128, StakingError> {
        self.accrual.reward_per_token(&self.period, now)
    }

    pub fn earned(&self, account: &StakerAccount, now: u64) -> Result<i128, StakingError> {
        self.accrual.earned(&self.period, account, now)
    }

    pub fn time_remaining_in_period(&self, now: u64) -> Result<u64, StakingError> {
        self.period.time_remaining(now)
    }

    // ── Staker operations ───────────────────────────────────────────────────

    pub fn stake(
        &mut self,
        account: &mut StakerAccount,
        amount: i128,
        now: u64,
    ) -> Result<(), StakingError> {
        self.with_account(account, now, |ledger, account| {
            ledger.accrual.deposit(account, amount)
        })
    }

    pub fn withdraw(
        &mut self,
        account: &mut StakerAccount,
        amount: i128,
        now: u64,
    ) -> Result<(), StakingError> {
        self.with_account(account, now, |ledger, account| {
            ledger.accrual.remove(account, amount)
        })
    }

    /// Pays out everything credited to `account`. Zero is a valid outcome.
    pub fn claim(&mut self, account: &mut StakerAccount, now: u64) -> Result<i128, StakingError> {
        self.with_account(account, now, |ledger, account| {
            ledger.accrual.take_rewards(account)
        })
    }

    /// Withdraws the whole stake and claims in one step.
    pub fn exit(
        &mut self,
        account: &mut StakerAccount,
        now: u64,
    ) -> Result<ExitOutcome, StakingError> {
        self.with_account(account, now, |ledger, account| {
            let withdrawn = account.staked;
            ledger.accrual.remove(account, withdrawn)?;
            let reward = ledger.accrual.take_rewards(account)?;
            Ok(ExitOutcome { withdrawn, reward })
        })
    }

    /// Checkpoint without any other change.
    pub fn update_reward(
        &mut self,
        account: Option<&mut StakerAccount>,
        now: u64,
    ) -> Result<(), StakingError> {
        match account {
            Some(account) => self.with_account(account, now, |_, _| Ok(())),
            None => self.with_pool(now, |_| Ok(())),
        }
    }

    // ── Period management ───────────────────────────────────────────────────

    /// Replaces the period once the current one is over (or before it has
    /// begun). Accrual is flushed up to the old period's last applicable
    /// instant first, and the rate restarts at zero.
    pub fn set_new_period(&mut self, start: u64, end: u64, now: u64) -> Result<(), StakingError> {
        self.period.check_replacement(now, start, end)?;
        self.with_pool(now, |ledger| ledger.period.replace(now, start, end))
    }

    /// Adds `amount` to the rewards emitted by the current period and returns
    /// the resulting rate. Funding a period that has already ended yields a
    /// zero rate; the amount is still counted as funded.
    pub fn add_to_rewards_allocation(&mut self, amount: i128, now: u64) -> Result<i128, StakingError> {
        self.with_pool(now, |ledger| {
            let rate = ledger.period.fund(now, amount)?;
            ledger.total_funded = ledger
                .total_funded
                .checked_add(amount)
                .ok_or(StakingError::ArithmeticOverflow)?;
            Ok(rate)
        })
    }

    // ── Checkpoint wrappers ─────────────────────────────────────────────────

    /// Checkpoint the pool and `account`, then run `op`. Commits only if both
    /// succeed.
    fn with_account<T, F>(
        &mut self,
        account: &mut StakerAccount,
        now: u64,
        op: F,
    ) -> Result<T, StakingError>
    where
        F: FnOnce(&mut Self, &mut StakerAccount) -> Result<T, StakingError>,
    {
        let mut next = self.clone();
        let mut touched = account.clone();

        next.accrual
            .checkpoint(&next.period, now, Some(&mut touched))?;
        let out = op(&mut next, &mut touched)?;

        *self = next;
        *account = touched;
        Ok(out)
    }

    /// Checkpoint the pool alone, then run `op`. Commits only if both
    /// succeed.
    fn with_pool<T, F>(&mut self, now: u64, op: F) -> Result<T, StakingError>
    where
        F: FnOnce(&mut Self) -> Result<T, StakingError>,
    {
        let mut next = self.clone();

        next.accrual.checkpoint(&next.period, now, None)?;
        let out = op(&mut next)?;

        *self = next;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use crate::rewards::PRECISION;

    const START: u64 = 1_000;
    const DURATION: u64 = 1_800;
    const END: u64 = START + DURATION;

    fn ledger() -> RewardsLedger {
        let mut ledger = RewardsLedger::new(None).unwrap();
        ledger.set_new_period(START, END, START - 60).unwrap();
        ledger
    }

    #[test]
    fn new_validates_initial_period() {
        assert_eq!(
            RewardsLedger::new(Some((10, 10))),
            Err(StakingError::InvalidEndTime)
        );
        let ledger = RewardsLedger::new(Some((0, 10))).unwrap();
        assert_eq!(ledger.period.start, 0);
        assert_eq!(ledger.period.end, 10);
        assert_eq!(ledger.accrual.last_update_time, 0);
    }

    #[test]
    fn lone_staker_receives_whole_allocation() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();

        ledger.stake(&mut alice, 100, START - 30).unwrap();
        ledger.add_to_rewards_allocation(10_000, START - 20).unwrap();

        let earned = ledger.earned(&alice, END + 1).unwrap();
        assert!(earned <= 10_000);
        assert!(earned >= 9_995, "rounding loss too large: {earned}");
    }

    #[test]
    fn equal_stakers_split_evenly() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();
        let mut bob = StakerAccount::default();

        ledger.stake(&mut alice, 100, START - 30).unwrap();
        ledger.stake(&mut bob, 100, START - 30).unwrap();
        ledger.add_to_rewards_allocation(10_000, START - 20).unwrap();

        let a = ledger.claim(&mut alice, END + 1).unwrap();
        let b = ledger.claim(&mut bob, END + 1).unwrap();
        assert_eq!(a, b);
        assert!((4_995..=5_000).contains(&a));
        assert!(a + b <= ledger.total_funded);
    }

    #[test]
    fn late_joiner_only_earns_remaining_time() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();
        let mut bob = StakerAccount::default();

        ledger.stake(&mut alice, 100, START - 30).unwrap();
        ledger.add_to_rewards_allocation(10_000, START - 20).unwrap();
        ledger.stake(&mut bob, 100, START + DURATION / 2).unwrap();

        let a = ledger.earned(&alice, END + 1).unwrap();
        let b = ledger.earned(&bob, END + 1).unwrap();
        assert!((7_495..=7_500).contains(&a), "alice earned {a}");
        assert!((2_495..=2_500).contains(&b), "bob earned {b}");
    }

    #[test]
    fn second_claim_pays_nothing() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();

        ledger.stake(&mut alice, 100, START).unwrap();
        ledger.add_to_rewards_allocation(1_800, START).unwrap();

        let first = ledger.claim(&mut alice, START + 100).unwrap();
        assert_eq!(first, 100);
        assert_eq!(ledger.claim(&mut alice, START + 100).unwrap(), 0);
        assert_eq!(ledger.accrual.total_paid, 100);
    }

    #[test]
    fn pre_start_time_accrues_nothing() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();

        ledger.stake(&mut alice, 100, 0).unwrap();
        ledger.add_to_rewards_allocation(1_800, 0).unwrap();

        assert_eq!(ledger.earned(&alice, START - 1).unwrap(), 0);
        assert_eq!(ledger.last_time_reward_applicable(START - 1), 0);
        assert_eq!(ledger.earned(&alice, START + 10).unwrap(), 10);
    }

    #[test]
    fn accrual_stops_at_period_end() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();

        ledger.stake(&mut alice, 100, START).unwrap();
        ledger.add_to_rewards_allocation(1_800, START).unwrap();

        let at_end = ledger.earned(&alice, END).unwrap();
        assert_eq!(at_end, 1_800);
        assert_eq!(ledger.earned(&alice, END + 10_000).unwrap(), at_end);
    }

    #[test]
    fn new_period_flushes_old_accrual_and_resets_rate() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();

        ledger.stake(&mut alice, 100, START).unwrap();
        ledger.add_to_rewards_allocation(1_800, START).unwrap();

        ledger.set_new_period(END + 100, END + 200, END + 50).unwrap();
        assert_eq!(ledger.period.reward_rate, 0);
        assert_eq!(ledger.accrual.last_update_time, END);
        assert_eq!(ledger.last_time_reward_applicable(END + 60), END);

        // Nothing more accrues in the new period until it is funded.
        assert_eq!(ledger.earned(&alice, END + 150).unwrap(), 1_800);
        ledger.add_to_rewards_allocation(100, END + 150).unwrap();
        assert_eq!(ledger.earned(&alice, END + 200).unwrap(), 1_900);
    }

    #[test]
    fn live_period_cannot_be_replaced() {
        let mut ledger = ledger();
        let before = ledger.clone();

        assert_eq!(
            ledger.set_new_period(END + 10, END + 20, START + 5),
            Err(StakingError::PeriodOngoing)
        );
        assert_eq!(
            ledger.set_new_period(END + 10, END + 20, END),
            Err(StakingError::PeriodOngoing)
        );
        assert_eq!(ledger, before);
        assert_eq!(ledger.set_new_period(END + 10, END + 20, END + 1), Ok(()));
    }

    #[test]
    fn zero_funding_fails() {
        let mut ledger = ledger();
        let before = ledger.clone();
        assert_eq!(
            ledger.add_to_rewards_allocation(0, START),
            Err(StakingError::InvalidAmount)
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn funding_after_end_is_stranded() {
        let mut ledger = ledger();
        let rate = ledger.add_to_rewards_allocation(500, END + 1).unwrap();
        assert_eq!(rate, 0);
        assert_eq!(ledger.total_funded, 500);
    }

    #[test]
    fn mid_period_top_up_raises_rate_for_time_left() {
        let mut ledger = ledger();
        ledger.add_to_rewards_allocation(1_800, START - 1).unwrap();
        assert_eq!(ledger.period.reward_rate, PRECISION);

        let rate = ledger
            .add_to_rewards_allocation(900, START + DURATION / 2)
            .unwrap();
        assert_eq!(rate, 2 * PRECISION);
    }

    #[test]
    fn failed_withdraw_leaves_state_untouched() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();
        ledger.stake(&mut alice, 100, START).unwrap();
        ledger.add_to_rewards_allocation(1_800, START).unwrap();

        let ledger_before = ledger.clone();
        let alice_before = alice.clone();
        assert_eq!(
            ledger.withdraw(&mut alice, 101, START + 500),
            Err(StakingError::InsufficientBalance)
        );
        assert_eq!(ledger, ledger_before);
        assert_eq!(alice, alice_before);
    }

    #[test]
    fn exit_returns_stake_and_rewards() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();
        ledger.stake(&mut alice, 100, START).unwrap();
        ledger.add_to_rewards_allocation(1_800, START).unwrap();

        let outcome = ledger.exit(&mut alice, START + 300).unwrap();
        assert_eq!(
            outcome,
            ExitOutcome {
                withdrawn: 100,
                reward: 300
            }
        );
        assert_eq!(alice, StakerAccount {
            staked: 0,
            reward_per_token_paid: ledger.accrual.reward_per_token_stored,
            rewards: 0,
        });
        assert_eq!(ledger.accrual.total_staked, 0);
        assert_eq!(
            ledger.exit(&mut alice, START + 301),
            Err(StakingError::InvalidAmount)
        );
    }

    #[test]
    fn chained_large_periods_keep_withdrawals_open() {
        // 100 tokens of an 18-decimal asset per period, all to a 1-unit stake.
        const FUNDING: i128 = 100 * 1_000_000_000_000_000_000;
        const PERIODS: u64 = 10;

        let mut ledger = RewardsLedger::new(Some((100, 200))).unwrap();
        let mut alice = StakerAccount::default();
        ledger.stake(&mut alice, 1, 0).unwrap();
        ledger.add_to_rewards_allocation(FUNDING, 0).unwrap();

        for i in 1..PERIODS {
            let start = 100 + i * 300;
            ledger.set_new_period(start, start + 100, start - 50).unwrap();
            ledger.add_to_rewards_allocation(FUNDING, start - 50).unwrap();
        }

        let now = 100 + PERIODS * 300;
        let total = FUNDING * PERIODS as i128;
        assert_eq!(ledger.earned(&alice, now).unwrap(), total);
        assert_eq!(ledger.withdraw(&mut alice, 1, now), Ok(()));
        assert_eq!(ledger.claim(&mut alice, now), Ok(total));
        assert_eq!(ledger.accrual.total_staked, 0);
    }

    #[test]
    fn update_reward_for_account_credits_without_paying() {
        let mut ledger = ledger();
        let mut alice = StakerAccount::default();
        ledger.stake(&mut alice, 100, START).unwrap();
        ledger.add_to_rewards_allocation(1_800, START).unwrap();

        ledger.update_reward(Some(&mut alice), START + 40).unwrap();
        assert_eq!(alice.rewards, 40);
        assert_eq!(ledger.accrual.total_paid, 0);

        ledger.update_reward(None, START + 80).unwrap();
        assert_eq!(ledger.accrual.last_update_time, START + 80);
        assert_eq!(ledger.earned(&alice, START + 80).unwrap(), 80);
    }
}
