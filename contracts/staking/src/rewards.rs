use crate::StakingError;

/// Fixed-point scaling factor.
///
/// Both the reward rate and every reward-per-token value carry this factor
/// so sub-unit emissions survive integer division. 10^12 keeps twelve
/// decimals of rate precision while leaving the accumulator room for
/// ~1.7 × 10^26 reward units per staked unit over the pool's lifetime,
/// enough for many full-size periods of an 18-decimal token.
pub const PRECISION: i128 = 1_000_000_000_000;

// ── Core reward engine ──────────────────────────────────────────────────────

/// Advance the global `reward_per_token_stored` value.
///
/// This is the O(1) accumulation step:
///
/// ```text
/// Δrpt = reward_rate × elapsed_seconds / total_staked
/// new_rpt = stored_rpt + Δrpt
/// ```
///
/// `reward_rate` is already scaled by [`PRECISION`], so `Δrpt` comes out
/// scaled as well. With no stake the accumulator is left untouched: that
/// interval is simply not attributed to anyone.
///
/// # Arguments
/// * `stored`       – current `reward_per_token_stored` (scaled by PRECISION)
/// * `reward_rate`  – scaled reward units emitted per second across all stakers
/// * `elapsed`      – reward-applicable seconds since the last update
/// * `total_staked` – sum of all active stakes
pub fn compute_reward_per_token(
    stored: i128,
    reward_rate: i128,
    elapsed: u64,
    total_staked: i128,
) -> Result<i128, StakingError> {
    if total_staked <= 0 || elapsed == 0 {
        return Ok(stored);
    }

    // u64 always fits in i128.
    let delta = reward_rate
        .checked_mul(i128::from(elapsed))
        .ok_or(StakingError::ArithmeticOverflow)?
        / total_staked;

    stored
        .checked_add(delta)
        .ok_or(StakingError::ArithmeticOverflow)
}

/// Total rewards owed to a single staker.
///
/// ```text
/// earned = staked × (current_rpt − user_rpt_paid) / PRECISION + user_earned
/// ```
///
/// Only accumulation since the staker's last snapshot is counted, so
/// earlier checkpoints are never credited twice.
///
/// # Arguments
/// * `staked`        – user's current staked balance
/// * `current_rpt`   – latest global reward-per-token
/// * `user_rpt_paid` – the snapshot taken at the user's last checkpoint
/// * `user_earned`   – already-credited rewards not yet claimed
pub fn earned(
    staked: i128,
    current_rpt: i128,
    user_rpt_paid: i128,
    user_earned: i128,
) -> Result<i128, StakingError> {
    let pending = current_rpt
        .checked_sub(user_rpt_paid)
        .and_then(|delta| staked.checked_mul(delta))
        .ok_or(StakingError::ArithmeticOverflow)?
        / PRECISION;

    user_earned
        .checked_add(pending)
        .ok_or(StakingError::ArithmeticOverflow)
}

/// Reward rate after adding `amount` to whatever the current rate still
/// has to emit over the next `remaining` seconds.
///
/// ```text
/// new_rate = (current_rate × remaining + amount × PRECISION) / remaining
/// ```
///
/// A zero window cannot emit anything and yields a zero rate.
pub fn compute_reward_rate(
    current_rate: i128,
    remaining: u64,
    amount: i128,
) -> Result<i128, StakingError> {
    if remaining == 0 {
        return Ok(0);
    }

    let window = i128::from(remaining);
    let unspent = current_rate
        .checked_mul(window)
        .ok_or(StakingError::ArithmeticOverflow)?;
    let added = amount
        .checked_mul(PRECISION)
        .ok_or(StakingError::ArithmeticOverflow)?;

    Ok(unspent
        .checked_add(added)
        .ok_or(StakingError::ArithmeticOverflow)?
        / window)
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests with no Soroban environment dependency.

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    #[test]
    fn rpt_unchanged_when_no_stakers() {
        let rpt = compute_reward_per_token(500, 100, 60, 0).unwrap();
        assert_eq!(rpt, 500, "RPT must not change when total_staked is zero");
    }

    #[test]
    fn rpt_unchanged_when_no_time_elapsed() {
        let rpt = compute_reward_per_token(500, PRECISION, 0, 10).unwrap();
        assert_eq!(rpt, 500);
    }

    #[test]
    fn rpt_accumulates_correctly() {
        // 10 tokens/s for 100s over 1_000 staked → exactly 1 token per staked unit.
        let rpt = compute_reward_per_token(0, 10 * PRECISION, 100, 1_000).unwrap();
        assert_eq!(rpt, PRECISION);
    }

    #[test]
    fn rpt_overflow_is_reported() {
        let err = compute_reward_per_token(0, i128::MAX, 2, 1).unwrap_err();
        assert_eq!(err, StakingError::ArithmeticOverflow);
    }

    #[test]
    fn earned_zero_when_no_new_accumulation() {
        let e = earned(500, 100, 100, 50).unwrap();
        assert_eq!(e, 50);
    }

    #[test]
    fn earned_proportional_to_stake() {
        // RPT increased by PRECISION since last snapshot.
        let e = earned(1_000, PRECISION, 0, 0).unwrap();
        assert_eq!(e, 1_000);
    }

    #[test]
    fn earned_truncates_toward_zero() {
        // 3 × 0.5 = 1.5 → 1
        let e = earned(3, PRECISION / 2, 0, 0).unwrap();
        assert_eq!(e, 1);
    }

    #[test]
    fn earned_overflow_is_reported() {
        let err = earned(i128::MAX, PRECISION, 0, 0).unwrap_err();
        assert_eq!(err, StakingError::ArithmeticOverflow);
    }

    #[test]
    fn rate_from_fresh_funding() {
        let rate = compute_reward_rate(0, 1_800, 10_000).unwrap();
        assert_eq!(rate, 10_000 * PRECISION / 1_800);
    }

    #[test]
    fn rate_carries_unspent_funding() {
        // 100 over 100s, then another 100 added with 50s left:
        // 50 unspent + 100 new over 50s = 3 tokens/s.
        let first = compute_reward_rate(0, 100, 100).unwrap();
        assert_eq!(first, PRECISION);
        let second = compute_reward_rate(first, 50, 100).unwrap();
        assert_eq!(second, 3 * PRECISION);
    }

    #[test]
    fn rate_zero_for_empty_window() {
        assert_eq!(compute_reward_rate(PRECISION, 0, 1_000).unwrap(), 0);
    }

    #[test]
    fn emission_never_exceeds_funding() {
        // Whatever the window, rate × window may only round down.
        for window in [1u64, 7, 1_800, 86_400, 31_536_000] {
            let rate = compute_reward_rate(0, window, 999_999_937).unwrap();
            assert!(rate * i128::from(window) <= 999_999_937 * PRECISION);
        }
    }
}
