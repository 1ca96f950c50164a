//! Hold decay.
//!
//! Computes how much of a hold is still required at a point in time. Pure,
//! integer-only, and exact: the same hold and timestamp always produce the
//! same amount on every host.

use transfer_rules_types::{Amount, DecayMode, RestrictionHold, Timestamp};

/// Amount of `hold` still required at `now`.
///
/// - At or after `expiry`: zero.
/// - `Cliff`: the full `target_amount` before expiry.
/// - `Linear`: `target_amount * (expiry - now) / (expiry - created_at)`,
///   truncated; the full amount at or before `created_at`.
#[must_use]
pub fn required_now(hold: &RestrictionHold, now: Timestamp) -> Amount {
    if now >= hold.expiry {
        return 0;
    }
    match hold.decay_mode {
        DecayMode::Cliff => hold.target_amount,
        DecayMode::Linear => {
            if now <= hold.created_at {
                return hold.target_amount;
            }
            let remaining = hold.expiry.saturating_since(now);
            linear_share(hold.target_amount, remaining, hold.span())
        }
    }
}

/// `amount * part / whole` without overflow, truncated.
///
/// Splits `amount = q * whole + r` so that `q * part <= amount` and
/// `r * part < whole^2`, both of which fit in u128.
fn linear_share(amount: Amount, part: u64, whole: u64) -> Amount {
    if whole == 0 {
        return 0;
    }
    let part = u128::from(part.min(whole));
    let whole = u128::from(whole);
    let q = amount / whole;
    let r = amount % whole;
    q * part + r * part / whole
}
