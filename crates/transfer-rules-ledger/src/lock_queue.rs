//! Per-account lock queue.
//!
//! Holds are kept in creation order. Entries are never reordered: lot
//! consumption always walks from the front (oldest first), and new holds are
//! appended at the back.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use transfer_rules_types::{Amount, HoldKind, LotDebit, RestrictionHold, Result, Timestamp};

use crate::decay::required_now;

/// Ordered restriction holds for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountLockState {
    holds: VecDeque<RestrictionHold>,
}

impl AccountLockState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted list, keeping its order.
    pub fn from_holds(holds: impl IntoIterator<Item = RestrictionHold>) -> Self {
        Self {
            holds: holds.into_iter().collect(),
        }
    }

    /// Append a hold at the back of the queue.
    ///
    /// # Errors
    /// Returns `InvalidParameters` for a zero amount or an expiry that is
    /// not after the creation time. Nothing is stored in that case.
    pub fn insert(&mut self, hold: RestrictionHold) -> Result<()> {
        hold.validate()?;
        self.holds.push_back(hold);
        Ok(())
    }

    /// Sum of `required_now` over every hold.
    #[must_use]
    pub fn total_required(&self, now: Timestamp) -> Amount {
        self.required_of(now, |_| true)
    }

    /// Sum of `required_now` over manual minimums only.
    #[must_use]
    pub fn manual_required(&self, now: Timestamp) -> Amount {
        self.required_of(now, |h| h.kind == HoldKind::Manual)
    }

    /// Sum of `required_now` over lots only.
    #[must_use]
    pub fn lot_required(&self, now: Timestamp) -> Amount {
        self.required_of(now, RestrictionHold::is_lot)
    }

    fn required_of(&self, now: Timestamp, keep: impl Fn(&RestrictionHold) -> bool) -> Amount {
        self.holds
            .iter()
            .filter(|h| keep(*h))
            .map(|h| required_now(h, now))
            .fold(0, Amount::saturating_add)
    }

    /// Consume up to `amount` from lots, oldest first.
    ///
    /// Each lot gives up at most its undecayed remainder. A partially
    /// consumed lot is re-anchored at `now` with the reduced amount and the
    /// same expiry. Exhausted lots are zeroed and removed by the next
    /// [`prune`](Self::prune). Manual minimums are skipped.
    ///
    /// Returns one [`LotDebit`] per lot touched, in queue order.
    pub fn debit_lots(&mut self, amount: Amount, now: Timestamp) -> Vec<LotDebit> {
        let mut left = amount;
        let mut debits = Vec::new();

        for hold in self.holds.iter_mut().filter(|h| h.is_lot()) {
            if left == 0 {
                break;
            }
            let remaining = required_now(hold, now);
            if remaining == 0 {
                continue;
            }
            let consumed = left.min(remaining);
            left -= consumed;

            debits.push(LotDebit {
                consumed,
                remaining_before: remaining,
                expiry: hold.expiry,
                remaining_duration: hold.expiry.saturating_since(now),
                decay_mode: hold.decay_mode,
            });

            hold.target_amount = remaining - consumed;
            hold.created_at = now;

            tracing::debug!(
                consumed,
                remaining_before = remaining,
                expiry = hold.expiry.0,
                mode = %hold.decay_mode,
                "Lot debited"
            );
        }

        debits
    }

    /// Remove holds that no longer require anything at `now`.
    ///
    /// Returns the number of holds removed.
    pub fn prune(&mut self, now: Timestamp) -> usize {
        let before = self.holds.len();
        self.holds.retain(|h| required_now(h, now) > 0);
        before - self.holds.len()
    }

    /// Drop every manual minimum, keeping lots in order.
    ///
    /// Returns the number of holds removed.
    pub fn remove_manual(&mut self) -> usize {
        let before = self.holds.len();
        self.holds.retain(RestrictionHold::is_lot);
        before - self.holds.len()
    }

    /// Holds in queue order, front first.
    pub fn iter(&self) -> impl Iterator<Item = &RestrictionHold> {
        self.holds.iter()
    }

    /// Holds as a vector, front first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<RestrictionHold> {
        self.holds.iter().copied().collect()
    }

    /// Number of holds, lots and manual minimums alike.
    #[must_use]
    pub fn len(&self) -> usize {
        self.holds.len()
    }

    /// Whether the queue holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transfer_rules_types::DecayMode;

    const NOW: Timestamp = Timestamp(1_000);

    fn lot(amount: Amount, duration: u64) -> RestrictionHold {
        RestrictionHold::lot(amount, NOW, duration, DecayMode::Cliff)
    }

    fn manual(amount: Amount, expiry: u64) -> RestrictionHold {
        RestrictionHold::manual(amount, NOW, Timestamp(expiry), DecayMode::Cliff)
    }

    #[test]
    fn insert_rejects_zero_amount() {
        let mut state = AccountLockState::new();
        assert!(state.insert(lot(0, 10)).is_err());
        assert!(state.is_empty());
    }

    #[test]
    fn fifo_consumption_exhausts_front_first() {
        let mut state = AccountLockState::new();
        state.insert(lot(100, 50)).unwrap();
        state.insert(lot(200, 60)).unwrap();

        let debits = state.debit_lots(150, NOW);

        assert_eq!(debits.len(), 2);
        assert_eq!(debits[0].consumed, 100);
        assert!(debits[0].exhausted());
        assert_eq!(debits[1].consumed, 50);
        assert_eq!(debits[1].remaining_before, 200);

        state.prune(NOW);
        let holds = state.to_vec();
        assert_eq!(holds.len(), 1);
        assert_eq!(holds[0].target_amount, 150);
        assert_eq!(holds[0].expiry, NOW.plus(60));
    }

    #[test]
    fn second_lot_untouched_until_first_empty() {
        let mut state = AccountLockState::new();
        state.insert(lot(100, 50)).unwrap();
        state.insert(lot(200, 60)).unwrap();

        let debits = state.debit_lots(60, NOW);
        assert_eq!(debits.len(), 1);
        let holds = state.to_vec();
        assert_eq!(holds[0].target_amount, 40);
        assert_eq!(holds[1].target_amount, 200);
    }

    #[test]
    fn manual_holds_are_not_debited() {
        let mut state = AccountLockState::new();
        state.insert(manual(700, 5_000)).unwrap();
        state.insert(lot(100, 50)).unwrap();

        let debits = state.debit_lots(500, NOW);
        assert_eq!(debits.len(), 1);
        assert_eq!(debits[0].consumed, 100);
        assert_eq!(state.manual_required(NOW), 700);
        assert_eq!(state.lot_required(NOW), 0);
    }

    #[test]
    fn expired_lots_are_skipped() {
        let mut state = AccountLockState::new();
        state.insert(lot(100, 10)).unwrap();
        state.insert(lot(200, 100)).unwrap();

        let later = NOW.plus(20);
        let debits = state.debit_lots(50, later);
        assert_eq!(debits.len(), 1);
        assert_eq!(debits[0].remaining_before, 200);
        assert_eq!(debits[0].remaining_duration, 80);
    }

    #[test]
    fn partial_linear_lot_is_reanchored() {
        let mut state = AccountLockState::new();
        state
            .insert(RestrictionHold::lot(1_000, NOW, 100, DecayMode::Linear))
            .unwrap();

        // Half-way: 500 remain; take 200.
        let mid = NOW.plus(50);
        let debits = state.debit_lots(200, mid);
        assert_eq!(debits[0].remaining_before, 500);
        assert_eq!(state.lot_required(mid), 300);

        // Remainder keeps decaying to zero at the original expiry.
        assert_eq!(state.lot_required(NOW.plus(75)), 150);
        assert_eq!(state.lot_required(NOW.plus(100)), 0);
    }

    #[test]
    fn prune_removes_decayed_and_consumed() {
        let mut state = AccountLockState::new();
        state.insert(manual(10, 1_005)).unwrap();
        state.insert(lot(100, 50)).unwrap();
        state.insert(lot(30, 500)).unwrap();
        state.debit_lots(100, NOW);

        assert_eq!(state.prune(NOW.plus(10)), 2);
        assert_eq!(state.len(), 1);
        assert_eq!(state.total_required(NOW.plus(10)), 30);
    }

    #[test]
    fn remove_manual_keeps_lot_order() {
        let mut state = AccountLockState::new();
        state.insert(lot(1, 50)).unwrap();
        state.insert(manual(5, 2_000)).unwrap();
        state.insert(lot(2, 50)).unwrap();

        assert_eq!(state.remove_manual(), 1);
        let amounts: Vec<_> = state.iter().map(|h| h.target_amount).collect();
        assert_eq!(amounts, vec![1, 2]);
    }

    #[test]
    fn over_attribution_stops_when_lots_run_out() {
        let mut state = AccountLockState::new();
        state.insert(lot(100, 50)).unwrap();
        let debits = state.debit_lots(1_000, NOW);
        let consumed: Amount = debits.iter().map(|d| d.consumed).sum();
        assert_eq!(consumed, 100);
    }
}
