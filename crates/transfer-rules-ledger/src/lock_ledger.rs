//! Concurrent lock ledger.
//!
//! Maps each account to its [`AccountLockState`] behind its own mutex, so
//! operations on different accounts never contend. A transfer that touches
//! two accounts locks both in ascending [`AccountId`] order and holds them
//! for the whole read-compute-commit cycle.
//!
//! A slot is created on first access and dropped again once its queue is
//! empty and no caller holds a handle to it, so accounts that never carry
//! holds do not accumulate in the map. Removal happens under the map's
//! shard lock and only when the map owns the last handle, which means no
//! in-flight operation can be writing to a slot that has been dropped.

use std::{collections::BTreeMap, sync::Arc};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use transfer_rules_types::{
    AccountId, Amount, LotDebit, RestrictionHold, Result, Timestamp, TransferRulesError,
};

use crate::lock_queue::AccountLockState;

type Slot = Arc<Mutex<AccountLockState>>;

/// Persistable view of every account's queue. Empty queues are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub accounts: BTreeMap<AccountId, AccountLockState>,
}

/// Per-account restriction queues, guarded per key.
#[derive(Debug, Default)]
pub struct LockLedger {
    accounts: DashMap<AccountId, Slot>,
}

impl LockLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let accounts = snapshot
            .accounts
            .into_iter()
            .map(|(account, state)| (account, Arc::new(Mutex::new(state))))
            .collect();
        Self { accounts }
    }

    fn slot(&self, account: AccountId) -> Slot {
        Arc::clone(&self.accounts.entry(account).or_default())
    }

    fn existing(&self, account: &AccountId) -> Option<Slot> {
        self.accounts.get(account).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop the slot of `account` if its queue is empty and the map holds
    /// the only handle. Callers must have released their own handle first.
    fn release_if_empty(&self, account: &AccountId) {
        self.accounts.remove_if(account, |_, slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().is_some_and(|state| state.is_empty())
        });
    }

    /// Sum of every active hold's required amount.
    #[must_use]
    pub fn total_required(&self, account: &AccountId, now: Timestamp) -> Amount {
        self.existing(account)
            .map_or(0, |slot| slot.lock().total_required(now))
    }

    /// Required amount from manual minimums only.
    #[must_use]
    pub fn manual_required(&self, account: &AccountId, now: Timestamp) -> Amount {
        self.existing(account)
            .map_or(0, |slot| slot.lock().manual_required(now))
    }

    /// Required amount from lockup lots only.
    #[must_use]
    pub fn lot_required(&self, account: &AccountId, now: Timestamp) -> Amount {
        self.existing(account)
            .map_or(0, |slot| slot.lock().lot_required(now))
    }

    /// Append a hold to the account's queue.
    ///
    /// # Errors
    /// Returns `InvalidParameters` if the hold is malformed.
    pub fn insert(&self, account: AccountId, hold: RestrictionHold) -> Result<()> {
        hold.validate()?;
        let result = self.slot(account).lock().insert(hold);
        self.release_if_empty(&account);
        result
    }

    /// Consume up to `amount` from the account's lots, oldest first.
    pub fn debit_lots(&self, account: AccountId, amount: Amount, now: Timestamp) -> Vec<LotDebit> {
        let debits = match self.existing(&account) {
            Some(slot) => slot.lock().debit_lots(amount, now),
            None => Vec::new(),
        };
        self.release_if_empty(&account);
        debits
    }

    /// Drop holds that require nothing at `now`. Returns how many were removed.
    pub fn prune(&self, account: &AccountId, now: Timestamp) -> usize {
        let removed = self.existing(account).map_or(0, |slot| slot.lock().prune(now));
        self.release_if_empty(account);
        removed
    }

    /// Prune every account. Returns the total number of holds removed.
    pub fn prune_all(&self, now: Timestamp) -> usize {
        let slots = self.slots();
        let removed = slots.iter().map(|(_, slot)| slot.lock().prune(now)).sum();
        let accounts: Vec<_> = slots.into_iter().map(|(account, _)| account).collect();
        for account in &accounts {
            self.release_if_empty(account);
        }
        removed
    }

    /// Remove the account's manual minimums. Returns how many were removed.
    pub fn remove_manual(&self, account: &AccountId) -> usize {
        let removed = self
            .existing(account)
            .map_or(0, |slot| slot.lock().remove_manual());
        self.release_if_empty(account);
        removed
    }

    /// The account's holds, front first.
    #[must_use]
    pub fn holds(&self, account: &AccountId) -> Vec<RestrictionHold> {
        self.existing(account)
            .map(|slot| slot.lock().to_vec())
            .unwrap_or_default()
    }

    /// Run `f` with exclusive access to one account's queue.
    pub fn with_account<R>(&self, account: AccountId, f: impl FnOnce(&mut AccountLockState) -> R) -> R {
        let result = {
            let slot = self.slot(account);
            let mut guard = slot.lock();
            f(&mut guard)
        };
        self.release_if_empty(&account);
        result
    }

    /// Run `f` with exclusive access to two distinct accounts' queues.
    ///
    /// The queues are passed in argument order. The locks are taken in
    /// ascending account order, so concurrent calls on overlapping pairs
    /// cannot deadlock.
    ///
    /// # Errors
    /// Returns `InvalidParameters` if `a == b`.
    pub fn with_pair<R>(
        &self,
        a: AccountId,
        b: AccountId,
        f: impl FnOnce(&mut AccountLockState, &mut AccountLockState) -> R,
    ) -> Result<R> {
        if a == b {
            return Err(TransferRulesError::InvalidParameters {
                reason: format!("with_pair needs two distinct accounts, got {a} twice"),
            });
        }
        let result = {
            let slot_a = self.slot(a);
            let slot_b = self.slot(b);
            let (mut guard_a, mut guard_b) = if a < b {
                let guard_a = slot_a.lock();
                let guard_b = slot_b.lock();
                (guard_a, guard_b)
            } else {
                let guard_b = slot_b.lock();
                let guard_a = slot_a.lock();
                (guard_a, guard_b)
            };
            f(&mut guard_a, &mut guard_b)
        };
        self.release_if_empty(&a);
        self.release_if_empty(&b);
        Ok(result)
    }

    /// Copy of every non-empty queue. Each queue is read under its own
    /// lock; the snapshot is consistent per account.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let accounts = self
            .slots()
            .into_iter()
            .filter_map(|(account, slot)| {
                let state = slot.lock().clone();
                (!state.is_empty()).then_some((account, state))
            })
            .collect();
        LedgerSnapshot { accounts }
    }

    /// Number of accounts with a live slot: a non-empty queue, or an
    /// operation in progress.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn slots(&self) -> Vec<(AccountId, Slot)> {
        self.accounts
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }
}
