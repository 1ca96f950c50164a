//! Restriction engine: the transfer-time state machine.
//!
//! For every transfer the host submits, the engine
//!
//! 1. classifies sender and recipient,
//! 2. debits the sender's lockup lots oldest first, whatever its class,
//! 3. checks `sender_balance - amount >= required` against the post-debit
//!    state,
//! 4. creates the recipient's lots (issuer origination or propagation),
//! 5. commits both queues.
//!
//! Steps 2 through 5 run while both account queues are locked, on a copy of
//! the queues that is written back only when the transfer is allowed. A
//! rejected transfer leaves no trace.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use transfer_rules_ledger::{
    AccountLockState, ClassificationRegistry, LedgerSnapshot, LockLedger, state_digest,
};
use transfer_rules_types::{
    AccountClass, AccountId, Amount, EngineConfig, LotDebit, RestrictionHold, Result, Timestamp,
    TransferReceipt, TransferRulesError,
};

use crate::host::HostLedger;

/// Persistable engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub ledger: LedgerSnapshot,
    pub registry: ClassificationRegistry,
}

/// Transfer gate shared by every caller of the host ledger.
///
/// `Send + Sync`; wrap in an `Arc` to share. Transfers take the registry
/// read lock and then the two account locks; admin mutations of the
/// registry take its write lock. The registry lock is always acquired
/// before any account lock.
#[derive(Debug)]
pub struct RestrictionEngine {
    ledger: LockLedger,
    registry: RwLock<ClassificationRegistry>,
    config: EngineConfig,
}

impl RestrictionEngine {
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            domestic_secs = config.base_durations.domestic,
            foreign_secs = config.base_durations.foreign,
            default_category = %config.default_category,
            "Restriction engine initialized"
        );
        Ok(Self {
            ledger: LockLedger::new(),
            registry: RwLock::new(ClassificationRegistry::from_config(&config)),
            config,
        })
    }

    /// Restore an engine from a snapshot.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn from_snapshot(config: EngineConfig, snapshot: EngineSnapshot) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger: LockLedger::from_snapshot(snapshot.ledger),
            registry: RwLock::new(snapshot.registry),
            config,
        })
    }

    /// Configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The per-account lock ledger.
    #[must_use]
    pub fn ledger(&self) -> &LockLedger {
        &self.ledger
    }

    /// Read access to the classification registry.
    ///
    /// Drop the guard before calling [`snapshot`](Self::snapshot) or
    /// [`state_digest`](Self::state_digest), which take the write lock.
    pub fn registry(&self) -> RwLockReadGuard<'_, ClassificationRegistry> {
        self.registry.read()
    }

    pub(crate) fn registry_mut(&self) -> RwLockWriteGuard<'_, ClassificationRegistry> {
        self.registry.write()
    }

    /// Sender role of `account` under the current registry.
    #[must_use]
    pub fn class_of(&self, account: &AccountId) -> AccountClass {
        self.registry.read().class_of(account)
    }

    /// The account's holds, front first.
    #[must_use]
    pub fn holds(&self, account: &AccountId) -> Vec<RestrictionHold> {
        self.ledger.holds(account)
    }

    /// The minimum balance `account` must keep at `now`.
    ///
    /// Manual minimums always count. Lots count only while the account is
    /// a holder; issuers and exempt accounts are never bound by them.
    #[must_use]
    pub fn required_minimum(&self, account: &AccountId, now: Timestamp) -> Amount {
        if self.class_of(account).lots_apply() {
            self.ledger.total_required(account, now)
        } else {
            self.ledger.manual_required(account, now)
        }
    }

    /// Decide a transfer and, if allowed, apply its lot side effects.
    ///
    /// `sender_balance` is the sender's balance before the transfer. On
    /// `Ok` the host must move `amount`; on `Err` it must abort, and the
    /// restriction state is unchanged.
    ///
    /// # Errors
    /// Returns `InsufficientUnlockedBalance` if the sender would fall below
    /// its required minimum, or if `amount` exceeds `sender_balance`.
    pub fn check_and_apply(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
        sender_balance: Amount,
        now: Timestamp,
    ) -> Result<TransferReceipt> {
        let outcome = self.decide(from, to, amount, sender_balance, now);

        match &outcome {
            Ok(receipt) if receipt.debits.is_empty() && receipt.created.is_empty() => {
                tracing::debug!(
                    from = %from.short(),
                    to = %to.short(),
                    amount,
                    "Transfer allowed without lot movement"
                );
            }
            Ok(receipt) => {
                tracing::info!(
                    from = %from.short(),
                    to = %to.short(),
                    amount,
                    debited = receipt.debits.len(),
                    consumed = receipt.consumed_total(),
                    created = receipt.created.len(),
                    locked = receipt.locked_total(),
                    "Transfer allowed"
                );
            }
            Err(TransferRulesError::InsufficientUnlockedBalance {
                required,
                remaining,
            }) => {
                tracing::warn!(
                    from = %from.short(),
                    to = %to.short(),
                    amount,
                    sender_balance,
                    required = *required,
                    remaining = *remaining,
                    "Transfer rejected: insufficient unlocked balance"
                );
            }
            Err(e) => {
                tracing::warn!(
                    from = %from.short(),
                    to = %to.short(),
                    amount,
                    error = %e,
                    "Transfer rejected"
                );
            }
        }

        outcome
    }

    /// [`check_and_apply`](Self::check_and_apply) with the sender's
    /// balance read from the host.
    ///
    /// # Errors
    /// As [`check_and_apply`](Self::check_and_apply).
    pub fn check_transfer<H: HostLedger + ?Sized>(
        &self,
        host: &H,
        from: AccountId,
        to: AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<TransferReceipt> {
        self.check_and_apply(from, to, amount, host.balance_of(&from), now)
    }

    /// Drop every hold that requires nothing at `now`.
    pub fn prune_all(&self, now: Timestamp) -> usize {
        let removed = self.ledger.prune_all(now);
        if removed > 0 {
            tracing::debug!(removed, "Pruned expired holds");
        }
        removed
    }

    /// Engine state for persistence or comparison.
    ///
    /// Holds the registry write lock while reading the ledger, so no
    /// transfer is halfway through its commit and lots are captured on one
    /// side of every transfer.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let registry = self.registry.write();
        EngineSnapshot {
            ledger: self.ledger.snapshot(),
            registry: registry.clone(),
        }
    }

    /// SHA-256 over the full restriction state, taken under the same lock
    /// as [`snapshot`](Self::snapshot).
    #[must_use]
    pub fn state_digest(&self) -> [u8; 32] {
        let registry = self.registry.write();
        state_digest(&self.ledger.snapshot(), &registry)
    }

    fn decide(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
        sender_balance: Amount,
        now: Timestamp,
    ) -> Result<TransferReceipt> {
        let registry = self.registry.read();
        let sender = registry.class_of(&from);

        if from == to {
            // Tokens do not move, so neither do lots.
            return self.ledger.with_account(from, |state| {
                let required = sender_floor(state, sender, now);
                let remaining = sender_balance.checked_sub(amount);
                if remaining.is_none() || sender_balance < required {
                    return Err(TransferRulesError::InsufficientUnlockedBalance {
                        required,
                        remaining: remaining.unwrap_or(0),
                    });
                }
                Ok(TransferReceipt::unrestricted(from, to, amount, now))
            });
        }

        let recipient_base = registry
            .category(&to)
            .map(|category| registry.base_duration(category));

        self.ledger.with_pair(from, to, |from_state, to_state| {
            // Lots leave with the tokens even when they do not bind the
            // sender, so an account never keeps more lots than tokens.
            let mut next_from = from_state.clone();
            let debits = next_from.debit_lots(amount, now);

            let required = sender_floor(&next_from, sender, now);
            let remaining = sender_balance.checked_sub(amount);
            match remaining {
                Some(left) if left >= required => {}
                _ => {
                    return Err(TransferRulesError::InsufficientUnlockedBalance {
                        required,
                        remaining: remaining.unwrap_or(0),
                    });
                }
            }

            let created = self.recipient_lots(sender, recipient_base, amount, &debits, now);
            let mut next_to = to_state.clone();
            for hold in &created {
                next_to.insert(*hold)?;
            }

            next_from.prune(now);
            next_to.prune(now);
            *from_state = next_from;
            *to_state = next_to;

            Ok(TransferReceipt {
                from,
                to,
                amount,
                at: now,
                debits,
                created,
            })
        })?
    }

    /// Lots the recipient receives. `recipient_base` is `None` when the
    /// recipient is exempt. Lots released by an exempt sender vanish.
    fn recipient_lots(
        &self,
        sender: AccountClass,
        recipient_base: Option<u64>,
        amount: Amount,
        debits: &[LotDebit],
        now: Timestamp,
    ) -> Vec<RestrictionHold> {
        let Some(base) = recipient_base else {
            return Vec::new();
        };
        match sender {
            AccountClass::Issuer if amount > 0 => {
                vec![RestrictionHold::lot(
                    amount,
                    now,
                    base,
                    self.config.issuer_lot_decay,
                )]
            }
            AccountClass::Holder(_) => debits
                .iter()
                .filter(|debit| debit.consumed > 0 && debit.remaining_duration > 0)
                .map(|debit| {
                    RestrictionHold::lot(
                        debit.consumed,
                        now,
                        debit.remaining_duration.min(base),
                        self.config.propagation_decay.resolve(debit.decay_mode),
                    )
                })
                .collect(),
            AccountClass::Issuer | AccountClass::Exempt => Vec::new(),
        }
    }
}

/// Required minimum for a sender of class `sender` with queue `state`.
fn sender_floor(state: &AccountLockState, sender: AccountClass, now: Timestamp) -> Amount {
    if sender.lots_apply() {
        state.total_required(now)
    } else {
        state.manual_required(now)
    }
}
