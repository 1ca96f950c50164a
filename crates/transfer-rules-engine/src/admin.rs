//! Owner-gated admin interface.
//!
//! Every mutator takes an explicit [`AuthContext`]. Calls from anyone but
//! the current owner fail with `Unauthorized` before touching any state and
//! leave no audit event. Each successful call records one [`AuditEvent`]
//! per affected account.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use transfer_rules_types::{
    AccountClass, AccountId, AdminOperation, Amount, AuditEvent, BaseDurations, DecayMode,
    RestrictionHold, Result, Timestamp, TransferRulesError, WhitelistEntry,
};

use crate::{audit::AuditLog, engine::RestrictionEngine};

/// Identity of the party invoking an admin operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    caller: AccountId,
}

impl AuthContext {
    #[must_use]
    pub fn new(caller: AccountId) -> Self {
        Self { caller }
    }

    #[must_use]
    pub fn caller(&self) -> AccountId {
        self.caller
    }
}

/// Admin operations over a shared [`RestrictionEngine`].
pub struct AdminInterface {
    engine: Arc<RestrictionEngine>,
    owner: RwLock<AccountId>,
    audit: Mutex<AuditLog>,
}

impl AdminInterface {
    /// Admin interface owned by `owner`, with an empty audit log.
    #[must_use]
    pub fn new(engine: Arc<RestrictionEngine>, owner: AccountId) -> Self {
        let audit = AuditLog::new(engine.config().audit_capacity);
        Self {
            engine,
            owner: RwLock::new(owner),
            audit: Mutex::new(audit),
        }
    }

    /// The engine this interface administers.
    #[must_use]
    pub fn engine(&self) -> &Arc<RestrictionEngine> {
        &self.engine
    }

    /// The account currently allowed to call mutators.
    #[must_use]
    pub fn owner(&self) -> AccountId {
        *self.owner.read()
    }

    /// Retained audit events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.audit.lock().iter().cloned().collect()
    }

    /// Run `f` with the audit log locked.
    pub fn with_audit<R>(&self, f: impl FnOnce(&AuditLog) -> R) -> R {
        f(&self.audit.lock())
    }

    // ------------------------------------------------------------------
    // Minimum holds
    // ------------------------------------------------------------------

    /// Add a manual minimum hold of `target_amount` on `account`, released
    /// at `expiry`. `gradual` selects linear decay from `now`.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners; `InvalidParameters` if
    /// `target_amount` is zero or `expiry <= now`.
    pub fn add_minimum(
        &self,
        auth: &AuthContext,
        account: AccountId,
        target_amount: Amount,
        expiry: Timestamp,
        gradual: bool,
        now: Timestamp,
    ) -> Result<()> {
        let _owner = self.authorize(auth, "ADD_MINIMUM")?;
        let decay_mode = DecayMode::from_gradual(gradual);
        let hold = RestrictionHold::manual(target_amount, now, expiry, decay_mode);
        self.engine.ledger().insert(account, hold)?;

        tracing::info!(
            account = %account.short(),
            target_amount,
            expiry = expiry.0,
            mode = %decay_mode,
            "Minimum hold added"
        );
        self.record(
            auth,
            AdminOperation::AddMinimum {
                target_amount,
                expiry,
                decay_mode,
            },
            Some(account),
            now,
        );
        Ok(())
    }

    /// Remove every manual minimum on `account`; lots are kept.
    /// Returns how many holds were removed.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners.
    pub fn remove_minimums(
        &self,
        auth: &AuthContext,
        account: AccountId,
        now: Timestamp,
    ) -> Result<usize> {
        let _owner = self.authorize(auth, "REMOVE_MINIMUMS")?;
        let removed = self.engine.ledger().remove_manual(&account);
        tracing::info!(account = %account.short(), removed, "Minimum holds removed");
        self.record(
            auth,
            AdminOperation::RemoveMinimums { removed },
            Some(account),
            now,
        );
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Grant issuer status. The account's whitelist entry is kept.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners.
    pub fn add_issuer(&self, auth: &AuthContext, account: AccountId, now: Timestamp) -> Result<()> {
        let _owner = self.authorize(auth, "ADD_ISSUER")?;
        let added = self.engine.registry_mut().add_issuer(account);
        tracing::info!(account = %account.short(), added, "Issuer added");
        self.record(auth, AdminOperation::AddIssuer, Some(account), now);
        Ok(())
    }

    /// Revoke issuer status. Returns `false` if `account` was not an issuer.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners.
    pub fn remove_issuer(
        &self,
        auth: &AuthContext,
        account: AccountId,
        now: Timestamp,
    ) -> Result<bool> {
        let _owner = self.authorize(auth, "REMOVE_ISSUER")?;
        let removed = self.engine.registry_mut().remove_issuer(&account);
        tracing::info!(account = %account.short(), removed, "Issuer removed");
        self.record(auth, AdminOperation::RemoveIssuer, Some(account), now);
        Ok(removed)
    }

    /// Set the whitelist entry of every account in `accounts` to `entry`.
    /// Issuers stay issuers.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners; `InvalidParameters` if `accounts` is
    /// empty.
    pub fn whitelist_add(
        &self,
        auth: &AuthContext,
        accounts: &[AccountId],
        entry: WhitelistEntry,
        now: Timestamp,
    ) -> Result<()> {
        let _owner = self.authorize(auth, "WHITELIST_ADD")?;
        require_accounts(accounts)?;
        {
            let mut registry = self.engine.registry_mut();
            for account in accounts {
                registry.whitelist(*account, entry);
            }
        }
        tracing::info!(
            count = accounts.len(),
            class = %AccountClass::from(entry),
            "Accounts whitelisted"
        );
        for account in accounts {
            self.record(auth, AdminOperation::WhitelistAdd { entry }, Some(*account), now);
        }
        Ok(())
    }

    /// Forget the whitelist classification of every account in `accounts`.
    /// Issuer status is not affected. Returns how many were cleared.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners; `InvalidParameters` if `accounts` is
    /// empty.
    pub fn whitelist_remove(
        &self,
        auth: &AuthContext,
        accounts: &[AccountId],
        now: Timestamp,
    ) -> Result<usize> {
        let _owner = self.authorize(auth, "WHITELIST_REMOVE")?;
        require_accounts(accounts)?;
        let cleared = {
            let mut registry = self.engine.registry_mut();
            accounts
                .iter()
                .filter(|account| registry.clear_whitelist(account).is_some())
                .count()
        };
        tracing::info!(count = accounts.len(), cleared, "Whitelist entries removed");
        for account in accounts {
            self.record(auth, AdminOperation::WhitelistRemove, Some(*account), now);
        }
        Ok(cleared)
    }

    /// Replace the per-category base lockup durations, in seconds.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners; `InvalidParameters` if either
    /// duration is zero, in which case the current durations are kept.
    pub fn set_base_durations(
        &self,
        auth: &AuthContext,
        domestic: u64,
        foreign: u64,
        now: Timestamp,
    ) -> Result<()> {
        let _owner = self.authorize(auth, "SET_BASE_DURATIONS")?;
        let durations = BaseDurations { domestic, foreign };
        self.engine.registry_mut().set_base_durations(durations)?;
        tracing::info!(domestic, foreign, "Base durations updated");
        self.record(
            auth,
            AdminOperation::SetBaseDurations { durations },
            None,
            now,
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------

    /// Hand the owner role to `new_owner`.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners.
    pub fn transfer_ownership(
        &self,
        auth: &AuthContext,
        new_owner: AccountId,
        now: Timestamp,
    ) -> Result<()> {
        let previous = {
            let mut owner = self.owner.write();
            if auth.caller != *owner {
                return Err(unauthorized(auth, "TRANSFER_OWNERSHIP"));
            }
            std::mem::replace(&mut *owner, new_owner)
        };
        tracing::info!(
            previous = %previous.short(),
            new_owner = %new_owner.short(),
            "Ownership transferred"
        );
        self.record(
            auth,
            AdminOperation::TransferOwnership { previous },
            Some(new_owner),
            now,
        );
        Ok(())
    }

    /// Check the caller is the owner. The returned guard keeps ownership
    /// fixed for the rest of the operation.
    fn authorize(
        &self,
        auth: &AuthContext,
        operation: &'static str,
    ) -> Result<RwLockReadGuard<'_, AccountId>> {
        let owner = self.owner.read();
        if auth.caller == *owner {
            Ok(owner)
        } else {
            Err(unauthorized(auth, operation))
        }
    }

    fn record(
        &self,
        auth: &AuthContext,
        operation: AdminOperation,
        account: Option<AccountId>,
        now: Timestamp,
    ) {
        let event = AuditEvent::new(operation, account, auth.caller, now);
        tracing::debug!(event = %event.id, operation = %event.operation, "Audit event recorded");
        self.audit.lock().record(event);
    }
}

fn unauthorized(auth: &AuthContext, operation: &'static str) -> TransferRulesError {
    tracing::warn!(
        caller = %auth.caller.short(),
        operation,
        "Admin call rejected: caller is not the owner"
    );
    TransferRulesError::Unauthorized {
        caller: auth.caller,
    }
}

fn require_accounts(accounts: &[AccountId]) -> Result<()> {
    if accounts.is_empty() {
        return Err(TransferRulesError::InvalidParameters {
            reason: "account list must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use transfer_rules_types::{Category, EngineConfig, HoldKind};

    const NOW: Timestamp = Timestamp(1_000);

    fn setup() -> (AdminInterface, AuthContext) {
        let engine = Arc::new(RestrictionEngine::new(EngineConfig::default()).unwrap());
        let owner = AccountId::from_index(100);
        (AdminInterface::new(engine, owner), AuthContext::new(owner))
    }

    #[test]
    fn add_minimum_records_hold_and_event() {
        let (admin, auth) = setup();
        let account = AccountId::from_index(1);
        admin
            .add_minimum(&auth, account, 700, NOW.plus(1_000), false, NOW)
            .unwrap();

        let holds = admin.engine().holds(&account);
        assert_eq!(holds.len(), 1);
        assert_eq!(holds[0].kind, HoldKind::Manual);
        assert_eq!(holds[0].decay_mode, DecayMode::Cliff);
        assert_eq!(admin.engine().required_minimum(&account, NOW), 700);

        let events = admin.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation.name(), "ADD_MINIMUM");
        assert_eq!(events[0].account, Some(account));
        assert_eq!(events[0].caller, auth.caller());
    }

    #[test]
    fn add_minimum_validates() {
        let (admin, auth) = setup();
        let account = AccountId::from_index(1);
        assert!(matches!(
            admin.add_minimum(&auth, account, 0, NOW.plus(10), false, NOW),
            Err(TransferRulesError::InvalidParameters { .. })
        ));
        assert!(matches!(
            admin.add_minimum(&auth, account, 10, NOW, true, NOW),
            Err(TransferRulesError::InvalidParameters { .. })
        ));
        assert!(admin.events().is_empty());
    }

    #[test]
    fn non_owner_changes_nothing() {
        let (admin, _) = setup();
        let intruder = AuthContext::new(AccountId::from_index(7));
        let account = AccountId::from_index(1);
        let before = admin.engine().state_digest();

        let results = [
            admin.add_minimum(&intruder, account, 10, NOW.plus(10), false, NOW),
            admin.add_issuer(&intruder, account, NOW),
            admin.whitelist_add(&intruder, &[account], WhitelistEntry::Exempt, NOW),
            admin.set_base_durations(&intruder, 1, 1, NOW),
            admin.transfer_ownership(&intruder, intruder.caller(), NOW),
        ];
        for result in results {
            assert_eq!(
                result.unwrap_err(),
                TransferRulesError::Unauthorized {
                    caller: intruder.caller()
                }
            );
        }
        assert!(admin.remove_minimums(&intruder, account, NOW).is_err());
        assert!(admin.remove_issuer(&intruder, account, NOW).is_err());
        assert!(admin.whitelist_remove(&intruder, &[account], NOW).is_err());

        assert_eq!(admin.engine().state_digest(), before);
        assert!(admin.events().is_empty());
        assert_ne!(admin.owner(), intruder.caller());
    }

    #[test]
    fn whitelist_add_and_remove() {
        let (admin, auth) = setup();
        let a = AccountId::from_index(1);
        let b = AccountId::from_index(2);
        let issuer = AccountId::from_index(3);
        admin.add_issuer(&auth, issuer, NOW).unwrap();
        admin
            .whitelist_add(&auth, &[a, b], WhitelistEntry::Holder(Category::Foreign), NOW)
            .unwrap();
        assert_eq!(admin.engine().registry().category(&a), Some(Category::Foreign));

        let cleared = admin.whitelist_remove(&auth, &[a, issuer], NOW).unwrap();
        assert_eq!(cleared, 1);
        assert!(!admin.engine().registry().is_classified(&a));
        assert!(admin.engine().registry().is_issuer(&issuer));
        assert_eq!(admin.events().len(), 1 + 2 + 2);
    }

    #[test]
    fn whitelisting_an_issuer_keeps_it_issuing() {
        let (admin, auth) = setup();
        let issuer = AccountId::from_index(1);
        let buyer = AccountId::from_index(2);
        admin.add_issuer(&auth, issuer, NOW).unwrap();
        admin
            .whitelist_add(&auth, &[issuer], WhitelistEntry::Holder(Category::Foreign), NOW)
            .unwrap();
        admin
            .whitelist_add(&auth, &[issuer], WhitelistEntry::Exempt, NOW)
            .unwrap();
        assert!(admin.engine().registry().is_issuer(&issuer));

        let receipt = admin
            .engine()
            .check_and_apply(issuer, buyer, 100, 100, NOW)
            .unwrap();
        assert_eq!(receipt.locked_total(), 100);
        assert_eq!(admin.engine().required_minimum(&buyer, NOW), 100);

        assert_eq!(admin.whitelist_remove(&auth, &[issuer], NOW).unwrap(), 1);
        assert!(admin.engine().registry().is_issuer(&issuer));
    }

    #[test]
    fn whitelist_rejects_empty_list() {
        let (admin, auth) = setup();
        assert!(matches!(
            admin.whitelist_add(&auth, &[], WhitelistEntry::Exempt, NOW),
            Err(TransferRulesError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn remove_minimums_keeps_lots() {
        let (admin, auth) = setup();
        let issuer = AccountId::from_index(1);
        let holder = AccountId::from_index(2);
        admin.add_issuer(&auth, issuer, NOW).unwrap();
        admin
            .engine()
            .check_and_apply(issuer, holder, 100, 100, NOW)
            .unwrap();
        admin
            .add_minimum(&auth, holder, 50, NOW.plus(10), true, NOW)
            .unwrap();

        assert_eq!(admin.remove_minimums(&auth, holder, NOW).unwrap(), 1);
        let holds = admin.engine().holds(&holder);
        assert_eq!(holds.len(), 1);
        assert!(holds[0].is_lot());
    }

    #[test]
    fn zero_base_duration_rejected() {
        let (admin, auth) = setup();
        let before = admin.engine().registry().base_durations();
        assert!(admin.set_base_durations(&auth, 0, 10, NOW).is_err());
        assert_eq!(admin.engine().registry().base_durations(), before);
        assert!(admin.events().is_empty());
    }

    #[test]
    fn ownership_moves() {
        let (admin, auth) = setup();
        let next = AccountId::from_index(101);
        admin.transfer_ownership(&auth, next, NOW).unwrap();
        assert_eq!(admin.owner(), next);
        assert!(admin.add_issuer(&auth, AccountId::from_index(1), NOW).is_err());

        let next_auth = AuthContext::new(next);
        admin
            .add_issuer(&next_auth, AccountId::from_index(1), NOW)
            .unwrap();
        let events = admin.events();
        assert_eq!(
            events[0].operation,
            AdminOperation::TransferOwnership {
                previous: auth.caller()
            }
        );
        assert_eq!(events[1].caller, next);
    }
}
