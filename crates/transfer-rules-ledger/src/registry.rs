//! Account classification registry.
//!
//! Tracks which accounts are issuers and which carry a whitelist entry
//! (exempt, or a holder category), together with the per-category base
//! lockup durations. The two are independent: granting or revoking issuer
//! status never changes an account's whitelist entry, and the reverse.
//! Accounts without an entry resolve to a holder in the configured default
//! category.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use transfer_rules_types::{
    AccountClass, AccountId, BaseDurations, Category, EngineConfig, Result, WhitelistEntry,
};

/// Process-wide account classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRegistry {
    issuers: BTreeSet<AccountId>,
    whitelist: BTreeMap<AccountId, WhitelistEntry>,
    base_durations: BaseDurations,
    default_category: Category,
}

impl ClassificationRegistry {
    #[must_use]
    pub fn new(base_durations: BaseDurations, default_category: Category) -> Self {
        Self {
            issuers: BTreeSet::new(),
            whitelist: BTreeMap::new(),
            base_durations,
            default_category,
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.base_durations, config.default_category)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// The sender role of `account`: issuer if it is one, otherwise what
    /// its whitelist entry says, otherwise a default-category holder.
    #[must_use]
    pub fn class_of(&self, account: &AccountId) -> AccountClass {
        if self.is_issuer(account) {
            return AccountClass::Issuer;
        }
        match self.whitelist.get(account) {
            Some(entry) => (*entry).into(),
            None => AccountClass::Holder(self.default_category),
        }
    }

    #[must_use]
    pub fn is_issuer(&self, account: &AccountId) -> bool {
        self.issuers.contains(account)
    }

    #[must_use]
    pub fn is_exempt(&self, account: &AccountId) -> bool {
        self.whitelist.get(account) == Some(&WhitelistEntry::Exempt)
    }

    /// Whether restricted tokens arriving at `account` create lots.
    /// Everyone but exempt accounts receives them, issuers included.
    #[must_use]
    pub fn receives_lots(&self, account: &AccountId) -> bool {
        !self.is_exempt(account)
    }

    /// Category that sets the lockup for lots received by `account`, or
    /// `None` for exempt accounts.
    #[must_use]
    pub fn category(&self, account: &AccountId) -> Option<Category> {
        match self.whitelist.get(account) {
            Some(WhitelistEntry::Exempt) => None,
            Some(WhitelistEntry::Holder(category)) => Some(*category),
            None => Some(self.default_category),
        }
    }

    /// The explicit whitelist entry of `account`, if any.
    #[must_use]
    pub fn whitelist_entry(&self, account: &AccountId) -> Option<WhitelistEntry> {
        self.whitelist.get(account).copied()
    }

    /// Whether `account` is an issuer or carries a whitelist entry.
    #[must_use]
    pub fn is_classified(&self, account: &AccountId) -> bool {
        self.is_issuer(account) || self.whitelist.contains_key(account)
    }

    #[must_use]
    pub fn base_duration(&self, category: Category) -> u64 {
        self.base_durations.for_category(category)
    }

    #[must_use]
    pub fn base_durations(&self) -> BaseDurations {
        self.base_durations
    }

    #[must_use]
    pub fn default_category(&self) -> Category {
        self.default_category
    }

    /// Registered issuers, in account order.
    pub fn issuers(&self) -> impl Iterator<Item = &AccountId> {
        self.issuers.iter()
    }

    /// Whitelist entries, in account order.
    pub fn whitelist_entries(&self) -> impl Iterator<Item = (&AccountId, &WhitelistEntry)> {
        self.whitelist.iter()
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Grant issuer status. Returns `false` if `account` already had it.
    pub fn add_issuer(&mut self, account: AccountId) -> bool {
        self.issuers.insert(account)
    }

    /// Revoke issuer status. Returns `false` if `account` was not an issuer.
    pub fn remove_issuer(&mut self, account: &AccountId) -> bool {
        self.issuers.remove(account)
    }

    /// Whitelist `account` as exempt. Returns `false` if it already was.
    pub fn add_exempt(&mut self, account: AccountId) -> bool {
        self.whitelist(account, WhitelistEntry::Exempt) != Some(WhitelistEntry::Exempt)
    }

    /// Drop an exempt entry. Returns `false` if `account` was not exempt.
    pub fn remove_exempt(&mut self, account: &AccountId) -> bool {
        if self.is_exempt(account) {
            self.whitelist.remove(account);
            true
        } else {
            false
        }
    }

    /// Whitelist `account` as a holder in `category`.
    pub fn set_category(&mut self, account: AccountId, category: Category) {
        self.whitelist(account, WhitelistEntry::Holder(category));
    }

    /// Set the whitelist entry of `account`, returning the previous one.
    pub fn whitelist(&mut self, account: AccountId, entry: WhitelistEntry) -> Option<WhitelistEntry> {
        self.whitelist.insert(account, entry)
    }

    /// Forget the whitelist entry of `account`. Returns the previous one.
    pub fn clear_whitelist(&mut self, account: &AccountId) -> Option<WhitelistEntry> {
        self.whitelist.remove(account)
    }

    /// # Errors
    /// Returns `InvalidParameters` if either duration is zero; the current
    /// durations are kept.
    pub fn set_base_durations(&mut self, durations: BaseDurations) -> Result<()> {
        durations.validate()?;
        self.base_durations = durations;
        Ok(())
    }
}

impl Default for ClassificationRegistry {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
