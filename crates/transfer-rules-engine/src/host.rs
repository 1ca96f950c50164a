//! The interface the engine requires from the host ledger.

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use transfer_rules_types::{AccountId, Amount};

/// Balance lookup provided by the host token ledger.
///
/// The host must call the engine exactly once per attempted transfer,
/// before moving any balance, and must abort the transfer on rejection.
pub trait HostLedger {
    /// Current balance of `account`; zero if unknown.
    fn balance_of(&self, account: &AccountId) -> Amount;
}

impl<S: BuildHasher> HostLedger for HashMap<AccountId, Amount, S> {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.get(account).copied().unwrap_or(0)
    }
}

impl HostLedger for BTreeMap<AccountId, Amount> {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.get(account).copied().unwrap_or(0)
    }
}
