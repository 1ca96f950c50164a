//! Canonical state digest.
//!
//! Two engines holding the same restriction state produce the same digest.
//! A rejected transfer must leave the digest unchanged, which is how tests
//! prove rejections are side-effect free.

use sha2::{Digest, Sha256};
use transfer_rules_types::{Category, DecayMode, HoldKind, RestrictionHold, WhitelistEntry};

use crate::{lock_ledger::LedgerSnapshot, registry::ClassificationRegistry};

/// SHA-256 over the ledger snapshot and the registry.
///
/// Covers, in order: every non-empty account queue (accounts ascending,
/// holds front first), the issuer set, the whitelist entries, the base
/// durations and the default category.
#[must_use]
pub fn state_digest(ledger: &LedgerSnapshot, registry: &ClassificationRegistry) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"transfer-rules:state:v1:");

    hasher.update((ledger.accounts.len() as u64).to_le_bytes());
    for (account, state) in &ledger.accounts {
        hasher.update(account.as_bytes());
        hasher.update((state.len() as u64).to_le_bytes());
        for hold in state.iter() {
            hash_hold(&mut hasher, hold);
        }
    }

    let issuers: Vec<_> = registry.issuers().collect();
    hasher.update((issuers.len() as u64).to_le_bytes());
    for account in issuers {
        hasher.update(account.as_bytes());
    }
    let entries: Vec<_> = registry.whitelist_entries().collect();
    hasher.update((entries.len() as u64).to_le_bytes());
    for (account, entry) in entries {
        hasher.update(account.as_bytes());
        hasher.update(entry_tag(*entry));
    }
    let durations = registry.base_durations();
    hasher.update(durations.domestic.to_le_bytes());
    hasher.update(durations.foreign.to_le_bytes());
    hasher.update([category_tag(registry.default_category())]);

    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Hex form of [`state_digest`] for logs.
#[must_use]
pub fn state_digest_hex(ledger: &LedgerSnapshot, registry: &ClassificationRegistry) -> String {
    hex::encode(state_digest(ledger, registry))
}

fn hash_hold(hasher: &mut Sha256, hold: &RestrictionHold) {
    hasher.update(hold.target_amount.to_le_bytes());
    hasher.update(hold.expiry.0.to_le_bytes());
    hasher.update(hold.created_at.0.to_le_bytes());
    hasher.update([
        match hold.decay_mode {
            DecayMode::Cliff => 0,
            DecayMode::Linear => 1,
        },
        match hold.kind {
            HoldKind::Manual => 0,
            HoldKind::Lot => 1,
        },
    ]);
}

fn category_tag(category: Category) -> u8 {
    match category {
        Category::Domestic => 0,
        Category::Foreign => 1,
    }
}

fn entry_tag(entry: WhitelistEntry) -> [u8; 2] {
    match entry {
        WhitelistEntry::Exempt => [0, 0],
        WhitelistEntry::Holder(category) => [1, category_tag(category)],
    }
}
