//! Account classification.
//!
//! Issuer status and the whitelist entry are recorded independently: an
//! issuer can also be whitelisted, and whitelisting never touches issuer
//! status. For transfer decisions the two resolve to one [`AccountClass`],
//! with issuer status taking precedence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Recipient category, which selects the base lockup duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    Domestic,
    Foreign,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domestic => write!(f, "DOMESTIC"),
            Self::Foreign => write!(f, "FOREIGN"),
        }
    }
}

/// The role an account plays as a transfer sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountClass {
    /// Primary issuer. Holds unrestricted supply; its outgoing transfers
    /// originate new lots for recipients.
    Issuer,
    /// Whitelisted exempt. Never checked against lots.
    Exempt,
    /// Ordinary holder in a category.
    Holder(Category),
}

impl AccountClass {
    /// Whether this account's lots count towards its outgoing floor and are
    /// consumed by its outgoing transfers.
    #[must_use]
    pub fn lots_apply(self) -> bool {
        matches!(self, Self::Holder(_))
    }

    /// The holder category, if this is a holder.
    #[must_use]
    pub fn category(self) -> Option<Category> {
        match self {
            Self::Holder(category) => Some(category),
            Self::Issuer | Self::Exempt => None,
        }
    }
}

impl fmt::Display for AccountClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issuer => write!(f, "ISSUER"),
            Self::Exempt => write!(f, "EXEMPT"),
            Self::Holder(category) => write!(f, "HOLDER({category})"),
        }
    }
}

/// What a whitelist entry assigns to the listed accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhitelistEntry {
    /// Exempt from lots, both as sender and as recipient.
    Exempt,
    /// A holder in the given category.
    Holder(Category),
}

impl From<WhitelistEntry> for AccountClass {
    fn from(entry: WhitelistEntry) -> Self {
        match entry {
            WhitelistEntry::Exempt => Self::Exempt,
            WhitelistEntry::Holder(category) => Self::Holder(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lots_bind_only_holders() {
        assert!(AccountClass::Holder(Category::Foreign).lots_apply());
        assert!(!AccountClass::Exempt.lots_apply());
        assert!(!AccountClass::Issuer.lots_apply());
    }

    #[test]
    fn category_only_for_holders() {
        assert_eq!(
            AccountClass::Holder(Category::Domestic).category(),
            Some(Category::Domestic)
        );
        assert_eq!(AccountClass::Issuer.category(), None);
    }

    #[test]
    fn whitelist_entry_maps_to_class() {
        assert_eq!(AccountClass::from(WhitelistEntry::Exempt), AccountClass::Exempt);
        assert_eq!(
            AccountClass::from(WhitelistEntry::Holder(Category::Foreign)),
            AccountClass::Holder(Category::Foreign)
        );
    }

    #[test]
    fn class_display() {
        assert_eq!(
            AccountClass::Holder(Category::Foreign).to_string(),
            "HOLDER(FOREIGN)"
        );
    }
}
