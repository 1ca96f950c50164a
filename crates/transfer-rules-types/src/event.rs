//! Audit event types.
//!
//! Every successful admin mutation produces an [`AuditEvent`] recording who
//! did what, to which account, with which parameters, and when.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, BaseDurations, DecayMode, EventId, Timestamp, WhitelistEntry};

/// An admin operation together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminOperation {
    AddMinimum {
        target_amount: Amount,
        expiry: Timestamp,
        decay_mode: DecayMode,
    },
    RemoveMinimums {
        removed: usize,
    },
    AddIssuer,
    RemoveIssuer,
    WhitelistAdd {
        entry: WhitelistEntry,
    },
    WhitelistRemove,
    SetBaseDurations {
        durations: BaseDurations,
    },
    TransferOwnership {
        previous: AccountId,
    },
}

impl AdminOperation {
    /// Stable operation name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddMinimum { .. } => "ADD_MINIMUM",
            Self::RemoveMinimums { .. } => "REMOVE_MINIMUMS",
            Self::AddIssuer => "ADD_ISSUER",
            Self::RemoveIssuer => "REMOVE_ISSUER",
            Self::WhitelistAdd { .. } => "WHITELIST_ADD",
            Self::WhitelistRemove => "WHITELIST_REMOVE",
            Self::SetBaseDurations { .. } => "SET_BASE_DURATIONS",
            Self::TransferOwnership { .. } => "TRANSFER_OWNERSHIP",
        }
    }
}

impl std::fmt::Display for AdminOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of the admin audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: EventId,
    pub operation: AdminOperation,
    /// Account the operation targeted; `None` for global settings.
    pub account: Option<AccountId>,
    /// The authorized caller.
    pub caller: AccountId,
    pub timestamp: Timestamp,
}

impl AuditEvent {
    #[must_use]
    pub fn new(
        operation: AdminOperation,
        account: Option<AccountId>,
        caller: AccountId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: EventId::new(),
            operation,
            account,
            caller,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names() {
        assert_eq!(AdminOperation::AddIssuer.to_string(), "ADD_ISSUER");
        assert_eq!(
            AdminOperation::SetBaseDurations {
                durations: BaseDurations::default()
            }
            .name(),
            "SET_BASE_DURATIONS"
        );
    }

    #[test]
    fn event_serde_keeps_large_amounts() {
        let event = AuditEvent::new(
            AdminOperation::AddMinimum {
                target_amount: 700 * crate::constants::ONE_TOKEN,
                expiry: Timestamp(2_000),
                decay_mode: DecayMode::Cliff,
            },
            Some(AccountId::from_index(1)),
            AccountId::from_index(9),
            Timestamp(1_000),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: AuditEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
