//! Transfer outcome types.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, DecayMode, RestrictionHold, Timestamp, constants};

/// The part of one sender lot consumed by an outgoing transfer.
///
/// Feeds lot propagation: the recipient's new lot is sized by `consumed`
/// and capped by `remaining_duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotDebit {
    /// Amount attributed to this lot.
    pub consumed: Amount,
    /// The lot's undecayed remainder before the debit.
    pub remaining_before: Amount,
    pub expiry: Timestamp,
    /// Seconds from the debit time to the lot's expiry.
    pub remaining_duration: u64,
    pub decay_mode: DecayMode,
}

impl LotDebit {
    /// Whether the debit emptied the lot.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.consumed == self.remaining_before
    }

    /// Fraction of the lot's remainder consumed, in basis points.
    #[must_use]
    pub fn consumed_bps(&self) -> u128 {
        if self.remaining_before == 0 {
            return 0;
        }
        // consumed <= remaining_before, so this never exceeds BPS_PRECISION.
        self.consumed.saturating_mul(constants::BPS_PRECISION) / self.remaining_before
    }
}

/// Side effects of an allowed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Amount,
    pub at: Timestamp,
    /// Sender lots consumed, front to back.
    pub debits: Vec<LotDebit>,
    /// Lots created for the recipient.
    pub created: Vec<RestrictionHold>,
}

impl TransferReceipt {
    /// A receipt with no lot movement.
    #[must_use]
    pub fn unrestricted(from: AccountId, to: AccountId, amount: Amount, at: Timestamp) -> Self {
        Self {
            from,
            to,
            amount,
            at,
            debits: Vec::new(),
            created: Vec::new(),
        }
    }

    /// Total amount drawn from sender lots.
    #[must_use]
    pub fn consumed_total(&self) -> Amount {
        self.debits.iter().map(|d| d.consumed).sum()
    }

    /// Total amount placed under new recipient lots.
    #[must_use]
    pub fn locked_total(&self) -> Amount {
        self.created.iter().map(|h| h.target_amount).sum()
    }
}
