//! Restriction hold types.
//!
//! A [`RestrictionHold`] requires that some amount stay in an account until
//! (or gradually until) an expiry time. Holds come in two kinds:
//!
//! - **Manual** minimums set by the owner. They are a pure balance floor and
//!   are never consumed by outgoing transfers.
//! - **Lots** created automatically when restricted tokens arrive. A lot is a
//!   tax lot: outgoing transfers consume lots first-in-first-out and the
//!   consumed part travels on to the recipient.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Amount, Timestamp, TransferRulesError};

/// How the required amount of a hold falls towards zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecayMode {
    /// Full amount until expiry, then zero.
    Cliff,
    /// Falls linearly from the full amount at `created_at` to zero at `expiry`.
    Linear,
}

impl DecayMode {
    /// Mode selected by the `gradual` flag of an admin minimum.
    #[must_use]
    pub fn from_gradual(gradual: bool) -> Self {
        if gradual { Self::Linear } else { Self::Cliff }
    }
}

impl fmt::Display for DecayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cliff => write!(f, "CLIFF"),
            Self::Linear => write!(f, "LINEAR"),
        }
    }
}

/// Whether a hold was set by the owner or created by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldKind {
    Manual,
    Lot,
}

impl fmt::Display for HoldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "MANUAL"),
            Self::Lot => write!(f, "LOT"),
        }
    }
}

/// A single time-bounded requirement attached to one account.
///
/// The owning account is implied by the queue the hold sits in.
///
/// `created_at` is the decay anchor. A lot that is partially consumed is
/// re-anchored at the consumption time with its reduced amount, so the
/// remainder keeps decaying towards the same `expiry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestrictionHold {
    /// Amount required at `created_at`.
    pub target_amount: Amount,
    /// Fully released at and after this time.
    pub expiry: Timestamp,
    pub decay_mode: DecayMode,
    pub created_at: Timestamp,
    pub kind: HoldKind,
}

impl RestrictionHold {
    /// An owner-set minimum.
    #[must_use]
    pub fn manual(
        target_amount: Amount,
        created_at: Timestamp,
        expiry: Timestamp,
        decay_mode: DecayMode,
    ) -> Self {
        Self {
            target_amount,
            expiry,
            decay_mode,
            created_at,
            kind: HoldKind::Manual,
        }
    }

    /// A lockup lot lasting `duration` seconds from `created_at`.
    #[must_use]
    pub fn lot(
        target_amount: Amount,
        created_at: Timestamp,
        duration: u64,
        decay_mode: DecayMode,
    ) -> Self {
        Self {
            target_amount,
            expiry: created_at.plus(duration),
            decay_mode,
            created_at,
            kind: HoldKind::Lot,
        }
    }

    #[must_use]
    pub fn is_lot(&self) -> bool {
        self.kind == HoldKind::Lot
    }

    /// Seconds between the decay anchor and expiry.
    #[must_use]
    pub fn span(&self) -> u64 {
        self.expiry.saturating_since(self.created_at)
    }

    /// Check the structural invariants: non-zero amount, expiry after creation.
    ///
    /// # Errors
    /// Returns `InvalidParameters` describing the first violated invariant.
    pub fn validate(&self) -> crate::Result<()> {
        if self.target_amount == 0 {
            return Err(TransferRulesError::InvalidParameters {
                reason: "hold amount must be positive".to_string(),
            });
        }
        if self.expiry <= self.created_at {
            return Err(TransferRulesError::InvalidParameters {
                reason: format!(
                    "hold expiry {} must be after creation {}",
                    self.expiry.0, self.created_at.0
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradual_flag_selects_linear() {
        assert_eq!(DecayMode::from_gradual(true), DecayMode::Linear);
        assert_eq!(DecayMode::from_gradual(false), DecayMode::Cliff);
    }

    #[test]
    fn lot_expiry_is_created_plus_duration() {
        let lot = RestrictionHold::lot(500, Timestamp(1_000), 40, DecayMode::Cliff);
        assert_eq!(lot.expiry, Timestamp(1_040));
        assert_eq!(lot.span(), 40);
        assert!(lot.is_lot());
    }

    #[test]
    fn zero_amount_invalid() {
        let hold = RestrictionHold::manual(0, Timestamp(0), Timestamp(10), DecayMode::Cliff);
        assert!(matches!(
            hold.validate(),
            Err(TransferRulesError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn expiry_not_after_creation_invalid() {
        let hold = RestrictionHold::manual(1, Timestamp(10), Timestamp(10), DecayMode::Linear);
        assert!(hold.validate().is_err());
        let hold = RestrictionHold::manual(1, Timestamp(10), Timestamp(11), DecayMode::Linear);
        assert!(hold.validate().is_ok());
    }

    #[test]
    fn display_tags() {
        assert_eq!(DecayMode::Linear.to_string(), "LINEAR");
        assert_eq!(HoldKind::Lot.to_string(), "LOT");
    }
}
