//! Error types for the rules engine.
//!
//! All errors use the `TR_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Transfer decisions
//! - 2xx: Authorization
//! - 3xx: Parameter validation
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AccountId, Amount};

/// Central error enum for all rules engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferRulesError {
    // =================================================================
    // Transfer Errors (1xx)
    // =================================================================
    /// The sender's balance after the transfer would fall below the
    /// required minimum. Recoverable: retry once holds decay, or send less.
    #[error(
        "TR_ERR_100: Insufficient unlocked balance: {remaining} would remain, {required} required"
    )]
    InsufficientUnlockedBalance { required: Amount, remaining: Amount },

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// An owner-only operation was called by someone else.
    #[error("TR_ERR_200: Unauthorized caller: {caller}")]
    Unauthorized { caller: AccountId },

    // =================================================================
    // Parameter Errors (3xx)
    // =================================================================
    /// Zero amount, expiry not in the future, malformed identifier, etc.
    #[error("TR_ERR_300: Invalid parameters: {reason}")]
    InvalidParameters { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("TR_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("TR_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config, missing fields, etc.).
    #[error("TR_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TransferRulesError>;

impl From<serde_json::Error> for TransferRulesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
