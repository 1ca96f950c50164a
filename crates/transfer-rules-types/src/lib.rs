//! # transfer-rules-types
//!
//! Shared types, errors, and configuration for the transfer-restriction
//! rules engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`EventId`]
//! - **Time**: [`Timestamp`] (integer unix seconds)
//! - **Hold model**: [`RestrictionHold`], [`DecayMode`], [`HoldKind`]
//! - **Classification**: [`AccountClass`], [`Category`], [`WhitelistEntry`]
//! - **Transfer outcome**: [`TransferReceipt`], [`LotDebit`]
//! - **Audit model**: [`AuditEvent`], [`AdminOperation`]
//! - **Configuration**: [`EngineConfig`], [`BaseDurations`], [`PropagationDecay`]
//! - **Errors**: [`TransferRulesError`] with `TR_ERR_` prefix codes
//! - **Constants**: defaults and time units

pub mod class;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod hold;
pub mod ids;
pub mod receipt;
pub mod time;

pub use class::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use hold::*;
pub use ids::*;
pub use receipt::*;
pub use time::*;

/// Token amount in base units. The token carries 18 decimals, so whole-token
/// balances in the billions still fit comfortably.
pub type Amount = u128;
