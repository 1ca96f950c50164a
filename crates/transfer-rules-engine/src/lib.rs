//! # transfer-rules-engine
//!
//! **Transfer gate** for a restricted token: the host ledger asks the
//! engine before every balance movement and honors its verdict.
//!
//! ## Architecture
//!
//! 1. **RestrictionEngine**: decides each transfer and applies its lot side
//!    effects atomically
//! 2. **AdminInterface**: owner-gated mutators for minimum holds,
//!    issuers, whitelist entries, and base durations
//! 3. **AuditLog**: bounded trail of admin events
//! 4. **HostLedger**: the one thing the engine needs from the host, a
//!    balance lookup
//!
//! ## Transfer Flow
//!
//! ```text
//! host.transfer(from, to, amount)
//!   → RestrictionEngine.check_and_apply(from, to, amount, balance_of(from), now)
//!       → classify sender / recipient (ClassificationRegistry)
//!       → debit sender lots FIFO (holders only)
//!       → floor check on the post-debit state
//!       → propagate consumed lots / originate issuer lot for the recipient
//!       → commit both queues
//!   → Ok(receipt): host moves the balance
//!   → Err(_):      host aborts, nothing changed
//! ```

pub mod admin;
pub mod audit;
pub mod engine;
pub mod host;

pub use admin::{AdminInterface, AuthContext};
pub use audit::AuditLog;
pub use engine::{EngineSnapshot, RestrictionEngine};
pub use host::HostLedger;
