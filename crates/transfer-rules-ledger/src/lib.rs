//! # transfer-rules-ledger
//!
//! Restriction state for the rules engine.
//!
//! ## Architecture
//!
//! 1. **decay**: pure `required_now` computation for one hold (cliff / linear)
//! 2. **AccountLockState**: one account's ordered queue of holds, with FIFO
//!    lot debit and pruning
//! 3. **LockLedger**: concurrent map of account → lock queue, guarded per key
//! 4. **ClassificationRegistry**: issuer / exempt / category lookups and the
//!    base lockup durations
//! 5. **digest**: canonical SHA-256 over ledger state
//!
//! All arithmetic is integer-only so that every node computes the same
//! required amount for the same inputs.

pub mod decay;
pub mod digest;
pub mod lock_ledger;
pub mod lock_queue;
pub mod registry;

pub use decay::required_now;
pub use digest::{state_digest, state_digest_hex};
pub use lock_ledger::{LedgerSnapshot, LockLedger};
pub use lock_queue::AccountLockState;
pub use registry::ClassificationRegistry;
