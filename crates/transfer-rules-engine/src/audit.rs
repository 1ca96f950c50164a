//! Admin audit trail.
//!
//! A bounded, append-only record of successful admin mutations. When the
//! log is full the oldest event is evicted, so memory stays predictable in
//! long-running hosts. Hosts that need the full history should drain
//! events to durable storage.

use std::collections::VecDeque;

use transfer_rules_types::{AccountId, AuditEvent};

/// Bounded FIFO of [`AuditEvent`]s.
#[derive(Debug, Clone)]
pub struct AuditLog {
    /// Front = oldest.
    events: VecDeque<AuditEvent>,
    max_size: usize,
    evicted: u64,
}

impl AuditLog {
    /// # Panics
    /// Panics if `max_size` is zero.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "AuditLog max_size must be > 0");
        Self {
            events: VecDeque::with_capacity(max_size.min(1_024)),
            max_size,
            evicted: 0,
        }
    }

    pub fn record(&mut self, event: AuditEvent) {
        if self.events.len() >= self.max_size {
            self.events.pop_front();
            self.evicted += 1;
        }
        self.events.push_back(event);
    }

    /// Retained events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &AuditEvent> {
        self.events.iter()
    }

    /// Retained events that targeted `account`.
    pub fn for_account<'a>(&'a self, account: &'a AccountId) -> impl Iterator<Item = &'a AuditEvent> {
        self.events
            .iter()
            .filter(move |event| event.account.as_ref() == Some(account))
    }

    #[must_use]
    pub fn latest(&self) -> Option<&AuditEvent> {
        self.events.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events dropped to stay within `max_size`.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
