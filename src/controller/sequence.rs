//! Request generation guard
//!
//! Refreshes are never cancelled, so responses can complete out of order. Each
//! request takes a [`Ticket`] when it is dispatched; on completion the ticket is
//! checked against the newest one already applied and older results are
//! dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Dispatch order of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out increasing tickets for one request channel
#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Newest ticket whose result reached the view
#[derive(Debug, Default)]
pub struct AppliedMark {
    latest: Option<Ticket>,
}

impl AppliedMark {
    /// Whether a newer result has already been applied
    pub fn is_stale(&self, ticket: Ticket) -> bool {
        self.latest.map(|latest| ticket < latest).unwrap_or(false)
    }

    pub fn record(&mut self, ticket: Ticket) {
        self.latest = Some(self.latest.map_or(ticket, |latest| latest.max(ticket)));
    }

    /// Record `ticket` unless it is stale; returns whether it may be applied
    pub fn admit(&mut self, ticket: Ticket) -> bool {
        if self.is_stale(ticket) {
            return false;
        }
        self.record(ticket);
        true
    }

    pub fn latest(&self) -> Option<Ticket> {
        self.latest
    }
}
