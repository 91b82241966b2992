//! Trailing-edge coalescing of rapid adjustment changes.
//!
//! Three sliders can fire dozens of parameter changes per second; the
//! remote adjust operation must see at most one request per settling
//! window, and that request must carry the freshest values.
//!
//! [`AdjustmentCoalescer`] is sans-IO: it tracks which scheduled
//! parameter set is current and which responses are still admissible,
//! while the driver owns the actual timer. The protocol is:
//!
//! 1. On every slider change, call [`schedule`](AdjustmentCoalescer::schedule)
//!    with a fresh snapshot of the parameters. The pending set is
//!    *replaced* (no leading call), and a ticket with a new sequence
//!    number is returned.
//! 2. The driver sleeps [`window`](AdjustmentCoalescer::window) and
//!    then calls [`fire`](AdjustmentCoalescer::fire) with its ticket.
//!    Only the ticket matching the most recent `schedule` call yields
//!    a request; superseded tickets yield `None`, which is what makes
//!    the debounce trailing-edge. Matching by sequence instead of by
//!    deadline keeps the core immune to timer drift.
//! 3. When a response arrives, call
//!    [`try_apply`](AdjustmentCoalescer::try_apply) with the request's
//!    sequence number. Responses are admitted strictly in increasing
//!    sequence order: a slow response to an earlier request is
//!    discarded even if it arrives after a newer request's response
//!    has already been applied. Last-to-resolve must never win.

use std::time::Duration;

use crate::adjust::AdjustmentParams;

/// The fixed settling window for adjustment changes.
pub const COALESCE_WINDOW: Duration = Duration::from_millis(300);

/// A remote adjust request produced by [`AdjustmentCoalescer::fire`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustRequest {
    /// Monotonically increasing sequence number, assigned at
    /// `schedule` time.
    pub seq: u64,
    /// The parameter snapshot to transmit.
    pub params: AdjustmentParams,
}

/// Handle returned by [`AdjustmentCoalescer::schedule`], identifying
/// one scheduled parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
}

/// Collapses a rapid stream of parameter changes into a bounded-rate
/// stream of remote requests. One instance is active per Adjust-stage
/// session; [`reset`](Self::reset) it whenever the session restarts.
#[derive(Debug)]
pub struct AdjustmentCoalescer {
    window: Duration,
    next_seq: u64,
    pending: Option<AdjustRequest>,
    last_applied: u64,
}

impl Default for AdjustmentCoalescer {
    fn default() -> Self {
        Self::new()
    }
}

impl AdjustmentCoalescer {
    /// A coalescer with the standard [`COALESCE_WINDOW`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_window(COALESCE_WINDOW)
    }

    /// A coalescer with a custom settling window.
    #[must_use]
    pub const fn with_window(window: Duration) -> Self {
        Self {
            window,
            next_seq: 0,
            pending: None,
            last_applied: 0,
        }
    }

    /// How long the driver should sleep before calling
    /// [`fire`](Self::fire).
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Record a fresh parameter snapshot, replacing any pending one.
    ///
    /// Each call re-arms the settling window; nothing is transmitted
    /// until a full window elapses without further calls.
    pub fn schedule(&mut self, params: AdjustmentParams) -> Ticket {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.pending = Some(AdjustRequest { seq, params });
        Ticket { seq }
    }

    /// Whether a parameter set is waiting for its window to elapse.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Claim the pending request if `ticket` is still the current one.
    ///
    /// Returns `None` when a later `schedule` call superseded the
    /// ticket — the later call's own timer will fire instead, so
    /// exactly one request leaves each settled window.
    pub fn fire(&mut self, ticket: Ticket) -> Option<AdjustRequest> {
        if self.pending.is_some_and(|p| p.seq == ticket.seq) {
            return self.pending.take();
        }
        None
    }

    /// Decide whether a resolved response may be applied.
    ///
    /// Admits `seq` only if it is newer than every previously applied
    /// response, and records it. Returns `false` for stale responses,
    /// which the caller must discard.
    pub fn try_apply(&mut self, seq: u64) -> bool {
        if seq > self.last_applied {
            self.last_applied = seq;
            return true;
        }
        false
    }

    /// Forget all pending and applied state (new session / new
    /// composite).
    pub fn reset(&mut self) {
        self.pending = None;
        self.last_applied = self.next_seq;
    }
}
