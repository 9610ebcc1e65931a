//! Auto-dismissing "saved" / "deleted" confirmations.
//!
//! Timers are deadlines driven by the caller's clock: `fire` schedules a
//! clear at `now + ttl` and `advance` runs the clears that are due. Firing
//! twice schedules two clears; the earlier one wins. After `cancel_all` no
//! pending clear can run.

use std::time::{Duration, Instant};

use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Saved,
    Deleted,
}

impl NotificationKind {
    pub fn message(self) -> &'static str {
        match self {
            NotificationKind::Saved => "User saved successfully!",
            NotificationKind::Deleted => "User deleted successfully!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(u64);

#[derive(Debug)]
struct PendingClear {
    id: TimerId,
    kind: NotificationKind,
    deadline: Instant,
}

#[derive(Debug)]
pub struct Notifications {
    ttl: Duration,
    saved: bool,
    deleted: bool,
    pending: Vec<PendingClear>,
    next_id: u64,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            saved: false,
            deleted: false,
            pending: Vec::new(),
            next_id: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_active(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Saved => self.saved,
            NotificationKind::Deleted => self.deleted,
        }
    }

    /// Kinds currently shown.
    pub fn active(&self) -> Vec<NotificationKind> {
        [NotificationKind::Saved, NotificationKind::Deleted]
            .into_iter()
            .filter(|kind| self.is_active(*kind))
            .collect()
    }

    pub fn fire(&mut self, kind: NotificationKind, now: Instant) -> TimerId {
        self.set(kind, true);
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push(PendingClear {
            id,
            kind,
            deadline: now + self.ttl,
        });
        debug!("Notification {:?} shown for {:?}", kind, self.ttl);
        id
    }

    /// Run the clears due at `now`; returns the kinds that went from shown to
    /// hidden.
    pub fn advance(&mut self, now: Instant) -> Vec<NotificationKind> {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|timer| timer.deadline <= now);
        self.pending = pending;

        let mut cleared = Vec::new();
        for timer in due {
            if self.is_active(timer.kind) {
                self.set(timer.kind, false);
                cleared.push(timer.kind);
            }
        }
        cleared
    }

    /// Earliest pending deadline, for hosts that sleep until the next clear.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|timer| timer.deadline).min()
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    fn set(&mut self, kind: NotificationKind, value: bool) {
        match kind {
            NotificationKind::Saved => self.saved = value,
            NotificationKind::Deleted => self.deleted = value,
        }
    }
}
