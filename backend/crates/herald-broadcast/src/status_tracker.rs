use crate::{BroadcasterStatus, ErrorClass, Metrics};

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use log::{error, warn};

/// Cumulative generic errors that move a broadcaster to `Error`.
pub const ERROR_THRESHOLD: u64 = 10;

/// Status and counters shared by every provider.
///
/// Transitions are compare-and-swap from `Active`, so a terminal state set by
/// one recorder can never be overwritten by another.
pub struct StatusTracker {
    name: String,
    status: AtomicU8,
    message_count: AtomicU64,
    error_count: AtomicU64,
    metrics: Metrics,
}

impl StatusTracker {
    pub fn new(name: impl Into<String>, initial: BroadcasterStatus) -> Self {
        Self {
            name: name.into(),
            status: AtomicU8::new(initial.to_u8()),
            message_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            metrics: Metrics::new(),
        }
    }

    pub fn status(&self) -> BroadcasterStatus {
        BroadcasterStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.status() == BroadcasterStatus::Active
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn record_messages(&self, count: u64) {
        self.message_count.fetch_add(count, Ordering::Relaxed);
    }

    /// Record one failure and apply the transition rules.
    /// Returns the status after recording.
    pub fn record_error(&self, class: ErrorClass) -> BroadcasterStatus {
        let errors = self.error_count.fetch_add(1, Ordering::AcqRel) + 1;
        self.metrics.error_recorded(&self.name, class.as_str());

        match class {
            ErrorClass::RateLimit => {
                if self.transition(BroadcasterStatus::LimitReached) {
                    warn!("Broadcaster {} reached its rate limit", self.name);
                }
            }
            ErrorClass::Generic if errors >= ERROR_THRESHOLD => {
                if self.transition(BroadcasterStatus::Error) {
                    error!(
                        "Broadcaster {} disabled after {} errors",
                        self.name, errors
                    );
                }
            }
            ErrorClass::Generic => {}
        }

        self.status()
    }

    fn transition(&self, to: BroadcasterStatus) -> bool {
        let swapped = self
            .status
            .compare_exchange(
                BroadcasterStatus::Active.to_u8(),
                to.to_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();

        if swapped {
            self.metrics.status_changed(&self.name, to.as_str());
        }
        swapped
    }
}
