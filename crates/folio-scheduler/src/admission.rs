//! Admission control: the ledger plus the in-flight counter, mutated only
//! through `admit` and `complete`.

use serde::Serialize;

use crate::ledger::PreloadLedger;

/// Outcome of a `schedule()` call. Rejections are silent by contract; the
/// value exists for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Admission {
    Admitted,
    /// Already requested (in flight or cached).
    Duplicate,
    /// `max_concurrent` requests outstanding; not queued.
    AtCapacity,
    /// The scheduler was shut down (page view discarded).
    Closed,
}

impl Admission {
    pub fn is_admitted(self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Running counters for a page view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub admitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub duplicates: u64,
    pub at_capacity: u64,
    pub in_flight: usize,
    pub ledger_len: usize,
}

#[derive(Debug, Clone)]
pub struct SchedulerState {
    ledger: PreloadLedger,
    in_flight: usize,
    max_concurrent: usize,
    stats: SchedulerStats,
}

impl SchedulerState {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            ledger: PreloadLedger::new(),
            in_flight: 0,
            max_concurrent,
            stats: SchedulerStats::default(),
        }
    }

    pub fn admit(&mut self, id: &str) -> Admission {
        if self.ledger.contains(id) {
            self.stats.duplicates += 1;
            return Admission::Duplicate;
        }
        if self.in_flight >= self.max_concurrent {
            self.stats.at_capacity += 1;
            return Admission::AtCapacity;
        }
        self.ledger.try_admit(id);
        self.in_flight += 1;
        self.stats.admitted += 1;
        Admission::Admitted
    }

    /// Apply a completion signal. Success keeps the entry as cached; failure
    /// evicts it so a later `admit` is accepted again.
    ///
    /// Returns false when `id` had no outstanding request.
    pub fn complete(&mut self, id: &str, success: bool) -> bool {
        let applied = if success {
            self.ledger.mark_cached(id)
        } else {
            self.ledger.evict(id)
        };
        if !applied {
            return false;
        }
        self.in_flight -= 1;
        if success {
            self.stats.succeeded += 1;
        } else {
            self.stats.failed += 1;
        }
        true
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn has_capacity(&self) -> bool {
        self.in_flight < self.max_concurrent
    }

    pub fn ledger(&self) -> &PreloadLedger {
        &self.ledger
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            in_flight: self.in_flight,
            ledger_len: self.ledger.len(),
            ..self.stats
        }
    }
}
