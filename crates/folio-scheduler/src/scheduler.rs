//! The prefetch scheduler: admission, request tasks, completion handling and
//! the page -> image cascade.
//!
//! Every admission and every completion is one critical section over
//! [`SchedulerState`]. The lock is never held across an `.await`, so each
//! callback runs to completion as a unit.

use folio_config::PrefetchSettings;
use folio_core::{PreloadCandidate, ResourceKind};
use folio_fetch::{FetchOutcome, ResourceFetcher};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::admission::{Admission, SchedulerState, SchedulerStats};
use crate::association::PageImageAssociation;
use crate::ledger::EntryState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub max_concurrent: usize,
    /// Delay between a page's thumbnail tier and its secondary tier.
    pub secondary_delay: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::from_settings(&PrefetchSettings::default())
    }
}

impl SchedulerOptions {
    pub fn from_settings(settings: &PrefetchSettings) -> Self {
        Self {
            max_concurrent: settings.max_concurrent,
            secondary_delay: settings.secondary_delay(),
        }
    }
}

struct Shared {
    state: Mutex<SchedulerState>,
    fetcher: Arc<dyn ResourceFetcher>,
    associations: PageImageAssociation,
    options: SchedulerOptions,
    // Spawned tasks not yet finished; see `TaskGuard`.
    pending_tasks: watch::Sender<usize>,
    cancel: CancellationToken,
    in_flight_tx: watch::Sender<usize>,
    seeded: AtomicBool,
    idle_pass_started: AtomicBool,
}

/// One scheduler per page view. Cloning yields another handle to the same
/// ledger and counter. When the last handle is dropped, pending delayed work
/// is cancelled; requests already issued still complete.
#[derive(Clone)]
pub struct PrefetchScheduler {
    shared: Arc<Shared>,
    // None on the handles captured by spawned tasks.
    _owner: Option<Arc<DropGuard>>,
}

impl std::fmt::Debug for PrefetchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchScheduler")
            .field("fetcher", &self.shared.fetcher.name())
            .field("options", &self.shared.options)
            .field("stats", &self.stats())
            .finish()
    }
}

impl PrefetchScheduler {
    pub fn new(
        fetcher: Arc<dyn ResourceFetcher>,
        associations: PageImageAssociation,
        options: SchedulerOptions,
    ) -> Self {
        let (in_flight_tx, _) = watch::channel(0);
        let (pending_tasks, _) = watch::channel(0);
        let cancel = CancellationToken::new();
        let owner = Arc::new(cancel.clone().drop_guard());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SchedulerState::new(options.max_concurrent)),
                fetcher,
                associations,
                options,
                pending_tasks,
                cancel,
                in_flight_tx,
                seeded: AtomicBool::new(false),
                idle_pass_started: AtomicBool::new(false),
            }),
            _owner: Some(owner),
        }
    }

    /// A handle that does not keep the page view alive.
    pub(crate) fn detached(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _owner: None,
        }
    }

    pub fn options(&self) -> SchedulerOptions {
        self.shared.options
    }

    pub fn fetcher_name(&self) -> &'static str {
        self.shared.fetcher.name()
    }

    /// Admit a candidate and start its request, or reject it silently.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, candidate: PreloadCandidate) -> Admission {
        if self.shared.cancel.is_cancelled() {
            return Admission::Closed;
        }

        let admission = {
            let mut state = self.lock_state();
            let admission = state.admit(&candidate.id);
            if admission.is_admitted() {
                self.shared.in_flight_tx.send_replace(state.in_flight());
            }
            admission
        };

        match admission {
            Admission::Admitted => {
                debug!(id = %candidate.id, kind = %candidate.kind, "preload admitted");
                self.launch(candidate);
            }
            Admission::Duplicate => {
                debug!(id = %candidate.id, "preload skipped: already requested");
            }
            Admission::AtCapacity => {
                debug!(id = %candidate.id, "preload skipped: at capacity");
            }
            Admission::Closed => {}
        }
        admission
    }

    fn launch(&self, candidate: PreloadCandidate) {
        let this = self.detached();
        self.spawn_tracked(async move {
            let outcome = this.shared.fetcher.fetch(&candidate).await;
            this.complete(candidate, outcome);
        });
    }

    /// Single completion handler for every request.
    fn complete(&self, candidate: PreloadCandidate, outcome: FetchOutcome) {
        {
            let mut state = self.lock_state();
            state.complete(&candidate.id, outcome.is_ok());
            self.shared.in_flight_tx.send_replace(state.in_flight());
        }

        match outcome {
            Ok(()) => {
                debug!(id = %candidate.id, "preloaded");
                if candidate.kind == ResourceKind::Page {
                    self.expand_page(&candidate.id);
                }
            }
            Err(e) => {
                warn!(id = %candidate.id, error = %e, "preload failed; eligible for retry");
            }
        }
    }

    /// Thumbnails now, secondary tier after the fixed delay.
    fn expand_page(&self, page_id: &str) {
        let Some(tiers) = self.shared.associations.lookup(page_id) else {
            return;
        };
        debug!(
            page = %page_id,
            thumbnails = tiers.thumbnails.len(),
            secondary = tiers.secondary.len(),
            "expanding page images"
        );

        for image in &tiers.thumbnails {
            self.schedule(PreloadCandidate::image(image.clone()));
        }

        if !tiers.secondary.is_empty() {
            let this = self.detached();
            let secondary = tiers.secondary.clone();
            self.spawn_after(self.shared.options.secondary_delay, async move {
                for image in secondary {
                    this.schedule(PreloadCandidate::image(image));
                }
            });
        }
    }

    /// Run `fut` after `delay` unless the scheduler is shut down first.
    pub(crate) fn spawn_after<F>(&self, delay: Duration, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.shared.cancel.clone();
        let sleep = tokio::time::sleep(delay);
        self.spawn_tracked(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = sleep => fut.await,
            }
        });
    }

    /// Spawn a task counted by [`PrefetchScheduler::wait_idle`].
    ///
    /// The count is raised before the task exists, so follow-up work spawned
    /// from inside a tracked task keeps the total above zero.
    pub(crate) fn spawn_tracked<F>(&self, fut: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.shared.pending_tasks.send_modify(|n| *n += 1);
        let guard = TaskGuard {
            shared: Arc::clone(&self.shared),
        };
        tokio::spawn(async move {
            let _guard = guard;
            fut.await;
        })
    }

    pub(crate) fn cancellation(&self) -> CancellationToken {
        self.shared.cancel.clone()
    }

    /// True for the first caller only.
    pub(crate) fn claim_seeding(&self) -> bool {
        !self.shared.seeded.swap(true, Ordering::AcqRel)
    }

    /// True for the first caller only.
    pub(crate) fn claim_idle_pass(&self) -> bool {
        !self.shared.idle_pass_started.swap(true, Ordering::AcqRel)
    }

    pub fn is_recorded(&self, id: &str) -> bool {
        self.lock_state().ledger().contains(id)
    }

    pub fn entry_state(&self, id: &str) -> Option<EntryState> {
        self.lock_state().ledger().state(id)
    }

    pub fn has_capacity(&self) -> bool {
        self.lock_state().has_capacity()
    }

    pub fn in_flight(&self) -> usize {
        self.lock_state().in_flight()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.lock_state().stats()
    }

    pub fn ledger_snapshot(&self) -> Vec<(String, EntryState)> {
        self.lock_state().ledger().snapshot()
    }

    /// Resolve once no request is outstanding.
    pub async fn wait_quiet(&self) {
        let mut rx = self.shared.in_flight_tx.subscribe();
        // The sender lives in `shared`, which `self` keeps alive.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Resolve once `in_flight` is below the capacity bound.
    pub(crate) async fn wait_for_slot(&self) {
        let max = self.shared.options.max_concurrent;
        let mut rx = self.shared.in_flight_tx.subscribe();
        let _ = rx.wait_for(|n| *n < max).await;
    }

    /// Resolve once every request, pending delay and armed timer has finished.
    /// Any number of callers may wait at once.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.pending_tasks.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Discard the page view: pending delayed work is dropped, requests
    /// already issued run to completion, and later `schedule` calls are
    /// rejected.
    pub fn shutdown(&self) {
        self.shared.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        // Poisoning is ignored: the state is plain counters and a set.
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lowers the pending task count when its task ends, aborted or not.
struct TaskGuard {
    shared: Arc<Shared>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.shared
            .pending_tasks
            .send_modify(|n| *n = n.saturating_sub(1));
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
