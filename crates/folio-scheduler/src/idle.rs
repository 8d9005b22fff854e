//! Idle pass: a lower-priority sweep over every known resource that has not
//! been requested yet.

use async_trait::async_trait;
use folio_core::PreloadCandidate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::admission::Admission;
use crate::scheduler::PrefetchScheduler;

/// Host facility reporting that foreground work has settled.
#[async_trait]
pub trait IdleSignal: Send + Sync {
    async fn idle(&self);
}

/// Idle once the scheduler has no request outstanding.
pub struct QuietNetwork {
    scheduler: PrefetchScheduler,
}

impl QuietNetwork {
    pub fn new(scheduler: &PrefetchScheduler) -> Self {
        Self {
            scheduler: scheduler.detached(),
        }
    }
}

#[async_trait]
impl IdleSignal for QuietNetwork {
    async fn idle(&self) {
        self.scheduler.wait_quiet().await;
    }
}

impl PrefetchScheduler {
    /// Schedule `resources` once `signal` reports idle, or after `fallback`
    /// when there is no signal. Runs at most once per scheduler; returns
    /// false when a pass was already started.
    ///
    /// The pass waits for a free slot before each candidate, so every
    /// resource not already recorded is eventually requested. Candidates
    /// are still admitted through `schedule`.
    pub fn run_idle_pass(
        &self,
        resources: Vec<PreloadCandidate>,
        signal: Option<Arc<dyn IdleSignal>>,
        fallback: Duration,
    ) -> bool {
        if !self.claim_idle_pass() {
            debug!("idle pass already started");
            return false;
        }

        let this = self.detached();
        let cancel = self.cancellation();
        let fallback = tokio::time::sleep(fallback);
        self.spawn_tracked(async move {
            let settled = async {
                match signal {
                    Some(signal) => signal.idle().await,
                    None => fallback.await,
                }
            };
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = settled => {}
            }

            let total = resources.len();
            let mut admitted = 0usize;
            for candidate in resources {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = this.wait_for_slot() => {}
                    }
                    // Cascades and hovers may have claimed it meanwhile
                    if this.is_recorded(&candidate.id) {
                        break;
                    }
                    match this.schedule(candidate.clone()) {
                        Admission::Admitted => {
                            admitted += 1;
                            break;
                        }
                        Admission::AtCapacity => continue,
                        Admission::Duplicate => break,
                        Admission::Closed => return,
                    }
                }
            }
            info!(admitted, total, "idle pass scheduled");
        });
        true
    }
}
