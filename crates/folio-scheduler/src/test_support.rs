use async_trait::async_trait;
use folio_core::{PrefetchError, PreloadCandidate};
use folio_fetch::{FetchOutcome, ResourceFetcher};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::association::PageImageAssociation;
use crate::scheduler::{PrefetchScheduler, SchedulerOptions};

/// Records every request. In manual mode each request stays pending until
/// the test calls `release`; otherwise it completes at once, failing for
/// ids listed in `failing`.
#[derive(Default)]
pub(crate) struct MockFetcher {
    manual: bool,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<PreloadCandidate>>,
    gates: Mutex<HashMap<String, VecDeque<oneshot::Sender<FetchOutcome>>>>,
}

impl MockFetcher {
    pub(crate) fn immediate() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn manual() -> Arc<Self> {
        Arc::new(Self {
            manual: true,
            ..Self::default()
        })
    }

    pub(crate) fn fail(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    pub(crate) fn succeed(&self, id: &str) {
        self.failing.lock().unwrap().remove(id);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.id.clone())
            .collect()
    }

    pub(crate) fn call_count(&self, id: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.id == id).count()
    }

    /// Complete the oldest pending request for `id`.
    pub(crate) fn release(&self, id: &str, success: bool) -> bool {
        let sender = self
            .gates
            .lock()
            .unwrap()
            .get_mut(id)
            .and_then(VecDeque::pop_front);
        let outcome = if success {
            Ok(())
        } else {
            Err(PrefetchError::MissingResource(id.to_string()))
        };
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl ResourceFetcher for MockFetcher {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, candidate: &PreloadCandidate) -> FetchOutcome {
        self.calls.lock().unwrap().push(candidate.clone());
        if !self.manual {
            if self.failing.lock().unwrap().contains(&candidate.id) {
                return Err(PrefetchError::MissingResource(candidate.id.clone()));
            }
            return Ok(());
        }
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(candidate.id.clone())
            .or_default()
            .push_back(tx);
        rx.await.unwrap_or_else(|_| {
            Err(PrefetchError::Transport {
                id: candidate.id.clone(),
                message: "gate dropped".into(),
            })
        })
    }
}

pub(crate) fn scheduler_with(
    fetcher: Arc<MockFetcher>,
    associations: PageImageAssociation,
    max_concurrent: usize,
) -> PrefetchScheduler {
    let options = SchedulerOptions {
        max_concurrent,
        ..SchedulerOptions::default()
    };
    PrefetchScheduler::new(fetcher, associations, options)
}

/// Let spawned tasks run without advancing the paused clock.
pub(crate) async fn drain() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub(crate) fn portfolio_association() -> PageImageAssociation {
    PageImageAssociation::new(
        [(
            "pages/portfolio.html",
            vec![
                "images/thumbs/t1.jpg",
                "images/fulls/f1.png",
                "images/thumbs/t2.jpg",
                "images/thumbs/t3.jpg",
                "images/thumbs/t4.jpg",
                "images/thumbs/t5.jpg",
                "images/fulls/f2.png",
                "images/thumbs/t6.jpg",
            ],
        )],
        "/thumbs/",
    )
}
