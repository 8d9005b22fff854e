//! Hover intent: a debounce between "pointer entered a navigation link" and
//! "prefetch that page".

use folio_config::PrefetchSettings;
use folio_core::{PreloadCandidate, TargetRejection, qualify_page_target};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::scheduler::PrefetchScheduler;

/// A navigational element as seen by the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavElement {
    /// Stable identity of the element; at most one timer is armed per id.
    pub id: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

impl NavElement {
    pub fn new(id: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: Some(href.into()),
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn has_any_class(&self, classes: &[String]) -> bool {
        self.classes.iter().any(|c| classes.contains(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverRejection {
    /// The element carries none of the watched class markers.
    Unwatched,
    Target(TargetRejection),
    AlreadyRecorded,
    AtCapacity,
    Closed,
}

impl std::fmt::Display for HoverRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unwatched => f.write_str("not a watched element"),
            Self::Target(reason) => write!(f, "{reason}"),
            Self::AlreadyRecorded => f.write_str("already requested"),
            Self::AtCapacity => f.write_str("at capacity"),
            Self::Closed => f.write_str("scheduler shut down"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverDecision {
    /// A debounce timer is armed for this page identifier.
    Armed(String),
    Rejected(HoverRejection),
}

struct ArmedTimer {
    generation: u64,
    handle: AbortHandle,
}

type PendingTimers = Arc<Mutex<HashMap<String, ArmedTimer>>>;

pub struct IntentDetector {
    scheduler: PrefetchScheduler,
    hover_delay: Duration,
    nav_classes: Vec<String>,
    pending: PendingTimers,
    generation: AtomicU64,
}

impl IntentDetector {
    pub fn new(scheduler: PrefetchScheduler, hover_delay: Duration, nav_classes: Vec<String>) -> Self {
        Self {
            scheduler,
            hover_delay,
            nav_classes,
            pending: Arc::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_settings(scheduler: PrefetchScheduler, settings: &PrefetchSettings) -> Self {
        Self::new(
            scheduler,
            settings.hover_delay(),
            settings.nav_classes.clone(),
        )
    }

    pub fn scheduler(&self) -> &PrefetchScheduler {
        &self.scheduler
    }

    /// Arm a debounce timer for `element` if its target qualifies. When the
    /// timer fires, the page is handed to the scheduler, which applies its
    /// own admission checks again.
    pub fn on_hover_start(&self, element: &NavElement) -> HoverDecision {
        let id = match self.qualify(element) {
            Ok(id) => id,
            Err(reason) => {
                debug!(element = %element.id, %reason, "hover ignored");
                return HoverDecision::Rejected(reason);
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let sleep = tokio::time::sleep(self.hover_delay);
        let pending = Arc::clone(&self.pending);
        let scheduler = self.scheduler.detached();
        let key = element.id.clone();
        let candidate = PreloadCandidate::page(id.clone());

        // Held across the spawn so the timer cannot observe the map before
        // its own entry is in place.
        let mut timers = lock(&self.pending);
        let handle = self.scheduler.spawn_tracked(async move {
            sleep.await;
            let fire = {
                let mut timers = lock(&pending);
                match timers.get(&key) {
                    Some(armed) if armed.generation == generation => {
                        timers.remove(&key);
                        true
                    }
                    _ => false,
                }
            };
            if fire {
                debug!(element = %key, id = %candidate.id, "hover intent confirmed");
                scheduler.schedule(candidate);
            }
        });
        let armed = ArmedTimer {
            generation,
            handle: handle.abort_handle(),
        };
        if let Some(previous) = timers.insert(element.id.clone(), armed) {
            previous.handle.abort();
        }

        debug!(element = %element.id, %id, delay_ms = self.hover_delay.as_millis() as u64, "hover timer armed");
        HoverDecision::Armed(id)
    }

    /// Cancel the element's armed timer. Returns true if one was pending.
    pub fn on_hover_end(&self, element: &NavElement) -> bool {
        match lock(&self.pending).remove(&element.id) {
            Some(armed) => {
                armed.handle.abort();
                debug!(element = %element.id, "hover timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    fn qualify(&self, element: &NavElement) -> Result<String, HoverRejection> {
        if !element.has_any_class(&self.nav_classes) {
            return Err(HoverRejection::Unwatched);
        }
        let href = element.href.as_deref().unwrap_or_default();
        let id = qualify_page_target(href).map_err(HoverRejection::Target)?;
        if self.scheduler.is_shut_down() {
            return Err(HoverRejection::Closed);
        }
        if self.scheduler.is_recorded(id) {
            return Err(HoverRejection::AlreadyRecorded);
        }
        if !self.scheduler.has_capacity() {
            return Err(HoverRejection::AtCapacity);
        }
        Ok(id.to_string())
    }
}

impl Drop for IntentDetector {
    fn drop(&mut self) {
        for (_, armed) in lock(&self.pending).drain() {
            armed.handle.abort();
        }
    }
}

fn lock(pending: &PendingTimers) -> MutexGuard<'_, HashMap<String, ArmedTimer>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "intent_tests.rs"]
mod tests;
