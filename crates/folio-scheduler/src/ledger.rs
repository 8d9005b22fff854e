use serde::Serialize;
use std::collections::HashMap;

/// Where an admitted identifier currently stands.
///
/// An identifier absent from the ledger is "unseen"; a failed request is
/// removed outright, which makes it unseen again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryState {
    InFlight,
    Cached,
}

/// Identifiers already requested during this page view.
///
/// Unbounded: a single page view only has a handful of navigable targets.
#[derive(Debug, Default, Clone)]
pub struct PreloadLedger {
    entries: HashMap<String, EntryState>,
}

impl PreloadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn state(&self, id: &str) -> Option<EntryState> {
        self.entries.get(id).copied()
    }

    /// Record a new in-flight request. Returns false (and changes nothing)
    /// if the identifier is already present.
    pub fn try_admit(&mut self, id: &str) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(id.to_string(), EntryState::InFlight);
        true
    }

    /// In-flight -> cached. Returns false if the id was not in flight.
    pub fn mark_cached(&mut self, id: &str) -> bool {
        match self.entries.get_mut(id) {
            Some(state) if *state == EntryState::InFlight => {
                *state = EntryState::Cached;
                true
            }
            _ => false,
        }
    }

    /// Drop a failed in-flight entry so a later request may retry it.
    pub fn evict(&mut self, id: &str) -> bool {
        if self.entries.get(id) == Some(&EntryState::InFlight) {
            self.entries.remove(id);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted copy of the entries, for reporting.
    pub fn snapshot(&self) -> Vec<(String, EntryState)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .map(|(id, state)| (id.clone(), *state))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
