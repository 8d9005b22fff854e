//! Critical-resource seeding for the page being viewed.

use folio_config::SeedEntry;
use folio_config::defaults::HOME_PAGE_KEY;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::scheduler::PrefetchScheduler;

/// Find the seed-map key for `current_page`.
///
/// An empty path, `/`, or any path ending in `/` is the home page. Otherwise
/// the longest key contained in the path wins.
pub fn resolve_seed_key<'a>(
    current_page: &str,
    seeds: &'a BTreeMap<String, Vec<SeedEntry>>,
) -> Option<&'a str> {
    let path = current_page.split(['?', '#']).next().unwrap_or_default();
    if path.is_empty() || path.ends_with('/') {
        return seeds.get_key_value(HOME_PAGE_KEY).map(|(k, _)| k.as_str());
    }
    seeds
        .keys()
        .filter(|key| !key.is_empty() && path.contains(key.as_str()))
        .max_by_key(|key| key.len())
        .map(String::as_str)
}

/// Entries to seed for `current_page`; empty when the page has none.
pub fn seed_plan(current_page: &str, seeds: &BTreeMap<String, Vec<SeedEntry>>) -> Vec<SeedEntry> {
    resolve_seed_key(current_page, seeds)
        .and_then(|key| seeds.get(key))
        .cloned()
        .unwrap_or_default()
}

impl PrefetchScheduler {
    /// Schedule the critical resources of `current_page`: each entry fires
    /// `settle_delay` plus its own delay after this call. Runs at most once
    /// per scheduler and returns the entries that were armed.
    pub fn seed_critical_resources(
        &self,
        current_page: &str,
        seeds: &BTreeMap<String, Vec<SeedEntry>>,
        settle_delay: Duration,
    ) -> Vec<SeedEntry> {
        if !self.claim_seeding() {
            debug!("critical resources already seeded");
            return Vec::new();
        }

        let plan = seed_plan(current_page, seeds);
        info!(page = %current_page, entries = plan.len(), "seeding critical resources");
        for entry in &plan {
            let this = self.detached();
            let candidate = entry.candidate();
            self.spawn_after(settle_delay + entry.delay(), async move {
                this.schedule(candidate);
            });
        }
        plan
    }
}
