//! One simulated page view: a fresh scheduler, the seed pass and the idle
//! pass, run until every request and delay has settled.

use anyhow::{Context, Result};
use folio_config::FolioConfig;
use folio_fetch::ResourceFetcher;
use folio_scheduler::{
    EntryState, PageImageAssociation, PrefetchScheduler, SchedulerOptions, SchedulerStats,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) fn determine_site_root(cd: Option<&str>) -> Result<PathBuf> {
    let root = match cd {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    root.canonicalize()
        .with_context(|| format!("Site root {} is not accessible", root.display()))
}

pub(crate) fn load_config(site_root: &Path) -> Result<FolioConfig> {
    let config = FolioConfig::load(site_root)?;
    folio_config::validate_loaded_config(&config)?;
    Ok(config)
}

pub(crate) fn build_scheduler(
    config: &FolioConfig,
    fetcher: Arc<dyn ResourceFetcher>,
) -> PrefetchScheduler {
    PrefetchScheduler::new(
        fetcher,
        PageImageAssociation::from_config(config),
        SchedulerOptions::from_settings(&config.prefetch),
    )
}

#[derive(Debug, Serialize)]
pub(crate) struct PageViewReport {
    pub page: String,
    pub strategy: &'static str,
    pub seeded: Vec<String>,
    pub idle_pass: bool,
    pub stats: SchedulerStats,
    pub ledger: Vec<LedgerRow>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LedgerRow {
    pub id: String,
    pub state: EntryState,
}

pub(crate) async fn run_page_view(
    config: &FolioConfig,
    fetcher: Arc<dyn ResourceFetcher>,
    page: &str,
    idle: bool,
) -> PageViewReport {
    let scheduler = build_scheduler(config, fetcher);
    let settings = &config.prefetch;

    let seeded = scheduler
        .seed_critical_resources(page, &config.seeds, settings.settle_delay())
        .into_iter()
        .map(|entry| entry.id)
        .collect();

    let idle_pass = idle && config.idle.enabled;
    if idle_pass {
        scheduler.run_idle_pass(config.known_resources(), None, settings.idle_fallback());
    }

    scheduler.wait_idle().await;

    PageViewReport {
        page: page.to_string(),
        strategy: scheduler.fetcher_name(),
        seeded,
        idle_pass,
        stats: scheduler.stats(),
        ledger: scheduler
            .ledger_snapshot()
            .into_iter()
            .map(|(id, state)| LedgerRow { id, state })
            .collect(),
    }
}

pub(crate) fn print_report_text(report: &PageViewReport) {
    println!("page: {} (strategy: {})", report.page, report.strategy);
    if report.seeded.is_empty() {
        println!("seeded: none");
    } else {
        println!("seeded: {}", report.seeded.join(", "));
    }
    println!("idle pass: {}", if report.idle_pass { "yes" } else { "no" });
    let s = &report.stats;
    println!(
        "admitted {}, succeeded {}, failed {}, duplicate {}, at capacity {}",
        s.admitted, s.succeeded, s.failed, s.duplicates, s.at_capacity
    );
    for row in &report.ledger {
        let state = match row.state {
            EntryState::Cached => "cached",
            EntryState::InFlight => "in-flight",
        };
        println!("  {:<10} {}", state, row.id);
    }
}
