use anyhow::{Context, Result};
use folio_config::FolioConfig;
use folio_core::OutputFormat;
use folio_fetch::{HintFetcher, HintSink, PrefetchHint};
use folio_scheduler::{HoverDecision, IntentDetector, NavElement, SchedulerStats};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::Instant;

use crate::page_view::{build_scheduler, determine_site_root, load_config};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum HoverAction {
    Enter,
    Leave,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct HoverEvent {
    /// Offset from the start of the run.
    pub at_ms: u64,
    pub action: HoverAction,
    #[serde(flatten)]
    pub element: NavElement,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Script {
    #[serde(default)]
    pub events: Vec<HoverEvent>,
}

impl Script {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut script: Script = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        };
        script.events.sort_by_key(|e| e.at_ms);
        Ok(script)
    }
}

/// Records each hint together with when it was emitted.
struct TimelineSink {
    start: Instant,
    hints: Mutex<Vec<TimedHint>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TimedHint {
    pub at_ms: u64,
    pub href: String,
    #[serde(rename = "as")]
    pub destination: &'static str,
}

impl HintSink for TimelineSink {
    fn emit(&self, hint: &PrefetchHint) -> std::io::Result<()> {
        let at_ms = self.start.elapsed().as_millis() as u64;
        self.hints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(TimedHint {
                at_ms,
                href: hint.href.clone(),
                destination: hint.destination,
            });
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EventOutcome {
    pub at_ms: u64,
    pub action: HoverAction,
    pub element: String,
    pub outcome: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SimulationReport {
    pub events: Vec<EventOutcome>,
    pub hints: Vec<TimedHint>,
    pub stats: SchedulerStats,
}

pub(crate) async fn run_script(
    config: &FolioConfig,
    site_root: PathBuf,
    script: Script,
) -> SimulationReport {
    let start = Instant::now();
    let sink = Arc::new(TimelineSink {
        start,
        hints: Mutex::new(Vec::new()),
    });
    let fetcher = Arc::new(HintFetcher::new(site_root, sink.clone()));
    let scheduler = build_scheduler(config, fetcher);
    let detector = IntentDetector::from_settings(scheduler.clone(), &config.prefetch);

    let mut events = Vec::with_capacity(script.events.len());
    for event in script.events {
        tokio::time::sleep_until(start + std::time::Duration::from_millis(event.at_ms)).await;
        let outcome = match event.action {
            HoverAction::Enter => match detector.on_hover_start(&event.element) {
                HoverDecision::Armed(id) => format!("armed {id}"),
                HoverDecision::Rejected(reason) => format!("ignored ({reason})"),
            },
            HoverAction::Leave => {
                if detector.on_hover_end(&event.element) {
                    "cancelled".to_string()
                } else {
                    "no pending timer".to_string()
                }
            }
        };
        events.push(EventOutcome {
            at_ms: event.at_ms,
            action: event.action,
            element: event.element.id,
            outcome,
        });
    }

    scheduler.wait_idle().await;
    drop(detector);

    let hints = sink
        .hints
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    SimulationReport {
        events,
        hints,
        stats: scheduler.stats(),
    }
}

/// Handle `folio simulate`.
pub(crate) async fn handle_simulate(
    cd: Option<String>,
    script_path: PathBuf,
    format: OutputFormat,
) -> Result<()> {
    let site_root = determine_site_root(cd.as_deref())?;
    let config = load_config(&site_root)?;
    let script = Script::load(&script_path)?;

    let report = run_script(&config, site_root, script).await;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            for e in &report.events {
                let action = match e.action {
                    HoverAction::Enter => "enter",
                    HoverAction::Leave => "leave",
                };
                println!("{:>6}ms {action} {}: {}", e.at_ms, e.element, e.outcome);
            }
            for h in &report.hints {
                println!("{:>6}ms prefetch {} as {}", h.at_ms, h.href, h.destination);
            }
            let s = &report.stats;
            println!(
                "admitted {}, succeeded {}, failed {}, at capacity {}",
                s.admitted, s.succeeded, s.failed, s.at_capacity
            );
        }
    }
    Ok(())
}
