use anyhow::Result;
use folio_core::OutputFormat;
use folio_fetch::{
    Capabilities, CollectingSink, FetchEnvironment, HintSink, WriterSink, select_fetcher,
};
use std::sync::Arc;

use crate::page_view::{determine_site_root, load_config, run_page_view};

/// Handle `folio hints`: emit the `<link rel="prefetch">` tags a page view
/// would produce for files present under the site root.
pub(crate) async fn handle_hints(
    cd: Option<String>,
    page: String,
    no_idle: bool,
    format: OutputFormat,
) -> Result<()> {
    let site_root = determine_site_root(cd.as_deref())?;
    let config = load_config(&site_root)?;

    match format {
        OutputFormat::Text => {
            // Tags stream to stdout as each hint resolves.
            let sink: Arc<dyn HintSink> = Arc::new(WriterSink::new(std::io::stdout()));
            let fetcher = hint_fetcher(site_root, sink)?;
            let report = run_page_view(&config, fetcher, &page, !no_idle).await;
            eprintln!(
                "{} hint(s) emitted, {} resource(s) missing",
                report.stats.succeeded, report.stats.failed
            );
        }
        OutputFormat::Json => {
            let sink = Arc::new(CollectingSink::new());
            let fetcher = hint_fetcher(site_root, sink.clone())?;
            let report = run_page_view(&config, fetcher, &page, !no_idle).await;
            let hints: Vec<_> = sink
                .hints()
                .into_iter()
                .map(|h| serde_json::json!({ "href": h.href, "as": h.destination }))
                .collect();
            let output = serde_json::json!({
                "hints": hints,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn hint_fetcher(
    site_root: std::path::PathBuf,
    sink: Arc<dyn HintSink>,
) -> Result<Arc<dyn folio_fetch::ResourceFetcher>> {
    let env = FetchEnvironment {
        site_root: Some(site_root),
        hint_sink: Some(sink),
        base_url: None,
    };
    select_fetcher(Capabilities::detect(&env), &env)
}
