use anyhow::Result;
use folio_core::OutputFormat;
use folio_fetch::{Capabilities, FetchEnvironment, select_fetcher};
use tracing::info;

use crate::page_view::{determine_site_root, load_config, print_report_text, run_page_view};

/// Handle `folio warm`: one page view against a served site over HTTP.
pub(crate) async fn handle_warm(
    cd: Option<String>,
    base_url: String,
    page: String,
    no_idle: bool,
    max_concurrent: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let site_root = determine_site_root(cd.as_deref())?;
    let mut config = load_config(&site_root)?;
    if let Some(limit) = max_concurrent {
        config.prefetch.max_concurrent = limit;
        folio_config::validate_loaded_config(&config)?;
    }

    let env = FetchEnvironment {
        base_url: Some(base_url),
        ..FetchEnvironment::default()
    };
    let fetcher = select_fetcher(Capabilities::detect(&env), &env)?;

    info!(%page, "warming");
    let report = run_page_view(&config, fetcher, &page, !no_idle).await;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report_text(&report),
    }
    Ok(())
}
