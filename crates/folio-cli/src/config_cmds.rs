use anyhow::Result;
use folio_config::{FolioConfig, init_site, validate_config};
use folio_core::OutputFormat;
use tracing::info;

use crate::page_view::determine_site_root;

pub(crate) fn handle_config_show(cd: Option<String>, format: OutputFormat) -> Result<()> {
    let site_root = determine_site_root(cd.as_deref())?;
    let config = FolioConfig::load(&site_root)?;

    match format {
        OutputFormat::Json => {
            let json_str = serde_json::to_string_pretty(&config)?;
            println!("{}", json_str);
        }
        OutputFormat::Text => {
            let toml_str = toml::to_string_pretty(&config)?;
            print!("{}", toml_str);
        }
    }
    Ok(())
}

pub(crate) fn handle_config_validate(cd: Option<String>) -> Result<()> {
    let site_root = determine_site_root(cd.as_deref())?;
    validate_config(&site_root)?;
    eprintln!("Configuration is valid.");
    Ok(())
}

pub(crate) fn handle_config_init(cd: Option<String>, force: bool) -> Result<()> {
    let site_root = determine_site_root(cd.as_deref())?;
    let path = init_site(&site_root, force)?;
    info!(path = %path.display(), "wrote default configuration");
    eprintln!("Initialized configuration at: {}", path.display());
    Ok(())
}
