use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use crate::config::FolioConfig;
use crate::paths;

/// Write the built-in defaults to `<site>/.folio/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
/// Returns the path written.
pub fn init_site(site_root: &Path, force: bool) -> Result<PathBuf> {
    let config_path = paths::project_config_path(site_root);
    if config_path.exists() && !force {
        bail!("Configuration already exists at {}", config_path.display());
    }
    FolioConfig::default().save(site_root)?;
    Ok(config_path)
}
