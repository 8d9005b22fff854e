use anyhow::{Result, bail};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

use crate::config::FolioConfig;

/// Largest admission capacity accepted by validation.
pub const MAX_CONCURRENT_LIMIT: usize = 8;

/// Validate the effective configuration for a site root.
/// Returns Ok(()) if valid, or Err with descriptive messages.
pub fn validate_config(site_root: &Path) -> Result<()> {
    let config = FolioConfig::load(site_root)?;
    validate_loaded_config(&config)
}

pub fn validate_loaded_config(config: &FolioConfig) -> Result<()> {
    config.check_schema_version()?;
    validate_prefetch(config)?;
    validate_pages(config)?;
    validate_seeds(config)?;
    validate_idle(config)?;
    warn_unassociated_thumbnails(config);
    Ok(())
}

fn validate_prefetch(config: &FolioConfig) -> Result<()> {
    let p = &config.prefetch;
    if p.max_concurrent == 0 || p.max_concurrent > MAX_CONCURRENT_LIMIT {
        bail!(
            "prefetch.max_concurrent must be between 1 and {} (got {})",
            MAX_CONCURRENT_LIMIT,
            p.max_concurrent
        );
    }
    if p.hover_delay_ms == 0 {
        bail!(
            "prefetch.hover_delay_ms must be > 0 (got 0). \
             A zero debounce prefetches every link the pointer crosses."
        );
    }
    if p.idle_fallback_ms == 0 {
        bail!("prefetch.idle_fallback_ms must be > 0 (got 0)");
    }
    if p.thumbnail_marker.is_empty() {
        bail!("prefetch.thumbnail_marker cannot be empty");
    }
    if p.nav_classes.iter().any(|c| c.trim().is_empty()) {
        bail!("prefetch.nav_classes cannot contain empty class names");
    }
    Ok(())
}

fn validate_pages(config: &FolioConfig) -> Result<()> {
    for (page, images) in &config.pages {
        if page.trim().is_empty() {
            bail!("pages: page identifier cannot be empty");
        }
        let mut seen = HashSet::new();
        for image in &images.images {
            if image.trim().is_empty() {
                bail!("pages.\"{}\".images contains an empty path", page);
            }
            if !seen.insert(image.as_str()) {
                bail!("pages.\"{}\".images lists '{}' more than once", page, image);
            }
        }
    }
    Ok(())
}

fn validate_seeds(config: &FolioConfig) -> Result<()> {
    for (page, entries) in &config.seeds {
        for entry in entries {
            if entry.id.trim().is_empty() {
                bail!("seeds.\"{}\" contains an entry with an empty id", page);
            }
        }
    }
    Ok(())
}

fn validate_idle(config: &FolioConfig) -> Result<()> {
    if config.idle.resources.iter().any(|r| r.trim().is_empty()) {
        bail!("idle.resources contains an empty path");
    }
    Ok(())
}

/// A page whose images contain no thumbnail-tier entry still works, but
/// every image lands in the delayed tier. Worth a warning, not an error.
fn warn_unassociated_thumbnails(config: &FolioConfig) {
    let marker = &config.prefetch.thumbnail_marker;
    for (page, images) in &config.pages {
        if images.images.len() > 1 && !images.images.iter().any(|i| i.contains(marker.as_str())) {
            warn!(
                page = %page,
                marker = %marker,
                "no thumbnail-tier images; all images will use the secondary delay"
            );
        }
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
