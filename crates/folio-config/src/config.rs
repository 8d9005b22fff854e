use anyhow::{Context, Result};
use folio_core::{PreloadCandidate, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config_merge::{merge_layer, unknown_sections};
use crate::defaults;
use crate::paths;

/// Current schema version for config.toml
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Tunables of the scheduler and intent detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchSettings {
    /// Upper bound on outstanding speculative requests.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Hover debounce before a link becomes a candidate.
    #[serde(default = "default_hover_delay_ms")]
    pub hover_delay_ms: u64,
    /// Delay between a page's thumbnail tier and its secondary tier.
    #[serde(default = "default_secondary_delay_ms")]
    pub secondary_delay_ms: u64,
    /// Settling delay before critical resources are seeded.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Idle pass fallback when no idle facility is available.
    #[serde(default = "default_idle_fallback_ms")]
    pub idle_fallback_ms: u64,
    /// Path fragment identifying thumbnail-tier images.
    #[serde(default = "default_thumbnail_marker")]
    pub thumbnail_marker: String,
    /// Class markers of navigational elements watched for hover intent.
    #[serde(default = "default_nav_classes")]
    pub nav_classes: Vec<String>,
}

fn default_max_concurrent() -> usize {
    8
}

fn default_hover_delay_ms() -> u64 {
    150
}

fn default_secondary_delay_ms() -> u64 {
    200
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_idle_fallback_ms() -> u64 {
    2000
}

fn default_thumbnail_marker() -> String {
    "/thumbs/".to_string()
}

fn default_nav_classes() -> Vec<String> {
    defaults::NAV_CLASSES.iter().map(|c| c.to_string()).collect()
}

impl Default for PrefetchSettings {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            hover_delay_ms: default_hover_delay_ms(),
            secondary_delay_ms: default_secondary_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            idle_fallback_ms: default_idle_fallback_ms(),
            thumbnail_marker: default_thumbnail_marker(),
            nav_classes: default_nav_classes(),
        }
    }
}

impl PrefetchSettings {
    pub fn hover_delay(&self) -> Duration {
        Duration::from_millis(self.hover_delay_ms)
    }

    pub fn secondary_delay(&self) -> Duration {
        Duration::from_millis(self.secondary_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn idle_fallback(&self) -> Duration {
        Duration::from_millis(self.idle_fallback_ms)
    }
}

/// Images a page is known to need, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImages {
    #[serde(default)]
    pub images: Vec<String>,
}

/// One critical resource seeded for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntry {
    pub id: String,
    /// Inferred from the path extension when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceKind>,
    /// Extra delay after the settling delay.
    #[serde(default)]
    pub delay_ms: u64,
}

impl SeedEntry {
    pub fn candidate(&self) -> PreloadCandidate {
        match self.kind {
            Some(kind) => PreloadCandidate::new(self.id.clone(), kind),
            None => PreloadCandidate::inferred(self.id.clone()),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Lower-priority pass over remaining known resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub resources: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resources: defaults::idle_resources(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub prefetch: PrefetchSettings,
    /// Page identifier -> associated images.
    #[serde(default)]
    pub pages: BTreeMap<String, PageImages>,
    /// Current-page key -> critical resources to seed.
    #[serde(default)]
    pub seeds: BTreeMap<String, Vec<SeedEntry>>,
    #[serde(default)]
    pub idle: IdleConfig,
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

impl Default for FolioConfig {
    /// The portfolio site's own tables.
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            prefetch: PrefetchSettings::default(),
            pages: defaults::page_images(),
            seeds: defaults::seeds(),
            idle: IdleConfig::default(),
        }
    }
}

impl FolioConfig {
    /// Load config with fallback chain:
    ///
    /// 1. Built-in defaults form the base layer.
    /// 2. `~/.config/folio-prefetch/config.toml` (user) is merged on top.
    /// 3. `<site>/.folio/config.toml` (project) is merged last and wins.
    ///
    /// Missing files are skipped; malformed files are errors.
    pub fn load(site_root: &Path) -> Result<Self> {
        let project_path = paths::project_config_path(site_root);
        let user_path = paths::user_config_path();
        Self::load_with_paths(user_path.as_deref(), &project_path)
    }

    /// Load config from explicit paths. Testable without global filesystem state.
    pub fn load_with_paths(user_path: Option<&Path>, project_path: &Path) -> Result<Self> {
        let mut merged =
            toml::Value::try_from(Self::default()).context("Failed to serialize defaults")?;

        for path in user_path.into_iter().chain(std::iter::once(project_path)) {
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let overlay: toml::Value = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            debug!(path = %path.display(), "merging config layer");
            unknown_sections(&overlay, &path.display().to_string());
            merge_layer(&mut merged, overlay);
        }

        let config: Self = merged
            .try_into()
            .context("Failed to deserialize merged config")?;
        config.check_schema_version()?;
        Ok(config)
    }

    /// Parse a single TOML document on top of the built-in defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut merged =
            toml::Value::try_from(Self::default()).context("Failed to serialize defaults")?;
        let overlay: toml::Value = toml::from_str(content).context("Failed to parse config")?;
        unknown_sections(&overlay, "<inline>");
        merge_layer(&mut merged, overlay);
        let config: Self = merged
            .try_into()
            .context("Failed to deserialize merged config")?;
        Ok(config)
    }

    /// Check if the config schema version is compatible with the current binary.
    pub fn check_schema_version(&self) -> Result<()> {
        if self.schema_version > CURRENT_SCHEMA_VERSION {
            anyhow::bail!(
                "Config schema version {} is newer than this binary supports (v{}).",
                self.schema_version,
                CURRENT_SCHEMA_VERSION
            );
        }
        Ok(())
    }

    /// Save config to `<site>/.folio/config.toml`
    pub fn save(&self, site_root: &Path) -> Result<()> {
        let config_path = paths::project_config_path(site_root);
        if let Some(dir) = config_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(())
    }

    /// Every resource the config knows about, deduplicated, in a stable order:
    /// idle resources, then page keys, then their images.
    pub fn known_resources(&self) -> Vec<PreloadCandidate> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        let pages = self.pages.iter().flat_map(|(page, images)| {
            std::iter::once(PreloadCandidate::page(page.clone())).chain(
                images
                    .images
                    .iter()
                    .map(|img| PreloadCandidate::image(img.clone())),
            )
        });
        let idle = self
            .idle
            .resources
            .iter()
            .map(|id| PreloadCandidate::inferred(id.clone()));
        for candidate in idle.chain(pages) {
            if seen.insert(candidate.id.clone()) {
                out.push(candidate);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "config_merge_tests.rs"]
mod merge_tests;
