use anyhow::{Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::fetcher::ResourceFetcher;
use crate::hint::{HintFetcher, HintSink};
use crate::http::HttpFetcher;

/// What the environment the scheduler runs in can do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Declarative hints can be issued (site tree + hint sink present).
    pub resource_hints: bool,
    /// Explicit network requests can be issued (base URL present).
    pub network_fetch: bool,
}

/// Inputs from which a fetch strategy is built.
#[derive(Clone, Default)]
pub struct FetchEnvironment {
    pub site_root: Option<PathBuf>,
    pub hint_sink: Option<Arc<dyn HintSink>>,
    pub base_url: Option<String>,
}

impl std::fmt::Debug for FetchEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchEnvironment")
            .field("site_root", &self.site_root)
            .field("hint_sink", &self.hint_sink.is_some())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Capabilities {
    pub fn detect(env: &FetchEnvironment) -> Self {
        Self {
            resource_hints: env.site_root.is_some() && env.hint_sink.is_some(),
            network_fetch: env.base_url.is_some(),
        }
    }
}

/// Pick the strategy once, up front: hints are preferred, explicit fetches
/// are the fallback.
pub fn select_fetcher(
    caps: Capabilities,
    env: &FetchEnvironment,
) -> Result<Arc<dyn ResourceFetcher>> {
    if caps.resource_hints {
        if let (Some(root), Some(sink)) = (&env.site_root, &env.hint_sink) {
            info!(site_root = %root.display(), "using prefetch-hint strategy");
            return Ok(Arc::new(HintFetcher::new(root.clone(), sink.clone())));
        }
    }
    if caps.network_fetch {
        if let Some(base_url) = &env.base_url {
            info!(base_url = %base_url, "using HTTP fetch strategy");
            return Ok(Arc::new(HttpFetcher::new(base_url)?));
        }
    }
    bail!("no fetch strategy available: provide a site root with a hint sink, or a base URL")
}
