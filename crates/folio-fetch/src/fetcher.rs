use async_trait::async_trait;
use folio_core::{PrefetchError, PreloadCandidate};

/// Result of one speculative request: the "load" or "error" signal.
pub type FetchOutcome = Result<(), PrefetchError>;

/// Strategy abstraction for issuing a speculative request.
/// Implementations: HintFetcher (declarative hint) and HttpFetcher (explicit GET).
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Short name used in logs and CLI reports.
    fn name(&self) -> &'static str;

    /// Issue the request and resolve once it has loaded or failed.
    async fn fetch(&self, candidate: &PreloadCandidate) -> FetchOutcome;
}
