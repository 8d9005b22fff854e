//! Fetch strategies behind the prefetch scheduler: declarative prefetch
//! hints against a local site tree, or cache-populating HTTP requests.

pub mod capability;
pub mod fetcher;
pub mod hint;
pub mod http;

pub use capability::{Capabilities, FetchEnvironment, select_fetcher};
pub use fetcher::{FetchOutcome, ResourceFetcher};
pub use hint::{CollectingSink, HintFetcher, HintSink, PrefetchHint, WriterSink};
pub use http::HttpFetcher;
