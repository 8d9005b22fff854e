//! Declarative prefetch hints.
//!
//! A hint is only emitted for a resource that actually exists under the site
//! root; a missing file plays the part of the hint's error event.

use async_trait::async_trait;
use folio_core::{PrefetchError, PreloadCandidate};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::fetcher::{FetchOutcome, ResourceFetcher};

/// A `<link rel="prefetch">` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchHint {
    pub href: String,
    /// `document` for pages, `image` for images.
    pub destination: &'static str,
}

impl PrefetchHint {
    pub fn for_candidate(candidate: &PreloadCandidate) -> Self {
        Self {
            href: candidate.id.clone(),
            destination: candidate.kind.hint_destination(),
        }
    }

    pub fn to_link_tag(&self) -> String {
        format!(
            r#"<link rel="prefetch" href="{}" as="{}">"#,
            escape_attr(&self.href),
            self.destination
        )
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Receives hints as they are issued.
pub trait HintSink: Send + Sync {
    fn emit(&self, hint: &PrefetchHint) -> std::io::Result<()>;
}

/// Keeps every hint in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    hints: Mutex<Vec<PrefetchHint>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hints(&self) -> Vec<PrefetchHint> {
        self.hints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HintSink for CollectingSink {
    fn emit(&self, hint: &PrefetchHint) -> std::io::Result<()> {
        self.hints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hint.clone());
        Ok(())
    }
}

/// Writes one link tag per line to any writer (stdout in the CLI).
pub struct WriterSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> HintSink for WriterSink<W> {
    fn emit(&self, hint: &PrefetchHint) -> std::io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{}", hint.to_link_tag())?;
        out.flush()
    }
}

/// Hint-based strategy: verifies the resource under `site_root`, then
/// hands a hint to the sink.
#[derive(Clone)]
pub struct HintFetcher {
    site_root: PathBuf,
    sink: Arc<dyn HintSink>,
}

impl std::fmt::Debug for HintFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HintFetcher")
            .field("site_root", &self.site_root)
            .finish()
    }
}

impl HintFetcher {
    pub fn new(site_root: impl Into<PathBuf>, sink: Arc<dyn HintSink>) -> Self {
        Self {
            site_root: site_root.into(),
            sink,
        }
    }

    /// Map an identifier to a file under the site root. Query strings are
    /// ignored; identifiers escaping the root are refused. The identifier is
    /// always taken relative to the root, never to the referring page.
    pub fn resolve(&self, id: &str) -> Result<PathBuf, PrefetchError> {
        let path_part = id.split(['?', '#']).next().unwrap_or(id);
        let relative = Path::new(path_part.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path_part.is_empty() || escapes {
            return Err(PrefetchError::InvalidTarget(id.to_string()));
        }
        Ok(self.site_root.join(relative))
    }
}

#[async_trait]
impl ResourceFetcher for HintFetcher {
    fn name(&self) -> &'static str {
        "hint"
    }

    async fn fetch(&self, candidate: &PreloadCandidate) -> FetchOutcome {
        let path = self.resolve(&candidate.id)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(PrefetchError::MissingResource(candidate.id.clone())),
        }

        let hint = PrefetchHint::for_candidate(candidate);
        debug!(href = %hint.href, destination = hint.destination, "emitting prefetch hint");
        self.sink
            .emit(&hint)
            .map_err(|e| PrefetchError::HintRejected {
                id: candidate.id.clone(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct FailingSink;

    impl HintSink for FailingSink {
        fn emit(&self, _hint: &PrefetchHint) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    fn site_with(files: &[&str]) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"x").unwrap();
        }
        dir
    }

    #[test]
    fn test_link_tag_rendering() {
        let hint = PrefetchHint::for_candidate(&PreloadCandidate::page("pages/about.html"));
        assert_eq!(
            hint.to_link_tag(),
            r#"<link rel="prefetch" href="pages/about.html" as="document">"#
        );
        let hint = PrefetchHint::for_candidate(&PreloadCandidate::image("a\"b&c.png"));
        assert_eq!(
            hint.to_link_tag(),
            r#"<link rel="prefetch" href="a&quot;b&amp;c.png" as="image">"#
        );
    }

    #[test]
    fn test_resolve_refuses_parent_components() {
        let fetcher = HintFetcher::new("/srv/site", Arc::new(CollectingSink::new()));
        assert!(fetcher.resolve("../etc/passwd").is_err());
        assert!(fetcher.resolve("pages/../../x.html").is_err());
        assert!(fetcher.resolve("").is_err());
        assert_eq!(
            fetcher.resolve("/pages/about.html?x=1").unwrap(),
            PathBuf::from("/srv/site/pages/about.html")
        );
    }

    #[test]
    fn test_resolve_is_relative_to_site_root() {
        let fetcher = HintFetcher::new("/srv/site", Arc::new(CollectingSink::new()));
        // A bare href seen on pages/portfolio.html still maps under the root
        assert_eq!(
            fetcher.resolve("about.html").unwrap(),
            PathBuf::from("/srv/site/about.html")
        );
    }

    #[tokio::test]
    async fn test_existing_file_emits_hint() {
        let site = site_with(&["pages/about.html"]);
        let sink = Arc::new(CollectingSink::new());
        let fetcher = HintFetcher::new(site.path(), sink.clone());

        fetcher
            .fetch(&PreloadCandidate::page("pages/about.html"))
            .await
            .unwrap();
        assert_eq!(
            sink.hints(),
            vec![PrefetchHint {
                href: "pages/about.html".into(),
                destination: "document",
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_failure_without_hint() {
        let site = site_with(&[]);
        let sink = Arc::new(CollectingSink::new());
        let fetcher = HintFetcher::new(site.path(), sink.clone());

        let err = fetcher
            .fetch(&PreloadCandidate::image("images/missing.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err, PrefetchError::MissingResource("images/missing.jpg".into()));
        assert!(sink.hints().is_empty());
    }

    #[tokio::test]
    async fn test_directory_is_not_a_resource() {
        let site = site_with(&["pages/index.html"]);
        let fetcher = HintFetcher::new(site.path(), Arc::new(CollectingSink::new()));
        assert!(fetcher.fetch(&PreloadCandidate::page("pages")).await.is_err());
    }

    #[tokio::test]
    async fn test_sink_error_is_hint_rejected() {
        let site = site_with(&["images/bg.jpg"]);
        let fetcher = HintFetcher::new(site.path(), Arc::new(FailingSink));
        let err = fetcher
            .fetch(&PreloadCandidate::image("images/bg.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, PrefetchError::HintRejected { .. }));
    }

    #[test]
    fn test_writer_sink_writes_lines() {
        let sink = WriterSink::new(Vec::new());
        sink.emit(&PrefetchHint {
            href: "a.html".into(),
            destination: "document",
        })
        .unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "<link rel=\"prefetch\" href=\"a.html\" as=\"document\">\n");
    }
}
