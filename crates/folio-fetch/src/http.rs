use anyhow::{Context, Result};
use async_trait::async_trait;
use folio_core::{PrefetchError, PreloadCandidate};
use reqwest::Url;
use reqwest::header::{HeaderValue, USER_AGENT};
use tracing::debug;

use crate::fetcher::{FetchOutcome, ResourceFetcher};

/// Header browsers attach to speculative navigations.
const SEC_PURPOSE: &str = "sec-purpose";
const PREFETCH_PURPOSE: &str = "prefetch";

/// Explicit cache-populating GET against a base URL.
///
/// The body is read to the end so intermediaries (CDN edges, reverse-proxy
/// caches) see a complete response.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        // Without the trailing slash `Url::join` would replace the last segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).with_context(|| format!("invalid base URL '{base_url}'"))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a site-relative identifier. Identifiers that would leave the
    /// base origin are refused.
    pub fn resolve(&self, id: &str) -> Result<Url, PrefetchError> {
        if id.starts_with("//") {
            return Err(PrefetchError::InvalidTarget(id.to_string()));
        }
        let relative = id.strip_prefix('/').unwrap_or(id);
        let url = self
            .base_url
            .join(relative)
            .map_err(|_| PrefetchError::InvalidTarget(id.to_string()))?;
        if url.origin() != self.base_url.origin() {
            return Err(PrefetchError::InvalidTarget(id.to_string()));
        }
        Ok(url)
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, candidate: &PreloadCandidate) -> FetchOutcome {
        let url = self.resolve(&candidate.id)?;
        debug!(url = %url, kind = %candidate.kind, "GET");

        let transport = |e: reqwest::Error| PrefetchError::Transport {
            id: candidate.id.clone(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .header(SEC_PURPOSE, HeaderValue::from_static(PREFETCH_PURPOSE))
            .header(
                USER_AGENT,
                HeaderValue::from_static(concat!("folio-prefetch/", env!("CARGO_PKG_VERSION"))),
            )
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrefetchError::HttpStatus {
                id: candidate.id.clone(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(transport)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one request with a fixed status line and return the
    /// raw request text through the join handle.
    async fn serve_once(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "{status_line}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn test_resolve_relative_ids() {
        let fetcher = HttpFetcher::new("https://example.com/site").unwrap();
        assert_eq!(
            fetcher.resolve("pages/about.html").unwrap().as_str(),
            "https://example.com/site/pages/about.html"
        );
        assert_eq!(
            fetcher.resolve("/images/bg.jpg").unwrap().as_str(),
            "https://example.com/site/images/bg.jpg"
        );
    }

    #[test]
    fn test_resolve_rejects_other_origin() {
        let fetcher = HttpFetcher::new("https://example.com/").unwrap();
        let err = fetcher.resolve("https://evil.example.net/x.html").unwrap_err();
        assert!(matches!(err, PrefetchError::InvalidTarget(_)));
        let err = fetcher.resolve("//cdn.example.org/x.html").unwrap_err();
        assert!(matches!(err, PrefetchError::InvalidTarget(_)));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpFetcher::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_fetch_success_sends_prefetch_purpose() {
        let (base, server) = serve_once("HTTP/1.1 200 OK").await;
        let fetcher = HttpFetcher::new(&base).unwrap();

        let outcome = fetcher.fetch(&PreloadCandidate::page("about.html")).await;
        assert!(outcome.is_ok(), "unexpected failure: {outcome:?}");

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /about.html "));
        assert!(request.contains("sec-purpose: prefetch"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_failure() {
        let (base, server) = serve_once("HTTP/1.1 404 Not Found").await;
        let fetcher = HttpFetcher::new(&base).unwrap();

        let err = fetcher
            .fetch(&PreloadCandidate::page("gone.html"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PrefetchError::HttpStatus {
                id: "gone.html".into(),
                status: 404
            }
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_failure() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(&format!("http://{addr}")).unwrap();
        let err = fetcher
            .fetch(&PreloadCandidate::image("images/bg.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, PrefetchError::Transport { .. }));
    }
}
