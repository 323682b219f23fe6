//! Single-shot page fetching.
//!
//! One GET per call with a browser-like User-Agent and a fixed timeout, no
//! retries. Valid UTF-8 bodies are kept as they are; anything else is
//! decoded with its detected encoding, never the charset header.

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use gameguide_shared::{GameGuideError, Result};

/// User-Agent sent with every fetch. Some guide sites block non-browser agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Timeout in seconds for a whole fetch.
const FETCH_TIMEOUT_SECS: u64 = 10;

/// HTTP client for fetching reference pages.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build the underlying HTTP client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| GameGuideError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch `url` and return its decoded markup, or `None` on any failure.
    ///
    /// The failure is logged; callers only learn that nothing came back.
    pub async fn fetch(&self, url: &Url) -> Option<String> {
        match self.try_fetch(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(%url, error = %e, "page fetch failed");
                None
            }
        }
    }

    /// Fetch `url`, reporting transport and HTTP-status errors.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn try_fetch(&self, url: &Url) -> Result<String> {
        debug!("fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| GameGuideError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GameGuideError::Network(format!("{url}: HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GameGuideError::Network(format!("{url}: body read failed: {e}")))?;

        let body = decode_body(&bytes);
        debug!(bytes = bytes.len(), chars = body.chars().count(), "page fetched");
        Ok(body)
    }
}

/// Decode a response body using its detected encoding, falling back to UTF-8.
///
/// Bodies that are already valid UTF-8 are taken as-is. A byte-order mark
/// takes precedence over detection.
pub fn decode_body(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.strip_prefix('\u{feff}').unwrap_or(text).to_string();
    }

    let (charset, confidence, _) = chardet::detect(&bytes.to_vec());
    let label = chardet::charset2encoding(&charset);
    let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
    debug!(%charset, confidence, encoding = encoding.name(), "detected body encoding");

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(encoding = encoding.name(), "body contained malformed sequences");
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_ascii() {
        let body = decode_body(b"<html><title>Walkthrough</title></html>");
        assert_eq!(body, "<html><title>Walkthrough</title></html>");
    }

    #[test]
    fn decode_respects_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<p>攻略ガイド</p>".as_bytes());
        let body = decode_body(&bytes);
        assert_eq!(body, "<p>攻略ガイド</p>");
    }

    #[test]
    fn decode_keeps_utf8_punctuation() {
        let body = decode_body("<title>Shrine Walkthrough – Lanayru</title>".as_bytes());
        assert_eq!(body, "<title>Shrine Walkthrough – Lanayru</title>");
    }

    #[test]
    fn decode_falls_back_to_detection() {
        // "café" in windows-1252 is not valid UTF-8.
        let body = decode_body(b"<p>caf\xe9 menu</p>");
        assert!(body.starts_with("<p>caf"));
        assert!(body.ends_with(" menu</p>"));
    }

    #[tokio::test]
    async fn fetch_returns_body_on_success() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/guide"))
            .and(|req: &wiremock::Request| {
                req.headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    == Some(USER_AGENT)
            })
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("<html><title>Guide</title><p>Hello</p></html>"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/guide", server.uri())).unwrap();
        let fetcher = PageFetcher::new().unwrap();
        let body = fetcher.fetch(&url).await.expect("body");
        assert!(body.contains("<title>Guide</title>"));
    }

    async fn not_found_server() -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/missing"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn fetch_http_error_is_absent() {
        let server = not_found_server().await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let fetcher = PageFetcher::new().unwrap();
        assert!(fetcher.fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn try_fetch_reports_http_status() {
        let server = not_found_server().await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let fetcher = PageFetcher::new().unwrap();
        let err = fetcher.try_fetch(&url).await.unwrap_err();
        assert!(matches!(err, GameGuideError::Network(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn fetch_server_error_is_not_retried() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let fetcher = PageFetcher::new().unwrap();
        assert!(fetcher.fetch(&url).await.is_none());
        // `expect(1)` is verified when the server drops.
    }

    #[tokio::test]
    async fn fetch_unreachable_host_is_absent() {
        // Port 1 on loopback: connection refused on any sane test host.
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let fetcher = PageFetcher::new().unwrap();
        assert!(fetcher.fetch(&url).await.is_none());
    }
}
