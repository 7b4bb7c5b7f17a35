//! Page fetchers: plain HTTP and WebDriver-rendered.

use std::sync::Arc;
use std::time::Duration;

use fantoccini::ClientBuilder;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::error::{Error, Result};

/// Total timeout for a plain page fetch.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Total timeout for a rendered (WebDriver) page fetch.
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Server-wide cap on concurrently open WebDriver sessions.
pub const MAX_BROWSER_SESSIONS: usize = 5;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP document fetcher with browser-like request headers.
///
/// The underlying client pools connections, so one fetcher is shared by all
/// tool invocations.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Create a fetcher with default headers and the standard timeout.
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.7"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
        headers.insert("dnt", HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    /// Fetch a page body, failing on non-success status codes.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.fetch_with_timeout(url, HTTP_TIMEOUT).await
    }

    /// Fetch with a caller-chosen total timeout (enrichment uses a shorter
    /// budget than top-level fetches).
    pub async fn fetch_with_timeout(&self, url: &str, total: Duration) -> Result<String> {
        let response = self.client.get(url).timeout(total).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetcher for JavaScript-rendered pages via a WebDriver endpoint.
///
/// Sessions are opened per fetch and gated by a server-wide semaphore so a
/// burst of tool calls cannot exhaust the automation service.
pub struct RenderedFetcher {
    webdriver_url: String,
    sessions: Arc<Semaphore>,
}

impl RenderedFetcher {
    /// Create a fetcher targeting the given WebDriver endpoint.
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            sessions: Arc::new(Semaphore::new(MAX_BROWSER_SESSIONS)),
        }
    }

    /// Navigate to `url` in a fresh session and return the rendered source.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let _permit = self
            .sessions
            .acquire()
            .await
            .map_err(|_| Error::Internal("browser session limiter closed".into()))?;

        tracing::debug!("starting rendered fetch for {}", url);
        let client = ClientBuilder::native().connect(&self.webdriver_url).await?;

        let result = timeout(RENDER_TIMEOUT, page_source(&client, url)).await;

        if let Err(e) = client.close().await {
            tracing::warn!("failed to close webdriver session: {}", e);
        }

        match result {
            Ok(source) => source,
            Err(_) => Err(Error::Timeout(url.to_string())),
        }
    }
}

async fn page_source(client: &fantoccini::Client, url: &str) -> Result<String> {
    client.goto(url).await?;
    Ok(client.source().await?)
}
