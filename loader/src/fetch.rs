use crate::config::LoaderConfig;
use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Retrieves a document body by URL.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().await.with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("GET {url}: {status}");
        }
        read_capped(resp, url, MAX_BODY_BYTES).await
    }
}

// Body of `resp`, refusing anything over `limit` bytes without buffering past it.
async fn read_capped(mut resp: reqwest::Response, url: &str, limit: usize) -> Result<String> {
    if let Some(len) = resp.content_length() {
        if len > limit as u64 {
            bail!("GET {url}: body of {len} bytes exceeds limit");
        }
    }
    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await.with_context(|| format!("reading body of {url}"))? {
        if body.len() + chunk.len() > limit {
            bail!("GET {url}: body exceeds {limit} bytes");
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Serves documents from memory; unknown URLs fail like a 404.
#[derive(Debug, Clone, Default)]
pub struct MapFetcher {
    pages: HashMap<String, String>,
}

impl MapFetcher {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

impl Fetcher for MapFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.pages.get(url).cloned().ok_or_else(|| anyhow!("GET {url}: 404 Not Found"))
    }
}
