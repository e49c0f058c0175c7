// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Feed published by Our World in Data.
pub const DEFAULT_FEED_URL: &str =
    "https://raw.githubusercontent.com/owid/covid-19-data/master/public/data/vaccinations/vaccinations.csv";

/// Anything that can hand back the body behind a URL.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// HTTP GET over a shared `reqwest::Client`.
#[derive(Clone, Default, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Client with an overall per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()?;
        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("reading body from {}", url))?;
        Ok(bytes.to_vec())
    }
}
