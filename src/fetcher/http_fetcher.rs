use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client;
use url::Url;

use crate::client::NewsApiError;
use crate::fetcher::{Fetcher, HttpResponse};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("newsreel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &Url) -> Result<HttpResponse, NewsApiError> {
        tracing::debug!("GET {}{}", url.origin().ascii_serialization(), url.path());

        let response = self
            .client
            .get(url.as_str())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(NewsApiError::network)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(NewsApiError::network)?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
