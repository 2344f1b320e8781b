pub mod http_fetcher;

use async_trait::async_trait;
use url::Url;

use crate::client::NewsApiError;

pub use http_fetcher::HttpFetcher;

/// Raw outcome of a GET: any status the server answered with, and its body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam under the news client.
///
/// Implementations only fail with [`NewsApiError::Network`]; status codes are
/// interpreted by the caller.
#[async_trait]
pub trait Fetcher {
    async fn get(&self, url: &Url) -> Result<HttpResponse, NewsApiError>;
}
