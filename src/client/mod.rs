//! REST client for the news aggregation API.

pub mod cache;
pub mod error;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::clock::Clock;
use crate::config::ApiConfig;
use crate::domain::{Article, NewsCategory, NewsSource, SortBy};
use crate::feed::{ArticleSource, FeedQuery};
use crate::fetcher::{Fetcher, HttpResponse};

pub use cache::{CacheKey, ResponseCache, DEFAULT_TTL_SECS};
pub use error::NewsApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesResponse {
    pub status: String,
    #[serde(default)]
    pub sources: Vec<NewsSource>,
}

/// Shape of the API's error documents: `{"status":"error","code":..,"message":..}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    status: String,
    code: Option<String>,
    message: Option<String>,
}

pub struct NewsClient {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    config: ApiConfig,
    cache: ResponseCache,
}

impl NewsClient {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        config: ApiConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ttl = cache_ttl(config.cache_ttl_secs);
        Self {
            fetcher,
            config,
            cache: ResponseCache::new(ttl, clock),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Top headlines for a category and region.
    ///
    /// Pages fetched within the cache TTL are served without touching the
    /// network.
    pub async fn fetch_top_headlines(
        &self,
        category: NewsCategory,
        region: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Article>, NewsApiError> {
        let key = CacheKey::new(category, region, page);
        if let Some(articles) = self.cache.get(&key) {
            debug!("Cache hit for {} ({} articles)", key, articles.len());
            return Ok(articles);
        }

        let mut params = Vec::new();
        if let Some(category) = category.query_value() {
            params.push(("category", category.to_string()));
        }
        params.push(("country", region.to_string()));
        params.push(("page", page.to_string()));
        params.push(("pageSize", page_size.to_string()));

        let url = self.endpoint("top-headlines", &params)?;
        let response: NewsResponse = self.get_json(&url).await?;
        debug!(
            "Fetched {} of {} headlines for {}",
            response.articles.len(),
            response.total_results,
            key
        );

        self.cache.insert(key, response.articles.clone());
        Ok(response.articles)
    }

    /// Full-text search. Results are never cached.
    pub async fn search_articles(
        &self,
        query: &str,
        sort_by: SortBy,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Article>, NewsApiError> {
        let params = [
            ("q", query.to_string()),
            ("sortBy", sort_by.to_string()),
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
            ("language", self.config.language.clone()),
        ];

        let url = self.endpoint("everything", &params)?;
        let response: NewsResponse = self.get_json(&url).await?;
        debug!(
            "Search {:?} page {} returned {} articles",
            query,
            page,
            response.articles.len()
        );
        Ok(response.articles)
    }

    pub async fn fetch_sources(
        &self,
        category: Option<&str>,
        language: &str,
        region: Option<&str>,
    ) -> Result<Vec<NewsSource>, NewsApiError> {
        let mut params = Vec::new();
        if let Some(category) = category {
            params.push(("category", category.to_string()));
        }
        params.push(("language", language.to_string()));
        if let Some(region) = region {
            params.push(("country", region.to_string()));
        }

        let url = self.endpoint("sources", &params)?;
        let response: SourcesResponse = self.get_json(&url).await?;
        Ok(response.sources)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, NewsApiError> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, path))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(NewsApiError::InvalidUrl(format!(
                "{} is not an http(s) endpoint",
                url
            )));
        }

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("apiKey", &self.config.api_key);
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, NewsApiError> {
        let response = self.fetcher.get(url).await?;
        decode_response(response)
    }
}

#[async_trait]
impl ArticleSource for NewsClient {
    async fn fetch_page(
        &self,
        query: &FeedQuery,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Article>, NewsApiError> {
        match query {
            FeedQuery::Headlines { category, region } => {
                self.fetch_top_headlines(*category, region, page, page_size)
                    .await
            }
            FeedQuery::Search { query, sort_by } => {
                self.search_articles(query, *sort_by, page, page_size).await
            }
        }
    }
}

/// Negative lifetimes disable caching; ones chrono cannot represent fall back
/// to the default.
fn cache_ttl(secs: i64) -> Duration {
    Duration::try_seconds(secs.max(0)).unwrap_or_else(|| {
        warn!(
            "cache_ttl_secs = {} is out of range, using {}",
            secs, DEFAULT_TTL_SECS
        );
        Duration::seconds(DEFAULT_TTL_SECS)
    })
}

fn decode_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, NewsApiError> {
    if !response.is_success() {
        return Err(classify_failure(&response));
    }

    if response.body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(NewsApiError::NoData);
    }

    if let Ok(body) = serde_json::from_slice::<ErrorBody>(&response.body) {
        if body.status == "error" {
            return Err(classify_failure(&response));
        }
    }

    Ok(serde_json::from_slice(&response.body)?)
}

fn classify_failure(response: &HttpResponse) -> NewsApiError {
    let body = serde_json::from_slice::<ErrorBody>(&response.body).ok();
    let code = body.as_ref().and_then(|b| b.code.as_deref());

    match (response.status, code) {
        (429, _) | (_, Some("rateLimited" | "apiKeyExhausted")) => NewsApiError::RateLimitExceeded,
        (401, _) | (_, Some("apiKeyInvalid" | "apiKeyMissing" | "apiKeyDisabled")) => {
            NewsApiError::ApiKeyInvalid
        }
        (status, _) => {
            let message = body
                .as_ref()
                .and_then(|b| b.message.clone())
                .unwrap_or_else(|| "no error message".to_string());
            warn!("Unexpected response {}: {}", status, message);
            NewsApiError::Decoding(format!("HTTP {}: {}", status, message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Serves queued responses and records every requested URL.
    #[derive(Default)]
    struct ScriptedFetcher {
        responses: Mutex<VecDeque<Result<HttpResponse, NewsApiError>>>,
        requests: Mutex<Vec<Url>>,
    }

    impl ScriptedFetcher {
        fn push(&self, response: Result<HttpResponse, NewsApiError>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn requests(&self) -> Vec<Url> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn get(&self, url: &Url) -> Result<HttpResponse, NewsApiError> {
            self.requests.lock().unwrap().push(url.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(NewsApiError::network("no scripted response")))
        }
    }

    fn headlines_body(urls: &[&str]) -> String {
        let articles: Vec<String> = urls
            .iter()
            .map(|u| {
                format!(
                    r#"{{"source":{{"id":null,"name":"Wire"}},"author":null,"title":"Story","description":"Body","url":"{}","urlToImage":null,"publishedAt":"2024-01-01T00:00:00Z","content":null}}"#,
                    u
                )
            })
            .collect();
        format!(
            r#"{{"status":"ok","totalResults":{},"articles":[{}]}}"#,
            urls.len(),
            articles.join(",")
        )
    }

    fn setup() -> (Arc<ScriptedFetcher>, Arc<ManualClock>, NewsClient) {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        ));
        let config = ApiConfig {
            api_key: "test-key".into(),
            ..ApiConfig::default()
        };
        let client = NewsClient::new(fetcher.clone(), config, clock.clone());
        (fetcher, clock, client)
    }

    fn query_value(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn test_headlines_request_shape() {
        let (fetcher, _, client) = setup();
        fetcher.push(Ok(HttpResponse::new(200, headlines_body(&["https://a.example/1"]))));

        let articles = client
            .fetch_top_headlines(NewsCategory::Technology, "gb", 2, 20)
            .await
            .unwrap();
        assert_eq!(articles.len(), 1);

        let requests = fetcher.requests();
        let url = &requests[0];
        assert_eq!(url.path(), "/v2/top-headlines");
        assert_eq!(query_value(url, "apiKey").as_deref(), Some("test-key"));
        assert_eq!(query_value(url, "category").as_deref(), Some("technology"));
        assert_eq!(query_value(url, "country").as_deref(), Some("gb"));
        assert_eq!(query_value(url, "page").as_deref(), Some("2"));
        assert_eq!(query_value(url, "pageSize").as_deref(), Some("20"));
    }

    #[tokio::test]
    async fn test_all_category_omits_parameter() {
        let (fetcher, _, client) = setup();
        fetcher.push(Ok(HttpResponse::new(200, headlines_body(&[]))));

        client
            .fetch_top_headlines(NewsCategory::All, "us", 1, 20)
            .await
            .unwrap();
        assert_eq!(query_value(&fetcher.requests()[0], "category"), None);
    }

    #[tokio::test]
    async fn test_headlines_cached_within_ttl() {
        let (fetcher, clock, client) = setup();
        fetcher.push(Ok(HttpResponse::new(200, headlines_body(&["https://a.example/1"]))));
        fetcher.push(Ok(HttpResponse::new(
            200,
            headlines_body(&["https://a.example/1", "https://a.example/2"]),
        )));

        client
            .fetch_top_headlines(NewsCategory::General, "us", 1, 20)
            .await
            .unwrap();

        clock.advance(Duration::seconds(299));
        let cached = client
            .fetch_top_headlines(NewsCategory::General, "us", 1, 20)
            .await
            .unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(fetcher.requests().len(), 1);

        clock.advance(Duration::seconds(2));
        let fresh = client
            .fetch_top_headlines(NewsCategory::General, "us", 1, 20)
            .await
            .unwrap();
        assert_eq!(fresh.len(), 2);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let (fetcher, _, client) = setup();
        fetcher.push(Err(NewsApiError::network("connection reset")));
        fetcher.push(Ok(HttpResponse::new(200, headlines_body(&["https://a.example/1"]))));

        let err = client
            .fetch_top_headlines(NewsCategory::General, "us", 1, 20)
            .await
            .unwrap_err();
        assert!(matches!(err, NewsApiError::Network(_)));

        let articles = client
            .fetch_top_headlines(NewsCategory::General, "us", 1, 20)
            .await
            .unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_search_is_never_cached() {
        let (fetcher, _, client) = setup();
        fetcher.push(Ok(HttpResponse::new(200, headlines_body(&["https://a.example/1"]))));
        fetcher.push(Ok(HttpResponse::new(200, headlines_body(&["https://a.example/1"]))));

        client
            .search_articles("rust", SortBy::Relevancy, 1, 20)
            .await
            .unwrap();
        client
            .search_articles("rust", SortBy::Relevancy, 1, 20)
            .await
            .unwrap();

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].path(), "/v2/everything");
        assert_eq!(query_value(&requests[0], "q").as_deref(), Some("rust"));
        assert_eq!(query_value(&requests[0], "sortBy").as_deref(), Some("relevancy"));
        assert_eq!(query_value(&requests[0], "language").as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_sources_optional_parameters() {
        let (fetcher, _, client) = setup();
        fetcher.push(Ok(HttpResponse::new(
            200,
            r#"{"status":"ok","sources":[{"id":"bbc","name":"BBC","description":null,"url":null,"category":"general","language":"en","country":"gb"}]}"#,
        )));

        let sources = client.fetch_sources(None, "en", Some("gb")).await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, "bbc");

        let url = &fetcher.requests()[0];
        assert_eq!(url.path(), "/v2/sources");
        assert_eq!(query_value(url, "category"), None);
        assert_eq!(query_value(url, "country").as_deref(), Some("gb"));
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let config = ApiConfig {
            base_url: "not a url".into(),
            ..ApiConfig::default()
        };
        let client = NewsClient::new(fetcher.clone(), config, Arc::new(crate::clock::SystemClock));

        let err = client
            .fetch_top_headlines(NewsCategory::General, "us", 1, 20)
            .await
            .unwrap_err();
        assert!(matches!(err, NewsApiError::InvalidUrl(_)));
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn test_out_of_range_ttl_falls_back() {
        assert_eq!(cache_ttl(i64::MAX), Duration::seconds(DEFAULT_TTL_SECS));
        assert_eq!(cache_ttl(-5), Duration::zero());
        assert_eq!(cache_ttl(60), Duration::seconds(60));

        let config = ApiConfig {
            cache_ttl_secs: i64::MAX,
            ..ApiConfig::default()
        };
        let client = NewsClient::new(
            Arc::new(ScriptedFetcher::default()),
            config,
            Arc::new(crate::clock::SystemClock),
        );
        assert_eq!(client.cache().ttl(), Duration::seconds(DEFAULT_TTL_SECS));
    }

    #[test]
    fn test_status_classification() {
        let rate = HttpResponse::new(429, "");
        assert!(matches!(classify_failure(&rate), NewsApiError::RateLimitExceeded));

        let key = HttpResponse::new(
            401,
            r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid"}"#,
        );
        assert!(matches!(classify_failure(&key), NewsApiError::ApiKeyInvalid));

        let coded = HttpResponse::new(
            400,
            r#"{"status":"error","code":"rateLimited","message":"slow down"}"#,
        );
        assert!(matches!(classify_failure(&coded), NewsApiError::RateLimitExceeded));

        let other = HttpResponse::new(500, "oops");
        assert!(matches!(classify_failure(&other), NewsApiError::Decoding(_)));
    }

    #[test]
    fn test_decode_empty_and_malformed_bodies() {
        let empty = decode_response::<NewsResponse>(HttpResponse::new(200, ""));
        assert!(matches!(empty, Err(NewsApiError::NoData)));

        let garbage = decode_response::<NewsResponse>(HttpResponse::new(200, "<html>"));
        assert!(matches!(garbage, Err(NewsApiError::Decoding(_))));

        let error_doc = decode_response::<NewsResponse>(HttpResponse::new(
            200,
            r#"{"status":"error","code":"apiKeyMissing","message":"missing"}"#,
        ));
        assert!(matches!(error_doc, Err(NewsApiError::ApiKeyInvalid)));
    }
}
