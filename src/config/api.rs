//! Settings for the news endpoint, the default feed and sign-in.

use serde::Deserialize;

use crate::client::cache::DEFAULT_TTL_SECS;
use crate::domain::NewsCategory;
use crate::fetcher::http_fetcher::DEFAULT_TIMEOUT_SECS;

pub const API_KEY_ENV: &str = "NEWSAPI_KEY";
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub language: String,
    pub cache_ttl_secs: i64,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            language: "en".to_string(),
            cache_ttl_secs: DEFAULT_TTL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// `NEWSAPI_KEY` wins over the key in the file.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = key.trim().to_string();
            }
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: u32,
    pub category: NewsCategory,
    pub country: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            category: NewsCategory::General,
            country: "us".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub client_id: String,
}

impl AuthConfig {
    /// An empty client id or one still holding a `YOUR_...` placeholder.
    pub fn is_configured(&self) -> bool {
        let id = self.client_id.trim();
        !id.is_empty() && !id.contains("YOUR_")
    }
}
