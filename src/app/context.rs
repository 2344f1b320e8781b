use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app::error::{NewsreelError, Result};
use crate::bookmarks::BookmarkStore;
use crate::client::NewsClient;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::feed::{FeedController, FeedQuery};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::session::{AuthProvider, SessionManager};
use crate::store::{KeyValueStore, MemoryStore, SqliteStore};

/// Wires every component together. Nothing in the crate reaches for a global;
/// whoever needs a client, a store or a session gets it from here.
pub struct AppContext {
    pub config: Config,
    pub client: Arc<NewsClient>,
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub auth_provider: Option<Arc<dyn AuthProvider>>,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::with_timeout(
            Duration::from_secs(config.api.timeout_secs),
        )?);
        Ok(Self::with_parts(config, fetcher, store, Arc::new(SystemClock)))
    }

    /// Nothing touches disk; bookmarks and session last for the process only.
    pub fn in_memory(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::with_timeout(
            Duration::from_secs(config.api.timeout_secs),
        )?);
        Ok(Self::with_parts(
            config,
            fetcher,
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
        ))
    }

    pub fn with_parts(
        config: Config,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let client = Arc::new(NewsClient::new(
            fetcher,
            config.api.clone(),
            clock.clone(),
        ));

        Self {
            config,
            client,
            store,
            clock,
            auth_provider: None,
        }
    }

    pub fn with_auth_provider(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth_provider = Some(provider);
        self
    }

    pub fn bookmarks(&self) -> BookmarkStore {
        BookmarkStore::load(self.store.clone())
    }

    pub fn session(&self) -> SessionManager {
        SessionManager::new(
            self.store.clone(),
            self.auth_provider.clone(),
            self.config.auth.clone(),
            self.clock.clone(),
        )
    }

    pub fn feed(&self, query: FeedQuery) -> FeedController {
        FeedController::new(self.client.clone(), query, self.config.feed.page_size)
    }

    pub fn page_size(&self) -> u32 {
        self.config.feed.page_size
    }

    /// The feed shown on launch: configured category and country.
    pub fn default_headlines(&self) -> FeedQuery {
        FeedQuery::headlines(self.config.feed.category, self.config.feed.country.clone())
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| NewsreelError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("newsreel");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("newsreel.db"))
    }
}
