use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::NewsApiError;
use crate::domain::{Article, DateFilter, FailureKind, LoadingState};
use crate::feed::{ArticleSource, FeedQuery};

const REMOVED_MARKER: &str = "[removed]";

/// Articles the feed is willing to show: not taken down, and with a
/// non-empty description.
pub fn is_displayable(article: &Article) -> bool {
    !article.title.to_lowercase().contains(REMOVED_MARKER) && article.has_description()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Initial,
    Refresh,
    More,
}

/// A page fetch the controller has committed to, tagged with the generation
/// it was dispatched under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub kind: RequestKind,
    pub page: u32,
    pub page_size: u32,
    pub query: FeedQuery,
}

impl PageRequest {
    pub async fn run(self, source: &dyn ArticleSource) -> PageResult {
        let result = source
            .fetch_page(&self.query, self.page, self.page_size)
            .await;
        PageResult {
            request: self,
            result,
        }
    }
}

#[derive(Debug)]
pub struct PageResult {
    pub request: PageRequest,
    pub result: Result<Vec<Article>, NewsApiError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The controller moved on (refresh, reload or new query) after this
    /// request was dispatched; its result was dropped.
    Stale,
}

/// Owns the visible article list and its loading lifecycle.
///
/// Every operation comes in two halves: `begin_*` decides whether a fetch
/// should happen and returns its [`PageRequest`], and [`complete`] folds the
/// result back in. Callers that can await in place use the `async` wrappers
/// instead.
///
/// [`complete`]: FeedController::complete
pub struct FeedController {
    source: Arc<dyn ArticleSource>,
    query: FeedQuery,
    page_size: u32,
    articles: Vec<Article>,
    loading_state: LoadingState,
    has_more_pages: bool,
    current_page: u32,
    generation: u64,
    pending_refresh: Option<u64>,
    pending_more: Option<u64>,
    last_error: Option<FailureKind>,
}

impl FeedController {
    pub fn new(source: Arc<dyn ArticleSource>, query: FeedQuery, page_size: u32) -> Self {
        Self {
            source,
            query,
            page_size: page_size.max(1),
            articles: Vec::new(),
            loading_state: LoadingState::Idle,
            has_more_pages: true,
            current_page: 1,
            generation: 0,
            pending_refresh: None,
            pending_more: None,
            last_error: None,
        }
    }

    pub fn source(&self) -> Arc<dyn ArticleSource> {
        self.source.clone()
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn loading_state(&self) -> LoadingState {
        self.loading_state
    }

    pub fn is_refreshing(&self) -> bool {
        self.pending_refresh.is_some()
    }

    pub fn is_loading_more(&self) -> bool {
        self.pending_more.is_some()
    }

    pub fn has_more_pages(&self) -> bool {
        self.has_more_pages
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Error from the last failed `load_more` or refresh that left the list
    /// in place.
    pub fn last_error(&self) -> Option<FailureKind> {
        self.last_error
    }

    pub fn take_last_error(&mut self) -> Option<FailureKind> {
        self.last_error.take()
    }

    /// Switch to a different query. Everything in flight becomes stale.
    pub fn set_query(&mut self, query: FeedQuery) {
        debug!("Feed query changed to {}", query.describe());
        self.query = query;
        self.generation += 1;
        self.articles.clear();
        self.loading_state = LoadingState::Idle;
        self.has_more_pages = true;
        self.current_page = 1;
        self.pending_refresh = None;
        self.pending_more = None;
        self.last_error = None;
    }

    pub fn begin_load_initial(&mut self) -> Option<PageRequest> {
        if self.loading_state.is_loading() {
            return None;
        }

        self.loading_state = LoadingState::Loading;
        self.current_page = 1;
        self.generation += 1;
        self.last_error = None;
        Some(self.request(RequestKind::Initial, 1))
    }

    pub fn begin_refresh(&mut self) -> Option<PageRequest> {
        if self.is_refreshing() {
            return None;
        }

        self.current_page = 1;
        self.has_more_pages = true;
        self.generation += 1;
        self.pending_refresh = Some(self.generation);
        Some(self.request(RequestKind::Refresh, 1))
    }

    pub fn begin_load_more(&mut self) -> Option<PageRequest> {
        if self.is_loading_more() || !self.has_more_pages || self.loading_state.is_loading() {
            return None;
        }

        self.current_page += 1;
        self.pending_more = Some(self.generation);
        Some(self.request(RequestKind::More, self.current_page))
    }

    /// Fold a finished fetch back into the feed.
    pub fn complete(&mut self, page: PageResult) -> Outcome {
        let PageResult { request, result } = page;

        match request.kind {
            RequestKind::Refresh if self.pending_refresh == Some(request.generation) => {
                self.pending_refresh = None;
            }
            RequestKind::More if self.pending_more == Some(request.generation) => {
                self.pending_more = None;
            }
            _ => {}
        }

        if request.generation != self.generation {
            debug!(
                "Discarding stale page {} ({:?}, generation {} < {})",
                request.page, request.kind, request.generation, self.generation
            );
            return Outcome::Stale;
        }

        match result {
            Ok(articles) => self.apply_page(&request, articles),
            Err(err) => self.apply_failure(&request, err),
        }
        Outcome::Applied
    }

    pub async fn load_initial_data(&mut self) -> Option<Outcome> {
        let request = self.begin_load_initial()?;
        Some(self.run(request).await)
    }

    pub async fn refresh(&mut self) -> Option<Outcome> {
        let request = self.begin_refresh()?;
        Some(self.run(request).await)
    }

    pub async fn load_more(&mut self) -> Option<Outcome> {
        let request = self.begin_load_more()?;
        Some(self.run(request).await)
    }

    /// Whether `article` is the last one in the list, i.e. the view has
    /// scrolled far enough to prefetch the next page.
    pub fn should_load_more(&self, article: &Article) -> bool {
        self.articles
            .last()
            .map(|last| last.id() == article.id())
            .unwrap_or(false)
    }

    pub fn visible_articles(&self, filter: DateFilter, now: DateTime<Utc>) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|article| filter.matches(article, now))
            .collect()
    }

    async fn run(&mut self, request: PageRequest) -> Outcome {
        let source = self.source.clone();
        let page = request.run(source.as_ref()).await;
        self.complete(page)
    }

    fn request(&self, kind: RequestKind, page: u32) -> PageRequest {
        PageRequest {
            generation: self.generation,
            kind,
            page,
            page_size: self.page_size,
            query: self.query.clone(),
        }
    }

    fn apply_page(&mut self, request: &PageRequest, articles: Vec<Article>) {
        let returned = articles.len();
        let displayable = articles.into_iter().filter(is_displayable);

        match request.kind {
            RequestKind::Initial | RequestKind::Refresh => {
                let mut seen = HashSet::new();
                self.articles = displayable
                    .filter(|article| seen.insert(article.id().to_string()))
                    .collect();
            }
            RequestKind::More => {
                let mut seen: HashSet<String> =
                    self.articles.iter().map(|a| a.id().to_string()).collect();
                let before = self.articles.len();
                self.articles
                    .extend(displayable.filter(|article| seen.insert(article.id().to_string())));
                debug!(
                    "Page {} added {} of {} articles",
                    request.page,
                    self.articles.len() - before,
                    returned
                );
            }
        }

        self.has_more_pages = returned >= request.page_size as usize;
        self.loading_state = LoadingState::Loaded;
        info!(
            "Feed {} now has {} articles (page {}, more: {})",
            self.query.describe(),
            self.articles.len(),
            self.current_page,
            self.has_more_pages
        );
    }

    fn apply_failure(&mut self, request: &PageRequest, err: NewsApiError) {
        let kind = FailureKind::from(&err);
        warn!(
            "Failed to fetch page {} of {}: {}",
            request.page,
            self.query.describe(),
            err
        );

        match request.kind {
            RequestKind::Initial => {
                self.loading_state = LoadingState::Failed(kind);
            }
            RequestKind::Refresh => {
                if self.articles.is_empty() || self.loading_state.is_loading() {
                    self.loading_state = LoadingState::Failed(kind);
                } else {
                    self.last_error = Some(kind);
                }
            }
            RequestKind::More => {
                if self.current_page == request.page {
                    self.current_page = self.current_page.saturating_sub(1).max(1);
                }
                self.last_error = Some(kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewsCategory;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedSource {
        pages: Mutex<VecDeque<Result<Vec<Article>, NewsApiError>>>,
        calls: Mutex<Vec<(u32, u32)>>,
    }

    impl ScriptedSource {
        fn with_pages(pages: Vec<Result<Vec<Article>, NewsApiError>>) -> Arc<Self> {
            Arc::new(Self {
                pages: Mutex::new(pages.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(u32, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArticleSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _query: &FeedQuery,
            page: u32,
            page_size: u32,
        ) -> Result<Vec<Article>, NewsApiError> {
            self.calls.lock().unwrap().push((page, page_size));
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn article(n: usize) -> Article {
        Article::new(format!("https://news.example/{}", n), format!("Story {}", n))
            .with_description("Something happened")
    }

    fn page(range: std::ops::Range<usize>) -> Vec<Article> {
        range.map(article).collect()
    }

    fn controller(source: Arc<ScriptedSource>, page_size: u32) -> FeedController {
        FeedController::new(
            source,
            FeedQuery::headlines(NewsCategory::General, "us"),
            page_size,
        )
    }

    fn ids(controller: &FeedController) -> Vec<String> {
        controller
            .articles()
            .iter()
            .map(|a| a.id().to_string())
            .collect()
    }

    #[test]
    fn test_displayable_filter() {
        assert!(is_displayable(&article(1)));
        assert!(!is_displayable(
            &Article::new("u", "Foo [Removed]").with_description("d")
        ));
        assert!(!is_displayable(
            &Article::new("u", "[REMOVED]").with_description("d")
        ));
        assert!(!is_displayable(&Article::new("u", "No description")));
        assert!(!is_displayable(&Article::new("u", "Empty").with_description("")));
    }

    #[tokio::test]
    async fn test_initial_load_success() {
        let source = ScriptedSource::with_pages(vec![Ok(page(0..3))]);
        let mut feed = controller(source.clone(), 3);
        assert_eq!(feed.loading_state(), LoadingState::Idle);

        assert_eq!(feed.load_initial_data().await, Some(Outcome::Applied));
        assert_eq!(feed.loading_state(), LoadingState::Loaded);
        assert_eq!(feed.articles().len(), 3);
        assert!(feed.has_more_pages());
        assert_eq!(source.calls(), vec![(1, 3)]);
    }

    #[test]
    fn test_initial_load_ignored_while_loading() {
        let source = ScriptedSource::with_pages(vec![]);
        let mut feed = controller(source, 20);
        assert!(feed.begin_load_initial().is_some());
        assert!(feed.begin_load_initial().is_none());
        assert_eq!(feed.loading_state(), LoadingState::Loading);
    }

    #[tokio::test]
    async fn test_initial_failure_then_retry() {
        let source = ScriptedSource::with_pages(vec![
            Err(NewsApiError::network("offline")),
            Ok(page(0..2)),
        ]);
        let mut feed = controller(source, 20);

        feed.load_initial_data().await;
        assert_eq!(
            feed.loading_state(),
            LoadingState::Failed(FailureKind::Network)
        );
        assert!(feed.articles().is_empty());

        feed.load_initial_data().await;
        assert_eq!(feed.loading_state(), LoadingState::Loaded);
        assert_eq!(feed.articles().len(), 2);
        assert!(!feed.has_more_pages());
    }

    #[tokio::test]
    async fn test_initial_load_deduplicates_page() {
        let mut first = page(0..3);
        first.push(article(1));
        let source = ScriptedSource::with_pages(vec![Ok(first)]);
        let mut feed = controller(source, 20);

        feed.load_initial_data().await;
        assert_eq!(ids(&feed).len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_replaces_list() {
        let source = ScriptedSource::with_pages(vec![
            Ok(page(0..3)),
            Ok(page(3..6)),
            Ok(page(10..12)),
        ]);
        let mut feed = controller(source.clone(), 3);

        feed.load_initial_data().await;
        feed.load_more().await;
        assert_eq!(feed.articles().len(), 6);
        assert_eq!(feed.current_page(), 2);

        assert_eq!(feed.refresh().await, Some(Outcome::Applied));
        assert_eq!(
            ids(&feed),
            vec![
                "https://news.example/10".to_string(),
                "https://news.example/11".to_string()
            ]
        );
        assert_eq!(feed.current_page(), 1);
        assert!(!feed.is_refreshing());
        assert_eq!(source.calls(), vec![(1, 3), (2, 3), (1, 3)]);
    }

    #[test]
    fn test_refresh_ignored_while_refreshing() {
        let source = ScriptedSource::with_pages(vec![]);
        let mut feed = controller(source, 20);
        assert!(feed.begin_refresh().is_some());
        assert!(feed.is_refreshing());
        assert!(feed.begin_refresh().is_none());
    }

    #[tokio::test]
    async fn test_load_more_skips_known_articles() {
        let mut second = page(3..5);
        second.push(article(0));
        second.push(article(2));
        let source = ScriptedSource::with_pages(vec![Ok(page(0..4)), Ok(second)]);
        let mut feed = controller(source, 4);

        feed.load_initial_data().await;
        feed.load_more().await;

        let ids = ids(&feed);
        assert_eq!(ids.len(), 5);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(ids.last().map(String::as_str), Some("https://news.example/4"));
        assert!(feed.has_more_pages(), "raw page size decides, not the new count");
    }

    #[tokio::test]
    async fn test_short_page_ends_pagination() {
        let source = ScriptedSource::with_pages(vec![Ok(page(0..4)), Ok(page(4..6))]);
        let mut feed = controller(source.clone(), 4);

        feed.load_initial_data().await;
        assert!(feed.has_more_pages());
        feed.load_more().await;
        assert!(!feed.has_more_pages());

        assert_eq!(feed.load_more().await, None);
        assert_eq!(source.calls().len(), 2);
    }

    #[test]
    fn test_load_more_blocked_during_full_load() {
        let source = ScriptedSource::with_pages(vec![]);
        let mut feed = controller(source, 20);
        feed.begin_load_initial();
        assert!(feed.begin_load_more().is_none());
    }

    #[test]
    fn test_load_more_single_flight() {
        let source = ScriptedSource::with_pages(vec![]);
        let mut feed = controller(source, 20);
        let first = feed.begin_load_more();
        assert_eq!(first.map(|r| r.page), Some(2));
        assert!(feed.begin_load_more().is_none());
        assert_eq!(feed.current_page(), 2);
    }

    #[test]
    fn test_stale_page_after_refresh_is_discarded() {
        let source = ScriptedSource::with_pages(vec![]);
        let mut feed = controller(source, 2);

        let initial = feed.begin_load_initial().unwrap();
        feed.complete(PageResult {
            request: initial,
            result: Ok(page(0..2)),
        });

        let more = feed.begin_load_more().unwrap();
        let refresh = feed.begin_refresh().unwrap();
        assert!(refresh.generation > more.generation);

        let outcome = feed.complete(PageResult {
            request: refresh,
            result: Ok(page(20..22)),
        });
        assert_eq!(outcome, Outcome::Applied);

        let outcome = feed.complete(PageResult {
            request: more,
            result: Ok(page(2..4)),
        });
        assert_eq!(outcome, Outcome::Stale);
        assert_eq!(
            ids(&feed),
            vec![
                "https://news.example/20".to_string(),
                "https://news.example/21".to_string()
            ]
        );
        assert_eq!(feed.current_page(), 1);
        assert!(!feed.is_loading_more());
    }

    #[test]
    fn test_stale_initial_does_not_override_refresh() {
        let source = ScriptedSource::with_pages(vec![]);
        let mut feed = controller(source, 20);

        let initial = feed.begin_load_initial().unwrap();
        let refresh = feed.begin_refresh().unwrap();

        feed.complete(PageResult {
            request: initial,
            result: Err(NewsApiError::NoData),
        });
        assert_eq!(feed.loading_state(), LoadingState::Loading);

        feed.complete(PageResult {
            request: refresh,
            result: Ok(page(0..1)),
        });
        assert_eq!(feed.loading_state(), LoadingState::Loaded);
        assert_eq!(feed.articles().len(), 1);
    }

    #[tokio::test]
    async fn test_load_more_failure_keeps_list() {
        let source = ScriptedSource::with_pages(vec![
            Ok(page(0..2)),
            Err(NewsApiError::RateLimitExceeded),
            Ok(page(2..3)),
        ]);
        let mut feed = controller(source.clone(), 2);

        feed.load_initial_data().await;
        feed.load_more().await;
        assert_eq!(feed.loading_state(), LoadingState::Loaded);
        assert_eq!(feed.last_error(), Some(FailureKind::RateLimited));
        assert_eq!(feed.current_page(), 1);
        assert_eq!(feed.articles().len(), 2);

        feed.load_more().await;
        assert_eq!(feed.articles().len(), 3);
        assert_eq!(source.calls(), vec![(1, 2), (2, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_refresh_failure_with_articles_keeps_loaded() {
        let source = ScriptedSource::with_pages(vec![
            Ok(page(0..2)),
            Err(NewsApiError::network("timeout")),
        ]);
        let mut feed = controller(source, 20);

        feed.load_initial_data().await;
        feed.refresh().await;
        assert_eq!(feed.loading_state(), LoadingState::Loaded);
        assert_eq!(feed.take_last_error(), Some(FailureKind::Network));
        assert_eq!(feed.last_error(), None);
        assert_eq!(feed.articles().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_on_empty_feed_fails() {
        let source = ScriptedSource::with_pages(vec![Err(NewsApiError::ApiKeyInvalid)]);
        let mut feed = controller(source, 20);

        feed.refresh().await;
        assert_eq!(
            feed.loading_state(),
            LoadingState::Failed(FailureKind::ApiKeyInvalid)
        );
    }

    #[tokio::test]
    async fn test_should_load_more_only_for_last() {
        let source = ScriptedSource::with_pages(vec![Ok(page(0..3))]);
        let mut feed = controller(source, 20);
        assert!(!feed.should_load_more(&article(0)));

        feed.load_initial_data().await;
        assert!(feed.should_load_more(&article(2)));
        assert!(!feed.should_load_more(&article(1)));
    }

    #[tokio::test]
    async fn test_set_query_resets_and_invalidates() {
        let source = ScriptedSource::with_pages(vec![Ok(page(0..2))]);
        let mut feed = controller(source, 20);
        feed.load_initial_data().await;

        let pending = feed.begin_refresh().unwrap();
        feed.set_query(FeedQuery::search("rust", crate::domain::SortBy::Relevancy));
        assert!(feed.articles().is_empty());
        assert_eq!(feed.loading_state(), LoadingState::Idle);
        assert!(!feed.is_refreshing());

        let outcome = feed.complete(PageResult {
            request: pending,
            result: Ok(page(5..7)),
        });
        assert_eq!(outcome, Outcome::Stale);
        assert!(feed.articles().is_empty());
    }
}
