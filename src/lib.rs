//! # newsreel
//!
//! A terminal news reader backed by a NewsAPI-style REST service.
//!
//! ## Architecture
//!
//! ```text
//! TUI / CLI → FeedController → NewsClient → (ResponseCache | Fetcher) → Article
//! ```
//!
//! - [`client`]: endpoint construction, response decoding, TTL cache
//! - [`feed`]: pagination, de-duplication and filtering of the article list
//! - [`bookmarks`]: favorites and read-later sets with write-through persistence
//! - [`store`]: key-value persistence (SQLite or in-memory)
//! - [`tui`]: terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! export NEWSAPI_KEY=...
//!
//! # Top technology headlines, two pages
//! newsreel headlines --category technology --pages 2
//!
//! # Search everything
//! newsreel search "rust language" --sort-by relevancy
//!
//! # Launch the TUI on the bookmarks tab
//! newsreel tui --link newsreel://bookmarks
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// client, store, clock, session.
pub mod app;

/// Favorites and read-later bookmark sets.
pub mod bookmarks;

/// Command-line interface using clap.
///
/// - `headlines`, `search`, `sources` - browse the news service
/// - `bookmark add|remove|toggle`, `bookmarks` - manage saved articles
/// - `whoami`, `logout` - session
/// - `tui` - launch the TUI
pub mod cli;

/// News service client.
///
/// - [`NewsClient`](client::NewsClient): headlines, search and sources
/// - [`ResponseCache`](client::cache::ResponseCache): time-bounded headline cache
/// - [`NewsApiError`](client::NewsApiError): fetch failure taxonomy
pub mod client;

/// Time source, swappable in tests.
pub mod clock;

/// Configuration management.
///
/// Loads from `~/.config/newsreel/config.toml`, supporting:
/// - API endpoint, key and cache lifetime
/// - Default category and country
/// - Custom colors (named or hex) and keybindings
pub mod config;

/// Core domain models.
///
/// - [`Article`](domain::Article): one news item, identified by its URL
/// - [`NewsCategory`](domain::NewsCategory), [`SortBy`](domain::SortBy), [`DateFilter`](domain::DateFilter)
/// - [`LoadingState`](domain::LoadingState), [`FailureKind`](domain::FailureKind)
pub mod domain;

/// Paginated feed state.
pub mod feed;

/// HTTP transport.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for GET requests
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Top-level destinations and `newsreel://` deep links.
pub mod route;

/// Signed-in user session.
pub mod session;

/// Key-value persistence.
///
/// - [`KeyValueStore`](store::KeyValueStore): storage trait
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
/// - [`MemoryStore`](store::MemoryStore): volatile implementation
pub mod store;

/// Terminal user interface.
///
/// Tabs for Home, Search, Bookmarks and Profile over a list/preview split.
/// Keybindings: j/k navigate, [/] switch tabs, f favorites, l read later,
/// o opens in browser, R refreshes, / searches, q quits.
pub mod tui;
