//! Top-level destinations and `newsreel://` deep links.

use std::fmt;

use url::Url;

pub const DEEP_LINK_SCHEME: &str = "newsreel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Search,
    Bookmarks,
    Profile,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Home, Route::Search, Route::Bookmarks, Route::Profile];

    /// `None` for input that is not a `newsreel://` URL. Unknown hosts land
    /// on [`Route::Home`].
    pub fn from_deep_link(link: &str) -> Option<Route> {
        let url = Url::parse(link.trim()).ok()?;
        if url.scheme() != DEEP_LINK_SCHEME {
            return None;
        }

        let host = url.host_str().unwrap_or_default().to_lowercase();
        Some(match host.as_str() {
            "home" => Route::Home,
            "search" => Route::Search,
            "bookmarks" | "saved" => Route::Bookmarks,
            "profile" | "settings" => Route::Profile,
            _ => Route::Home,
        })
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Search => "Search",
            Route::Bookmarks => "Bookmarks",
            Route::Profile => "Profile",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Route::Home => 0,
            Route::Search => 1,
            Route::Bookmarks => 2,
            Route::Profile => 3,
        }
    }

    pub fn next(&self) -> Route {
        Route::ALL[(self.index() + 1) % Route::ALL.len()]
    }

    pub fn prev(&self) -> Route {
        Route::ALL[(self.index() + Route::ALL.len() - 1) % Route::ALL.len()]
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
