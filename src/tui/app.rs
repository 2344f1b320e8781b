use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use crate::bookmarks::{BookmarkEntry, BookmarkList, BookmarkStore};
use crate::domain::{Article, DateFilter, LoadingState, SortBy};
use crate::feed::{FeedController, FeedQuery, Outcome, PageRequest, PageResult, RequestKind};
use crate::route::Route;
use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    List,
    Preview,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::List => ActivePane::Preview,
            ActivePane::Preview => ActivePane::List,
        }
    }

    pub fn prev(self) -> Self {
        self.next()
    }
}

/// Which feed a dispatched request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTarget {
    Home,
    Search,
}

pub const PAGE_SIZE: usize = 10;
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

pub struct StatusBanner {
    pub message: String,
    pub is_error: bool,
    shown_at: Instant,
}

pub struct FeedPane {
    pub feed: FeedController,
    pub index: usize,
    pub list_state: ListState,
    /// Set when the last next-page fetch failed. Scrolling back onto the
    /// last row does not fetch again until the selection moves or the user
    /// retries.
    pub load_more_failed: bool,
}

impl FeedPane {
    pub fn new(feed: FeedController) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            feed,
            index: 0,
            list_state,
            load_more_failed: false,
        }
    }

    fn select(&mut self, index: usize) {
        if index != self.index {
            self.load_more_failed = false;
        }
        self.index = index;
        self.list_state.select(Some(index));
    }

    /// Keep the selection inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        if self.index >= len {
            self.select(len.saturating_sub(1));
        }
    }
}

pub struct TuiApp {
    pub route: Route,
    pub active_pane: ActivePane,
    pub home: FeedPane,
    pub search: FeedPane,
    pub bookmarks: BookmarkStore,
    pub session: SessionManager,
    pub bookmark_list: BookmarkList,
    pub bookmark_index: usize,
    pub bookmark_list_state: ListState,
    pub date_filter: DateFilter,
    pub sort_by: SortBy,
    pub region: String,
    /// `Some` while the search prompt is open.
    pub search_input: Option<String>,
    pub preview_scroll: u16,
    pub maximized: bool,
    pub should_quit: bool,
    status: Option<StatusBanner>,
}

impl TuiApp {
    pub fn new(
        home: FeedController,
        search: FeedController,
        bookmarks: BookmarkStore,
        session: SessionManager,
        region: String,
        route: Route,
    ) -> Self {
        let mut bookmark_list_state = ListState::default();
        bookmark_list_state.select(Some(0));

        Self {
            route,
            active_pane: ActivePane::List,
            home: FeedPane::new(home),
            search: FeedPane::new(search),
            bookmarks,
            session,
            bookmark_list: BookmarkList::Favorites,
            bookmark_index: 0,
            bookmark_list_state,
            date_filter: DateFilter::All,
            sort_by: SortBy::default(),
            region,
            search_input: None,
            preview_scroll: 0,
            maximized: false,
            should_quit: false,
            status: None,
        }
    }

    pub fn pane(&self, target: FeedTarget) -> &FeedPane {
        match target {
            FeedTarget::Home => &self.home,
            FeedTarget::Search => &self.search,
        }
    }

    pub fn pane_mut(&mut self, target: FeedTarget) -> &mut FeedPane {
        match target {
            FeedTarget::Home => &mut self.home,
            FeedTarget::Search => &mut self.search,
        }
    }

    pub fn current_target(&self) -> Option<FeedTarget> {
        match self.route {
            Route::Home => Some(FeedTarget::Home),
            Route::Search => Some(FeedTarget::Search),
            Route::Bookmarks | Route::Profile => None,
        }
    }

    pub fn visible_articles(&self, now: DateTime<Utc>) -> Vec<&Article> {
        match self.current_target() {
            Some(target) => self
                .pane(target)
                .feed
                .visible_articles(self.date_filter, now),
            None => Vec::new(),
        }
    }

    pub fn bookmark_entries(&self) -> Vec<BookmarkEntry<'_>> {
        let loaded = self
            .home
            .feed
            .articles()
            .iter()
            .chain(self.search.feed.articles());
        self.bookmarks.entries(self.bookmark_list, loaded)
    }

    pub fn selected_article(&self, now: DateTime<Utc>) -> Option<&Article> {
        match self.current_target() {
            Some(target) => self
                .visible_articles(now)
                .get(self.pane(target).index)
                .copied(),
            None if self.route == Route::Bookmarks => {
                match self.bookmark_entries().get(self.bookmark_index) {
                    Some(BookmarkEntry::Loaded(article)) => Some(*article),
                    _ => None,
                }
            }
            None => None,
        }
    }

    /// URL of whatever row is selected, resolved or not.
    pub fn selected_link(&self, now: DateTime<Utc>) -> Option<String> {
        if self.route == Route::Bookmarks {
            return self
                .bookmark_entries()
                .get(self.bookmark_index)
                .map(|entry| entry.id().to_string());
        }
        self.selected_article(now).map(|a| a.url().to_string())
    }

    fn list_len(&self, now: DateTime<Utc>) -> usize {
        match self.route {
            Route::Home | Route::Search => self.visible_articles(now).len(),
            Route::Bookmarks => self.bookmarks.len(self.bookmark_list),
            Route::Profile => 0,
        }
    }

    fn selection(&self) -> usize {
        match self.current_target() {
            Some(target) => self.pane(target).index,
            None => self.bookmark_index,
        }
    }

    fn select(&mut self, index: usize) {
        match self.current_target() {
            Some(target) => self.pane_mut(target).select(index),
            None => {
                self.bookmark_index = index;
                self.bookmark_list_state.select(Some(index));
            }
        }
        self.preview_scroll = 0;
    }

    fn move_selection(&mut self, delta: isize, now: DateTime<Utc>) {
        let len = self.list_len(now);
        if len == 0 {
            return;
        }
        let current = self.selection() as isize;
        let target = (current + delta).clamp(0, len as isize - 1) as usize;
        if target != self.selection() {
            self.select(target);
        }
    }

    pub fn move_up(&mut self, now: DateTime<Utc>) {
        match self.active_pane {
            ActivePane::List => self.move_selection(-1, now),
            ActivePane::Preview => self.preview_scroll = self.preview_scroll.saturating_sub(1),
        }
    }

    pub fn move_down(&mut self, now: DateTime<Utc>) {
        match self.active_pane {
            ActivePane::List => self.move_selection(1, now),
            ActivePane::Preview => self.preview_scroll = self.preview_scroll.saturating_add(1),
        }
    }

    pub fn next_page(&mut self, now: DateTime<Utc>) {
        match self.active_pane {
            ActivePane::List => self.move_selection(PAGE_SIZE as isize, now),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(PAGE_SIZE as u16)
            }
        }
    }

    pub fn prev_page(&mut self, now: DateTime<Utc>) {
        match self.active_pane {
            ActivePane::List => self.move_selection(-(PAGE_SIZE as isize), now),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(PAGE_SIZE as u16)
            }
        }
    }

    pub fn set_route(&mut self, route: Route) {
        self.route = route;
        self.active_pane = ActivePane::List;
        self.preview_scroll = 0;
    }

    pub fn toggle_maximize(&mut self) {
        self.maximized = !self.maximized;
        if self.maximized {
            self.active_pane = ActivePane::Preview;
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(StatusBanner {
            message: message.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(StatusBanner {
            message: message.into(),
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    pub fn status(&self) -> Option<&StatusBanner> {
        self.status.as_ref()
    }

    pub fn expire_status(&mut self, now: Instant) {
        if let Some(status) = &self.status {
            if now.duration_since(status.shown_at) >= STATUS_TIMEOUT {
                self.status = None;
            }
        }
    }

    /// Flip `list` membership of the selected row. Returns the new membership.
    pub fn toggle_bookmark(&mut self, list: BookmarkList, now: DateTime<Utc>) -> Option<bool> {
        let id = self.selected_link(now)?;
        let added = self.bookmarks.toggle(list, &id);
        if added {
            self.set_status(format!("Added to {}", list.display_name()));
        } else {
            self.set_status(format!("Removed from {}", list.display_name()));
        }
        if self.route == Route::Bookmarks {
            let len = self.bookmarks.len(self.bookmark_list);
            if self.bookmark_index >= len {
                self.select(len.saturating_sub(1));
            }
        }
        Some(added)
    }

    pub fn switch_bookmark_list(&mut self) {
        self.bookmark_list = match self.bookmark_list {
            BookmarkList::Favorites => BookmarkList::ReadLater,
            BookmarkList::ReadLater => BookmarkList::Favorites,
        };
        self.bookmark_index = 0;
        self.bookmark_list_state.select(Some(0));
    }

    pub fn cycle_date_filter(&mut self) {
        self.date_filter = self.date_filter.next();
        self.home.select(0);
        self.search.select(0);
        self.set_status(format!("Showing: {}", self.date_filter));
    }

    pub fn begin_initial(&mut self, target: FeedTarget) -> Option<(FeedTarget, PageRequest)> {
        if target == FeedTarget::Search && self.search_query().is_empty() {
            return None;
        }
        let pane = self.pane_mut(target);
        let request = pane.feed.begin_load_initial()?;
        pane.load_more_failed = false;
        Some((target, request))
    }

    pub fn begin_refresh(&mut self) -> Option<(FeedTarget, PageRequest)> {
        let target = self.current_target()?;
        if target == FeedTarget::Search && self.search_query().is_empty() {
            return None;
        }
        let pane = self.pane_mut(target);
        let request = pane.feed.begin_refresh()?;
        pane.load_more_failed = false;
        Some((target, request))
    }

    /// Reload a feed that failed or never loaded, or fetch again the next
    /// page that failed.
    pub fn begin_retry(&mut self) -> Option<(FeedTarget, PageRequest)> {
        let target = self.current_target()?;
        if self.pane(target).load_more_failed {
            let pane = self.pane_mut(target);
            let request = pane.feed.begin_load_more()?;
            pane.load_more_failed = false;
            return Some((target, request));
        }
        match self.pane(target).feed.loading_state() {
            LoadingState::Failed(_) | LoadingState::Idle => self.begin_initial(target),
            LoadingState::Loading | LoadingState::Loaded => None,
        }
    }

    /// Fetch the next page once the selection sits on the last visible row.
    pub fn begin_load_more_if_needed(
        &mut self,
        now: DateTime<Utc>,
    ) -> Option<(FeedTarget, PageRequest)> {
        let target = self.current_target()?;
        if self.pane(target).load_more_failed {
            return None;
        }
        let visible = self.visible_articles(now);
        let index = self.pane(target).index;
        let selected = visible.get(index)?;

        let at_end = self.pane(target).feed.should_load_more(selected)
            || (self.date_filter != DateFilter::All && index + 1 == visible.len());
        if !at_end {
            return None;
        }

        let request = self.pane_mut(target).feed.begin_load_more()?;
        Some((target, request))
    }

    /// Home only: move to the next category and reload.
    pub fn cycle_category(&mut self) -> Option<(FeedTarget, PageRequest)> {
        if self.route != Route::Home {
            return None;
        }
        let FeedQuery::Headlines { category, region } = self.home.feed.query().clone() else {
            return None;
        };

        let next = category.next();
        self.home.feed.set_query(FeedQuery::headlines(next, region));
        self.home.select(0);
        self.set_status(format!("Category: {}", next.display_name()));
        self.begin_initial(FeedTarget::Home)
    }

    pub fn search_query(&self) -> String {
        match self.search.feed.query() {
            FeedQuery::Search { query, .. } => query.clone(),
            FeedQuery::Headlines { .. } => String::new(),
        }
    }

    pub fn open_search_input(&mut self) {
        self.set_route(Route::Search);
        self.search_input = Some(self.search_query());
    }

    /// Keys typed while the search prompt is open. Returns the request to
    /// dispatch when a query is submitted.
    pub fn handle_search_key(&mut self, key: KeyEvent) -> Option<(FeedTarget, PageRequest)> {
        match key.code {
            KeyCode::Enter => self.submit_search(),
            KeyCode::Esc => {
                self.search_input = None;
                None
            }
            KeyCode::Backspace => {
                if let Some(input) = self.search_input.as_mut() {
                    input.pop();
                }
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(input) = self.search_input.as_mut() {
                    input.push(c);
                }
                None
            }
            _ => None,
        }
    }

    fn submit_search(&mut self) -> Option<(FeedTarget, PageRequest)> {
        let input = self.search_input.take()?;
        let query = input.trim();
        if query.is_empty() {
            return None;
        }

        self.search
            .feed
            .set_query(FeedQuery::search(query, self.sort_by));
        self.search.select(0);
        self.begin_initial(FeedTarget::Search)
    }

    /// Fold a finished fetch into its feed.
    pub fn apply(&mut self, target: FeedTarget, page: PageResult) -> Outcome {
        let more_failed = page.request.kind == RequestKind::More && page.result.is_err();
        let pane = self.pane_mut(target);
        let outcome = pane.feed.complete(page);
        let len = pane.feed.articles().len();
        pane.clamp(len);
        if outcome == Outcome::Applied && more_failed {
            pane.load_more_failed = true;
        }

        if outcome == Outcome::Applied {
            if let Some(kind) = self.pane_mut(target).feed.take_last_error() {
                if more_failed {
                    self.set_error(format!("{} (r to retry)", kind.message()));
                } else {
                    self.set_error(kind.message());
                }
            }
        }
        outcome
    }
}
