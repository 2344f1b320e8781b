//! Favorites and read-later lists, keyed by article URL.
//!
//! Both sets are written through to the [`KeyValueStore`] on every change.
//! A failed write is logged and the in-memory set stays authoritative for the
//! rest of the session.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::Article;
use crate::store::KeyValueStore;

pub const FAVORITES_KEY: &str = "bookmarks.favorites";
pub const READ_LATER_KEY: &str = "bookmarks.read_later";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkList {
    Favorites,
    ReadLater,
}

impl BookmarkList {
    pub fn storage_key(&self) -> &'static str {
        match self {
            BookmarkList::Favorites => FAVORITES_KEY,
            BookmarkList::ReadLater => READ_LATER_KEY,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BookmarkList::Favorites => "Favorites",
            BookmarkList::ReadLater => "Read Later",
        }
    }
}

/// A bookmarked id, resolved against the articles currently in memory when
/// possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkEntry<'a> {
    Loaded(&'a Article),
    Unresolved(String),
}

impl BookmarkEntry<'_> {
    pub fn id(&self) -> &str {
        match self {
            BookmarkEntry::Loaded(article) => article.id(),
            BookmarkEntry::Unresolved(id) => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            BookmarkEntry::Loaded(article) => &article.title,
            BookmarkEntry::Unresolved(id) => id,
        }
    }
}

pub struct BookmarkStore {
    store: Arc<dyn KeyValueStore>,
    favorites: BTreeSet<String>,
    read_later: BTreeSet<String>,
}

impl BookmarkStore {
    /// Loads both sets. Missing or unreadable data yields an empty set.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let favorites = Self::read_set(store.as_ref(), BookmarkList::Favorites);
        let read_later = Self::read_set(store.as_ref(), BookmarkList::ReadLater);
        debug!(
            "Loaded {} favorites and {} read-later bookmarks",
            favorites.len(),
            read_later.len()
        );
        Self {
            store,
            favorites,
            read_later,
        }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn is_read_later(&self, id: &str) -> bool {
        self.read_later.contains(id)
    }

    pub fn contains(&self, list: BookmarkList, id: &str) -> bool {
        self.set(list).contains(id)
    }

    /// Returns the new membership.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        self.toggle(BookmarkList::Favorites, id)
    }

    /// Returns the new membership.
    pub fn toggle_read_later(&mut self, id: &str) -> bool {
        self.toggle(BookmarkList::ReadLater, id)
    }

    pub fn toggle(&mut self, list: BookmarkList, id: &str) -> bool {
        let now_member = if self.set(list).contains(id) {
            self.set_mut(list).remove(id);
            false
        } else {
            self.set_mut(list).insert(id.to_string());
            true
        };
        self.persist(list);
        now_member
    }

    /// Returns `false` if the id was already present.
    pub fn add(&mut self, list: BookmarkList, id: &str) -> bool {
        let inserted = self.set_mut(list).insert(id.to_string());
        if inserted {
            self.persist(list);
        }
        inserted
    }

    /// Returns `false` if the id was not present.
    pub fn remove(&mut self, list: BookmarkList, id: &str) -> bool {
        let removed = self.set_mut(list).remove(id);
        if removed {
            self.persist(list);
        }
        removed
    }

    pub fn add_to_favorites(&mut self, id: &str) -> bool {
        self.add(BookmarkList::Favorites, id)
    }

    pub fn remove_from_favorites(&mut self, id: &str) -> bool {
        self.remove(BookmarkList::Favorites, id)
    }

    pub fn add_to_read_later(&mut self, id: &str) -> bool {
        self.add(BookmarkList::ReadLater, id)
    }

    pub fn remove_from_read_later(&mut self, id: &str) -> bool {
        self.remove(BookmarkList::ReadLater, id)
    }

    pub fn favorites(&self) -> impl Iterator<Item = &str> {
        self.favorites.iter().map(String::as_str)
    }

    pub fn read_later(&self) -> impl Iterator<Item = &str> {
        self.read_later.iter().map(String::as_str)
    }

    pub fn len(&self, list: BookmarkList) -> usize {
        self.set(list).len()
    }

    /// Bookmarked ids in `list`, matched up with `loaded` where possible.
    pub fn entries<'a, I>(&self, list: BookmarkList, loaded: I) -> Vec<BookmarkEntry<'a>>
    where
        I: IntoIterator<Item = &'a Article>,
    {
        let by_id: HashMap<&str, &'a Article> =
            loaded.into_iter().map(|a| (a.id(), a)).collect();
        self.set(list)
            .iter()
            .map(|id| match by_id.get(id.as_str()) {
                Some(article) => BookmarkEntry::Loaded(article),
                None => BookmarkEntry::Unresolved(id.clone()),
            })
            .collect()
    }

    fn set(&self, list: BookmarkList) -> &BTreeSet<String> {
        match list {
            BookmarkList::Favorites => &self.favorites,
            BookmarkList::ReadLater => &self.read_later,
        }
    }

    fn set_mut(&mut self, list: BookmarkList) -> &mut BTreeSet<String> {
        match list {
            BookmarkList::Favorites => &mut self.favorites,
            BookmarkList::ReadLater => &mut self.read_later,
        }
    }

    fn persist(&self, list: BookmarkList) {
        let key = list.storage_key();
        let result = serde_json::to_vec(self.set(list))
            .map_err(Into::into)
            .and_then(|bytes| self.store.set(key, &bytes));
        if let Err(e) = result {
            warn!("Failed to save {}: {}", key, e);
        }
    }

    fn read_set(store: &dyn KeyValueStore, list: BookmarkList) -> BTreeSet<String> {
        let key = list.storage_key();
        match store.get(key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<String>>(&bytes) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    warn!("Ignoring unreadable {}: {}", key, e);
                    BTreeSet::new()
                }
            },
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!("Failed to load {}: {}", key, e);
                BTreeSet::new()
            }
        }
    }
}
