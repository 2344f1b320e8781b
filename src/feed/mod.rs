//! Paginated article feed: what the views render and how it grows.

pub mod controller;

use async_trait::async_trait;

use crate::client::NewsApiError;
use crate::domain::{Article, NewsCategory, SortBy};

pub use controller::{
    is_displayable, FeedController, Outcome, PageRequest, PageResult, RequestKind,
};

/// What a feed shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedQuery {
    Headlines {
        category: NewsCategory,
        region: String,
    },
    Search {
        query: String,
        sort_by: SortBy,
    },
}

impl FeedQuery {
    pub fn headlines(category: NewsCategory, region: impl Into<String>) -> Self {
        FeedQuery::Headlines {
            category,
            region: region.into(),
        }
    }

    pub fn search(query: impl Into<String>, sort_by: SortBy) -> Self {
        FeedQuery::Search {
            query: query.into(),
            sort_by,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FeedQuery::Headlines { category, region } => {
                format!("{} ({})", category.display_name(), region.to_uppercase())
            }
            FeedQuery::Search { query, sort_by } => {
                format!("\"{}\" by {}", query, sort_by)
            }
        }
    }
}

/// Anything that can produce one page of articles for a query.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_page(
        &self,
        query: &FeedQuery,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Article>, NewsApiError>;
}
