use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Headline categories understood by the top-headlines endpoint.
///
/// `All` is a client-side notion: requests for it carry no category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    All,
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 8] = [
        NewsCategory::All,
        NewsCategory::General,
        NewsCategory::Business,
        NewsCategory::Entertainment,
        NewsCategory::Health,
        NewsCategory::Science,
        NewsCategory::Sports,
        NewsCategory::Technology,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NewsCategory::All => "all",
            NewsCategory::General => "general",
            NewsCategory::Business => "business",
            NewsCategory::Entertainment => "entertainment",
            NewsCategory::Health => "health",
            NewsCategory::Science => "science",
            NewsCategory::Sports => "sports",
            NewsCategory::Technology => "technology",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            NewsCategory::All => "All",
            NewsCategory::General => "Top Headlines",
            NewsCategory::Business => "Business",
            NewsCategory::Entertainment => "Entertainment",
            NewsCategory::Health => "Health",
            NewsCategory::Science => "Science",
            NewsCategory::Sports => "Sports",
            NewsCategory::Technology => "Technology",
        }
    }

    /// Value for the `category` query parameter, if any.
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            NewsCategory::All => None,
            other => Some(other.as_str()),
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Sort order for the everything/search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "publishedAt")]
    PublishedAt,
    #[serde(rename = "relevancy")]
    Relevancy,
    #[serde(rename = "popularity")]
    Popularity,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "publishedat" | "published" | "date" => Ok(SortBy::PublishedAt),
            "relevancy" | "relevance" => Ok(SortBy::Relevancy),
            "popularity" | "popular" => Ok(SortBy::Popularity),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}
