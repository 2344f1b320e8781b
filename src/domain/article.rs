use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDateTime, Utc};
use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};

/// The `source` object embedded in every article payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: Option<String>,
    pub name: String,
}

/// A single news item as returned by the headlines and search endpoints.
///
/// The article URL is its identity: two articles compare equal (and hash
/// alike) exactly when their URLs match, whatever the other fields say.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: SourceRef,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    url: String,
    pub url_to_image: Option<String>,
    pub published_at: String,
    pub content: Option<String>,
}

impl Article {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: SourceRef::default(),
            author: None,
            title: title.into(),
            description: None,
            url: url.into(),
            url_to_image: None,
            published_at: String::new(),
            content: None,
        }
    }

    pub fn with_source(mut self, name: impl Into<String>) -> Self {
        self.source.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = published_at.into();
        self
    }

    pub fn with_image(mut self, url_to_image: impl Into<String>) -> Self {
        self.url_to_image = Some(url_to_image.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.url
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source_name(&self) -> &str {
        &self.source.name
    }

    /// Parsed publication time, `None` when the server sent something that
    /// isn't a timestamp.
    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        let s = self.published_at.trim();
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    pub fn time_ago(&self, now: DateTime<Utc>) -> Option<TimeAgo> {
        self.published_date()
            .map(|published| TimeAgo::between(published, now))
    }

    pub fn has_image(&self) -> bool {
        self.url_to_image
            .as_deref()
            .map(|u| !u.is_empty())
            .unwrap_or(false)
    }

    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .map(|d| !d.is_empty())
            .unwrap_or(false)
    }

    /// Best available body text: content, else description.
    ///
    /// NewsAPI truncates `content` and appends a `[+1234 chars]` marker,
    /// which is dropped here.
    pub fn display_content(&self) -> String {
        let raw = self
            .content
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.description.as_deref())
            .unwrap_or("");
        let decoded = decode_html_entities(raw).to_string();
        strip_truncation_marker(&decoded).to_string()
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

fn strip_truncation_marker(text: &str) -> &str {
    let trimmed = text.trim_end();
    let Some(body) = trimmed.strip_suffix(" chars]") else {
        return trimmed;
    };
    match body.rfind("[+") {
        Some(start) if body[start + 2..].chars().all(|c| c.is_ascii_digit()) => {
            body[..start].trim_end()
        }
        _ => trimmed,
    }
}

/// Relative age of an article, bucketed the way the feed displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAgo {
    Minutes(i64),
    Hours(i64),
    Days(i64),
}

impl TimeAgo {
    pub fn between(then: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let secs = (now - then).num_seconds().max(0);
        if secs < 3600 {
            TimeAgo::Minutes(secs / 60)
        } else if secs < 86_400 {
            TimeAgo::Hours(secs / 3600)
        } else {
            TimeAgo::Days(secs / 86_400)
        }
    }
}

impl fmt::Display for TimeAgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeAgo::Minutes(m) => write!(f, "{}m ago", m),
            TimeAgo::Hours(h) => write!(f, "{}h ago", h),
            TimeAgo::Days(d) => write!(f, "{}d ago", d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    const ARTICLE_JSON: &str = r#"{
        "source": {"id": "bbc-news", "name": "BBC News"},
        "author": "Jane Doe",
        "title": "Rust 2.0 released",
        "description": "A new edition lands.",
        "url": "https://example.com/rust-2",
        "urlToImage": "https://example.com/rust.png",
        "publishedAt": "2024-03-01T12:00:00Z",
        "content": "The Rust team announced &amp; shipped… [+2345 chars]"
    }"#;

    #[test]
    fn test_decode_article_payload() {
        let article: Article = serde_json::from_str(ARTICLE_JSON).unwrap();
        assert_eq!(article.id(), "https://example.com/rust-2");
        assert_eq!(article.source_name(), "BBC News");
        assert_eq!(article.source.id.as_deref(), Some("bbc-news"));
        assert_eq!(article.author.as_deref(), Some("Jane Doe"));
        assert!(article.has_image());
    }

    #[test]
    fn test_decode_article_with_nulls() {
        let json = r#"{
            "source": {"id": null, "name": "Wire"},
            "author": null,
            "title": "Untitled wire story",
            "description": null,
            "url": "https://example.com/wire",
            "urlToImage": null,
            "publishedAt": "2024-03-01T12:00:00Z",
            "content": null
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert!(article.source.id.is_none());
        assert!(!article.has_image());
        assert!(!article.has_description());
        assert_eq!(article.display_content(), "");
    }

    #[test]
    fn test_identity_is_url() {
        let a = Article::new("https://example.com/a", "First title").with_source("One");
        let b = Article::new("https://example.com/a", "Other title").with_source("Two");
        let c = Article::new("https://example.com/c", "First title");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Article> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_published_date_parses_iso8601() {
        let article = Article::new("u", "t").with_published_at("2024-03-01T12:00:00Z");
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(article.published_date(), Some(expected));

        let offset = Article::new("u", "t").with_published_at("2024-03-01T14:00:00+02:00");
        assert_eq!(offset.published_date(), Some(expected));
    }

    #[test]
    fn test_published_date_invalid_is_none() {
        let article = Article::new("u", "t").with_published_at("yesterday-ish");
        assert_eq!(article.published_date(), None);
        assert_eq!(article.time_ago(Utc::now()), None);
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
        assert_eq!(
            TimeAgo::between(now - Duration::minutes(42), now),
            TimeAgo::Minutes(42)
        );
        assert_eq!(
            TimeAgo::between(now - Duration::minutes(61), now),
            TimeAgo::Hours(1)
        );
        assert_eq!(
            TimeAgo::between(now - Duration::hours(23), now),
            TimeAgo::Hours(23)
        );
        assert_eq!(
            TimeAgo::between(now - Duration::hours(50), now),
            TimeAgo::Days(2)
        );
        assert_eq!(TimeAgo::Days(2).to_string(), "2d ago");
        assert_eq!(TimeAgo::Minutes(5).to_string(), "5m ago");
    }

    #[test]
    fn test_time_ago_future_clamps_to_zero() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
        assert_eq!(
            TimeAgo::between(now + Duration::minutes(10), now),
            TimeAgo::Minutes(0)
        );
    }

    #[test]
    fn test_has_image_requires_non_empty_url() {
        assert!(!Article::new("u", "t").with_image("").has_image());
        assert!(Article::new("u", "t").with_image("https://x/y.png").has_image());
    }

    #[test]
    fn test_display_content_strips_marker_and_entities() {
        let article: Article = serde_json::from_str(ARTICLE_JSON).unwrap();
        assert_eq!(
            article.display_content(),
            "The Rust team announced & shipped\u{2026}"
        );
    }

    #[test]
    fn test_display_content_falls_back_to_description() {
        let article = Article::new("u", "t").with_description("Short summary");
        assert_eq!(article.display_content(), "Short summary");
    }

    #[test]
    fn test_truncation_marker_left_alone_when_not_numeric() {
        assert_eq!(strip_truncation_marker("see [+more chars]"), "see [+more chars]");
        assert_eq!(strip_truncation_marker("plain text"), "plain text");
    }
}
