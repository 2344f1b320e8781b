pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::api::DEFAULT_PAGE_SIZE;
use crate::domain::{DateFilter, NewsCategory, SortBy};

#[derive(Parser)]
#[command(name = "newsreel")]
#[command(about = "Browse, search and bookmark news headlines", long_about = None)]
pub struct Cli {
    /// Articles requested per page (defaults to feed.page_size from the config)
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Keep bookmarks and session in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show top headlines
    Headlines {
        /// Category: all, general, business, entertainment, health, science, sports, technology
        #[arg(short, long)]
        category: Option<NewsCategory>,

        /// Two-letter country code
        #[arg(long)]
        country: Option<String>,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Only show articles from: all, today, week, month
        #[arg(short, long, default_value_t = DateFilter::All)]
        date: DateFilter,
    },
    /// Search all articles
    Search {
        /// Search terms
        query: String,

        /// Sort order: publishedAt, relevancy, popularity
        #[arg(short, long, default_value_t = SortBy::PublishedAt)]
        sort_by: SortBy,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// List news sources
    Sources {
        #[arg(short, long)]
        category: Option<NewsCategory>,

        #[arg(short, long)]
        language: Option<String>,

        #[arg(long)]
        country: Option<String>,
    },
    /// Add, remove or toggle a bookmark
    Bookmark {
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// List saved articles
    Bookmarks,
    /// Show the signed-in user
    Whoami,
    /// Sign out and forget the stored session
    Logout,
    /// Launch the TUI
    Tui {
        /// Open at a deep link, e.g. newsreel://bookmarks
        #[arg(long)]
        link: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BookmarkAction {
    Add {
        url: String,
        /// Use the read-later list instead of favorites
        #[arg(long)]
        read_later: bool,
    },
    Remove {
        url: String,
        #[arg(long)]
        read_later: bool,
    },
    Toggle {
        url: String,
        #[arg(long)]
        read_later: bool,
    },
}

impl Cli {
    pub fn page_size_or_default(&self, configured: u32) -> u32 {
        self.page_size
            .filter(|size| *size > 0)
            .unwrap_or(if configured > 0 {
                configured
            } else {
                DEFAULT_PAGE_SIZE
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headlines() {
        let cli = Cli::parse_from([
            "newsreel",
            "headlines",
            "--category",
            "technology",
            "--pages",
            "2",
            "--date",
            "today",
        ]);
        match cli.command {
            Commands::Headlines {
                category,
                pages,
                date,
                ..
            } => {
                assert_eq!(category, Some(NewsCategory::Technology));
                assert_eq!(pages, 2);
                assert_eq!(date, DateFilter::Today);
            }
            _ => panic!("expected headlines"),
        }
    }

    #[test]
    fn test_parse_search_and_global_page_size() {
        let cli = Cli::parse_from([
            "newsreel",
            "search",
            "rust lang",
            "--sort-by",
            "relevancy",
            "--page-size",
            "50",
        ]);
        assert_eq!(cli.page_size_or_default(20), 50);
        match cli.command {
            Commands::Search { query, sort_by, .. } => {
                assert_eq!(query, "rust lang");
                assert_eq!(sort_by, SortBy::Relevancy);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_page_size_fallbacks() {
        let cli = Cli::parse_from(["newsreel", "bookmarks", "--page-size", "0"]);
        assert_eq!(cli.page_size_or_default(30), 30);
        assert_eq!(cli.page_size_or_default(0), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_parse_bookmark_toggle() {
        let cli = Cli::parse_from([
            "newsreel",
            "bookmark",
            "toggle",
            "https://news.example/a",
            "--read-later",
        ]);
        assert!(matches!(
            cli.command,
            Commands::Bookmark {
                action: BookmarkAction::Toggle { read_later: true, .. }
            }
        ));
    }
}
