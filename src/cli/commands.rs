use chrono::{DateTime, Utc};

use crate::app::{AppContext, NewsreelError, Result};
use crate::bookmarks::{BookmarkList, BookmarkStore};
use crate::cli::BookmarkAction;
use crate::domain::{Article, DateFilter, LoadingState, NewsCategory, SortBy};
use crate::feed::{FeedController, FeedQuery};

/// Load up to `pages` pages, stopping early when the feed runs out.
async fn load_pages(feed: &mut FeedController, pages: u32) -> Result<()> {
    feed.load_initial_data().await;
    if let LoadingState::Failed(kind) = feed.loading_state() {
        return Err(NewsreelError::Feed(kind));
    }

    for _ in 1..pages {
        if !feed.has_more_pages() {
            break;
        }
        feed.load_more().await;
        if let Some(kind) = feed.take_last_error() {
            eprintln!("Stopped after page {}: {}", feed.current_page(), kind);
            break;
        }
    }
    Ok(())
}

fn print_articles(articles: &[&Article], bookmarks: &BookmarkStore, now: DateTime<Utc>) {
    if articles.is_empty() {
        println!("No articles");
        return;
    }

    for article in articles {
        let marker = match (
            bookmarks.is_favorite(article.id()),
            bookmarks.is_read_later(article.id()),
        ) {
            (true, _) => "★",
            (false, true) => "◷",
            (false, false) => " ",
        };
        let age = article
            .time_ago(now)
            .map(|ago| ago.to_string())
            .unwrap_or_default();

        println!(
            "{} {:>8}  {}  {}\n    {}",
            marker,
            age,
            article.source_name(),
            article.title,
            article.url()
        );
    }
}

pub async fn headlines(
    ctx: &AppContext,
    category: Option<NewsCategory>,
    country: Option<String>,
    pages: u32,
    date: DateFilter,
) -> Result<()> {
    let category = category.unwrap_or(ctx.config.feed.category);
    let country = country.unwrap_or_else(|| ctx.config.feed.country.clone());
    let mut feed = ctx.feed(FeedQuery::headlines(category, country));
    load_pages(&mut feed, pages).await?;

    let now = ctx.clock.now();
    println!(
        "{} ({} articles)",
        feed.query().describe(),
        feed.articles().len()
    );
    print_articles(&feed.visible_articles(date, now), &ctx.bookmarks(), now);
    Ok(())
}

pub async fn search(ctx: &AppContext, query: &str, sort_by: SortBy, pages: u32) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        return Err(NewsreelError::Other("Search query cannot be empty".into()));
    }

    let mut feed = ctx.feed(FeedQuery::search(query, sort_by));
    load_pages(&mut feed, pages).await?;

    let now = ctx.clock.now();
    println!("{} ({} articles)", feed.query().describe(), feed.articles().len());
    print_articles(
        &feed.visible_articles(DateFilter::All, now),
        &ctx.bookmarks(),
        now,
    );
    Ok(())
}

pub async fn sources(
    ctx: &AppContext,
    category: Option<NewsCategory>,
    language: Option<String>,
    country: Option<String>,
) -> Result<()> {
    let language = language.unwrap_or_else(|| ctx.config.api.language.clone());
    let sources = ctx
        .client
        .fetch_sources(
            category.and_then(|c| c.query_value()),
            &language,
            country.as_deref(),
        )
        .await?;

    if sources.is_empty() {
        println!("No sources");
        return Ok(());
    }

    for source in sources {
        println!(
            "{} [{}]",
            source.display_name(),
            source.category.as_deref().unwrap_or("-")
        );
        if let Some(url) = &source.url {
            println!("  {}", url);
        }
    }
    Ok(())
}

pub fn bookmark(ctx: &AppContext, action: BookmarkAction) -> Result<()> {
    let mut bookmarks = ctx.bookmarks();
    let list_for = |read_later: bool| {
        if read_later {
            BookmarkList::ReadLater
        } else {
            BookmarkList::Favorites
        }
    };

    match action {
        BookmarkAction::Add { url, read_later } => {
            let list = list_for(read_later);
            if bookmarks.add(list, &url) {
                println!("Added to {}: {}", list.display_name(), url);
            } else {
                println!("Already in {}: {}", list.display_name(), url);
            }
        }
        BookmarkAction::Remove { url, read_later } => {
            let list = list_for(read_later);
            if bookmarks.remove(list, &url) {
                println!("Removed from {}: {}", list.display_name(), url);
            } else {
                println!("Not in {}: {}", list.display_name(), url);
            }
        }
        BookmarkAction::Toggle { url, read_later } => {
            let list = list_for(read_later);
            if bookmarks.toggle(list, &url) {
                println!("Added to {}: {}", list.display_name(), url);
            } else {
                println!("Removed from {}: {}", list.display_name(), url);
            }
        }
    }
    Ok(())
}

pub fn list_bookmarks(ctx: &AppContext) -> Result<()> {
    let bookmarks = ctx.bookmarks();

    for list in [BookmarkList::Favorites, BookmarkList::ReadLater] {
        println!("{} ({})", list.display_name(), bookmarks.len(list));
        let urls: Vec<&str> = match list {
            BookmarkList::Favorites => bookmarks.favorites().collect(),
            BookmarkList::ReadLater => bookmarks.read_later().collect(),
        };
        for url in urls {
            println!("  {}", url);
        }
    }
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.session();
    match session.current_user() {
        Some(user) => {
            println!("{} <{}>", user.display_name, user.email);
            match session.token_expiry() {
                Some(expiry) if session.is_logged_in() => {
                    println!("Signed in until {}", expiry.format("%Y-%m-%d %H:%M UTC"))
                }
                _ => println!("Session expired; sign in again"),
            }
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    let mut session = ctx.session();
    let was_signed_in = session.current_user().is_some();
    session.sign_out().await;
    if was_signed_in {
        println!("Signed out");
    } else {
        println!("Not signed in");
    }
    Ok(())
}
