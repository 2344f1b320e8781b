use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::bookmarks::{BookmarkEntry, BookmarkList};
use crate::config::ColorConfig;
use crate::domain::{Article, LoadingState};
use crate::route::Route;
use crate::tui::app::{ActivePane, FeedTarget, TuiApp};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig, now: DateTime<Utc>) {
    if app.maximized {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(1)])
            .split(frame.area());

        render_preview_pane(frame, app, chunks[0], colors, now);
        render_status_bar(frame, app, chunks[1], colors);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Tabs
            Constraint::Percentage(45), // List
            Constraint::Min(8),         // Preview
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0], colors);
    match app.route {
        Route::Home => render_feed_pane(frame, app, FeedTarget::Home, chunks[1], colors, now),
        Route::Search => render_feed_pane(frame, app, FeedTarget::Search, chunks[1], colors, now),
        Route::Bookmarks => render_bookmarks_pane(frame, app, chunks[1], colors),
        Route::Profile => render_profile_pane(frame, app, chunks[1], colors, now),
    }
    render_preview_pane(frame, app, chunks[2], colors, now);
    render_status_bar(frame, app, chunks[3], colors);
}

fn render_tabs(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let titles: Vec<Line> = Route::ALL
        .iter()
        .map(|route| Line::from(format!(" {} ", route.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" newsreel "))
        .select(app.route.index())
        .style(colors.tab(false))
        .highlight_style(colors.tab(true));

    frame.render_widget(tabs, area);
}

fn article_row(
    app: &TuiApp,
    article: &Article,
    colors: &ColorConfig,
    now: DateTime<Utc>,
) -> ListItem<'static> {
    let favorite = if app.bookmarks.is_favorite(article.id()) {
        Span::styled("★", colors.marker(BookmarkList::Favorites))
    } else {
        Span::raw(" ")
    };
    let read_later = if app.bookmarks.is_read_later(article.id()) {
        Span::styled("◷", colors.marker(BookmarkList::ReadLater))
    } else {
        Span::raw(" ")
    };
    let age = article
        .time_ago(now)
        .map(|ago| format!("{:>8}", ago.to_string()))
        .unwrap_or_else(|| " ".repeat(8));

    ListItem::new(Line::from(vec![
        favorite,
        read_later,
        Span::raw(format!(" {} ", age)),
        Span::styled(
            format!("{} ", article.source_name()),
            colors.source(),
        ),
        Span::styled(article.title.clone(), colors.headline()),
    ]))
}

fn render_feed_pane(
    frame: &mut Frame,
    app: &mut TuiApp,
    target: FeedTarget,
    area: Rect,
    colors: &ColorConfig,
    now: DateTime<Utc>,
) {
    let is_active = app.active_pane == ActivePane::List;
    let block_title = {
        let feed = &app.pane(target).feed;
        let mut title = format!(" {} ", feed.query().describe());
        if app.date_filter != crate::domain::DateFilter::All {
            title.push_str(&format!("[{}] ", app.date_filter));
        }
        if feed.is_refreshing() {
            title.push_str("(refreshing) ");
        } else if feed.is_loading_more() {
            title.push_str("(loading more) ");
        }
        title
    };
    let block = Block::default()
        .title(block_title)
        .borders(Borders::ALL)
        .border_style(colors.border(is_active));

    if target == FeedTarget::Search && app.search_query().is_empty() {
        let hint = Paragraph::new("Press / to search all articles")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(hint, area);
        return;
    }

    match app.pane(target).feed.loading_state() {
        LoadingState::Idle | LoadingState::Loading if app.pane(target).feed.articles().is_empty() => {
            let loading = Paragraph::new("Loading...")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(loading, area);
            return;
        }
        LoadingState::Failed(kind) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    kind.message(),
                    colors.error(),
                )),
                Line::from(""),
            ];
            if kind.is_retryable() {
                lines.push(Line::from("Press r to retry"));
            } else {
                lines.push(Line::from("Check api.api_key and api.base_url in the config file"));
            }
            let error = Paragraph::new(Text::from(lines))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(error, area);
            return;
        }
        _ => {}
    }

    let visible = app.visible_articles(now);
    if visible.is_empty() {
        let empty = Paragraph::new("No articles")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem<'static>> = visible
        .iter()
        .map(|article| article_row(app, article, colors, now))
        .collect();
    let len = items.len();

    let list = List::new(items)
        .block(block)
        .highlight_style(colors.selection(is_active))
        .highlight_symbol("> ");

    let pane = app.pane_mut(target);
    pane.clamp(len);
    frame.render_stateful_widget(list, area, &mut pane.list_state);
}

fn render_bookmarks_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::List;
    let other = match app.bookmark_list {
        BookmarkList::Favorites => BookmarkList::ReadLater,
        BookmarkList::ReadLater => BookmarkList::Favorites,
    };
    let title = format!(
        " {} ({}) | b: {} ({}) ",
        app.bookmark_list.display_name(),
        app.bookmarks.len(app.bookmark_list),
        other.display_name(),
        app.bookmarks.len(other)
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(colors.border(is_active));

    let items: Vec<ListItem> = app
        .bookmark_entries()
        .into_iter()
        .map(|entry| match entry {
            BookmarkEntry::Loaded(article) => ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", article.source_name()),
                    colors.source(),
                ),
                Span::styled(article.title.clone(), colors.headline()),
            ])),
            BookmarkEntry::Unresolved(url) => ListItem::new(Span::styled(
                url,
                colors.faint(),
            )),
        })
        .collect();

    if items.is_empty() {
        let empty = Paragraph::new("Nothing saved yet. Press f or l on an article.")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(colors.selection(is_active))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.bookmark_list_state);
}

fn render_profile_pane(
    frame: &mut Frame,
    app: &TuiApp,
    area: Rect,
    colors: &ColorConfig,
    now: DateTime<Utc>,
) {
    let mut lines = Vec::new();
    match app.session.current_user() {
        Some(user) => {
            lines.push(Line::from(Span::styled(
                user.display_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(user.email.clone()));
            let state = if app.session.is_logged_in() {
                "Signed in".to_string()
            } else {
                "Session expired".to_string()
            };
            lines.push(Line::from(state));
            if let Some(expiry) = app.session.token_expiry() {
                lines.push(Line::from(Span::styled(
                    format!("Token valid until {}", expiry.format("%Y-%m-%d %H:%M UTC")),
                    colors.metadata(),
                )));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Not signed in",
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "Favorites: {}   Read later: {}",
        app.bookmarks.len(BookmarkList::Favorites),
        app.bookmarks.len(BookmarkList::ReadLater)
    )));
    lines.push(Line::from(format!(
        "Region: {}   Date filter: {}",
        app.region.to_uppercase(),
        app.date_filter
    )));
    lines.push(Line::from(format!(
        "Local time: {}",
        now.format("%Y-%m-%d %H:%M UTC")
    )));

    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title(" Profile ")
            .borders(Borders::ALL)
            .border_style(colors.border(app.active_pane == ActivePane::List)),
    );
    frame.render_widget(paragraph, area);
}

fn render_preview_pane(
    frame: &mut Frame,
    app: &TuiApp,
    area: Rect,
    colors: &ColorConfig,
    now: DateTime<Utc>,
) {
    let is_active = app.active_pane == ActivePane::Preview;

    let (title, content) = if let Some(article) = app.selected_article(now) {
        let mut lines = vec![
            Line::from(Span::styled(
                article.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        lines.push(Line::from(Span::styled(
            article.source_name().to_string(),
            colors.source(),
        )));
        if let Some(author) = article.author.as_deref().filter(|a| !a.is_empty()) {
            lines.push(Line::from(Span::styled(
                format!("By: {}", author),
                colors.metadata(),
            )));
        }
        if let Some(date) = article.published_date() {
            let ago = article
                .time_ago(now)
                .map(|ago| format!(" ({})", ago))
                .unwrap_or_default();
            lines.push(Line::from(Span::styled(
                format!("Date: {}{}", date.format("%Y-%m-%d %H:%M"), ago),
                colors.metadata(),
            )));
        }
        lines.push(Line::from(Span::styled(
            format!("Link: {}", article.url()),
            colors.link(),
        )));
        if let Some(image) = article.url_to_image.as_deref().filter(|_| article.has_image()) {
            lines.push(Line::from(Span::styled(
                format!("Image: {}", image),
                colors.link(),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(
            "─".repeat(area.width.saturating_sub(2) as usize),
        ));
        lines.push(Line::from(""));

        for line in article.display_content().lines() {
            lines.push(Line::from(line.to_string()));
        }

        (format!(" {} ", article.source_name()), Text::from(lines))
    } else if let Some(link) = app.selected_link(now) {
        (
            " Saved link ".to_string(),
            Text::from(vec![
                Line::from("This article is not in any loaded feed."),
                Line::from(""),
                Line::from(Span::styled(link, colors.link())),
                Line::from(""),
                Line::from("Press o to open it in the browser."),
            ]),
        )
    } else {
        (" Preview ".to_string(), Text::from("No article selected"))
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(colors.border(is_active));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let mut is_error = false;

    let status = if let Some(input) = &app.search_input {
        format!("Search: {}_   (Enter: search  Esc: cancel)", input)
    } else if let Some(banner) = app.status() {
        is_error = banner.is_error;
        banner.message.clone()
    } else if app.maximized {
        "j/k:Scroll  n/p:Page  m:Exit maximize  q:Quit".to_string()
    } else {
        match app.route {
            Route::Home => {
                "j/k:Nav  [/]:Tab  f:Fav  l:Later  o:Open  c:Category  d:Date  R:Refresh  /:Search  q:Quit"
            }
            Route::Search => "j/k:Nav  /:New search  f:Fav  l:Later  o:Open  d:Date  R:Refresh  q:Quit",
            Route::Bookmarks => "j/k:Nav  b:Switch list  f/l:Remove  o:Open  q:Quit",
            Route::Profile => "[/]:Tab  q:Quit",
        }
        .to_string()
    };

    let paragraph = Paragraph::new(status).style(colors.status_bar(is_error));
    frame.render_widget(paragraph, area);
}
