pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::{AppContext, Result};
use crate::bookmarks::BookmarkList;
use crate::domain::SortBy;
use crate::feed::{FeedQuery, PageRequest, PageResult};
use crate::route::Route;

use self::app::{ActivePane, FeedTarget, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;
type PageMessage = (FeedTarget, PageResult);

pub async fn run(ctx: Arc<AppContext>, route: Route) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, route).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run `request` on its own task and post the result back to the loop.
fn dispatch(
    tx: &mpsc::UnboundedSender<PageMessage>,
    tui_app: &TuiApp,
    (target, request): (FeedTarget, PageRequest),
) {
    let source = tui_app.pane(target).feed.source();
    let tx = tx.clone();
    debug!("Dispatching {:?} page {} for {:?}", request.kind, request.page, target);
    tokio::spawn(async move {
        let page = request.run(source.as_ref()).await;
        // The loop may already be gone on quit.
        let _ = tx.send((target, page));
    });
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, route: Route) -> Result<()> {
    let config = &ctx.config;
    let mut session = ctx.session();
    session.refresh_token_if_needed().await;

    let mut tui_app = TuiApp::new(
        ctx.feed(ctx.default_headlines()),
        ctx.feed(FeedQuery::search("", SortBy::default())),
        ctx.bookmarks(),
        session,
        config.feed.country.clone(),
        route,
    );
    if !config.api.has_api_key() {
        tui_app.set_error("No API key configured: set NEWSAPI_KEY or api.api_key");
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<PageMessage>();
    let event_handler = EventHandler::new(Duration::from_millis(100));

    if let Some(request) = tui_app.begin_initial(FeedTarget::Home) {
        dispatch(&tx, &tui_app, request);
    }

    loop {
        while let Ok((target, page)) = rx.try_recv() {
            tui_app.apply(target, page);
        }

        let now = ctx.clock.now();
        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors, now))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                if tui_app.search_input.is_some() {
                    if let Some(request) = tui_app.handle_search_key(key) {
                        dispatch(&tx, &tui_app, request);
                    }
                    continue;
                }

                let request = match config.keybindings.get_action(&key) {
                    Action::Quit => {
                        tui_app.should_quit = true;
                        None
                    }
                    Action::MoveUp => {
                        tui_app.move_up(now);
                        None
                    }
                    Action::MoveDown => {
                        tui_app.move_down(now);
                        None
                    }
                    Action::NextPage => {
                        tui_app.next_page(now);
                        None
                    }
                    Action::PrevPage => {
                        tui_app.prev_page(now);
                        None
                    }
                    Action::NextPane => {
                        tui_app.active_pane = tui_app.active_pane.next();
                        None
                    }
                    Action::PrevPane => {
                        tui_app.active_pane = tui_app.active_pane.prev();
                        None
                    }
                    Action::NextTab => {
                        tui_app.set_route(tui_app.route.next());
                        None
                    }
                    Action::PrevTab => {
                        tui_app.set_route(tui_app.route.prev());
                        None
                    }
                    Action::Select => {
                        if tui_app.active_pane == ActivePane::List {
                            tui_app.active_pane = ActivePane::Preview;
                        }
                        None
                    }
                    Action::ToggleFavorite => {
                        tui_app.toggle_bookmark(BookmarkList::Favorites, now);
                        None
                    }
                    Action::ToggleReadLater => {
                        tui_app.toggle_bookmark(BookmarkList::ReadLater, now);
                        None
                    }
                    Action::OpenInBrowser => {
                        if let Some(link) = tui_app.selected_link(now) {
                            if let Err(e) = open::that(&link) {
                                tui_app.set_error(format!("Failed to open browser: {}", e));
                            }
                        }
                        None
                    }
                    Action::Refresh => {
                        let request = tui_app.begin_refresh();
                        if request.is_some() {
                            tui_app.set_status("Refreshing...");
                        }
                        request
                    }
                    Action::Retry => tui_app.begin_retry(),
                    Action::Search => {
                        tui_app.open_search_input();
                        None
                    }
                    Action::CycleCategory => tui_app.cycle_category(),
                    Action::CycleDateFilter => {
                        tui_app.cycle_date_filter();
                        None
                    }
                    Action::SwitchBookmarkList => {
                        if tui_app.route == Route::Bookmarks {
                            tui_app.switch_bookmark_list();
                        }
                        None
                    }
                    Action::ToggleMaximize => {
                        tui_app.toggle_maximize();
                        None
                    }
                    Action::None => None,
                };

                if let Some(request) = request {
                    dispatch(&tx, &tui_app, request);
                }
            }
            AppEvent::Tick => {
                tui_app.expire_status(Instant::now());
            }
        }

        if let Some(request) = tui_app.begin_load_more_if_needed(ctx.clock.now()) {
            dispatch(&tx, &tui_app, request);
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}
