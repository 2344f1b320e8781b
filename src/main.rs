use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsreel::app::AppContext;
use newsreel::cli::{commands, Cli, Commands};
use newsreel::config::Config;
use newsreel::route::Route;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with command output or the TUI.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    config.feed.page_size = cli.page_size_or_default(config.feed.page_size);

    let ctx = if cli.ephemeral {
        AppContext::in_memory(config)?
    } else {
        AppContext::new(config, None)?
    };

    match cli.command {
        Commands::Headlines {
            category,
            country,
            pages,
            date,
        } => {
            commands::headlines(&ctx, category, country, pages, date).await?;
        }
        Commands::Search {
            query,
            sort_by,
            pages,
        } => {
            commands::search(&ctx, &query, sort_by, pages).await?;
        }
        Commands::Sources {
            category,
            language,
            country,
        } => {
            commands::sources(&ctx, category, language, country).await?;
        }
        Commands::Bookmark { action } => {
            commands::bookmark(&ctx, action)?;
        }
        Commands::Bookmarks => {
            commands::list_bookmarks(&ctx)?;
        }
        Commands::Whoami => {
            commands::whoami(&ctx)?;
        }
        Commands::Logout => {
            commands::logout(&ctx).await?;
        }
        Commands::Tui { link } => {
            let route = match link.as_deref() {
                Some(link) => Route::from_deep_link(link)
                    .ok_or_else(|| anyhow::anyhow!("Not a newsreel:// link: {}", link))?,
                None => Route::Home,
            };
            newsreel::tui::run(Arc::new(ctx), route).await?;
        }
    }

    Ok(())
}
