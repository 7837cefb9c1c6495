use anyhow::{Context, Result};
use clap::Parser;
use newsfeed::api::{FeedClient, NewsItem};
use newsfeed::app::App;
use newsfeed::config::Config;
use newsfeed::feed::{build_feed, ScreenKind};
use newsfeed::ui;
use newsfeed::util::single_line;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of the background event channel.
const EVENT_BUFFER: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "newsfeed", about = "Terminal browser for a news-feeds JSON API")]
struct Args {
    /// Config file (default: ~/.config/newsfeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API root, overriding `base_url` from the config file
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Latest poll period in seconds; 0 disables polling
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<u64>,

    /// Print the Popular and Latest lists to stdout and exit
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent unless RUST_LOG is set; output would corrupt the terminal UI
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            tracing::debug!("HOME not set, using default configuration");
            Config::default()
        }
    };

    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(secs) = args.poll_interval {
        config.poll_interval_secs = secs;
    }
    config.validate().context("Invalid configuration")?;

    let client = FeedClient::new(&config.base_url, config.request_timeout())
        .context("Failed to create API client")?;

    if args.dump {
        return dump(&client).await;
    }

    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
    let app = App::new(Arc::new(client), &config);
    ui::run(app, event_tx, event_rx).await
}

/// Fetch once and print both arranged lists.
async fn dump(client: &FeedClient) -> Result<()> {
    let raw = client
        .list_feed()
        .await
        .context("Failed to fetch the news feed")?;

    let mut out = std::io::stdout().lock();
    for kind in [ScreenKind::Popular, ScreenKind::Latest] {
        let items = build_feed(kind, raw.clone());
        writeln!(out, "== {} ({}) ==", kind.title(), items.len())?;
        for (index, item) in items.iter().enumerate() {
            write_item(&mut out, index + 1, item)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_item(out: &mut impl Write, position: usize, item: &NewsItem) -> std::io::Result<()> {
    let badge = if item.is_highlighted() { " ★" } else { "" };
    writeln!(out, "{:>3}. {}{}", position, single_line(&item.title), badge)?;
    writeln!(out, "     {}", ui::meta_line(item))?;
    writeln!(out, "     /{}", single_line(&item.slug))
}
