use anyhow::Result;
use clap::Parser;
use shared::{
    load_feed_urls, render, CacheStore, Config, NoProgress, Pipeline, Player, Progress, Selection,
    Selector, StderrProgress,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "yt-rss")]
#[command(about = "Browse recent videos from your YouTube subscriptions and play one with mpv")]
struct Args {
    /// Fetch feeds even if the cache is still fresh
    #[arg(short, long)]
    refresh: bool,

    /// Print the list to stdout instead of opening the selector
    #[arg(short, long)]
    list: bool,

    /// Log what each stage is doing
    #[arg(short, long)]
    verbose: bool,

    /// Feed list to read (default: ~/.config/yt-rss/urls)
    #[arg(long)]
    urls: Option<PathBuf>,

    /// Cache file to use (default: ~/.config/yt-rss/cache.json)
    #[arg(long)]
    cache: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::from_env()?;
    if let Some(path) = args.urls {
        config.urls_file = path;
    }
    if let Some(path) = args.cache {
        config.cache_file = path;
    }

    let padding = config.pipeline.author_name_padding;
    let pipeline = Pipeline::new(config.pipeline.clone(), CacheStore::new(&config.cache_file))?;

    let progress: &dyn Progress = if args.list { &NoProgress } else { &StderrProgress };
    let urls_file = config.urls_file.clone();
    let outcome = pipeline
        .run(move || load_feed_urls(&urls_file), args.refresh, progress)
        .await?;

    if outcome.from_cache {
        eprintln!("Using cached feeds");
    } else if outcome.failed_sources > 0 {
        eprintln!("⚠ {} feeds could not be fetched", outcome.failed_sources);
    }

    let rendered = render(&outcome.items, padding);

    if args.list {
        for line in &rendered.plain {
            println!("{}", line);
        }
        return Ok(());
    }

    if rendered.is_empty() {
        eprintln!("No videos to show.");
        return Ok(());
    }

    let item = match Selector::new(config.selector).select(&rendered).await {
        Selection::Selected(item) => item,
        Selection::Cancelled => return Ok(()),
        Selection::Failed(e) => return Err(e),
    };

    eprintln!("Playing {}", item.media_url);
    Player::new(config.player).play(&item).await
}
