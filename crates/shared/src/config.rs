use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const APP_DIR: &str = "yt-rss";

/// Knobs the pipeline stages read at run time
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub fetch_concurrency: usize,
    pub enrich_concurrency: usize,
    /// Cached data younger than this is served without touching the network
    pub freshness_window: Duration,
    /// Videos shorter than this are treated as Shorts and hidden
    pub shorts_threshold: Duration,
    /// Pad author names so the selector columns line up
    pub author_name_padding: bool,
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 10,
            enrich_concurrency: 10,
            freshness_window: Duration::from_secs(30 * 60),
            shorts_threshold: Duration::from_secs(80),
            author_name_padding: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// An external program plus its leading arguments
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Split a shell-like string on whitespace ("mpv --no-video")
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub urls_file: PathBuf,
    pub cache_file: PathBuf,
    pub selector: CommandSpec,
    pub player: CommandSpec,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Defaults rooted at the given directory (normally `~/.config/yt-rss`)
    pub fn with_dir(dir: PathBuf) -> Self {
        Self {
            urls_file: dir.join("urls"),
            cache_file: dir.join("cache.json"),
            selector: CommandSpec::new("fzf", &["--ansi", "--tiebreak=index"]),
            player: CommandSpec::new("mpv", &[]),
            pipeline: PipelineConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(APP_DIR);

        Self::try_load_dotenv(&dir);

        let mut config = Self::with_dir(dir);

        if let Ok(path) = env::var("YT_RSS_URLS_FILE") {
            config.urls_file = PathBuf::from(path);
        }
        if let Ok(path) = env::var("YT_RSS_CACHE_FILE") {
            config.cache_file = PathBuf::from(path);
        }
        if let Ok(value) = env::var("YT_RSS_PLAYER") {
            config.player = CommandSpec::parse(&value)
                .context("YT_RSS_PLAYER is set but empty")?;
        }

        let pipeline = &mut config.pipeline;
        if let Some(minutes) = parse_var::<u64>("YT_RSS_CACHE_MINUTES")? {
            pipeline.freshness_window = minutes_to_duration("YT_RSS_CACHE_MINUTES", minutes)?;
        }
        if let Some(seconds) = parse_var::<u64>("YT_RSS_SHORTS_SECONDS")? {
            pipeline.shorts_threshold = Duration::from_secs(seconds);
        }
        if let Some(seconds) = parse_var::<u64>("YT_RSS_TIMEOUT_SECONDS")? {
            pipeline.request_timeout = Duration::from_secs(seconds);
        }
        if let Some(n) = parse_var::<usize>("YT_RSS_FETCH_CONCURRENCY")? {
            pipeline.fetch_concurrency = n.max(1);
        }
        if let Some(n) = parse_var::<usize>("YT_RSS_ENRICH_CONCURRENCY")? {
            pipeline.enrich_concurrency = n.max(1);
        }
        if let Some(padding) = parse_var::<bool>("YT_RSS_AUTHOR_PADDING")? {
            pipeline.author_name_padding = padding;
        }

        Ok(config)
    }

    fn try_load_dotenv(dir: &std::path::Path) {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/yt-rss/.env
        let config_path = dir.join(".env");
        if config_path.exists() {
            let _ = dotenvy::from_path(&config_path);
        }
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(None),
    }
}

fn minutes_to_duration(name: &str, minutes: u64) -> Result<Duration> {
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .with_context(|| format!("{} has an invalid value: {} is too large", name, minutes))
}
