// Public modules
pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod feed;
pub mod io;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod present;
pub mod progress;
pub mod select;

// Re-export commonly used types
pub use cache::{CacheStore, LoadedCache};
pub use config::{CommandSpec, Config, PipelineConfig};
pub use enrich::{normalize_title, Enricher};
pub use error::FetchError;
pub use feed::{FeedFetcher, SourceResult};
pub use io::load_feed_urls;
pub use merge::merge;
pub use models::{CacheSnapshot, Derived, Item};
pub use pipeline::{Outcome, Pipeline};
pub use present::{present, render, Rendered};
pub use progress::{NoProgress, Progress, StderrProgress};
pub use select::{Player, Selection, Selector};
