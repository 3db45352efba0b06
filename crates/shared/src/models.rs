use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Current on-disk format of [`CacheSnapshot`]
pub const CACHE_VERSION: u32 = 1;

/// One video entry aggregated from a channel feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub source_name: String,
    /// Keeps the offset the feed published it with, for display
    pub published_at: DateTime<FixedOffset>,
    pub title: String,
    pub media_url: String,
    #[serde(default)]
    pub derived: Derived,
}

/// Metadata that is not part of the feed and is filled in by enrichment.
///
/// A field that is `Some` has already been computed and is never fetched again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    #[serde(default)]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub normalized_title: Option<String>,
}

impl Derived {
    pub fn is_complete(&self) -> bool {
        self.duration.is_some() && self.normalized_title.is_some()
    }
}

impl Item {
    /// Title to show the user, preferring the cleaned-up one
    pub fn display_title(&self) -> &str {
        self.derived
            .normalized_title
            .as_deref()
            .unwrap_or(&self.title)
    }
}

/// Complete cache contents for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub version: u32,
    pub last_refreshed_at: DateTime<Utc>,
    pub items: Vec<Item>,
}

impl CacheSnapshot {
    pub fn new(items: Vec<Item>, last_refreshed_at: DateTime<Utc>) -> Self {
        Self {
            version: CACHE_VERSION,
            last_refreshed_at,
            items,
        }
    }

    /// Snapshot used when nothing has been cached yet
    pub fn empty() -> Self {
        Self::new(Vec::new(), DateTime::<Utc>::UNIX_EPOCH)
    }
}
