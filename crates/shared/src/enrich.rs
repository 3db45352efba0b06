//! Per-item metadata that the feeds do not carry.

use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, Result};
use crate::models::Item;
use crate::progress::Progress;

static DURATION_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta itemprop="duration" content="(.+?)">"#).expect("valid regex")
});

// Only the minutes+seconds form YouTube uses on watch pages. Anything with an
// hour component falls through as a parse failure.
static MINUTES_SECONDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?P<minutes>\d+)M(?P<seconds>\d+)S").expect("valid regex")
});

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B(#[\w_-]+\b)").expect("valid regex"));

/// Sentence-case a title and drop its hashtags
pub fn normalize_title(title: &str) -> String {
    let lower = title.to_lowercase();
    let mut chars = lower.chars();
    let cased: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    let stripped = HASHTAG.replace_all(&cased, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the video length from a watch page body
pub fn parse_duration(body: &str, url: &str) -> Result<Duration> {
    let encoded = DURATION_META
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| FetchError::DurationNotFound(url.to_string()))?;

    let caps = MINUTES_SECONDS
        .captures(encoded)
        .ok_or_else(|| FetchError::DurationFormat(encoded.to_string()))?;

    let minutes: u64 = caps["minutes"]
        .parse()
        .map_err(|_| FetchError::DurationFormat(encoded.to_string()))?;
    let seconds: u64 = caps["seconds"]
        .parse()
        .map_err(|_| FetchError::DurationFormat(encoded.to_string()))?;

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .map(Duration::from_secs)
        .ok_or_else(|| FetchError::DurationFormat(encoded.to_string()))
}

/// A single item whose duration could not be filled in this pass
#[derive(Debug)]
pub struct EnrichFailure {
    pub id: String,
    pub error: FetchError,
}

pub struct Enricher {
    client: Client,
    concurrency: usize,
}

impl Enricher {
    pub fn new(client: Client, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn fetch_duration(&self, url: &str) -> Result<Duration> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await?;
        parse_duration(&body, url)
    }

    /// Fill whatever derived fields are still missing on one item.
    ///
    /// The title is local work and is always filled; the duration needs a
    /// request and is left `None` if that fails.
    pub async fn enrich_item(&self, item: &mut Item) -> Result<()> {
        if item.derived.normalized_title.is_none() {
            item.derived.normalized_title = Some(normalize_title(&item.title));
        }

        if item.derived.duration.is_none() {
            let duration = self.fetch_duration(&item.media_url).await?;
            debug!(id = %item.id, secs = duration.as_secs(), "Got video duration");
            item.derived.duration = Some(duration);
        }

        Ok(())
    }

    /// Enrich every incomplete item in place.
    ///
    /// Each in-flight task holds the only `&mut` to its item, so no locking
    /// is needed. Items that are already complete are skipped entirely.
    pub async fn enrich_all(&self, items: &mut [Item], progress: &dyn Progress) -> Vec<EnrichFailure> {
        let pending: Vec<&mut Item> = items
            .iter_mut()
            .filter(|item| !item.derived.is_complete())
            .collect();

        let total = pending.len();
        let completed = AtomicUsize::new(0);

        stream::iter(pending)
            .map(|item| {
                let completed = &completed;
                async move {
                    let result = self.enrich_item(item).await;
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    progress.advance(done, total);

                    match result {
                        Ok(()) => None,
                        Err(error) => {
                            warn!(url = %item.media_url, "Failed to get video duration: {}", error);
                            Some(EnrichFailure {
                                id: item.id.clone(),
                                error,
                            })
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|failure| async move { failure })
            .collect()
            .await
    }
}
