//! Channel feed retrieval.
//!
//! YouTube publishes one Atom document per channel. Each `<entry>` becomes an
//! [`Item`]; fields we do not use are ignored by the deserializer.

use chrono::DateTime;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use crate::error::{FetchError, Result};
use crate::models::{Derived, Item};
use crate::progress::Progress;

// quick-xml may hand us element names with or without their namespace
// prefix, so prefixed names carry the bare local name as an alias.

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: String,
    #[serde(rename = "yt:videoId", alias = "videoId", default)]
    video_id: Option<String>,
    published: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: Option<AtomAuthor>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(rename = "media:group", alias = "group", default)]
    group: Option<MediaGroup>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
    #[serde(rename = "@href")]
    href: String,
}

#[derive(Debug, Deserialize)]
struct MediaGroup {
    #[serde(rename = "media:title", alias = "title", default)]
    title: Option<String>,
    #[serde(rename = "media:content", alias = "content", default)]
    content: Option<MediaContent>,
}

#[derive(Debug, Deserialize)]
struct MediaContent {
    #[serde(rename = "@url")]
    url: String,
}

impl AtomEntry {
    fn into_item(self) -> Option<Item> {
        let published_at = match DateTime::parse_from_rfc3339(self.published.trim()) {
            Ok(dt) => dt,
            Err(e) => {
                warn!(id = %self.id, published = %self.published, "Skipping entry with bad timestamp: {}", e);
                return None;
            }
        };

        let (group_title, content_url) = match self.group {
            Some(group) => (group.title, group.content.map(|c| c.url)),
            None => (None, None),
        };

        let media_url = content_url.or_else(|| {
            self.links
                .into_iter()
                .find(|l| l.rel.as_deref().unwrap_or("alternate") == "alternate")
                .map(|l| l.href)
        });
        let Some(media_url) = media_url else {
            warn!(id = %self.id, "Skipping entry without a media URL");
            return None;
        };

        let title = group_title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(self.title);

        Some(Item {
            id: self.id,
            video_id: self.video_id,
            source_name: self.author.map(|a| a.name).unwrap_or_default(),
            published_at,
            title,
            media_url,
            derived: Derived::default(),
        })
    }
}

/// Parse one Atom document into items, in document order
pub fn parse_feed(xml: &str) -> Result<Vec<Item>> {
    let feed: AtomFeed = quick_xml::de::from_str(xml)?;
    Ok(feed
        .entries
        .into_iter()
        .filter_map(AtomEntry::into_item)
        .collect())
}

/// Outcome for one feed locator
#[derive(Debug)]
pub struct SourceResult {
    pub url: String,
    pub result: Result<Vec<Item>>,
}

pub struct FeedFetcher {
    client: Client,
    concurrency: usize,
}

impl FeedFetcher {
    pub fn new(client: Client, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<Item>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await?;
        let items = parse_feed(&body)?;
        debug!(url, count = items.len(), "Parsed feed");
        Ok(items)
    }

    /// Fetch every locator with bounded concurrency.
    ///
    /// Failures are logged and returned per locator; they never cut the batch
    /// short. Results arrive in completion order, not input order.
    pub async fn fetch_all(&self, urls: &[String], progress: &dyn Progress) -> Vec<SourceResult> {
        let total = urls.len();
        let completed = AtomicUsize::new(0);

        stream::iter(urls)
            .map(|url| {
                let completed = &completed;
                async move {
                    let result = self.fetch_feed(url).await;
                    if let Err(e) = &result {
                        warn!(url = %url, "Failed to fetch feed: {}", e);
                    }
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    progress.advance(done, total);
                    SourceResult {
                        url: url.clone(),
                        result,
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }
}
