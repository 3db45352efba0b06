use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::config::PipelineConfig;
use crate::enrich::Enricher;
use crate::feed::FeedFetcher;
use crate::merge::merge;
use crate::models::{CacheSnapshot, Item};
use crate::present::present;
use crate::progress::Progress;

/// What a pipeline run produced
#[derive(Debug)]
pub struct Outcome {
    /// Visible items, newest first
    pub items: Vec<Item>,
    /// `true` when the cache was fresh and no request was made
    pub from_cache: bool,
    pub failed_sources: usize,
    pub failed_items: usize,
}

pub struct Pipeline {
    config: PipelineConfig,
    store: CacheStore,
    fetcher: FeedFetcher,
    enricher: Enricher,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, store: CacheStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("Mozilla/5.0 (compatible; yt-rss/0.1)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            fetcher: FeedFetcher::new(client.clone(), config.fetch_concurrency),
            enricher: Enricher::new(client, config.enrich_concurrency),
            config,
            store,
        })
    }

    pub async fn run<F>(&self, load_sources: F, force_refresh: bool, progress: &dyn Progress) -> Result<Outcome>
    where
        F: FnOnce() -> Result<Vec<String>>,
    {
        self.run_at(Utc::now(), load_sources, force_refresh, progress)
            .await
    }

    /// Run against an explicit clock.
    ///
    /// The source list is only loaded when the cache turns out to be stale
    /// (or a refresh is forced).
    pub async fn run_at<F>(
        &self,
        now: DateTime<Utc>,
        load_sources: F,
        force_refresh: bool,
        progress: &dyn Progress,
    ) -> Result<Outcome>
    where
        F: FnOnce() -> Result<Vec<String>>,
    {
        let loaded = self.store.load()?;

        if !force_refresh && !loaded.is_stale(now, self.config.freshness_window) {
            info!(
                items = loaded.snapshot.items.len(),
                refreshed = %loaded.snapshot.last_refreshed_at,
                "Using cached feeds"
            );
            return Ok(Outcome {
                items: present(loaded.snapshot.items, self.config.shorts_threshold),
                from_cache: true,
                failed_sources: 0,
                failed_items: 0,
            });
        }

        let urls = load_sources()?;
        info!(count = urls.len(), "Fetching feeds");
        let mut results = self.fetcher.fetch_all(&urls, progress).await;

        // Completion order is arbitrary; merge in configured order instead
        let position: HashMap<&str, usize> = urls
            .iter()
            .enumerate()
            .map(|(i, url)| (url.as_str(), i))
            .collect();
        results.sort_by_key(|r| position.get(r.url.as_str()).copied().unwrap_or(usize::MAX));

        let mut failed_sources = 0;
        let fresh: Vec<Vec<Item>> = results
            .into_iter()
            .filter_map(|r| match r.result {
                Ok(items) => Some(items),
                Err(_) => {
                    failed_sources += 1;
                    None
                }
            })
            .collect();
        if failed_sources > 0 {
            warn!("{} of {} feeds could not be fetched", failed_sources, urls.len());
        }

        let mut merged = merge(loaded.snapshot.items, fresh);

        info!(count = merged.len(), "Adding metadata");
        let failures = self.enricher.enrich_all(&mut merged, progress).await;
        if !failures.is_empty() {
            warn!("{} items are missing a duration", failures.len());
        }

        let snapshot = CacheSnapshot::new(merged, now);
        self.store.save(&snapshot)?;

        Ok(Outcome {
            items: present(snapshot.items, self.config.shorts_threshold),
            from_cache: false,
            failed_sources,
            failed_items: failures.len(),
        })
    }
}
