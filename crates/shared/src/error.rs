//! Errors for the per-source and per-item network stages.
//!
//! These never abort a run: the fetcher and enricher log them and move on.
//! Fatal errors (cache I/O, the selector and player processes) use `anyhow`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed feed: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("duration not found in {0}")]
    DurationNotFound(String),

    #[error("duration not parsed correctly: {0}")]
    DurationFormat(String),
}
