//! Typed errors for each stage of a poll cycle.
//!
//! Every stage recovers from its own error kind differently, so they are kept
//! as separate enums rather than one catch-all:
//! - `FetchError`: the cycle yields zero listings
//! - `EnrichmentError`: the probe substitutes the "no shipping" sentinel
//! - `NotificationError`: the listing stays unseen and is retried next cycle
//! - `StorageError`: the rest of the cycle is aborted

use thiserror::Error;

/// Listing or detail page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("timeout fetching {url}")]
    Timeout { url: String },

    #[error("could not parse {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// Detail page enrichment failed. Never leaves the probe.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("detail page unavailable: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] telegram::TelegramError),

    /// Delivery rejected by a non-Telegram transport.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
