// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only. The polling logic lives in
// engine::poll_cycle and talks to the outside world exclusively through these.
//
// Naming convention: Base* for trait names (e.g., BaseNotifier, BaseClock)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::{FetchError, NotificationError, StorageError};
use crate::listings::{DeliveryInfo, ListingRecord, SeenRecord};

// =============================================================================
// Listing Fetcher Trait
// =============================================================================

#[async_trait]
pub trait BaseListingFetcher: Send + Sync {
    /// Fetch the current listing sequence for a search URL, in page order
    async fn fetch_listings(&self, search_url: &str) -> Result<Vec<ListingRecord>, FetchError>;
}

// =============================================================================
// Enrichment Probe Trait
// =============================================================================

#[async_trait]
pub trait BaseEnrichmentProbe: Send + Sync {
    /// Derive delivery availability from a listing's detail page.
    ///
    /// Infallible by contract: implementations swallow their own errors and
    /// return `DeliveryInfo::Unavailable`.
    async fn probe(&self, detail_url: &str) -> DeliveryInfo;
}

// =============================================================================
// Notifier Trait
// =============================================================================

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Deliver one enriched listing. `Ok` means it reached the channel,
    /// possibly via the text-only fallback.
    async fn notify(&self, listing: &ListingRecord) -> Result<(), NotificationError>;
}

// =============================================================================
// Messenger Trait (Infrastructure - chat transport)
// =============================================================================

#[async_trait]
pub trait BaseMessenger: Send + Sync {
    /// Send a photo by URL with a caption
    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), NotificationError>;

    /// Send a text-only message
    async fn send_text(&self, text: &str) -> Result<(), NotificationError>;
}

// =============================================================================
// Seen Store Trait
// =============================================================================

#[async_trait]
pub trait BaseSeenStore: Send + Sync {
    /// True iff the identifier has been recorded. False for every id on a fresh store.
    async fn has_seen(&self, id: &str) -> Result<bool, StorageError>;

    /// Record a notified listing. Inserting an existing id is a no-op.
    async fn mark_seen(&self, listing: &ListingRecord) -> Result<(), StorageError>;

    async fn get(&self, id: &str) -> Result<Option<SeenRecord>, StorageError>;

    async fn count(&self) -> Result<u64, StorageError>;

    /// Release underlying resources. Default is a no-op.
    async fn close(&self) {}
}

// =============================================================================
// Clock Trait
// =============================================================================

#[async_trait]
pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}
