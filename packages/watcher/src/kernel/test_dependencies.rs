// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into the poll cycle engine for tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::{
    notifier::MessengerNotifier, BaseClock, BaseEnrichmentProbe, BaseListingFetcher,
    BaseMessenger, BaseSeenStore, WatcherDeps,
};
use crate::error::{FetchError, NotificationError, StorageError};
use crate::listings::{DeliveryInfo, ListingRecord, SeenRecord};
use crate::stores::MemorySeenStore;

// =============================================================================
// Mock Listing Fetcher
// =============================================================================

#[derive(Debug, Clone)]
enum FetchResponse {
    Listings(Vec<ListingRecord>),
    Timeout,
}

/// Replays queued fetch results. The last queued result repeats forever,
/// so a single `with_listings` call serves every cycle.
pub struct MockListingFetcher {
    responses: Mutex<VecDeque<FetchResponse>>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockListingFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockListingFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_listings(self, listings: Vec<ListingRecord>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(FetchResponse::Listings(listings));
        self
    }

    /// Queue a fetch that fails with a timeout
    pub fn with_timeout(self) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(FetchResponse::Timeout);
        self
    }

    /// Get all search URLs that were fetched
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseListingFetcher for MockListingFetcher {
    async fn fetch_listings(&self, search_url: &str) -> Result<Vec<ListingRecord>, FetchError> {
        self.calls.lock().unwrap().push(search_url.to_string());

        let response = {
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.pop_front()
            } else {
                responses.front().cloned()
            }
        };

        match response {
            Some(FetchResponse::Listings(listings)) => Ok(listings),
            Some(FetchResponse::Timeout) => Err(FetchError::Timeout {
                url: search_url.to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

// =============================================================================
// Mock Enrichment Probe
// =============================================================================

/// Returns canned delivery info per URL, `Unavailable` otherwise.
#[derive(Default)]
pub struct MockEnrichmentProbe {
    responses: Mutex<HashMap<String, DeliveryInfo>>,
    calls: Mutex<Vec<String>>,
}

impl MockEnrichmentProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delivery(self, detail_url: &str, info: DeliveryInfo) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(detail_url.to_string(), info);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseEnrichmentProbe for MockEnrichmentProbe {
    async fn probe(&self, detail_url: &str) -> DeliveryInfo {
        self.calls.lock().unwrap().push(detail_url.to_string());

        self.responses
            .lock()
            .unwrap()
            .get(detail_url)
            .cloned()
            .unwrap_or(DeliveryInfo::Unavailable)
    }
}

// =============================================================================
// Mock Messenger
// =============================================================================

/// One attempted delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessengerCall {
    Photo {
        photo_url: String,
        caption: String,
        delivered: bool,
    },
    Text {
        text: String,
        delivered: bool,
    },
}

#[derive(Default)]
pub struct MockMessenger {
    fail_photos: AtomicBool,
    fail_texts: AtomicBool,
    calls: Mutex<Vec<MessengerCall>>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every photo, as Telegram does for unreachable images
    pub fn failing_photos(self) -> Self {
        self.fail_photos.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_texts(self) -> Self {
        self.fail_texts.store(true, Ordering::SeqCst);
        self
    }

    /// Toggle text failures while a test is running
    pub fn set_failing_texts(&self, failing: bool) {
        self.fail_texts.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<MessengerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn photo_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MessengerCall::Photo { .. }))
            .count()
    }

    pub fn text_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MessengerCall::Text { .. }))
            .count()
    }

    /// Texts and captions that actually reached the chat, in order
    pub fn delivered_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MessengerCall::Photo {
                    caption,
                    delivered: true,
                    ..
                } => Some(caption),
                MessengerCall::Text {
                    text,
                    delivered: true,
                } => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl BaseMessenger for MockMessenger {
    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), NotificationError> {
        let failing = self.fail_photos.load(Ordering::SeqCst);
        self.calls.lock().unwrap().push(MessengerCall::Photo {
            photo_url: photo_url.to_string(),
            caption: caption.to_string(),
            delivered: !failing,
        });

        if failing {
            Err(NotificationError::Delivery(format!(
                "wrong file identifier/HTTP URL specified: {}",
                photo_url
            )))
        } else {
            Ok(())
        }
    }

    async fn send_text(&self, text: &str) -> Result<(), NotificationError> {
        let failing = self.fail_texts.load(Ordering::SeqCst);
        self.calls.lock().unwrap().push(MessengerCall::Text {
            text: text.to_string(),
            delivered: !failing,
        });

        if failing {
            Err(NotificationError::Delivery("chat unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Flaky Seen Store
// =============================================================================

/// Memory store whose reads or writes can be switched to fail.
#[derive(Default)]
pub struct FlakySeenStore {
    inner: MemorySeenStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakySeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, failing: bool) {
        self.fail_reads.store(failing, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn unavailable() -> StorageError {
        StorageError::Unavailable("disk I/O error".to_string())
    }
}

#[async_trait]
impl BaseSeenStore for FlakySeenStore {
    async fn has_seen(&self, id: &str) -> Result<bool, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.has_seen(id).await
    }

    async fn mark_seen(&self, listing: &ListingRecord) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.mark_seen(listing).await
    }

    async fn get(&self, id: &str) -> Result<Option<SeenRecord>, StorageError> {
        self.inner.get(id).await
    }

    async fn count(&self) -> Result<u64, StorageError> {
        self.inner.count().await
    }
}

// =============================================================================
// Mock Clock
// =============================================================================

/// Virtual clock: `sleep` returns immediately and advances `now`.
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseClock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let step = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        let mut now = self.now.lock().unwrap();
        *now += step;
    }
}

// =============================================================================
// Local HTTP servers
// =============================================================================

/// Base URL of a local server that accepts connections and never answers.
pub async fn silent_http_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local test server address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

/// Base URL of a local server answering every request with `status` and an empty body.
pub async fn status_http_server(status: u16) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local test server address");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", addr)
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Builder for engine dependencies backed by mocks.
///
/// Handles to every mock are kept so tests can assert on them after running cycles.
pub struct TestDependencies {
    pub fetcher: Arc<MockListingFetcher>,
    pub probe: Arc<MockEnrichmentProbe>,
    pub messenger: Arc<MockMessenger>,
    pub store: Arc<dyn BaseSeenStore>,
    pub clock: Arc<MockClock>,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            fetcher: Arc::new(MockListingFetcher::new()),
            probe: Arc::new(MockEnrichmentProbe::new()),
            messenger: Arc::new(MockMessenger::new()),
            store: Arc::new(MemorySeenStore::new()),
            clock: Arc::new(MockClock::new()),
        }
    }

    pub fn mock_fetcher(mut self, fetcher: MockListingFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    pub fn mock_probe(mut self, probe: MockEnrichmentProbe) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    pub fn mock_messenger(mut self, messenger: MockMessenger) -> Self {
        self.messenger = Arc::new(messenger);
        self
    }

    pub fn store(mut self, store: Arc<dyn BaseSeenStore>) -> Self {
        self.store = store;
        self
    }

    /// Assemble `WatcherDeps`; the notifier is the real `MessengerNotifier`
    /// over the mock messenger so fallback behaviour is exercised.
    pub fn to_deps(&self) -> WatcherDeps {
        WatcherDeps::new(
            self.fetcher.clone(),
            self.probe.clone(),
            Arc::new(MessengerNotifier::new(self.messenger.clone())),
            self.store.clone(),
            self.clock.clone(),
        )
    }
}
