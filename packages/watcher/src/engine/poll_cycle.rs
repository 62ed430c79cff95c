//! Poll cycle engine: fetch, filter, enrich, notify, record, wait.
//!
//! # Architecture
//!
//! ```text
//! PollCycleEngine::run (forever)
//!     │
//!     ├─► run_cycle()
//!     │       ├─► fetcher.fetch_listings()        FetchError   → cycle yields nothing
//!     │       └─► for each listing, page order:
//!     │               ├─► store.has_seen()        StorageError → abort cycle
//!     │               ├─► probe.probe()           never fails
//!     │               ├─► notifier.notify()       failure      → stays unseen
//!     │               ├─► store.mark_seen()       StorageError → abort cycle
//!     │               └─► clock.sleep(listing_pause)
//!     └─► clock.sleep(interval)
//! ```
//!
//! A listing is recorded only after its notification went out, and a failed
//! notification leaves it unseen, so it is retried on the next cycle.

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::StorageError;
use crate::kernel::WatcherDeps;
use crate::listings::ListingRecord;

/// Timing and target of the polling loop.
#[derive(Debug, Clone)]
pub struct PollCycleConfig {
    pub search_url: String,
    /// Wait between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Pause after each new listing, to avoid bursting the messaging API
    pub listing_pause: Duration,
}

impl PollCycleConfig {
    pub fn new(search_url: impl Into<String>) -> Self {
        Self {
            search_url: search_url.into(),
            interval: Duration::from_secs(180),
            listing_pause: Duration::from_secs(2),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_listing_pause(mut self, pause: Duration) -> Self {
        self.listing_pause = pause;
        self
    }
}

impl From<&Config> for PollCycleConfig {
    fn from(config: &Config) -> Self {
        Self::new(config.search_url.clone())
            .with_interval(config.check_interval)
            .with_listing_pause(config.listing_pause)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Fetching,
    Filtering,
    Enriching,
    Notifying,
    Recording,
    Waiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    FetchFailed { reason: String },
    StorageAborted { reason: String },
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub skipped: usize,
    pub notified: usize,
    pub notify_failed: usize,
    /// Identifiers notified and recorded, in processing order
    pub notified_ids: Vec<String>,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    fn new() -> Self {
        Self {
            fetched: 0,
            skipped: 0,
            notified: 0,
            notify_failed: 0,
            notified_ids: Vec::new(),
            outcome: CycleOutcome::Completed,
        }
    }
}

pub struct PollCycleEngine {
    deps: WatcherDeps,
    config: PollCycleConfig,
    state: EngineState,
    cycles_run: u64,
}

impl PollCycleEngine {
    pub fn new(deps: WatcherDeps, config: PollCycleConfig) -> Self {
        Self {
            deps,
            config,
            state: EngineState::Idle,
            cycles_run: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    pub fn deps(&self) -> &WatcherDeps {
        &self.deps
    }

    /// Run cycles until the task is dropped. Never returns.
    pub async fn run(&mut self) {
        info!(
            search_url = %self.config.search_url,
            interval_secs = self.config.interval.as_secs(),
            "Watcher started"
        );
        loop {
            self.run_cycle().await;
            self.wait().await;
        }
    }

    /// Run `count` cycles, each followed by the inter-cycle wait.
    pub async fn run_cycles(&mut self, count: usize) -> Vec<CycleReport> {
        let mut reports = Vec::with_capacity(count);
        for _ in 0..count {
            reports.push(self.run_cycle().await);
            self.wait().await;
        }
        reports
    }

    /// One fetch → filter → enrich → notify → record pass. Never fails; the
    /// outcome is reported instead.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycles_run += 1;
        let cycle = self.cycles_run;
        let mut report = CycleReport::new();
        info!(cycle, "Starting poll cycle");

        self.state = EngineState::Fetching;
        let listings = match self.deps.fetcher.fetch_listings(&self.config.search_url).await {
            Ok(listings) => listings,
            Err(e) => {
                error!(cycle, error = %e, "Fetching listings failed");
                report.outcome = CycleOutcome::FetchFailed {
                    reason: e.to_string(),
                };
                self.finish_cycle(cycle, &report);
                return report;
            }
        };

        report.fetched = listings.len();
        if listings.is_empty() {
            info!(cycle, "No listings found this cycle");
        }

        for listing in listings {
            if let Err(e) = self.process_listing(listing, &mut report).await {
                error!(cycle, error = %e, "Seen store unavailable, aborting cycle");
                report.outcome = CycleOutcome::StorageAborted {
                    reason: e.to_string(),
                };
                break;
            }
        }

        self.finish_cycle(cycle, &report);
        report
    }

    async fn process_listing(
        &mut self,
        listing: ListingRecord,
        report: &mut CycleReport,
    ) -> Result<(), StorageError> {
        self.state = EngineState::Filtering;
        if self.deps.store.has_seen(&listing.id).await? {
            debug!(listing_id = %listing.id, title = %listing.title, "Skipping already sent listing");
            report.skipped += 1;
            return Ok(());
        }

        info!(listing_id = %listing.id, title = %listing.title, "Found new listing");

        self.state = EngineState::Enriching;
        let delivery = self.deps.probe.probe(&listing.url).await;
        let listing = listing.with_delivery(delivery);

        self.state = EngineState::Notifying;
        match self.deps.notifier.notify(&listing).await {
            Ok(()) => {
                self.state = EngineState::Recording;
                self.deps.store.mark_seen(&listing).await?;
                report.notified += 1;
                report.notified_ids.push(listing.id.clone());
                info!(listing_id = %listing.id, "Marked listing as sent");
            }
            Err(e) => {
                // Left unseen on purpose: the next cycle retries it.
                warn!(listing_id = %listing.id, error = %e, "Notification failed, will retry next cycle");
                report.notify_failed += 1;
            }
        }

        self.deps.clock.sleep(self.config.listing_pause).await;
        Ok(())
    }

    fn finish_cycle(&mut self, cycle: u64, report: &CycleReport) {
        self.state = EngineState::Idle;
        info!(
            cycle,
            fetched = report.fetched,
            skipped = report.skipped,
            notified = report.notified,
            notify_failed = report.notify_failed,
            outcome = ?report.outcome,
            finished_at = %self.deps.clock.now().format("%H:%M:%S"),
            "Poll cycle finished"
        );
    }

    /// Inter-cycle wait
    pub async fn wait(&mut self) {
        self.state = EngineState::Waiting;
        debug!(seconds = self.config.interval.as_secs(), "Waiting for next cycle");
        self.deps.clock.sleep(self.config.interval).await;
        self.state = EngineState::Idle;
    }
}
