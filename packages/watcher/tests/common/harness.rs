//! Test harness wiring the poll cycle engine to mock dependencies.
//!
//! Time is virtual: the mock clock records every pause instead of sleeping.

use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use watcher_core::engine::{PollCycleConfig, PollCycleEngine};
use watcher_core::kernel::{BaseEnrichmentProbe, TestDependencies, WatcherDeps};

use super::SEARCH_URL;

pub const INTERVAL: Duration = Duration::from_secs(180);
pub const LISTING_PAUSE: Duration = Duration::from_secs(2);

pub struct TestHarness {
    pub deps: TestDependencies,
    pub engine: PollCycleEngine,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::with_deps(TestDependencies::new())
    }

    async fn teardown(self) {
        self.deps.store.close().await;
    }
}

impl TestHarness {
    pub fn with_deps(deps: TestDependencies) -> Self {
        let wired = deps.to_deps();
        Self::build(deps, wired)
    }

    /// Mocks everywhere except enrichment, which goes through `probe`
    pub fn with_probe(deps: TestDependencies, probe: Arc<dyn BaseEnrichmentProbe>) -> Self {
        let mut wired = deps.to_deps();
        wired.probe = probe;
        Self::build(deps, wired)
    }

    fn build(deps: TestDependencies, wired: WatcherDeps) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let engine = PollCycleEngine::new(
            wired,
            PollCycleConfig::new(SEARCH_URL)
                .with_interval(INTERVAL)
                .with_listing_pause(LISTING_PAUSE),
        );
        Self { deps, engine }
    }

    /// Captions and texts that reached the chat, in order
    pub fn delivered(&self) -> Vec<String> {
        self.deps.messenger.delivered_texts()
    }
}
