//! Watcher dependencies (using traits for testability)
//!
//! This module provides the dependency container handed to the poll cycle engine.
//! All external services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use telegram::{ParseMode, TelegramOptions, TelegramService};

use crate::config::Config;
use crate::error::NotificationError;
use crate::kernel::{
    clock::TokioClock, delivery_probe::HttpDeliveryProbe, http::build_client,
    notifier::MessengerNotifier, olx_fetcher::OlxFetcher, BaseClock, BaseEnrichmentProbe,
    BaseListingFetcher, BaseMessenger, BaseNotifier, BaseSeenStore,
};
use crate::stores::SqliteSeenStore;

// =============================================================================
// TelegramService Adapter (implements BaseMessenger trait)
// =============================================================================

/// Wrapper around TelegramService bound to one chat
pub struct TelegramAdapter {
    service: Arc<TelegramService>,
    chat_id: String,
}

impl TelegramAdapter {
    pub fn new(service: Arc<TelegramService>, chat_id: impl Into<String>) -> Self {
        Self {
            service,
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl BaseMessenger for TelegramAdapter {
    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), NotificationError> {
        self.service
            .send_photo(
                &self.chat_id,
                photo_url,
                Some(caption),
                Some(ParseMode::MarkdownV2),
            )
            .await
            .map(|_| ())
            .map_err(NotificationError::from)
    }

    async fn send_text(&self, text: &str) -> Result<(), NotificationError> {
        self.service
            .send_message(&self.chat_id, text, Some(ParseMode::MarkdownV2))
            .await
            .map(|_| ())
            .map_err(NotificationError::from)
    }
}

// =============================================================================
// WatcherDeps
// =============================================================================

/// Dependencies of the poll cycle engine
#[derive(Clone)]
pub struct WatcherDeps {
    pub fetcher: Arc<dyn BaseListingFetcher>,
    pub probe: Arc<dyn BaseEnrichmentProbe>,
    pub notifier: Arc<dyn BaseNotifier>,
    pub store: Arc<dyn BaseSeenStore>,
    pub clock: Arc<dyn BaseClock>,
}

impl WatcherDeps {
    pub fn new(
        fetcher: Arc<dyn BaseListingFetcher>,
        probe: Arc<dyn BaseEnrichmentProbe>,
        notifier: Arc<dyn BaseNotifier>,
        store: Arc<dyn BaseSeenStore>,
        clock: Arc<dyn BaseClock>,
    ) -> Self {
        Self {
            fetcher,
            probe,
            notifier,
            store,
            clock,
        }
    }

    /// Wire the production services: reqwest fetcher and probe, Telegram
    /// notifier (same timeout as page fetches), SQLite store. Returns the
    /// Telegram service too so the caller can run a credentials check.
    pub async fn from_config(config: &Config) -> Result<(Self, Arc<TelegramService>)> {
        let client = build_client(config.http_timeout)?;
        let telegram = Arc::new(TelegramService::new(
            TelegramOptions::new(config.telegram_token.clone()).with_timeout(config.http_timeout),
        ));
        let messenger = Arc::new(TelegramAdapter::new(telegram.clone(), config.chat_id.clone()));
        let store = SqliteSeenStore::new(&config.database_url).await?;

        let deps = Self::new(
            Arc::new(OlxFetcher::new(client.clone(), config.base_url.clone())),
            Arc::new(HttpDeliveryProbe::new(client)),
            Arc::new(MessengerNotifier::new(messenger)),
            Arc::new(store),
            Arc::new(TokioClock),
        );
        Ok((deps, telegram))
    }
}
