//! In-memory seen store for testing and development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StorageError;
use crate::kernel::BaseSeenStore;
use crate::listings::{ListingRecord, SeenRecord};

/// In-memory seen store.
///
/// NOT durable: everything is lost on restart, so a restarted watcher would
/// notify every listing on the page again. Use `SqliteSeenStore` in production.
#[derive(Default)]
pub struct MemorySeenStore {
    records: RwLock<HashMap<String, SeenRecord>>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseSeenStore for MemorySeenStore {
    async fn has_seen(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.records.read().unwrap().contains_key(id))
    }

    async fn mark_seen(&self, listing: &ListingRecord) -> Result<(), StorageError> {
        self.records
            .write()
            .unwrap()
            .entry(listing.id.clone())
            .or_insert_with(|| SeenRecord::from_listing(listing, Utc::now().timestamp()));
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SeenRecord>, StorageError> {
        Ok(self.records.read().unwrap().get(id).cloned())
    }

    async fn count(&self) -> Result<u64, StorageError> {
        Ok(self.records.read().unwrap().len() as u64)
    }
}
