use std::path::PathBuf;
use uuid::Uuid;
use watcher_core::kernel::BaseSeenStore;
use watcher_core::listings::ListingRecord;
use watcher_core::stores::{MemorySeenStore, SqliteSeenStore};

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        Self {
            path: std::env::temp_dir().join(format!("watcher-seen-{}.db", Uuid::new_v4())),
        }
    }

    fn url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        for suffix in ["-wal", "-shm"] {
            let mut sidecar = self.path.clone().into_os_string();
            sidecar.push(suffix);
            let _ = std::fs::remove_file(sidecar);
        }
    }
}

fn iphone() -> ListingRecord {
    ListingRecord::new("https://www.olx.pl/d/oferta/x-123.html", "iPhone 12")
}

#[tokio::test]
async fn test_seen_state_survives_reopen() {
    let db = TempDb::new();

    let store = SqliteSeenStore::new(&db.url()).await.unwrap();
    assert!(!store.has_seen("123").await.unwrap());
    store.mark_seen(&iphone()).await.unwrap();
    store.close().await;

    let reopened = SqliteSeenStore::new(&db.url()).await.unwrap();
    assert!(reopened.has_seen("123").await.unwrap());
    assert_eq!(reopened.count().await.unwrap(), 1);
    reopened.close().await;
}

#[tokio::test]
async fn test_backends_agree_on_idempotent_insert() {
    let db = TempDb::new();
    let sqlite = SqliteSeenStore::new(&db.url()).await.unwrap();
    let memory = MemorySeenStore::new();
    let stores: [&dyn BaseSeenStore; 2] = [&sqlite, &memory];

    for store in stores {
        assert!(!store.has_seen("123").await.unwrap());
        store.mark_seen(&iphone()).await.unwrap();
        store.mark_seen(&iphone()).await.unwrap();
        assert!(store.has_seen("123").await.unwrap());
        assert!(!store.has_seen("124").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    sqlite.close().await;
}

#[tokio::test]
async fn test_unreachable_database_fails_to_open() {
    let path = std::env::temp_dir()
        .join(format!("watcher-missing-{}", Uuid::new_v4()))
        .join("seen.db");
    // mode=ro on a file that does not exist cannot be opened.
    let result = SqliteSeenStore::new(&format!("sqlite:{}?mode=ro", path.display())).await;
    assert!(result.is_err());
}
