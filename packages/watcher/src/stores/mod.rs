//! Seen store implementations.
//!
//! Available backends:
//! - `MemorySeenStore` - In-memory, non-durable (tests and development)
//! - `SqliteSeenStore` - SQLite file-based storage (production)

pub mod memory;
pub mod sqlite;

pub use memory::MemorySeenStore;
pub use sqlite::SqliteSeenStore;
