// Listing Watcher - Core
//
// Polls a classifieds search page, finds listings it has not announced yet,
// checks each one's delivery options and posts it to a Telegram chat.
// Every listing is announced at most once; the set of announced listings
// survives restarts in SQLite.

pub mod config;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod listings;
pub mod stores;

pub use config::*;
