// Kernel: infrastructure behind traits (HTTP, Telegram, clock) plus mocks.

pub mod clock;
pub mod delivery_probe;
pub mod deps;
pub mod http;
pub mod notifier;
pub mod olx_fetcher;
pub mod test_dependencies;
pub mod traits;

pub use clock::TokioClock;
pub use delivery_probe::HttpDeliveryProbe;
pub use deps::{TelegramAdapter, WatcherDeps};
pub use notifier::{escape_markdown, render_caption, MessengerNotifier};
pub use olx_fetcher::OlxFetcher;
pub use test_dependencies::TestDependencies;
pub use traits::*;
