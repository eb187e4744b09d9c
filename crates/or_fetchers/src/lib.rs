pub mod cli;
pub mod config;
pub mod fetchers;
pub mod logging;
pub mod retry;

pub use cli::{handle_command, FetchArgs};
pub use config::FetchConfig;
pub use fetchers::{ArticleFetcher, Fetcher, FetcherRegistry, RedditFetcher, YouTubeFetcher};
pub use logging::{init_logging, Logger};
pub use retry::RetryPolicy;

pub mod prelude {
    pub use super::fetchers::{Fetcher, FetcherRegistry};
    pub use super::config::FetchConfig;
    pub use or_core::{ContentSource, Error, Result, SourceKind};
}
