pub mod cache;
pub mod config;
pub mod coordinator;
pub mod decoder;
pub mod error;
pub mod listing;
pub mod models;
pub mod transport;
pub mod viewer;

pub use cache::QueryCache;
pub use config::Config;
pub use coordinator::{SearchCoordinator, SearchEvent, SearchOutcome};
pub use error::{DecodeError, FetchError, TransportError};
pub use models::{FeedResult, Media, PhotoItem, SearchQuery};
pub use transport::{HttpTransport, Transport};
