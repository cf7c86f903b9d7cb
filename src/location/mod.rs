//! Location resolution subsystem.
//!
//! Turns structured postal addresses into geographic coordinates via an
//! external maps search provider, with batch chunking and score-based
//! disambiguation of ranked matches.

pub mod provider;
pub mod service;
pub mod types;

pub use provider::{
    GeocodingProvider, HttpMapsSearchApi, MapsSearchApi, MapsSearchClient, ProviderError,
    SEARCH_BATCH_ASYNC_MAX, SEARCH_BATCH_SYNC_MAX,
};
pub use service::LocationService;
pub use types::{Address, GeoCoordinate};
