//! Multi-catalog track lookup and stream resolution.
//!
//! Several unofficial music catalogs are queried side by side through
//! [`providers::ProviderManager`]; a chosen [`models::Track`] is resolved to
//! a stream URL by its own provider and read through
//! [`audio::HttpSource`].

pub mod audio;
pub mod config;
pub mod errors;
pub mod models;
pub mod piped;
pub mod providers;
pub mod saavn;
pub mod spotify;
pub mod util;
pub mod youtube;

pub use config::CatalogConfig;
pub use errors::ProviderError;
pub use models::{AudioFormatCandidate, StreamInfo, Track};
pub use providers::{CatalogProvider, ProviderKind, ProviderManager};
