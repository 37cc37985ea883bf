pub mod client;
pub mod config;
pub mod parser;
pub mod provider;
pub mod token;

pub use client::SpotifyClient;
pub use config::{SpotifyConfig, SpotifyCredentials};
pub use provider::SpotifyProvider;
pub use token::{CachedToken, TokenCache};
