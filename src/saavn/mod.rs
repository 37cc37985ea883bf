pub mod client;
pub mod config;
pub mod parser;
pub mod provider;

pub use client::SaavnClient;
pub use config::SaavnConfig;
pub use provider::SaavnProvider;
