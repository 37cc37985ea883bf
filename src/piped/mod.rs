pub mod client;
pub mod config;
pub mod endpoint_manager;
pub mod parser;
pub mod provider;

pub use client::PipedClient;
pub use config::PipedConfig;
pub use endpoint_manager::EndpointPool;
pub use provider::PipedProvider;
