pub mod client;
pub mod clients;
pub mod config;
pub mod parser;
pub mod provider;

pub use client::InnerTubeClient;
pub use clients::{ClientKind, ClientProfile};
pub use config::YouTubeConfig;
pub use provider::YouTubeProvider;
