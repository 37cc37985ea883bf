pub mod http;

pub use http::{HttpSource, SourceState};
pub use symphonia::core::io::MediaSource;
