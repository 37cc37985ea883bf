pub mod duration;
pub mod json;
pub mod text;

pub use duration::{parse_loose_seconds, parse_timecode};
pub use json::JsonNav;
pub use text::{log_preview, unescape_html};
