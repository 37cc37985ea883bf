pub mod format;
pub mod source;

pub use format::select_best;
pub use source::{HttpSource, SourceState};
