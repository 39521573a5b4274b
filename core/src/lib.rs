//! segread-core
//!
//! Reads a file of any size and hands it to a consumer as fixed-size byte
//! segments, one per consumer pull, with exactly one completion signal.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod telemetry;

// Stream layers
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::stream::{
        ByteSource, CollectingSink, FileMetadata, ReaderConfig, Segment, SegmentSink,
        SegmentedReader, SessionState,
    };
    pub use crate::types::{ReaderError, SourceError};
}
