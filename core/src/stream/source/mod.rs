//! Byte sources feeding the segment assembler.
//!
//! Responsibilities:
//! - Hand out resident chunks without blocking (`ByteSource::try_take`)
//! - Publish `DataAvailable` / `Ended` / `Failed` notifications on a channel
//!
//! Non-responsibilities:
//! - Segment boundaries
//! - Backpressure decisions (the assembler only takes when a pull is pending)

pub mod types;
pub mod file;
pub mod memory;

pub use types::{ByteSource, SourceEvent};
pub use file::FileSource;
pub use memory::{MemorySource, MemorySourceHandle};
