//! stream: pull-driven, fixed-size segmentation of a file.
//!
//! Layers, bottom up:
//! - `source`: byte producers (file-backed thread, scripted in-memory)
//! - `segmenting`: segment types, sinks, the assembly state machine
//! - `io`: metadata lookup and chunked reads
//! - `core`: configuration and the `SegmentedReader` session

pub mod io;
pub mod core;
pub mod source;
pub mod segmenting;

pub use io::FileMetadata;
pub use source::{ByteSource, SourceEvent, FileSource, MemorySource, MemorySourceHandle};
pub use segmenting::{Segment, SegmentSink, CollectingSink, SegmentAssembler};
pub use core::{
    ReaderConfig,
    ResolvedConfig,
    SegmentedReader,
    SessionState,
    validate_reader_config,
};
