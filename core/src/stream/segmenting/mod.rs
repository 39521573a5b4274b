//! Segment assembly.
//!
//! Responsibilities:
//! - Define emitted segments and the sink they are delivered to
//! - Turn arbitrarily sized source chunks into fixed-size segments under
//!   consumer backpressure
//!
//! Non-responsibilities:
//! - File access
//! - Threading

pub mod types;
pub mod assembler;

pub use types::{Segment, SegmentSink, CollectingSink};
pub use assembler::SegmentAssembler;
