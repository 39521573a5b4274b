//! telemetry/mod.rs
//! Reader telemetry: counters, stage timers, and immutable snapshots.
//!
//! Counters are advisory. Nothing in the reader's control flow reads them back.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
