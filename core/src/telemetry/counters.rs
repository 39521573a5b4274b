//! telemetry/counters.rs
//! Mutable counters collected while a read session runs.
//!
//! Converted into an immutable `TelemetrySnapshot` on request.
use bincode::{Encode, Decode};

/// Deterministic counters collected during a read session
#[derive(Default, Clone, Debug, Encode, Decode, PartialEq)]
pub struct TelemetryCounters {
    pub pulls: u64,
    pub notifications_data: u64,
    pub notifications_ended: u64,
    pub chunks_drained: u64,
    pub bytes_drained: u64,
    pub segments_emitted: u64,
    pub bytes_emitted: u64,
    pub empty_completions: u64,
    pub source_errors: u64,
}

impl TelemetryCounters {
    pub fn add_pull(&mut self) {
        self.pulls += 1;
    }

    pub fn add_data_notification(&mut self) {
        self.notifications_data += 1;
    }

    pub fn add_ended_notification(&mut self) {
        self.notifications_ended += 1;
    }

    /// Record one chunk taken from the byte source.
    pub fn add_drained(&mut self, chunk_len: usize) {
        self.chunks_drained += 1;
        self.bytes_drained += chunk_len as u64;
    }

    /// Record one segment handed to the sink.
    ///
    /// - `data_len`: payload length (0 for a trailing empty completion)
    pub fn add_emitted(&mut self, data_len: usize) {
        self.segments_emitted += 1;
        self.bytes_emitted += data_len as u64;
        if data_len == 0 {
            self.empty_completions += 1;
        }
    }

    pub fn add_source_error(&mut self) {
        self.source_errors += 1;
    }
}
