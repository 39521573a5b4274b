//! telemetry/snapshot.rs
//!
//! Immutable telemetry snapshot of a read session.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{TelemetryTimer, StageTimes};

/// Captures counters, throughput, stage timings, and elapsed duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub pulls: u64,
    pub notifications_data: u64,
    pub notifications_ended: u64,
    pub chunks_drained: u64,
    pub bytes_drained: u64,
    pub segments_emitted: u64,
    pub bytes_emitted: u64,
    pub empty_completions: u64,
    pub source_errors: u64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_emitted as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            pulls: counters.pulls,
            notifications_data: counters.notifications_data,
            notifications_ended: counters.notifications_ended,
            chunks_drained: counters.chunks_drained,
            bytes_drained: counters.bytes_drained,
            segments_emitted: counters.segments_emitted,
            bytes_emitted: counters.bytes_emitted,
            empty_completions: counters.empty_completions,
            source_errors: counters.source_errors,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    /// Internal consistency:
    /// - nothing emitted that was not drained
    /// - stage time never exceeds wall time
    pub fn sanity_check(&self) -> bool {
        self.bytes_emitted <= self.bytes_drained &&
        self.empty_completions <= 1 &&
        self.total_stage_time() <= self.elapsed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
