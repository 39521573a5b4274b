//! Segment assembly state machine.
//!
//! Pull requests, `DataAvailable` and `Ended` all funnel into
//! `drain_and_emit`, which acts only while a pull is pending. Completion is
//! decided solely by `ended && buffered_len == 0` at the moment of emission;
//! no segment count is ever compared against an estimate.

use std::collections::VecDeque;
use std::time::Instant;

use bytes::Bytes;

use crate::stream::segmenting::types::{Segment, SegmentSink};
use crate::stream::source::ByteSource;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::{ReaderError, SourceError};
use crate::utils::split_front;

pub struct SegmentAssembler<K: SegmentSink> {
    sink: K,
    segment_size: usize,

    // Chunks taken from the source but not yet emitted, in file order.
    buffered: VecDeque<Bytes>,
    buffered_len: usize,

    ended: bool,
    awaiting_pull: bool,
    emitted_completion: bool,
    failure: Option<SourceError>,

    next_index: u64,
    next_offset: u64,

    telemetry: TelemetryCounters,
    timer: TelemetryTimer,
}

impl<K: SegmentSink> SegmentAssembler<K> {
    /// `segment_size` must be non-zero; `ReaderConfig` validation guarantees it.
    pub fn new(segment_size: usize, sink: K) -> Self {
        debug_assert!(segment_size > 0, "segment size must be positive");
        Self {
            sink,
            segment_size,
            buffered: VecDeque::new(),
            buffered_len: 0,
            ended: false,
            awaiting_pull: false,
            emitted_completion: false,
            failure: None,
            next_index: 0,
            next_offset: 0,
            telemetry: TelemetryCounters::default(),
            timer: TelemetryTimer::new(),
        }
    }

    // ---- Stimuli ----

    /// Consumer asks for the next segment.
    ///
    /// Re-arms the gate and runs one drain. Repeating it without new data or
    /// an end notification emits nothing.
    pub fn pull<S: ByteSource + ?Sized>(&mut self, source: &mut S) {
        if self.is_terminal() {
            return;
        }
        self.telemetry.add_pull();
        self.awaiting_pull = true;
        self.drain_and_emit(source);
    }

    /// Source reports resident data (possibly spuriously).
    pub fn on_data_available<S: ByteSource + ?Sized>(&mut self, source: &mut S) {
        if self.is_terminal() {
            return;
        }
        self.telemetry.add_data_notification();
        self.drain_and_emit(source);
    }

    /// Source reports that nothing further will be produced.
    ///
    /// Without a pending pull this only records the fact; draining and the
    /// completion decision wait for the next `pull`.
    pub fn on_ended<S: ByteSource + ?Sized>(&mut self, source: &mut S) {
        if self.is_terminal() {
            return;
        }
        if self.ended {
            log::trace!("[ASSEMBLER] duplicate end notification ignored");
            return;
        }
        self.telemetry.add_ended_notification();
        self.ended = true;
        log::debug!(
            "[ASSEMBLER] source ended, {} bytes buffered, pull pending: {}",
            self.buffered_len,
            self.awaiting_pull
        );
        self.drain_and_emit(source);
    }

    /// Source faulted. Delivers one terminal error regardless of pending pulls.
    pub fn on_failed(&mut self, err: SourceError) {
        if self.is_terminal() {
            return;
        }
        log::warn!(
            "[ASSEMBLER] source failed after {} segments, dropping {} buffered bytes: {}",
            self.next_index,
            self.buffered_len,
            err
        );
        self.failure = Some(err.duplicate());
        self.awaiting_pull = false;
        self.buffered.clear();
        self.buffered_len = 0;
        self.telemetry.add_source_error();
        self.timer.finish();
        self.sink.deliver(Err(ReaderError::Source(err)));
    }

    // ---- Core ----

    fn drain_and_emit<S: ByteSource + ?Sized>(&mut self, source: &mut S) {
        if !self.awaiting_pull || self.is_terminal() {
            return;
        }

        // 1. Drain everything resident, also when triggered by `Ended`.
        let t = Instant::now();
        loop {
            match source.try_take() {
                Ok(Some(chunk)) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    self.telemetry.add_drained(chunk.len());
                    self.buffered_len += chunk.len();
                    self.buffered.push_back(chunk);
                }
                Ok(None) => break,
                Err(err) => {
                    self.timer.add_stage_time(Stage::Drain, t.elapsed());
                    self.on_failed(err);
                    return;
                }
            }
        }
        self.timer.add_stage_time(Stage::Drain, t.elapsed());
        debug_assert!(self.check_invariant(), "buffered_len out of sync after drain");

        // 2. Gate.
        if self.buffered_len < self.segment_size && !self.ended {
            log::trace!(
                "[ASSEMBLER] holding {} of {} bytes, waiting for more",
                self.buffered_len,
                self.segment_size
            );
            return;
        }

        // 3./4. Emit one segment; an empty one only when ended and drained.
        let t = Instant::now();
        let data = if self.buffered_len > 0 {
            split_front(&mut self.buffered, self.segment_size)
        } else {
            Bytes::new()
        };
        self.buffered_len -= data.len();
        debug_assert!(self.check_invariant(), "buffered_len out of sync after split");

        let complete = self.ended && self.buffered_len == 0;
        let segment = Segment {
            index: self.next_index,
            offset: self.next_offset,
            data,
            complete,
        };

        self.next_index += 1;
        self.next_offset += segment.data.len() as u64;
        self.awaiting_pull = false;
        self.telemetry.add_emitted(segment.data.len());
        self.emitted_completion = complete;

        log::debug!("[ASSEMBLER] emitting {}", segment.summary());
        self.sink.deliver(Ok(segment));
        self.timer.add_stage_time(Stage::Emit, t.elapsed());

        // Wall clock stops after the last sink call has been charged.
        if complete {
            self.timer.finish();
        }
    }

    // ---- Inspection ----

    /// `buffered_len` equals the sum of buffered chunk lengths.
    pub fn check_invariant(&self) -> bool {
        self.buffered.iter().map(Bytes::len).sum::<usize>() == self.buffered_len
    }

    /// Completion emitted or source failed; nothing more will reach the sink.
    pub fn is_terminal(&self) -> bool {
        self.emitted_completion || self.failure.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.emitted_completion
    }

    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The fault that retired the session, if any.
    pub fn failure(&self) -> Option<&SourceError> {
        self.failure.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn awaiting_pull(&self) -> bool {
        self.awaiting_pull
    }

    pub fn buffered_len(&self) -> usize {
        self.buffered_len
    }

    pub fn segments_emitted(&self) -> u64 {
        self.next_index
    }

    pub fn bytes_emitted(&self) -> u64 {
        self.next_offset
    }

    pub fn counters(&self) -> &TelemetryCounters {
        &self.telemetry
    }

    pub(crate) fn record_stage(&mut self, stage: Stage, dur: std::time::Duration) {
        self.timer.add_stage_time(stage, dur);
    }

    /// Restart the wall clock. Stage times recorded so far are discarded.
    pub(crate) fn restart_clock(&mut self) {
        self.timer = TelemetryTimer::new();
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(&self.telemetry, &self.timer)
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::segmenting::CollectingSink;
    use crate::stream::source::MemorySource;

    #[test]
    fn gate_holds_partial_segment_until_end() {
        let (mut source, handle) = MemorySource::pair();
        let sink = CollectingSink::new();
        let mut asm = SegmentAssembler::new(8, sink.clone());

        handle.push(&b"abc"[..]);
        asm.pull(&mut source);
        assert!(sink.is_empty());
        assert!(asm.awaiting_pull());
        assert_eq!(asm.buffered_len(), 3);

        asm.on_ended(&mut source);
        let segs = sink.segments();
        assert_eq!(segs.len(), 1);
        assert_eq!(&segs[0].data[..], b"abc");
        assert!(segs[0].complete);
        assert!(asm.is_terminal());
    }

    #[test]
    fn data_notification_without_pull_is_noop() {
        let (mut source, handle) = MemorySource::pair();
        let sink = CollectingSink::new();
        let mut asm = SegmentAssembler::new(2, sink.clone());

        handle.push(&b"abcd"[..]);
        asm.on_data_available(&mut source);
        assert!(sink.is_empty());
        assert_eq!(asm.buffered_len(), 0);
        assert_eq!(source.resident(), 1);
    }

    #[test]
    fn failure_is_delivered_once() {
        let (mut source, _handle) = MemorySource::pair();
        let sink = CollectingSink::new();
        let mut asm = SegmentAssembler::new(2, sink.clone());

        asm.on_failed(SourceError::Disconnected);
        asm.on_failed(SourceError::Disconnected);
        asm.pull(&mut source);
        assert_eq!(sink.errors().len(), 1);
        assert_eq!(sink.len(), 1);
        assert!(asm.has_failed());
    }
}
