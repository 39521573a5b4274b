use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::types::ReaderError;

/// One emitted slice of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Emission ordinal, starting at 0
    pub index: u64,

    /// File offset of the first byte in `data`
    pub offset: u64,

    /// At most `segment_size` bytes; empty only for a trailing completion
    pub data: Bytes,

    /// Set on exactly one segment, the last one delivered
    pub complete: bool,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Segment {{ index: {}, offset: {}, len: {}, complete: {} }}",
            self.index,
            self.offset,
            self.data.len(),
            self.complete,
        )
    }
}

impl AsRef<[u8]> for Segment {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Receiver of segment events.
///
/// Invoked once per segment. A session ends with either one `Ok` segment whose
/// `complete` is set, or one `Err` carrying the terminal source fault.
pub trait SegmentSink {
    fn deliver(&mut self, event: Result<Segment, ReaderError>);
}

impl<F> SegmentSink for F
where
    F: FnMut(Result<Segment, ReaderError>),
{
    fn deliver(&mut self, event: Result<Segment, ReaderError>) {
        self(event)
    }
}

/// Sink that records every event behind a shared handle.
///
/// Clone it before handing it to a reader to inspect the events afterwards.
#[derive(Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<Result<Segment, ReaderError>>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Result<Segment, ReaderError>>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of sink invocations so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Successfully delivered segments, in order.
    pub fn segments(&self) -> Vec<Segment> {
        self.lock().iter().filter_map(|e| e.as_ref().ok().cloned()).collect()
    }

    /// Rendered error events, in order.
    pub fn errors(&self) -> Vec<String> {
        self.lock().iter().filter_map(|e| e.as_ref().err().map(|err| err.to_string())).collect()
    }

    /// Payloads concatenated in delivery order.
    pub fn bytes(&self) -> Vec<u8> {
        crate::utils::segments_to_bytes(&self.segments())
    }

    pub fn completions(&self) -> usize {
        self.lock().iter().filter(|e| matches!(e, Ok(s) if s.complete)).count()
    }

    /// True when the most recent event is a completed segment.
    pub fn is_complete(&self) -> bool {
        matches!(self.lock().last(), Some(Ok(s)) if s.complete)
    }

    /// Drain all recorded events.
    pub fn take(&self) -> Vec<Result<Segment, ReaderError>> {
        std::mem::take(&mut *self.lock())
    }
}

impl SegmentSink for CollectingSink {
    fn deliver(&mut self, event: Result<Segment, ReaderError>) {
        self.lock().push(event);
    }
}
