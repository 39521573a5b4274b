use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::stream::source::types::{ByteSource, SourceEvent};
use crate::types::SourceError;

/// In-memory byte source driven by a `MemorySourceHandle`.
///
/// The handle decides when chunks become resident and when the end and failure
/// notifications fire, which makes every interleaving of pulls, data and end
/// reproducible.
pub struct MemorySource {
    queue: Arc<Mutex<VecDeque<Bytes>>>,
    take_fault: Arc<Mutex<Option<SourceError>>>,
    events: Option<Receiver<SourceEvent>>,
}

/// Producer side of a `MemorySource`.
#[derive(Clone)]
pub struct MemorySourceHandle {
    queue: Arc<Mutex<VecDeque<Bytes>>>,
    take_fault: Arc<Mutex<Option<SourceError>>>,
    events: Sender<SourceEvent>,
    ended: Arc<Mutex<bool>>,
}

impl MemorySource {
    pub fn pair() -> (Self, MemorySourceHandle) {
        let queue = Arc::new(Mutex::new(VecDeque::new()));
        let take_fault = Arc::new(Mutex::new(None));
        let (tx, rx) = unbounded();
        let source = Self {
            queue: queue.clone(),
            take_fault: take_fault.clone(),
            events: Some(rx),
        };
        let handle = MemorySourceHandle {
            queue,
            take_fault,
            events: tx,
            ended: Arc::new(Mutex::new(false)),
        };
        (source, handle)
    }

    /// Source holding `chunks` that has already announced its end.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Bytes>,
    {
        let (source, handle) = Self::pair();
        for chunk in chunks {
            handle.push(chunk);
        }
        handle.end();
        source
    }

    /// Number of chunks still resident.
    pub fn resident(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl MemorySourceHandle {
    /// Make `chunk` resident and publish `DataAvailable`.
    pub fn push(&self, chunk: impl Into<Bytes>) {
        self.push_quiet(chunk);
        let _ = self.events.send(SourceEvent::DataAvailable);
    }

    /// Make `chunk` resident without notifying.
    pub fn push_quiet(&self, chunk: impl Into<Bytes>) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(chunk.into());
    }

    /// Publish `Ended`. Later calls are ignored.
    pub fn end(&self) {
        let mut ended = self.ended.lock().unwrap_or_else(PoisonError::into_inner);
        if !*ended {
            *ended = true;
            let _ = self.events.send(SourceEvent::Ended);
        }
    }

    /// Publish a terminal failure.
    pub fn fail(&self, err: SourceError) {
        let _ = self.events.send(SourceEvent::Failed(err));
    }

    /// Make the next `try_take` fail with `err` instead of returning a chunk.
    ///
    /// Nothing is published; the fault surfaces on the consumer's next drain.
    pub fn fail_next_take(&self, err: SourceError) {
        *self.take_fault.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
    }

    /// Publish a `DataAvailable` that is not backed by data.
    pub fn notify_spurious(&self) {
        let _ = self.events.send(SourceEvent::DataAvailable);
    }
}

impl ByteSource for MemorySource {
    fn try_take(&mut self) -> Result<Option<Bytes>, SourceError> {
        if let Some(err) = self.take_fault.lock().unwrap_or_else(PoisonError::into_inner).take() {
            return Err(err);
        }
        Ok(self.queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front())
    }

    fn subscribe(&mut self) -> Option<Receiver<SourceEvent>> {
        self.events.take()
    }
}
