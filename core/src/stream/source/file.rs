use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use crossbeam::channel::{bounded, never, unbounded, Receiver, Sender, TryRecvError};

use crate::stream::io::read_exact_or_eof;
use crate::stream::source::types::{ByteSource, SourceEvent};
use crate::types::SourceError;

/// File-backed byte source.
///
/// A reader thread fills a bounded channel of `capacity` chunks; that bound is
/// the only read-ahead the source performs. `Ended` is published as soon as the
/// last chunk is queued, so chunks may still be waiting in the channel when it
/// arrives.
///
/// Dropping the source disconnects the chunk channel and joins the reader
/// thread. A thread parked on a full channel wakes immediately; one inside a
/// `read` call finishes that read first.
pub struct FileSource {
    chunks: Receiver<Bytes>,
    reader: Option<JoinHandle<()>>,
    events: Option<Receiver<SourceEvent>>,
    // Edge trigger: set by the producer when it queues a chunk, cleared by
    // `try_take` once it observes the channel empty.
    signalled: Arc<AtomicBool>,
}

impl FileSource {
    pub fn open(path: &Path, chunk_size: usize, capacity: usize) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::spawn(file, chunk_size, capacity))
    }

    /// Start the reader thread over any `Read` implementation.
    pub fn spawn<R>(reader: R, chunk_size: usize, capacity: usize) -> Self
    where
        R: std::io::Read + Send + 'static,
    {
        let (chunk_tx, chunk_rx) = bounded::<Bytes>(capacity.max(1));
        let (event_tx, event_rx) = unbounded::<SourceEvent>();
        let signalled = Arc::new(AtomicBool::new(false));

        let flag = signalled.clone();
        let handle = thread::spawn(move || produce(reader, chunk_size, chunk_tx, event_tx, flag));

        Self {
            chunks: chunk_rx,
            reader: Some(handle),
            events: Some(event_rx),
            signalled,
        }
    }
}

fn produce<R: std::io::Read>(
    mut reader: R,
    chunk_size: usize,
    chunk_tx: Sender<Bytes>,
    event_tx: Sender<SourceEvent>,
    signalled: Arc<AtomicBool>,
) {
    let mut sent = 0u64;
    loop {
        match read_exact_or_eof(&mut reader, chunk_size) {
            Ok(buf) if buf.is_empty() => {
                log::debug!("[SOURCE] EOF after {} chunks, publishing end", sent);
                let _ = event_tx.send(SourceEvent::Ended);
                return;
            }
            Ok(buf) => {
                // Blocks while `capacity` chunks are unclaimed.
                if chunk_tx.send(buf).is_err() {
                    log::debug!("[SOURCE] consumer dropped, stopping after {} chunks", sent);
                    return;
                }
                sent += 1;
                if !signalled.swap(true, Ordering::SeqCst) {
                    let _ = event_tx.send(SourceEvent::DataAvailable);
                }
            }
            Err(err) => {
                log::warn!("[SOURCE] read failed after {} chunks: {}", sent, err);
                let _ = event_tx.send(SourceEvent::Failed(SourceError::Io(err)));
                return;
            }
        }
    }
}

impl ByteSource for FileSource {
    fn try_take(&mut self) -> Result<Option<Bytes>, SourceError> {
        match self.chunks.try_recv() {
            Ok(chunk) => return Ok(Some(chunk)),
            Err(TryRecvError::Disconnected) => return Ok(None),
            Err(TryRecvError::Empty) => {}
        }

        // Re-arm the trigger, then look again so a chunk queued in between is
        // either returned here or announced by a fresh notification.
        self.signalled.store(false, Ordering::SeqCst);
        match self.chunks.try_recv() {
            Ok(chunk) => Ok(Some(chunk)),
            Err(_) => Ok(None),
        }
    }

    fn subscribe(&mut self) -> Option<Receiver<SourceEvent>> {
        self.events.take()
    }
}

impl Drop for FileSource {
    fn drop(&mut self) {
        // Release the receiving end first so a blocked `send` returns.
        drop(std::mem::replace(&mut self.chunks, never()));
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                log::warn!("[SOURCE] reader thread panicked");
            }
        }
    }
}
