use bytes::Bytes;
use crossbeam::channel::Receiver;

use crate::types::SourceError;

/// Notification published by a byte source.
#[derive(Debug)]
pub enum SourceEvent {
    /// `try_take` would now return a chunk. May be spurious.
    DataAvailable,
    /// No further data will be produced. Fires once. Chunks already queued
    /// inside the source remain retrievable afterwards.
    Ended,
    /// The source faulted; nothing more will arrive.
    Failed(SourceError),
}

/// Pull-style, notification-driven producer of byte chunks.
///
/// Chunk sizes are arbitrary and carry no alignment guarantee.
pub trait ByteSource {
    /// Take the next resident chunk, or `None` if nothing is resident right now.
    ///
    /// Must never block.
    fn try_take(&mut self) -> Result<Option<Bytes>, SourceError>;

    /// Hand over the notification channel. Only the first call yields a receiver.
    fn subscribe(&mut self) -> Option<Receiver<SourceEvent>>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn try_take(&mut self) -> Result<Option<Bytes>, SourceError> {
        (**self).try_take()
    }

    fn subscribe(&mut self) -> Option<Receiver<SourceEvent>> {
        (**self).subscribe()
    }
}
