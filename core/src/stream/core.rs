// ## Stable public API: configuration, session lifecycle, event dispatch

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::constants::{
    DEFAULT_READ_CHUNK_SIZE, DEFAULT_SEGMENT_SIZE, DEFAULT_SOURCE_CAPACITY, MAX_READ_CHUNK_SIZE,
    MAX_SEGMENT_SIZE, MAX_SOURCE_CAPACITY, MIN_SEGMENT_SIZE,
};
use crate::stream::io::{lookup_metadata, FileMetadata};
use crate::stream::segmenting::{SegmentAssembler, SegmentSink};
use crate::stream::source::{ByteSource, FileSource, SourceEvent};
use crate::telemetry::{Stage, TelemetrySnapshot};
use crate::types::{ReaderError, SourceError};

/// Construction input for a `SegmentedReader`.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// Required. File to read.
    pub file_path: PathBuf,

    /// Bytes per emitted segment.
    /// - `None` → `DEFAULT_SEGMENT_SIZE` (2.5 MiB).
    pub segment_size: Option<usize>,

    /// Bytes per read issued by the file source thread.
    /// - `None` → `DEFAULT_READ_CHUNK_SIZE`.
    pub read_chunk_size: Option<usize>,

    /// Chunks the file source may queue ahead of the consumer.
    /// - `None` → `DEFAULT_SOURCE_CAPACITY`.
    pub source_capacity: Option<usize>,
}

impl ReaderConfig {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    pub fn with_segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = Some(segment_size);
        self
    }

    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = Some(read_chunk_size);
        self
    }

    pub fn with_source_capacity(mut self, source_capacity: usize) -> Self {
        self.source_capacity = Some(source_capacity);
        self
    }
}

/// `ReaderConfig` with every default applied and every bound checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub file_path: PathBuf,
    pub segment_size: usize,
    pub read_chunk_size: usize,
    pub source_capacity: usize,
}

pub fn validate_reader_config(config: &ReaderConfig) -> Result<ResolvedConfig, ReaderError> {
    if config.file_path.as_os_str().is_empty() {
        return Err(ReaderError::Config("file path is required".into()));
    }

    // --- Resolve defaults ---
    let segment_size = config.segment_size.unwrap_or(DEFAULT_SEGMENT_SIZE);
    let read_chunk_size = config.read_chunk_size.unwrap_or(DEFAULT_READ_CHUNK_SIZE);
    let source_capacity = config.source_capacity.unwrap_or(DEFAULT_SOURCE_CAPACITY);

    if !(MIN_SEGMENT_SIZE..=MAX_SEGMENT_SIZE).contains(&segment_size) {
        return Err(ReaderError::Config(format!(
            "invalid segment size: {segment_size}, must be within {MIN_SEGMENT_SIZE}..={MAX_SEGMENT_SIZE}"
        )));
    }
    if !(1..=MAX_READ_CHUNK_SIZE).contains(&read_chunk_size) {
        return Err(ReaderError::Config(format!(
            "invalid read chunk size: {read_chunk_size}, must be within 1..={MAX_READ_CHUNK_SIZE}"
        )));
    }
    if !(1..=MAX_SOURCE_CAPACITY).contains(&source_capacity) {
        return Err(ReaderError::Config(format!(
            "invalid source capacity: {source_capacity}, must be within 1..={MAX_SOURCE_CAPACITY}"
        )));
    }

    Ok(ResolvedConfig {
        file_path: config.file_path.clone(),
        segment_size,
        read_chunk_size,
        source_capacity,
    })
}

/// Lifecycle of a read session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed; no I/O performed yet.
    Created,
    /// Source open and notifications wired.
    Active,
    /// Completion or a terminal error delivered; source released.
    Terminated,
}

/// Reads one file and delivers it to a sink as fixed-size segments, one
/// segment per `pull()` at most.
///
/// The sink runs inside `pull()` and the dispatch methods, so it cannot call
/// back into the reader; consumers pull again after it returns.
pub struct SegmentedReader<K: SegmentSink> {
    config: ResolvedConfig,
    state: SessionState,
    source: Option<Box<dyn ByteSource>>,
    events: Option<Receiver<SourceEvent>>,
    assembler: SegmentAssembler<K>,
    metadata: Option<FileMetadata>,
}

impl<K: SegmentSink> SegmentedReader<K> {
    /// Validate `config` and build an inert session. No I/O happens here.
    pub fn new(config: ReaderConfig, sink: K) -> Result<Self, ReaderError> {
        let config = validate_reader_config(&config)?;
        Ok(Self {
            assembler: SegmentAssembler::new(config.segment_size, sink),
            config,
            state: SessionState::Created,
            source: None,
            events: None,
            metadata: None,
        })
    }

    /// Look up the file, open a `FileSource` on it and wire its notifications.
    pub fn initialize(&mut self) -> Result<FileMetadata, ReaderError> {
        self.initialize_with(|path, config| {
            let source = FileSource::open(path, config.read_chunk_size, config.source_capacity)
                .map_err(|e| ReaderError::from_lookup(path.to_path_buf(), e))?;
            Ok(Box::new(source) as Box<dyn ByteSource>)
        })
    }

    /// Same as `initialize`, with the byte source supplied by `open`.
    ///
    /// The metadata lookup still runs against the configured path; `open` is
    /// only called when it succeeds.
    pub fn initialize_with<F>(&mut self, open: F) -> Result<FileMetadata, ReaderError>
    where
        F: FnOnce(&Path, &ResolvedConfig) -> Result<Box<dyn ByteSource>, ReaderError>,
    {
        if self.state != SessionState::Created {
            return Err(ReaderError::State("session already initialized"));
        }

        self.assembler.restart_clock();
        let t = Instant::now();
        let metadata = lookup_metadata(&self.config.file_path, self.config.segment_size)?;
        let mut source = open(&self.config.file_path, &self.config)?;
        let events = source
            .subscribe()
            .ok_or(ReaderError::State("byte source notifications already taken"))?;
        self.assembler.record_stage(Stage::Open, t.elapsed());

        log::debug!(
            "[READER] opened {} ({} bytes, ~{} segments of {})",
            metadata.name,
            metadata.size,
            metadata.size_estimate_hint,
            self.config.segment_size
        );

        self.source = Some(source);
        self.events = Some(events);
        self.state = SessionState::Active;
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    /// Signal readiness for the next segment.
    ///
    /// Fails only when called before `initialize`. A no-op once terminated.
    pub fn pull(&mut self) -> Result<(), ReaderError> {
        match self.state {
            SessionState::Created => Err(ReaderError::State("pull before initialize")),
            SessionState::Terminated => Ok(()),
            SessionState::Active => {
                if let Some(source) = self.source.as_mut() {
                    self.assembler.pull(source);
                }
                self.retire_if_terminal();
                Ok(())
            }
        }
    }

    /// Deliver every notification already published by the source.
    ///
    /// Never blocks. Returns how many notifications were dispatched.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut dispatched = 0;
        while self.state == SessionState::Active {
            let Some(events) = self.events.as_ref() else { break };
            match events.try_recv() {
                Ok(event) => {
                    self.dispatch(event);
                    dispatched += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.on_disconnected();
                    break;
                }
            }
        }
        dispatched
    }

    /// Block until the source publishes one notification, then dispatch it.
    ///
    /// `timeout = None` waits indefinitely. Returns `Ok(false)` on timeout or
    /// when the session is not active.
    pub fn wait_event(&mut self, timeout: Option<Duration>) -> Result<bool, ReaderError> {
        if self.state == SessionState::Created {
            return Err(ReaderError::State("wait before initialize"));
        }
        let Some(events) = self.events.as_ref() else {
            return Ok(false);
        };

        let received = match timeout {
            Some(t) => events.recv_timeout(t),
            None => events.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(event) => {
                self.dispatch(event);
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => {
                self.on_disconnected();
                Ok(false)
            }
        }
    }

    /// Drive the session to its terminal event, pulling again after every emission.
    ///
    /// Returns the final telemetry, or the terminal source error.
    pub fn read_to_end(&mut self) -> Result<TelemetrySnapshot, ReaderError> {
        if self.state == SessionState::Created {
            return Err(ReaderError::State("read before initialize"));
        }

        while self.state == SessionState::Active {
            if !self.assembler.awaiting_pull() {
                self.pull()?;
                continue;
            }
            self.wait_event(None)?;
        }

        if let Some(err) = self.assembler.failure() {
            return Err(ReaderError::Source(err.duplicate()));
        }
        Ok(self.telemetry())
    }

    fn dispatch(&mut self, event: SourceEvent) {
        let Some(source) = self.source.as_mut() else { return };
        match event {
            SourceEvent::DataAvailable => self.assembler.on_data_available(source),
            SourceEvent::Ended => self.assembler.on_ended(source),
            SourceEvent::Failed(err) => self.assembler.on_failed(err),
        }
        self.retire_if_terminal();
    }

    // Producer vanished. Harmless after `Ended`; a fault before it.
    fn on_disconnected(&mut self) {
        self.events = None;
        if !self.assembler.is_ended() {
            self.assembler.on_failed(SourceError::Disconnected);
            self.retire_if_terminal();
        }
    }

    fn retire_if_terminal(&mut self) {
        if self.assembler.is_terminal() && self.state != SessionState::Terminated {
            let snapshot = self.assembler.snapshot();
            log::debug!(
                "[READER] session retired after {} segments, {} bytes (open {:.3} ms, drain {:.3} ms, emit {:.3} ms)",
                snapshot.segments_emitted,
                snapshot.bytes_emitted,
                snapshot.stage_times.get_ms(Stage::Open),
                snapshot.stage_times.get_ms(Stage::Drain),
                snapshot.stage_times.get_ms(Stage::Emit)
            );
            self.source = None;
            self.events = None;
            self.state = SessionState::Terminated;
        }
    }

    // ---- Inspection ----

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn metadata(&self) -> Option<&FileMetadata> {
        self.metadata.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.assembler.is_complete()
    }

    pub fn awaiting_pull(&self) -> bool {
        self.assembler.awaiting_pull()
    }

    pub fn segments_emitted(&self) -> u64 {
        self.assembler.segments_emitted()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.assembler.snapshot()
    }

    pub fn sink(&self) -> &K {
        self.assembler.sink()
    }
}
