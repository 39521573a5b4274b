/// Defaults when `Option<T>` is None in `ReaderConfig`.
///
/// Segment size handed to the sink: 2.5 MiB.
pub const DEFAULT_SEGMENT_SIZE: usize = 2_621_440;

/// Smallest accepted segment size (one byte segments are legal).
pub const MIN_SEGMENT_SIZE: usize = 1;
/// Max segment size sanity bound (256 MiB).
pub const MAX_SEGMENT_SIZE: usize = 256 * 1024 * 1024;

/// Size of a single read issued by the file source thread.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB
/// Max read chunk sanity bound (32 MiB).
pub const MAX_READ_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Number of chunks the file source may hold ahead of the consumer.
pub const DEFAULT_SOURCE_CAPACITY: usize = 16;
pub const MAX_SOURCE_CAPACITY: usize = 4096;

