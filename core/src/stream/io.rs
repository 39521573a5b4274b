// ## Metadata lookup + chunked file reads

use std::fs;
use std::io::Read;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::ReaderError;
use crate::utils::size_estimate_hint;

/// What `initialize()` reports about the target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Base name of the path.
    pub name: String,
    /// Byte length at lookup time.
    pub size: u64,
    /// `ceil(size / segment_size)`. Advisory only.
    pub size_estimate_hint: u64,
}

/// Stat `path` and describe it for a session using `segment_size`.
///
/// Fails with `FileNotFound` when nothing exists at the path and with `Access`
/// for everything else, including paths that are not regular files.
pub fn lookup_metadata(path: &Path, segment_size: usize) -> Result<FileMetadata, ReaderError> {
    let meta = fs::metadata(path).map_err(|e| ReaderError::from_lookup(path.to_path_buf(), e))?;

    if !meta.is_file() {
        return Err(ReaderError::Access {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileMetadata {
        name,
        size: meta.len(),
        size_estimate_hint: size_estimate_hint(meta.len(), segment_size),
    })
}

/// Read up to `len` bytes, stopping early only at EOF.
///
/// Returns an empty buffer at EOF. Interrupted reads are retried.
pub fn read_exact_or_eof<R: Read>(r: &mut R, len: usize) -> std::io::Result<Bytes> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(off);
    Ok(Bytes::from(buf))
}
