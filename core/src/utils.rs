use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

/// Advisory segment count for a file of `size` bytes.
///
/// Informational only. Nothing in the reader compares against it.
pub fn size_estimate_hint(size: u64, segment_size: usize) -> u64 {
    if segment_size == 0 {
        return 0;
    }
    size.div_ceil(segment_size as u64)
}

/// Take up to `len` bytes off the front of `chunks`.
///
/// Returns the taken bytes; whatever is left stays in `chunks` as a single
/// remainder chunk. Zero-copy when the head chunk alone covers `len`.
pub fn split_front(chunks: &mut VecDeque<Bytes>, len: usize) -> Bytes {
    let Some(head) = chunks.front_mut() else {
        return Bytes::new();
    };

    if head.len() >= len {
        let out = head.split_to(len);
        if head.is_empty() {
            chunks.pop_front();
        }
        return out;
    }

    let total: usize = chunks.iter().map(Bytes::len).sum();
    let mut joined = BytesMut::with_capacity(total);
    for chunk in chunks.drain(..) {
        joined.extend_from_slice(&chunk);
    }

    let take = len.min(joined.len());
    let out = joined.split_to(take).freeze();
    if !joined.is_empty() {
        chunks.push_back(joined.freeze());
    }
    out
}

/// Concatenate segment payloads in order.
pub fn segments_to_bytes(segments: &[impl AsRef<[u8]>]) -> Vec<u8> {
    segments.iter().flat_map(|s| s.as_ref()).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_rounds_up() {
        assert_eq!(size_estimate_hint(0, 4), 0);
        assert_eq!(size_estimate_hint(4, 4), 1);
        assert_eq!(size_estimate_hint(5, 4), 2);
    }

    #[test]
    fn split_front_zero_copy_head() {
        let mut chunks: VecDeque<Bytes> = VecDeque::from(vec![Bytes::from_static(b"abcdef")]);
        let out = split_front(&mut chunks, 4);
        assert_eq!(&out[..], b"abcd");
        assert_eq!(chunks.len(), 1);
        assert_eq!(&chunks[0][..], b"ef");
    }

    #[test]
    fn split_front_joins_and_keeps_remainder() {
        let mut chunks: VecDeque<Bytes> = VecDeque::from(vec![
            Bytes::from_static(b"ab"),
            Bytes::from_static(b"cd"),
            Bytes::from_static(b"efg"),
        ]);
        let out = split_front(&mut chunks, 5);
        assert_eq!(&out[..], b"abcde");
        assert_eq!(chunks.len(), 1);
        assert_eq!(&chunks[0][..], b"fg");
    }

    #[test]
    fn split_front_short_buffer_takes_all() {
        let mut chunks: VecDeque<Bytes> = VecDeque::from(vec![
            Bytes::from_static(b"ab"),
            Bytes::from_static(b"c"),
        ]);
        let out = split_front(&mut chunks, 10);
        assert_eq!(&out[..], b"abc");
        assert!(chunks.is_empty());
    }
}
