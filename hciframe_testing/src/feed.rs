//! Helpers replaying a byte stream into a reassembler.

use hciframe::{PacketAllocator, PacketFormat, Reassembler};

/// Pump `stream` in pieces of `chunk` bytes, returning the number of
/// completed frames.
///
/// # Panics
///
/// Panics if `chunk` is zero.
pub fn feed_in_chunks<F, A>(
    reassembler: &mut Reassembler<F, A>,
    stream: &[u8],
    chunk: usize,
) -> u64
where
    F: PacketFormat,
    A: PacketAllocator,
{
    assert!(chunk > 0, "chunk size must be non-zero");
    stream
        .chunks(chunk)
        .map(|mut piece| reassembler.pump(&mut piece))
        .sum()
}

/// Pump `stream` split at the given offsets. Offsets must be ascending and
/// within the stream.
pub fn feed_at_splits<F, A>(
    reassembler: &mut Reassembler<F, A>,
    stream: &[u8],
    splits: &[usize],
) -> u64
where
    F: PacketFormat,
    A: PacketAllocator,
{
    let mut completed = 0;
    let mut start = 0;
    for &end in splits.iter().chain(std::iter::once(&stream.len())) {
        let mut piece = &stream[start..end];
        completed += reassembler.pump(&mut piece);
        start = end;
    }
    completed
}
