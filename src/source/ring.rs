//! Bounded receive ring standing in for a UART driver's RX buffer.

use std::{collections::VecDeque, num::NonZeroUsize};

use super::ByteSource;

/// Fixed-capacity FIFO filled by a receive path and drained by the
/// reassembler.
///
/// Bytes that arrive while the ring is full are dropped; [`RxRing::push`]
/// reports how many were accepted so the producer can account for overruns.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use hciframe::{ByteSource, RxRing};
///
/// let mut ring = RxRing::new(NonZeroUsize::new(4).expect("non-zero capacity"));
/// assert_eq!(ring.push(&[1, 2, 3, 4, 5]), 4);
/// assert_eq!(ring.available(), 4);
/// assert_eq!(ring.read_byte(), Some(1));
/// ```
#[derive(Debug)]
pub struct RxRing {
    capacity: NonZeroUsize,
    bytes: VecDeque<u8>,
    overruns: usize,
}

impl RxRing {
    /// Create an empty ring holding at most `capacity` bytes.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            bytes: VecDeque::with_capacity(capacity.get()),
            overruns: 0,
        }
    }

    /// Append received bytes, returning how many fitted.
    pub fn push(&mut self, data: &[u8]) -> usize {
        let accepted = data.len().min(self.free());
        self.bytes.extend(&data[..accepted]);
        let dropped = data.len() - accepted;
        if dropped > 0 {
            self.overruns += dropped;
            tracing::warn!(dropped, capacity = self.capacity.get(), "rx ring overrun");
        }
        accepted
    }

    /// Remaining space before the ring starts dropping bytes.
    #[must_use]
    pub fn free(&self) -> usize { self.capacity.get() - self.bytes.len() }

    /// Maximum number of buffered bytes.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize { self.capacity }

    /// Total bytes dropped because the ring was full.
    #[must_use]
    pub fn overruns(&self) -> usize { self.overruns }

    /// Whether no bytes are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }
}

impl ByteSource for RxRing {
    fn available(&self) -> usize { self.bytes.len() }

    fn read(&mut self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.bytes.len());
        for (slot, byte) in dst.iter_mut().zip(self.bytes.drain(..count)) {
            *slot = byte;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::RxRing;
    use crate::source::ByteSource;

    fn ring(capacity: usize) -> RxRing {
        RxRing::new(NonZeroUsize::new(capacity).expect("non-zero capacity"))
    }

    #[test]
    fn push_drops_bytes_beyond_capacity() {
        let mut rx = ring(3);

        assert_eq!(rx.push(&[1, 2]), 2);
        assert_eq!(rx.push(&[3, 4, 5]), 1);
        assert_eq!(rx.overruns(), 2);
        assert_eq!(rx.free(), 0);
    }

    #[test]
    fn reads_preserve_order_across_wraparound() {
        let mut rx = ring(4);
        let mut dst = [0_u8; 3];

        rx.push(&[1, 2, 3]);
        assert_eq!(rx.read(&mut dst), 3);
        rx.push(&[4, 5, 6, 7]);

        let mut rest = [0_u8; 4];
        assert_eq!(rx.read(&mut rest), 4);
        assert_eq!(rest, [4, 5, 6, 7]);
        assert!(rx.is_empty());
    }
}
