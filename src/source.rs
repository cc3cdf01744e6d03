//! Non-blocking byte sources feeding the reassembler.
//!
//! A [`ByteSource`] reports how many bytes are ready and copies them out in
//! order. It never waits: when nothing is available the reassembler simply
//! returns and resumes on the next pump.

use bytes::{Buf, BytesMut};

mod ring;

pub use ring::RxRing;

/// Ordered, non-blocking supply of inbound bytes.
pub trait ByteSource {
    /// Number of bytes that can be read right now.
    fn available(&self) -> usize;

    /// Copy up to `dst.len()` bytes into `dst`, returning how many were
    /// written. Implementations must never report more than `dst.len()`.
    fn read(&mut self, dst: &mut [u8]) -> usize;

    /// Read a single byte, if one is available.
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0_u8; 1];
        (self.read(&mut byte) == 1).then_some(byte[0])
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn available(&self) -> usize { (**self).available() }

    fn read(&mut self, dst: &mut [u8]) -> usize { (**self).read(dst) }
}

impl ByteSource for BytesMut {
    fn available(&self) -> usize { self.len() }

    fn read(&mut self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.len());
        dst[..count].copy_from_slice(&self[..count]);
        self.advance(count);
        count
    }
}

impl ByteSource for &[u8] {
    fn available(&self) -> usize { self.len() }

    fn read(&mut self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.len());
        let (head, tail) = self.split_at(count);
        dst[..count].copy_from_slice(head);
        *self = tail;
        count
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::ByteSource;

    #[test]
    fn bytes_mut_reads_from_the_front() {
        let mut source = BytesMut::from(&[1_u8, 2, 3, 4][..]);
        let mut dst = [0_u8; 3];

        assert_eq!(source.read(&mut dst), 3);
        assert_eq!(dst, [1, 2, 3]);
        assert_eq!(source.available(), 1);
        assert_eq!(source.read_byte(), Some(4));
        assert_eq!(source.read_byte(), None);
    }

    #[test]
    fn slice_source_advances() {
        let data = [9_u8, 8, 7];
        let mut source: &[u8] = &data;
        let mut dst = [0_u8; 8];

        assert_eq!(source.read(&mut dst), 3);
        assert_eq!(&dst[..3], &[9, 8, 7]);
        assert_eq!(source.available(), 0);
    }
}
