//! Single-allocation packet buffer with a fixed header region and an
//! append-only payload region.
//!
//! The declared payload length is captured when the buffer is created, and
//! every write is bounds-checked against it, so a frame can never grow past
//! what its header announced.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Errors raised by bounds-checked [`FrameBuffer`] writes.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FrameBufferError {
    /// A write would exceed the declared payload length.
    #[error("payload overflow: {attempted} bytes written with {remaining} remaining")]
    Overflow {
        /// Bytes the caller tried to add.
        attempted: usize,
        /// Payload bytes still expected.
        remaining: usize,
    },
}

/// Packet buffer laid out as `header | payload`.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use hciframe::FrameBuffer;
///
/// let mut buffer = FrameBuffer::new(BytesMut::new(), 2, 3);
/// buffer.header_mut().copy_from_slice(&[0xAA, 0xBB]);
/// buffer.append(&[1, 2]).expect("within declared length");
/// assert!(!buffer.is_complete());
/// buffer.append(&[3]).expect("within declared length");
/// assert!(buffer.is_complete());
/// assert!(buffer.append(&[4]).is_err());
/// assert_eq!(&buffer.freeze()[..], &[0xAA, 0xBB, 1, 2, 3]);
/// ```
#[derive(Debug)]
pub struct FrameBuffer {
    bytes: BytesMut,
    header_len: usize,
    payload_len: usize,
    received: usize,
}

impl FrameBuffer {
    /// Lay out `storage` as a buffer of exactly `header_len + payload_len`
    /// bytes. Any existing contents of `storage` are discarded.
    #[must_use]
    pub fn new(mut storage: BytesMut, header_len: usize, payload_len: usize) -> Self {
        storage.clear();
        storage.resize(header_len + payload_len, 0);
        Self {
            bytes: storage,
            header_len,
            payload_len,
            received: 0,
        }
    }

    /// Mutable view of the header region.
    pub fn header_mut(&mut self) -> &mut [u8] { &mut self.bytes[..self.header_len] }

    /// The header region.
    #[must_use]
    pub fn header(&self) -> &[u8] { &self.bytes[..self.header_len] }

    /// Payload bytes received so far.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.bytes[self.header_len..self.header_len + self.received]
    }

    /// Length of the header region.
    #[must_use]
    pub const fn header_len(&self) -> usize { self.header_len }

    /// Payload length declared at construction.
    #[must_use]
    pub const fn payload_len(&self) -> usize { self.payload_len }

    /// Number of payload bytes written so far.
    #[must_use]
    pub const fn received(&self) -> usize { self.received }

    /// Payload bytes still expected.
    #[must_use]
    pub const fn remaining(&self) -> usize { self.payload_len - self.received }

    /// Whether every declared payload byte has been written.
    #[must_use]
    pub const fn is_complete(&self) -> bool { self.received == self.payload_len }

    /// Total size of the buffer, header included.
    #[must_use]
    pub const fn total_len(&self) -> usize { self.header_len + self.payload_len }

    /// Append payload bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FrameBufferError::Overflow`] if `data` is longer than the
    /// remaining declared payload. Nothing is written in that case.
    pub fn append(&mut self, data: &[u8]) -> Result<(), FrameBufferError> {
        let remaining = self.remaining();
        if data.len() > remaining {
            return Err(FrameBufferError::Overflow {
                attempted: data.len(),
                remaining,
            });
        }
        let start = self.header_len + self.received;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        self.received += data.len();
        Ok(())
    }

    /// The unwritten tail of the payload region, for reading directly from a
    /// byte source. Follow with [`FrameBuffer::commit`].
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        let start = self.header_len + self.received;
        &mut self.bytes[start..]
    }

    /// Mark `count` bytes of [`FrameBuffer::unfilled_mut`] as written.
    ///
    /// # Errors
    ///
    /// Returns [`FrameBufferError::Overflow`] if `count` exceeds the
    /// remaining declared payload.
    pub fn commit(&mut self, count: usize) -> Result<(), FrameBufferError> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(FrameBufferError::Overflow {
                attempted: count,
                remaining,
            });
        }
        self.received += count;
        Ok(())
    }

    /// Freeze the whole buffer, header included. Unwritten payload bytes are
    /// zero.
    #[must_use]
    pub fn freeze(self) -> Bytes { self.bytes.freeze() }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::{FrameBuffer, FrameBufferError};

    #[test]
    fn zero_length_payload_is_complete_immediately() {
        let buffer = FrameBuffer::new(BytesMut::new(), 4, 0);
        assert!(buffer.is_complete());
        assert_eq!(buffer.total_len(), 4);
    }

    #[test]
    fn commit_rejects_counts_past_declared_length() {
        let mut buffer = FrameBuffer::new(BytesMut::new(), 1, 2);
        assert_eq!(buffer.unfilled_mut().len(), 2);
        assert_eq!(
            buffer.commit(3),
            Err(FrameBufferError::Overflow {
                attempted: 3,
                remaining: 2
            })
        );
        assert_eq!(buffer.received(), 0);
    }

    #[test]
    fn unfilled_region_shrinks_as_payload_arrives() {
        let mut buffer = FrameBuffer::new(BytesMut::zeroed(16), 1, 3);
        buffer.unfilled_mut()[0] = 7;
        buffer.commit(1).expect("one byte fits");

        assert_eq!(buffer.unfilled_mut().len(), 2);
        assert_eq!(buffer.payload(), &[7]);
        assert_eq!(buffer.total_len(), 4);
    }
}
