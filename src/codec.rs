//! `tokio_util` decoder over the frame reassembler.
//!
//! [`HciDecoder`] lets an asynchronous serial port be consumed with
//! [`tokio_util::codec::FramedRead`] as a stream of packets. Each call to
//! [`Decoder::decode`] drains the read buffer through the reassembler and
//! queues every completed packet, so the buffer never holds a partial frame.
//!
//! # Error Handling
//!
//! Noise, oversized frames and allocation failures are absorbed by the
//! reassembler. The stream only fails when it ends mid-frame, reported as an
//! [`EofError`] wrapped in an [`io::Error`] of kind
//! [`io::ErrorKind::UnexpectedEof`].

use std::{collections::VecDeque, fmt, io};

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::{
    allocator::{HeapAllocator, PacketAllocator},
    config::ReassemblerConfig,
    format::PacketFormat,
    reassembler::{ParserState, Reassembler},
};

pub mod error;

pub use error::{CodecError, EofError};

/// Decoder yielding reassembled packets from a byte stream.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use hciframe::{HciDecoder, RawFormat, ReassemblerConfig};
/// use tokio_util::codec::Decoder;
///
/// let mut decoder = HciDecoder::new(RawFormat, ReassemblerConfig::default());
/// let mut buf = BytesMut::from(&[0x01_u8, 0x03, 0x0C, 0x00, 0x01, 0x03][..]);
///
/// let packet = decoder.decode(&mut buf).expect("decode").expect("packet");
/// assert_eq!(packet.as_bytes(), &[0x01, 0x03, 0x0C, 0x00]);
/// assert!(decoder.decode(&mut buf).expect("decode").is_none());
/// assert!(buf.is_empty());
/// ```
pub struct HciDecoder<F: PacketFormat, A = HeapAllocator> {
    reassembler: Reassembler<F, A>,
    ready: VecDeque<F::Packet>,
}

impl<F: PacketFormat> HciDecoder<F> {
    /// Create a decoder allocating packet buffers from the heap.
    #[must_use]
    pub fn new(format: F, config: ReassemblerConfig) -> Self {
        Self::from_reassembler(Reassembler::new(format, config))
    }
}

impl<F, A> HciDecoder<F, A>
where
    F: PacketFormat,
    A: PacketAllocator,
{
    /// Create a decoder using a custom allocator.
    #[must_use]
    pub fn with_allocator(format: F, allocator: A, config: ReassemblerConfig) -> Self {
        Self::from_reassembler(Reassembler::with_allocator(format, allocator, config))
    }

    /// Wrap an existing reassembler. Any registered callback is bypassed
    /// while the decoder drives it.
    #[must_use]
    pub fn from_reassembler(reassembler: Reassembler<F, A>) -> Self {
        Self {
            reassembler,
            ready: VecDeque::new(),
        }
    }

    /// The underlying reassembler.
    #[must_use]
    pub fn reassembler(&self) -> &Reassembler<F, A> { &self.reassembler }

    /// Packets decoded but not yet yielded.
    #[must_use]
    pub fn pending(&self) -> usize { self.ready.len() }

    /// Consume the decoder, returning the reassembler. Queued packets are
    /// dropped.
    #[must_use]
    pub fn into_reassembler(self) -> Reassembler<F, A> { self.reassembler }

    fn eof_error(&self) -> Option<EofError> {
        match self.reassembler.state() {
            ParserState::AwaitingPacketType => None,
            ParserState::CommandPayload | ParserState::DataPayload => {
                let progress = self.reassembler.progress()?;
                Some(EofError::MidFrame {
                    bytes_received: progress.received,
                    expected: progress.expected,
                })
            }
            ParserState::Flushing => Some(EofError::MidFlush {
                remaining: self.reassembler.flush_remaining().unwrap_or_default(),
            }),
            state => Some(EofError::MidHeader { state }),
        }
    }
}

impl<F, A> Decoder for HciDecoder<F, A>
where
    F: PacketFormat,
    A: PacketAllocator,
{
    type Item = F::Packet;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.ready.is_empty() && !src.is_empty() {
            let ready = &mut self.ready;
            self.reassembler
                .drain(src, &mut |_, packet| ready.push_back(packet));
        }
        Ok(self.ready.pop_front())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(packet) = self.decode(src)? {
            return Ok(Some(packet));
        }
        match self.eof_error() {
            None => Ok(None),
            Some(eof) => {
                tracing::debug!(error = %eof, "stream ended mid-frame");
                self.reassembler.reset();
                Err(eof.into())
            }
        }
    }
}

impl<F, A> fmt::Debug for HciDecoder<F, A>
where
    F: PacketFormat + fmt::Debug,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HciDecoder")
            .field("reassembler", &self.reassembler)
            .field("pending", &self.ready.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
