//! Flat byte-buffer representation.

use bytes::Bytes;

use super::{FrameHeader, PacketFormat};
use crate::{buffer::FrameBuffer, packet::PacketType};

/// Format emitting each frame as a single [`RawPacket`] buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawFormat;

impl PacketFormat for RawFormat {
    type Packet = RawPacket;

    fn header_len(&self, header: &FrameHeader) -> usize { header.wire_header_len() }

    fn write_header(&self, header: &FrameHeader, region: &mut [u8]) {
        header.write_wire_header(region);
    }

    fn finalize(&self, header: &FrameHeader, buffer: FrameBuffer) -> RawPacket {
        RawPacket {
            packet_type: header.packet_type(),
            header_len: buffer.header_len(),
            bytes: buffer.freeze(),
        }
    }
}

/// A complete frame as wire bytes: tag, header fields, then payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawPacket {
    packet_type: PacketType,
    header_len: usize,
    bytes: Bytes,
}

impl RawPacket {
    /// Packet family.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType { self.packet_type }

    /// Header bytes, tag included.
    #[must_use]
    pub fn header(&self) -> &[u8] { &self.bytes[..self.header_len] }

    /// Payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.bytes[self.header_len..] }

    /// The whole frame.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// Consume the packet, returning the frame buffer.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.bytes }
}
