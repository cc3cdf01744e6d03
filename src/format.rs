//! Output representations for reassembled frames.
//!
//! The reassembler is generic over a [`PacketFormat`], which decides how much
//! of the header is stored in the packet buffer, writes that header once the
//! buffer is allocated, and turns the completed buffer into the value handed
//! to the callback. Two formats ship with the crate:
//!
//! - [`RawFormat`] keeps every frame as one flat byte buffer, exactly as it
//!   appeared on the wire (after vendor opcode normalisation).
//! - [`TypedFormat`] splits frames into [`CommandPacket`]s routed by command
//!   class and [`DataPacket`]s with the connection handle and flags decoded.

use crate::{
    buffer::FrameBuffer,
    byte_order::write_wire_u16,
    packet::{HandleWithFlags, OPCODE_HIGH_STRIP_MASK, Opcode, PacketType},
};

mod raw;
mod typed;

pub use raw::{RawFormat, RawPacket};
pub use typed::{CommandPacket, CommandRoute, DataPacket, HciPacket, TypedFormat};

/// Header fields of a frame, complete once its length field has been read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    packet_type: PacketType,
    field: u16,
    declared_len: u16,
}

impl FrameHeader {
    /// Assemble a header from its decoded fields. `field` is the opcode for
    /// command packets and the handle-with-flags for data packets.
    #[must_use]
    pub const fn new(packet_type: PacketType, field: u16, declared_len: u16) -> Self {
        Self {
            packet_type,
            field,
            declared_len,
        }
    }

    /// Packet family.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType { self.packet_type }

    /// Opcode or handle field as received.
    #[must_use]
    pub const fn field(&self) -> u16 { self.field }

    /// Payload length announced by the header.
    #[must_use]
    pub const fn declared_len(&self) -> u16 { self.declared_len }

    /// The opcode, for command packets.
    #[must_use]
    pub const fn opcode(&self) -> Option<Opcode> {
        if self.packet_type.is_command() {
            Some(Opcode::new(self.field))
        } else {
            None
        }
    }

    /// The handle and flags, for data packets.
    #[must_use]
    pub const fn handle(&self) -> Option<HandleWithFlags> {
        if self.packet_type.is_command() {
            None
        } else {
            Some(HandleWithFlags::new(self.field))
        }
    }

    /// Whether the vendor group code is stripped from this frame's opcode.
    #[must_use]
    pub const fn strips_group_code(&self) -> bool {
        match self.opcode() {
            Some(opcode) => opcode.strips_group_code(),
            None => false,
        }
    }

    /// Header size on the wire.
    #[must_use]
    pub const fn wire_header_len(&self) -> usize { self.packet_type.header_len() }

    /// Total frame size on the wire, header and payload.
    #[must_use]
    pub const fn wire_len(&self) -> usize {
        self.wire_header_len() + self.declared_len as usize
    }

    /// Write the wire header into `dst`, applying vendor opcode
    /// normalisation to command frames.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is shorter than [`FrameHeader::wire_header_len`].
    pub fn write_wire_header(&self, dst: &mut [u8]) {
        let dst = &mut dst[..self.wire_header_len()];
        dst[0] = self.packet_type.tag();
        dst[1..3].copy_from_slice(&write_wire_u16(self.field));
        if self.strips_group_code() {
            dst[2] &= OPCODE_HIGH_STRIP_MASK;
        }
        match self.packet_type.length_field_len() {
            1 => dst[3] = self.declared_len.to_le_bytes()[0],
            _ => dst[3..5].copy_from_slice(&write_wire_u16(self.declared_len)),
        }
    }
}

/// Representation of reassembled packets.
///
/// The reassembler allocates `header_len + declared_len` bytes, calls
/// [`PacketFormat::write_header`] on the header region, streams the payload
/// into the rest, and passes the completed buffer to
/// [`PacketFormat::finalize`].
pub trait PacketFormat {
    /// Value delivered to the callback.
    type Packet;

    /// Number of header bytes this representation stores ahead of the
    /// payload.
    fn header_len(&self, header: &FrameHeader) -> usize;

    /// Fill the header region (exactly [`PacketFormat::header_len`] bytes).
    fn write_header(&self, header: &FrameHeader, region: &mut [u8]);

    /// Convert a completed buffer into a packet.
    fn finalize(&self, header: &FrameHeader, buffer: FrameBuffer) -> Self::Packet;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::FrameHeader;
    use crate::packet::PacketType;

    #[rstest]
    #[case::command(
        FrameHeader::new(PacketType::Command, 0x0C03, 2),
        vec![0x01, 0x03, 0x0C, 0x02]
    )]
    #[case::extended_command(
        FrameHeader::new(PacketType::ExtendedCommand, 0x2006, 0x0102),
        vec![0x09, 0x06, 0x20, 0x02, 0x01]
    )]
    #[case::vendor_command_stripped(
        FrameHeader::new(PacketType::Command, 0xFC81, 0),
        vec![0x01, 0x81, 0x00, 0x00]
    )]
    #[case::link_layer_vendor_command_kept(
        FrameHeader::new(PacketType::Command, 0xFC01, 0),
        vec![0x01, 0x01, 0xFC, 0x00]
    )]
    #[case::acl(
        FrameHeader::new(PacketType::AclData, 0x2042, 0x001B),
        vec![0x02, 0x42, 0x20, 0x1B, 0x00]
    )]
    fn writes_wire_headers(#[case] header: FrameHeader, #[case] expected: Vec<u8>) {
        let mut dst = vec![0_u8; header.wire_header_len()];
        header.write_wire_header(&mut dst);
        assert_eq!(dst, expected);
    }

    #[test]
    fn data_headers_never_strip() {
        let header = FrameHeader::new(PacketType::AclData, 0xFC81, 0);
        assert!(!header.strips_group_code());
        assert!(header.opcode().is_none());
        assert_eq!(header.handle().map(|h| h.handle()), Some(0x0C81));
    }
}
