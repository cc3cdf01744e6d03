//! Structured representation separating commands from data.
//!
//! Commands keep their wire bytes and gain a [`CommandRoute`] telling the
//! stack whether they go to the vendor extension handler or the standard
//! command handler. Data packets drop their header from the buffer; the
//! handle and flag bits are decoded into fields instead.

use bytes::Bytes;

use super::{FrameHeader, PacketFormat};
use crate::{
    buffer::FrameBuffer,
    byte_order::read_wire_u16,
    packet::{HandleWithFlags, Opcode, PacketType},
};

/// Stack event code for commands routed to the vendor extension handler.
pub const VENDOR_COMMAND_EVENT: u8 = 0x93;

/// Stack event code for standard host-to-controller commands.
pub const HOST_TO_CONTROLLER_COMMAND_EVENT: u8 = 0x01;

/// Stack event code for host-to-controller data.
pub const HOST_TO_CONTROLLER_DATA_EVENT: u8 = 0x02;

/// Format emitting [`HciPacket`] values.
#[derive(Clone, Copy, Debug, Default)]
pub struct TypedFormat;

impl PacketFormat for TypedFormat {
    type Packet = HciPacket;

    fn header_len(&self, header: &FrameHeader) -> usize {
        if header.packet_type().is_command() {
            header.wire_header_len()
        } else {
            0
        }
    }

    fn write_header(&self, header: &FrameHeader, region: &mut [u8]) {
        if header.packet_type().is_command() {
            header.write_wire_header(region);
        }
    }

    fn finalize(&self, header: &FrameHeader, buffer: FrameBuffer) -> HciPacket {
        match header.handle() {
            None => HciPacket::Command(CommandPacket {
                packet_type: header.packet_type(),
                received_opcode: Opcode::new(header.field()),
                route: if header.strips_group_code() {
                    CommandRoute::Vendor
                } else {
                    CommandRoute::Standard
                },
                header_len: buffer.header_len(),
                bytes: buffer.freeze(),
            }),
            Some(handle) => HciPacket::Data(DataPacket {
                packet_type: header.packet_type(),
                handle,
                payload: buffer.freeze(),
            }),
        }
    }
}

/// A reassembled frame split by family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HciPacket {
    /// Command or extended command.
    Command(CommandPacket),
    /// ACL or SCO data.
    Data(DataPacket),
}

impl HciPacket {
    /// Packet family.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        match self {
            Self::Command(command) => command.packet_type,
            Self::Data(data) => data.packet_type,
        }
    }

    /// Stack event code the packet is posted under.
    #[must_use]
    pub const fn event_code(&self) -> u8 {
        match self {
            Self::Command(command) => command.route.event_code(),
            Self::Data(_) => HOST_TO_CONTROLLER_DATA_EVENT,
        }
    }
}

/// Handler class a command is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandRoute {
    /// Vendor-specific command whose group code was stripped.
    Vendor,
    /// Any other command.
    Standard,
}

impl CommandRoute {
    /// Stack event code for this route.
    #[must_use]
    pub const fn event_code(self) -> u8 {
        match self {
            Self::Vendor => VENDOR_COMMAND_EVENT,
            Self::Standard => HOST_TO_CONTROLLER_COMMAND_EVENT,
        }
    }
}

/// Command frame with its wire bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandPacket {
    packet_type: PacketType,
    received_opcode: Opcode,
    route: CommandRoute,
    header_len: usize,
    bytes: Bytes,
}

impl CommandPacket {
    /// Command or extended command.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType { self.packet_type }

    /// Handler class.
    #[must_use]
    pub const fn route(&self) -> CommandRoute { self.route }

    /// Opcode as it arrived on the wire.
    #[must_use]
    pub const fn received_opcode(&self) -> Opcode { self.received_opcode }

    /// Opcode as forwarded, after any group code stripping.
    #[must_use]
    pub fn opcode(&self) -> Opcode { Opcode::new(read_wire_u16([self.bytes[1], self.bytes[2]])) }

    /// Command parameters.
    #[must_use]
    pub fn parameters(&self) -> &[u8] { &self.bytes[self.header_len..] }

    /// The whole frame as forwarded.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// Shared handle to the frame bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes { self.bytes.clone() }
}

/// ACL or SCO data with decoded handle and flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPacket {
    packet_type: PacketType,
    handle: HandleWithFlags,
    payload: Bytes,
}

impl DataPacket {
    /// ACL or SCO.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType { self.packet_type }

    /// Connection handle without flag bits.
    #[must_use]
    pub const fn connection_handle(&self) -> u16 { self.handle.handle() }

    /// Packet-boundary flag.
    #[must_use]
    pub const fn packet_boundary(&self) -> u8 { self.handle.packet_boundary() }

    /// Broadcast flag.
    #[must_use]
    pub const fn broadcast(&self) -> u8 { self.handle.broadcast() }

    /// The raw handle field, flags included.
    #[must_use]
    pub const fn handle_with_flags(&self) -> HandleWithFlags { self.handle }

    /// Payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Consume the packet, returning the payload buffer.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }

    /// Shared handle to the payload bytes.
    #[must_use]
    pub fn to_payload(&self) -> Bytes { self.payload.clone() }
}
