//! Packet-type tags and header fields of the HCI serial transport.
//!
//! Each frame on the wire starts with a one-byte [`PacketType`] tag followed
//! by a family-specific header: commands carry an [`Opcode`], ACL and SCO data
//! packets carry a connection handle with flag bits ([`HandleWithFlags`]).

use std::fmt;

use derive_more::{Display, From, Into};
use thiserror::Error;

/// Opcode group field (OGF) reserved for vendor-specific commands.
pub const VENDOR_SPECIFIC_OGF: u16 = 0x3F;

/// Command subgroup of vendor-specific commands handled by the link layer.
///
/// Vendor commands in this subgroup keep their group code when forwarded.
pub const LINK_LAYER_SUBGROUP: u16 = 0x00;

/// Mask applied to the opcode high byte when the vendor group code is stripped.
pub const OPCODE_HIGH_STRIP_MASK: u8 = 0x03;

/// Leading byte identifying the family of an inbound frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    /// Command with a one-byte parameter length.
    Command = 0x01,
    /// Asynchronous connection-oriented data.
    AclData = 0x02,
    /// Synchronous connection-oriented data.
    ScoData = 0x03,
    /// Command with a two-byte parameter length.
    ExtendedCommand = 0x09,
}

impl PacketType {
    /// Classify a leading byte, returning `None` for anything that is not a
    /// recognised tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::Command),
            0x02 => Some(Self::AclData),
            0x03 => Some(Self::ScoData),
            0x09 => Some(Self::ExtendedCommand),
            _ => None,
        }
    }

    /// The on-wire tag value.
    #[must_use]
    pub const fn tag(self) -> u8 { self as u8 }

    /// Short lowercase name used in logs and metric labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::AclData => "acl",
            Self::ScoData => "sco",
            Self::ExtendedCommand => "extended-command",
        }
    }

    /// Whether the packet belongs to the command family.
    #[must_use]
    pub const fn is_command(self) -> bool {
        matches!(self, Self::Command | Self::ExtendedCommand)
    }

    /// Number of bytes in the length field of this family.
    #[must_use]
    pub const fn length_field_len(self) -> usize {
        match self {
            Self::Command => 1,
            Self::ExtendedCommand | Self::AclData | Self::ScoData => 2,
        }
    }

    /// Header size on the wire: tag, opcode or handle, and length field.
    #[must_use]
    pub const fn header_len(self) -> usize { 1 + 2 + self.length_field_len() }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.name()) }
}

/// A leading byte that does not name a packet family.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("unrecognised packet type tag {0:#04x}")]
pub struct UnknownPacketType(pub u8);

impl TryFrom<u8> for PacketType {
    type Error = UnknownPacketType;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::from_tag(tag).ok_or(UnknownPacketType(tag))
    }
}

/// Two-byte command opcode: a 6-bit group field above a 10-bit command field.
///
/// # Examples
///
/// ```
/// use hciframe::Opcode;
///
/// let reset = Opcode::new(0x0C03);
/// assert_eq!(reset.ogf(), 0x03);
/// assert_eq!(reset.ocf(), 0x0003);
/// assert!(!reset.strips_group_code());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0:#06x}")]
pub struct Opcode(u16);

impl Opcode {
    /// Wrap a raw opcode value.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Return the raw opcode value.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// Opcode group field (top six bits).
    #[must_use]
    pub const fn ogf(self) -> u16 { self.0 >> 10 }

    /// Opcode command field (low ten bits).
    #[must_use]
    pub const fn ocf(self) -> u16 { self.0 & 0x03FF }

    /// Vendor command subgroup (the three bits below the group field).
    #[must_use]
    pub const fn command_subgroup(self) -> u16 { (self.0 >> 7) & 0x07 }

    /// Whether this vendor-specific opcode has its group code stripped before
    /// forwarding. Link-layer vendor commands are forwarded unchanged.
    #[must_use]
    pub const fn strips_group_code(self) -> bool {
        self.ogf() == VENDOR_SPECIFIC_OGF && self.command_subgroup() != LINK_LAYER_SUBGROUP
    }
}

/// Connection handle field of a data packet, including its flag bits.
///
/// Bits 0–11 hold the handle, bits 12–13 the packet-boundary flag and bits
/// 14–15 the broadcast flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0:#06x}")]
pub struct HandleWithFlags(u16);

impl HandleWithFlags {
    /// Wrap the raw 16-bit field.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Return the raw field, flags included.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// Connection handle with the flag bits masked out.
    #[must_use]
    pub const fn handle(self) -> u16 { self.0 & 0x0FFF }

    /// Packet-boundary flag.
    #[must_use]
    pub const fn packet_boundary(self) -> u8 { ((self.0 & 0x3000) >> 12) as u8 }

    /// Broadcast flag.
    #[must_use]
    pub const fn broadcast(self) -> u8 { ((self.0 & 0xC000) >> 14) as u8 }
}
