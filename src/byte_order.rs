//! Helpers for the little-endian byte order used on the HCI wire.
//!
//! Every multi-byte header field of the transport (opcode, connection handle,
//! length) is little-endian. The parser assembles those fields one byte at a
//! time, so the helpers work on individual low/high halves as well as on
//! arrays.

/// Serialise a `u16` in HCI wire order (little-endian).
///
/// # Examples
///
/// ```
/// use hciframe::byte_order::write_wire_u16;
///
/// assert_eq!(write_wire_u16(0x0C03), [0x03, 0x0C]);
/// ```
#[must_use]
pub fn write_wire_u16(value: u16) -> [u8; 2] { value.to_le_bytes() }

/// Parse a `u16` from its little-endian on-wire representation.
///
/// # Examples
///
/// ```
/// use hciframe::byte_order::read_wire_u16;
///
/// assert_eq!(read_wire_u16([0x03, 0x0C]), 0x0C03);
/// ```
#[must_use]
pub fn read_wire_u16(bytes: [u8; 2]) -> u16 { u16::from_le_bytes(bytes) }

/// Combine a low and a high byte received separately into a `u16`.
///
/// # Examples
///
/// ```
/// use hciframe::byte_order::join_halves;
///
/// assert_eq!(join_halves(0x34, 0x12), 0x1234);
/// ```
#[must_use]
pub const fn join_halves(low: u8, high: u8) -> u16 { u16::from_le_bytes([low, high]) }
