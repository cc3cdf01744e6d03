//! Builders for well-formed HCI wire frames.
//!
//! Builders take the header fields as they should appear on the wire; they
//! do not apply vendor opcode normalisation.

/// Command frame with a one-byte length.
///
/// # Panics
///
/// Panics if `params` is longer than 255 bytes.
#[must_use]
pub fn command_frame(opcode: u16, params: &[u8]) -> Vec<u8> {
    let len = u8::try_from(params.len()).expect("command parameters fit a one-byte length");
    let mut frame = vec![0x01];
    frame.extend_from_slice(&opcode.to_le_bytes());
    frame.push(len);
    frame.extend_from_slice(params);
    frame
}

/// Extended command frame with a two-byte length.
#[must_use]
pub fn extended_command_frame(opcode: u16, params: &[u8]) -> Vec<u8> {
    two_byte_length_frame(0x09, opcode, params)
}

/// ACL data frame. `handle` includes the flag bits.
#[must_use]
pub fn acl_frame(handle: u16, payload: &[u8]) -> Vec<u8> {
    two_byte_length_frame(0x02, handle, payload)
}

/// SCO data frame. `handle` includes the flag bits.
#[must_use]
pub fn sco_frame(handle: u16, payload: &[u8]) -> Vec<u8> {
    two_byte_length_frame(0x03, handle, payload)
}

fn two_byte_length_frame(tag: u8, field: u16, payload: &[u8]) -> Vec<u8> {
    let len = u16::try_from(payload.len()).expect("payload fits a two-byte length");
    let mut frame = vec![tag];
    frame.extend_from_slice(&field.to_le_bytes());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}
