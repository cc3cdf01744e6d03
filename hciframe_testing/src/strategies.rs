//! `proptest` strategies producing well-formed HCI streams.

use proptest::{collection::vec, prelude::*};

use crate::frames::{acl_frame, command_frame, extended_command_frame, sco_frame};

/// Opcodes outside the vendor group, so the wire bytes survive reassembly
/// unchanged.
pub fn standard_opcode() -> impl Strategy<Value = u16> {
    (0_u16..0x3F, 0_u16..0x400).prop_map(|(ogf, ocf)| (ogf << 10) | ocf)
}

/// A single well-formed frame whose payload is at most `max_payload` bytes.
pub fn frame(max_payload: usize) -> impl Strategy<Value = Vec<u8>> {
    let command_payload = max_payload.min(usize::from(u8::MAX));
    prop_oneof![
        (standard_opcode(), vec(any::<u8>(), 0..=command_payload))
            .prop_map(|(opcode, params)| command_frame(opcode, &params)),
        (standard_opcode(), vec(any::<u8>(), 0..=max_payload))
            .prop_map(|(opcode, params)| extended_command_frame(opcode, &params)),
        (any::<u16>(), vec(any::<u8>(), 0..=max_payload))
            .prop_map(|(handle, payload)| acl_frame(handle, &payload)),
        (any::<u16>(), vec(any::<u8>(), 0..=max_payload))
            .prop_map(|(handle, payload)| sco_frame(handle, &payload)),
    ]
}

/// Between one and `max_frames` frames, each at most `max_payload` bytes.
pub fn frames(
    max_frames: usize,
    max_payload: usize,
) -> impl Strategy<Value = Vec<Vec<u8>>> {
    vec(frame(max_payload), 1..=max_frames)
}

/// Ascending split offsets within a stream of `len` bytes.
pub fn splits(len: usize) -> impl Strategy<Value = Vec<usize>> {
    vec(0..=len, 0..8).prop_map(|mut offsets| {
        offsets.sort_unstable();
        offsets
    })
}

/// Bytes that are never a packet-type tag.
pub fn noise(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    vec(
        any::<u8>().prop_filter("not a packet-type tag", |byte| {
            !matches!(byte, 0x01 | 0x02 | 0x03 | 0x09)
        }),
        0..=max_len,
    )
}
