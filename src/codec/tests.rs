//! Unit tests for [`HciDecoder`].

use std::io;

use bytes::BytesMut;
use rstest::{fixture, rstest};
use tokio_util::codec::Decoder;

use super::{EofError, HciDecoder};
use crate::{
    allocator::LimitedAllocator,
    config::ReassemblerConfig,
    format::{HciPacket, RawFormat, TypedFormat},
    reassembler::ParserState,
};

#[fixture]
fn decoder() -> HciDecoder<RawFormat> { HciDecoder::new(RawFormat, ReassemblerConfig::default()) }

fn eof_kind(err: &io::Error) -> Option<EofError> {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<EofError>())
        .copied()
}

#[rstest]
fn queues_every_packet_in_the_buffer(mut decoder: HciDecoder<RawFormat>) {
    let mut buf = BytesMut::from(
        &[
            0x01, 0x03, 0x0C, 0x00, 0x02, 0x01, 0x00, 0x01, 0x00, 0xAB, 0x01, 0x03, 0x0C, 0x00,
        ][..],
    );

    let first = decoder.decode(&mut buf).expect("decode").expect("first packet");
    assert!(buf.is_empty());
    assert_eq!(decoder.pending(), 2);
    assert_eq!(first.as_bytes(), &[0x01, 0x03, 0x0C, 0x00]);

    let second = decoder.decode(&mut buf).expect("decode").expect("second packet");
    assert_eq!(second.payload(), &[0xAB]);
    assert!(decoder.decode(&mut buf).expect("decode").is_some());
    assert!(decoder.decode(&mut buf).expect("decode").is_none());
}

#[rstest]
fn partial_frames_wait_for_more_bytes(mut decoder: HciDecoder<RawFormat>) {
    let mut buf = BytesMut::from(&[0x02_u8, 0x01, 0x00, 0x03, 0x00, 0x10][..]);

    assert!(decoder.decode(&mut buf).expect("decode").is_none());
    assert_eq!(decoder.reassembler().state(), ParserState::DataPayload);

    buf.extend_from_slice(&[0x20, 0x30]);
    let packet = decoder.decode(&mut buf).expect("decode").expect("packet");
    assert_eq!(packet.payload(), &[0x10, 0x20, 0x30]);
}

#[rstest]
fn clean_eof_at_frame_boundary(mut decoder: HciDecoder<RawFormat>) {
    let mut buf = BytesMut::from(&[0x01_u8, 0x03, 0x0C, 0x00][..]);

    assert!(decoder.decode_eof(&mut buf).expect("decode").is_some());
    assert!(decoder.decode_eof(&mut buf).expect("clean close").is_none());
}

#[rstest]
#[case::mid_header(&[0x02, 0x01], EofError::MidHeader { state: ParserState::DataHandleHigh })]
#[case::mid_frame(
    &[0x02, 0x01, 0x00, 0x04, 0x00, 0xAA],
    EofError::MidFrame { bytes_received: 1, expected: 4 }
)]
#[case::mid_flush(&[0x02, 0x01, 0x00, 0x10, 0x01, 0x00], EofError::MidFlush { remaining: 271 })]
fn eof_inside_a_frame_is_an_error(
    mut decoder: HciDecoder<RawFormat>,
    #[case] bytes: &[u8],
    #[case] expected: EofError,
) {
    let mut buf = BytesMut::from(bytes);

    let err = decoder.decode_eof(&mut buf).expect_err("premature EOF");

    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    assert_eq!(eof_kind(&err), Some(expected));
    assert_eq!(decoder.reassembler().state(), ParserState::AwaitingPacketType);
}

#[test]
fn custom_allocator_failures_skip_the_frame() {
    let mut decoder =
        HciDecoder::with_allocator(RawFormat, LimitedAllocator::new(4), ReassemblerConfig::default());
    let mut buf = BytesMut::from(
        &[0x02_u8, 0x01, 0x00, 0x01, 0x00, 0x7F, 0x01, 0x03, 0x0C, 0x00][..],
    );

    let packet = decoder.decode(&mut buf).expect("decode").expect("packet");

    assert_eq!(packet.as_bytes(), &[0x01, 0x03, 0x0C, 0x00]);
    assert!(decoder.decode(&mut buf).expect("decode").is_none());
    assert_eq!(decoder.reassembler().stats().allocation_failures, 1);
}

#[rstest]
fn reassembler_keeps_its_position_when_unwrapped(mut decoder: HciDecoder<RawFormat>) {
    let mut buf = BytesMut::from(&[0x01_u8, 0x03, 0x0C, 0x00, 0x02, 0x01, 0x00, 0x02][..]);
    assert!(decoder.decode(&mut buf).expect("decode").is_some());

    let reassembler = decoder.into_reassembler();

    assert_eq!(reassembler.state(), ParserState::DataLengthHigh);
    assert_eq!(reassembler.stats().frames, 1);
}

#[test]
fn typed_decoder_yields_structured_packets() {
    let mut decoder = HciDecoder::new(TypedFormat, ReassemblerConfig::default());
    let mut buf = BytesMut::from(&[0x01_u8, 0x81, 0xFC, 0x01, 0x07][..]);

    let packet = decoder.decode(&mut buf).expect("decode").expect("packet");

    let HciPacket::Command(command) = packet else {
        panic!("expected a command packet");
    };
    assert_eq!(command.opcode().get(), 0x0081);
    assert_eq!(command.parameters(), &[0x07]);
}
