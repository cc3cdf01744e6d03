//! `HciDecoder` driven through `FramedRead` over an in-memory serial link.

use std::io;

use futures::StreamExt;
use hciframe::{EofError, HciDecoder, HciPacket, RawFormat, ReassemblerConfig, TypedFormat};
use hciframe_testing::{acl_frame, command_frame};
use tokio::io::AsyncWriteExt;
use tokio_util::codec::FramedRead;

#[tokio::test]
async fn serial_stream_yields_packets() {
    let stream = [
        command_frame(0x0C03, &[]),
        acl_frame(0x0001, &[0xDE, 0xAD, 0xBE, 0xEF]),
        command_frame(0x1001, &[]),
    ]
    .concat();
    let mut framed = FramedRead::new(
        stream.as_slice(),
        HciDecoder::new(RawFormat, ReassemblerConfig::default()),
    );

    let mut frames = Vec::new();
    while let Some(packet) = framed.next().await {
        frames.push(packet.expect("decode").as_bytes().to_vec());
    }

    assert_eq!(
        frames,
        vec![
            command_frame(0x0C03, &[]),
            acl_frame(0x0001, &[0xDE, 0xAD, 0xBE, 0xEF]),
            command_frame(0x1001, &[]),
        ]
    );
}

#[tokio::test]
async fn writes_split_across_reads_are_reassembled() {
    let (mut uart, host) = tokio::io::duplex(3);
    let writer = tokio::spawn(async move {
        for byte in acl_frame(0x0002, &[1, 2, 3, 4, 5, 6]) {
            uart.write_all(&[byte]).await.expect("write");
        }
    });

    let mut framed = FramedRead::new(
        host,
        HciDecoder::new(TypedFormat, ReassemblerConfig::default()),
    );
    let packet = framed
        .next()
        .await
        .expect("one packet")
        .expect("decode");
    writer.await.expect("writer task");

    let HciPacket::Data(data) = packet else {
        panic!("expected data");
    };
    assert_eq!(data.connection_handle(), 0x002);
    assert_eq!(data.payload(), &[1, 2, 3, 4, 5, 6]);
    assert!(framed.next().await.is_none());
}

#[tokio::test]
async fn truncated_stream_reports_unexpected_eof() {
    let mut stream = command_frame(0x0C03, &[]);
    stream.extend_from_slice(&acl_frame(0x0001, &[0; 8])[..7]);
    let mut framed = FramedRead::new(
        stream.as_slice(),
        HciDecoder::new(RawFormat, ReassemblerConfig::default()),
    );

    assert!(framed.next().await.expect("first packet").is_ok());
    let err = framed
        .next()
        .await
        .expect("eof error")
        .expect_err("truncated frame");

    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    let eof = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<EofError>())
        .copied();
    assert_eq!(
        eof,
        Some(EofError::MidFrame {
            bytes_received: 2,
            expected: 8,
        })
    );
}
