//! Replay a captured HCI serial stream and print the recovered packets.

mod cli;

use std::{error::Error, fs};

use clap::Parser;
use cli::{Cli, OutputFormat};
use hciframe::{
    HciPacket,
    MessageCategory,
    PacketFormat,
    ParserState,
    RawFormat,
    RawPacket,
    Reassembler,
    ReassemblerConfig,
    TypedFormat,
};
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let stream = read_capture(&cli)?;
    let chunk = usize::from(cli.chunk);

    match cli.format {
        OutputFormat::Raw => replay(RawFormat, config, &stream, chunk, describe_raw),
        OutputFormat::Typed => replay(TypedFormat, config, &stream, chunk, describe_typed),
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ReassemblerConfig, Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => ReassemblerConfig::from_json(&fs::read_to_string(path)?)?,
        None => ReassemblerConfig::default(),
    };
    match cli.max_payload {
        Some(max_payload_len) => Ok(ReassemblerConfig::new(max_payload_len).validate()?),
        None => Ok(config),
    }
}

fn read_capture(cli: &Cli) -> Result<Vec<u8>, Box<dyn Error>> {
    let bytes = fs::read(&cli.input)?;
    if !cli.hex {
        return Ok(bytes);
    }
    let digits: Vec<u8> = bytes
        .into_iter()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    Ok(hex::decode(digits)?)
}

fn replay<F>(
    format: F,
    config: ReassemblerConfig,
    stream: &[u8],
    chunk: usize,
    describe: fn(&F::Packet) -> String,
) where
    F: PacketFormat,
    F::Packet: 'static,
{
    let mut reassembler = Reassembler::new(format, config);
    reassembler.initialize(move |size: usize, packet: F::Packet, _: MessageCategory| {
        println!("{size:>5} {}", describe(&packet));
    });

    for mut piece in stream.chunks(chunk) {
        reassembler.pump(&mut piece);
    }

    let stats = reassembler.stats();
    info!(
        frames = stats.frames,
        noise_bytes = stats.noise_bytes,
        flushed_frames = stats.flushed_frames,
        allocation_failures = stats.allocation_failures,
        "replay finished"
    );
    if reassembler.state() != ParserState::AwaitingPacketType {
        warn!(state = ?reassembler.state(), "capture ended mid-frame");
    }
}

fn describe_raw(packet: &RawPacket) -> String {
    format!("{:<16} {}", packet.packet_type(), hex::encode(packet.as_bytes()))
}

fn describe_typed(packet: &HciPacket) -> String {
    match packet {
        HciPacket::Command(command) => format!(
            "{:<16} opcode={} route={:?} params={}",
            command.packet_type(),
            command.opcode(),
            command.route(),
            hex::encode(command.parameters())
        ),
        HciPacket::Data(data) => format!(
            "{:<16} handle={:#05x} pb={} bc={} payload={}",
            data.packet_type(),
            data.connection_handle(),
            data.packet_boundary(),
            data.broadcast(),
            hex::encode(data.payload())
        ),
    }
}
