//! Command line interface for the `hciframe` binary.
//!
//! The binary replays a captured serial stream through the reassembler and
//! prints every recovered packet. This module is also compiled by the build
//! script to render the man page, so it depends only on `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Packet representation printed by the binary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Whole frames as received.
    #[default]
    Raw,
    /// Commands with their routing, data with decoded handles.
    Typed,
}

/// Command line arguments for the `hciframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "hciframe",
    version,
    about = "Reassemble HCI packets from a captured serial stream"
)]
pub struct Cli {
    /// Capture file holding the byte stream.
    pub input: PathBuf,

    /// Treat the capture as hexadecimal text; whitespace is ignored.
    #[arg(long)]
    pub hex: bool,

    /// Feed the stream to the reassembler in pieces of this many bytes.
    #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u16).range(1..))]
    pub chunk: u16,

    /// Packet representation to print.
    #[arg(long, value_enum, default_value_t = OutputFormat::Raw)]
    pub format: OutputFormat,

    /// Largest payload buffered; longer frames are flushed.
    #[arg(long)]
    pub max_payload: Option<u16>,

    /// JSON reassembler configuration. `--max-payload` takes precedence.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
