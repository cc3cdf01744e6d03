//! Parser states of the frame reassembler.
//!
//! Header fields gathered so far travel inside the state variants, and the
//! payload states own the in-flight frame, so a payload state without an
//! allocated buffer cannot be expressed.

use std::num::NonZeroU16;

use crate::{
    buffer::FrameBuffer,
    byte_order::join_halves,
    format::FrameHeader,
    packet::PacketType,
};

/// Position of the parser within the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParserState {
    /// At a frame boundary; the next byte is a packet-type tag.
    AwaitingPacketType,
    /// Expecting the opcode low byte.
    CommandOpcodeLow,
    /// Expecting the opcode high byte.
    CommandOpcodeHigh,
    /// Expecting the low length byte of an extended command.
    CommandLengthLow,
    /// Expecting the final length byte of a command.
    CommandHeader,
    /// Copying command parameters.
    CommandPayload,
    /// Expecting the handle low byte.
    DataHandleLow,
    /// Expecting the handle high byte.
    DataHandleHigh,
    /// Expecting the data length low byte.
    DataLengthLow,
    /// Expecting the data length high byte.
    DataLengthHigh,
    /// Copying data payload.
    DataPayload,
    /// Discarding the payload of an oversized frame.
    Flushing,
}

/// Frame whose header is complete and whose buffer is being filled.
#[derive(Debug)]
pub(crate) struct InFlightFrame {
    pub(crate) header: FrameHeader,
    pub(crate) buffer: FrameBuffer,
}

/// Internal parser state.
#[derive(Debug)]
pub(crate) enum Stage {
    Header(HeaderStage),
    CommandPayload(InFlightFrame),
    DataPayload(InFlightFrame),
    Flushing { remaining: NonZeroU16 },
}

impl Stage {
    pub(crate) const fn idle() -> Self { Self::Header(HeaderStage::AwaitingPacketType) }

    pub(crate) fn state(&self) -> ParserState {
        match self {
            Self::Header(header) => header.state(),
            Self::CommandPayload(_) => ParserState::CommandPayload,
            Self::DataPayload(_) => ParserState::DataPayload,
            Self::Flushing { .. } => ParserState::Flushing,
        }
    }

    /// State after discarding one byte of a flushed frame.
    pub(crate) fn after_flushed_byte(remaining: NonZeroU16) -> Self {
        NonZeroU16::new(remaining.get() - 1)
            .map_or_else(Self::idle, |remaining| Self::Flushing { remaining })
    }
}

/// Header-accumulating states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HeaderStage {
    AwaitingPacketType,
    CommandOpcodeLow {
        packet_type: PacketType,
    },
    CommandOpcodeHigh {
        packet_type: PacketType,
        opcode_low: u8,
    },
    CommandLengthLow {
        opcode: u16,
    },
    CommandHeader {
        packet_type: PacketType,
        opcode: u16,
        length_low: Option<u8>,
    },
    DataHandleLow {
        packet_type: PacketType,
    },
    DataHandleHigh {
        packet_type: PacketType,
        handle_low: u8,
    },
    DataLengthLow {
        packet_type: PacketType,
        handle: u16,
    },
    DataLengthHigh {
        packet_type: PacketType,
        handle: u16,
        length_low: u8,
    },
}

/// Outcome of feeding one header byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Next(HeaderStage),
    Complete(FrameHeader),
    Noise,
}

impl HeaderStage {
    pub(crate) const fn state(self) -> ParserState {
        match self {
            Self::AwaitingPacketType => ParserState::AwaitingPacketType,
            Self::CommandOpcodeLow { .. } => ParserState::CommandOpcodeLow,
            Self::CommandOpcodeHigh { .. } => ParserState::CommandOpcodeHigh,
            Self::CommandLengthLow { .. } => ParserState::CommandLengthLow,
            Self::CommandHeader { .. } => ParserState::CommandHeader,
            Self::DataHandleLow { .. } => ParserState::DataHandleLow,
            Self::DataHandleHigh { .. } => ParserState::DataHandleHigh,
            Self::DataLengthLow { .. } => ParserState::DataLengthLow,
            Self::DataLengthHigh { .. } => ParserState::DataLengthHigh,
        }
    }

    pub(crate) fn accept(self, byte: u8) -> Step {
        match self {
            Self::AwaitingPacketType => match PacketType::from_tag(byte) {
                Some(packet_type) if packet_type.is_command() => {
                    Step::Next(Self::CommandOpcodeLow { packet_type })
                }
                Some(packet_type) => Step::Next(Self::DataHandleLow { packet_type }),
                None => Step::Noise,
            },
            Self::CommandOpcodeLow { packet_type } => Step::Next(Self::CommandOpcodeHigh {
                packet_type,
                opcode_low: byte,
            }),
            Self::CommandOpcodeHigh {
                packet_type,
                opcode_low,
            } => {
                let opcode = join_halves(opcode_low, byte);
                match packet_type {
                    PacketType::ExtendedCommand => Step::Next(Self::CommandLengthLow { opcode }),
                    _ => Step::Next(Self::CommandHeader {
                        packet_type,
                        opcode,
                        length_low: None,
                    }),
                }
            }
            Self::CommandLengthLow { opcode } => Step::Next(Self::CommandHeader {
                packet_type: PacketType::ExtendedCommand,
                opcode,
                length_low: Some(byte),
            }),
            Self::CommandHeader {
                packet_type,
                opcode,
                length_low,
            } => {
                let declared_len = match length_low {
                    Some(low) => join_halves(low, byte),
                    None => u16::from(byte),
                };
                Step::Complete(FrameHeader::new(packet_type, opcode, declared_len))
            }
            Self::DataHandleLow { packet_type } => Step::Next(Self::DataHandleHigh {
                packet_type,
                handle_low: byte,
            }),
            Self::DataHandleHigh {
                packet_type,
                handle_low,
            } => Step::Next(Self::DataLengthLow {
                packet_type,
                handle: join_halves(handle_low, byte),
            }),
            Self::DataLengthLow {
                packet_type,
                handle,
            } => Step::Next(Self::DataLengthHigh {
                packet_type,
                handle,
                length_low: byte,
            }),
            Self::DataLengthHigh {
                packet_type,
                handle,
                length_low,
            } => Step::Complete(FrameHeader::new(
                packet_type,
                handle,
                join_halves(length_low, byte),
            )),
        }
    }
}
