#![doc(html_root_url = "https://docs.rs/hciframe/latest")]
//! Public API for the `hciframe` library.
//!
//! This crate reassembles HCI command and data packets from the unframed byte
//! stream of a serial transport. Bytes are pulled from a [`ByteSource`], the
//! [`Reassembler`] state machine recovers packet boundaries from the length
//! fields, and each completed packet is handed to a registered
//! [`PacketCallback`] in one of two representations ([`RawFormat`] or
//! [`TypedFormat`]).

pub mod allocator;
pub mod buffer;
pub mod byte_order;
pub mod callback;
pub mod codec;
pub mod config;
pub mod format;
pub mod metrics;
pub mod outbound;
pub mod packet;
pub mod reassembler;
pub mod source;

pub use allocator::{FnAllocator, HeapAllocator, LimitedAllocator, PacketAllocator};
pub use buffer::{FrameBuffer, FrameBufferError};
pub use callback::{MessageCategory, PacketCallback};
pub use codec::{CodecError, EofError, HciDecoder};
pub use config::{ConfigError, DEFAULT_MAX_PAYLOAD_LEN, ReassemblerConfig};
pub use format::{
    CommandPacket,
    CommandRoute,
    DataPacket,
    FrameHeader,
    HciPacket,
    PacketFormat,
    RawFormat,
    RawPacket,
    TypedFormat,
};
pub use outbound::{OutboundMessage, StackMessage, frame_outbound};
pub use packet::{HandleWithFlags, Opcode, PacketType, UnknownPacketType};
pub use reassembler::{FrameProgress, ParserState, ReassemblyStats, Reassembler};
pub use source::{ByteSource, RxRing};
