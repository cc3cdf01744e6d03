//! Inbound state machine that recovers HCI frames from a byte stream.
//!
//! [`Reassembler`] pulls bytes from a [`ByteSource`] one at a time while it
//! reads a frame header, then copies payload bytes in bulk straight into the
//! packet buffer. The wire format has no delimiters, so framing is purely
//! length-driven:
//!
//! - unrecognised leading bytes are treated as line noise and dropped;
//! - frames announcing more than [`ReassemblerConfig::max_payload_len`] bytes
//!   are flushed, which keeps the parser aligned on the next frame;
//! - when the [`PacketAllocator`] cannot supply a buffer the frame is
//!   abandoned and parsing resumes at the next byte. The payload of the
//!   abandoned frame is not flushed, so its bytes are then read as new frames.
//!   An allocator that fails mid-stream is treated as fatal for the link.
//!
//! The reassembler is a plain value owned by whatever task drains the
//! receive path; `&mut self` on [`Reassembler::pump`] rules out concurrent
//! pumps.

use std::{fmt, mem, num::NonZeroU16};

use tracing::{debug, trace, warn};

use crate::{
    allocator::{HeapAllocator, PacketAllocator},
    buffer::FrameBuffer,
    callback::{MessageCategory, PacketCallback},
    config::ReassemblerConfig,
    format::{FrameHeader, PacketFormat},
    metrics,
    packet::PacketType,
    source::ByteSource,
};

mod state;

pub use state::ParserState;
use state::{HeaderStage, InFlightFrame, Stage, Step};

/// Running totals for one reassembler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReassemblyStats {
    /// Frames delivered.
    pub frames: u64,
    /// Leading bytes discarded as noise.
    pub noise_bytes: u64,
    /// Frames flushed for exceeding the payload ceiling.
    pub flushed_frames: u64,
    /// Frames abandoned because allocation failed.
    pub allocation_failures: u64,
}

/// Payload progress of the frame currently being filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameProgress {
    /// Family of the frame.
    pub packet_type: PacketType,
    /// Payload bytes received.
    pub received: usize,
    /// Payload bytes declared by the header.
    pub expected: usize,
}

type BoxedCallback<P> = Box<dyn PacketCallback<P> + Send>;

/// Byte-stream frame reassembler generic over the packet representation.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use hciframe::{MessageCategory, RawFormat, RawPacket, Reassembler, ReassemblerConfig};
///
/// let delivered = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&delivered);
///
/// let mut reassembler = Reassembler::new(RawFormat, ReassemblerConfig::default());
/// reassembler.initialize(move |size: usize, packet: RawPacket, _: MessageCategory| {
///     sink.lock().expect("sink lock").push((size, packet));
/// });
///
/// // HCI_Reset arrives split across two reads.
/// reassembler.pump(&mut &[0x01_u8, 0x03][..]);
/// assert!(delivered.lock().expect("sink lock").is_empty());
/// reassembler.pump(&mut &[0x0C_u8, 0x00][..]);
///
/// let delivered = delivered.lock().expect("sink lock");
/// assert_eq!(delivered.len(), 1);
/// assert_eq!(delivered[0].0, 4);
/// assert_eq!(delivered[0].1.as_bytes(), &[0x01, 0x03, 0x0C, 0x00]);
/// ```
pub struct Reassembler<F: PacketFormat, A = HeapAllocator> {
    format: F,
    allocator: A,
    config: ReassemblerConfig,
    stage: Stage,
    callback: Option<BoxedCallback<F::Packet>>,
    stats: ReassemblyStats,
}

impl<F: PacketFormat> Reassembler<F> {
    /// Create a reassembler allocating packet buffers from the heap.
    #[must_use]
    pub fn new(format: F, config: ReassemblerConfig) -> Self {
        Self::with_allocator(format, HeapAllocator, config)
    }
}

impl<F, A> Reassembler<F, A>
where
    F: PacketFormat,
    A: PacketAllocator,
{
    /// Create a reassembler using a custom allocator.
    #[must_use]
    pub fn with_allocator(format: F, allocator: A, config: ReassemblerConfig) -> Self {
        Self {
            format,
            allocator,
            config,
            stage: Stage::idle(),
            callback: None,
            stats: ReassemblyStats::default(),
        }
    }

    /// Register the packet callback and reset the parser to a frame boundary.
    ///
    /// Registering again replaces the previous callback. Any partially
    /// received frame is discarded.
    pub fn initialize<C>(&mut self, callback: C)
    where
        C: PacketCallback<F::Packet> + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self.reset();
    }

    /// Drop any partially received frame and return to a frame boundary.
    pub fn reset(&mut self) { self.stage = Stage::idle(); }

    /// Drain every byte currently available from `source`, delivering each
    /// completed frame to the registered callback.
    ///
    /// Returns the number of frames completed. Frames completed while no
    /// callback is registered are dropped.
    pub fn pump<S>(&mut self, source: &mut S) -> u64
    where
        S: ByteSource + ?Sized,
    {
        let mut callback = self.callback.take();
        let completed = self.drain(source, &mut |total_size, packet| match callback.as_mut() {
            Some(callback) => {
                callback.on_packet_complete(total_size, packet, MessageCategory::Async);
            }
            None => warn!(total_size, "no packet callback registered; dropping frame"),
        });
        self.callback = callback;
        completed
    }

    /// Current parser position.
    #[must_use]
    pub fn state(&self) -> ParserState { self.stage.state() }

    /// Payload progress of the in-flight frame, if one is being filled.
    #[must_use]
    pub fn progress(&self) -> Option<FrameProgress> {
        match &self.stage {
            Stage::CommandPayload(frame) | Stage::DataPayload(frame) => Some(FrameProgress {
                packet_type: frame.header.packet_type(),
                received: frame.buffer.received(),
                expected: frame.buffer.payload_len(),
            }),
            Stage::Header(_) | Stage::Flushing { .. } => None,
        }
    }

    /// Bytes still to be discarded while flushing an oversized frame.
    #[must_use]
    pub fn flush_remaining(&self) -> Option<u16> {
        match self.stage {
            Stage::Flushing { remaining } => Some(remaining.get()),
            _ => None,
        }
    }

    /// Running totals since construction.
    #[must_use]
    pub fn stats(&self) -> ReassemblyStats { self.stats }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> ReassemblerConfig { self.config }

    /// Whether a callback has been registered.
    #[must_use]
    pub fn has_callback(&self) -> bool { self.callback.is_some() }

    /// Mutable access to the allocator.
    pub fn allocator_mut(&mut self) -> &mut A { &mut self.allocator }

    /// Run the state machine until `source` is empty, passing completed
    /// packets to `emit`.
    pub(crate) fn drain<S>(&mut self, source: &mut S, emit: &mut dyn FnMut(usize, F::Packet)) -> u64
    where
        S: ByteSource + ?Sized,
    {
        let frames_before = self.stats.frames;
        while source.available() > 0 {
            let stage = mem::replace(&mut self.stage, Stage::idle());
            let (next, consumed) = match stage {
                Stage::CommandPayload(frame) => {
                    self.fill(frame, source, emit, Stage::CommandPayload)
                }
                Stage::DataPayload(frame) => self.fill(frame, source, emit, Stage::DataPayload),
                Stage::Flushing { remaining } => match source.read_byte() {
                    Some(_) => (Stage::after_flushed_byte(remaining), true),
                    None => (Stage::Flushing { remaining }, false),
                },
                Stage::Header(header) => match source.read_byte() {
                    Some(byte) => (self.accept_header_byte(header, byte, emit), true),
                    None => (Stage::Header(header), false),
                },
            };
            self.stage = next;
            if !consumed {
                break;
            }
        }
        self.stats.frames - frames_before
    }

    fn accept_header_byte(
        &mut self,
        header: HeaderStage,
        byte: u8,
        emit: &mut dyn FnMut(usize, F::Packet),
    ) -> Stage {
        match header.accept(byte) {
            Step::Next(next) => Stage::Header(next),
            Step::Noise => {
                trace!(byte, "discarding unrecognised packet type");
                self.stats.noise_bytes += 1;
                metrics::inc_noise();
                Stage::idle()
            }
            Step::Complete(header) => self.begin_frame(header, emit),
        }
    }

    fn begin_frame(&mut self, header: FrameHeader, emit: &mut dyn FnMut(usize, F::Packet)) -> Stage {
        let declared_len = header.declared_len();
        if let Some(remaining) =
            NonZeroU16::new(declared_len).filter(|_| declared_len > self.config.max_payload_len)
        {
            warn!(
                packet_type = %header.packet_type(),
                declared_len,
                max_payload_len = self.config.max_payload_len,
                "flushing oversized frame"
            );
            self.stats.flushed_frames += 1;
            metrics::inc_flushed();
            return Stage::Flushing { remaining };
        }

        let header_len = self.format.header_len(&header);
        let payload_len = usize::from(declared_len);
        let Some(storage) = self.allocator.allocate(header_len + payload_len) else {
            warn!(
                packet_type = %header.packet_type(),
                declared_len,
                "packet allocation failed; abandoning frame"
            );
            self.stats.allocation_failures += 1;
            metrics::inc_allocation_failures();
            return Stage::idle();
        };

        let mut buffer = FrameBuffer::new(storage, header_len, payload_len);
        self.format.write_header(&header, buffer.header_mut());
        let frame = InFlightFrame { header, buffer };
        if frame.buffer.is_complete() {
            self.complete(frame, emit);
            Stage::idle()
        } else if header.packet_type().is_command() {
            Stage::CommandPayload(frame)
        } else {
            Stage::DataPayload(frame)
        }
    }

    fn fill<S>(
        &mut self,
        mut frame: InFlightFrame,
        source: &mut S,
        emit: &mut dyn FnMut(usize, F::Packet),
        resume: fn(InFlightFrame) -> Stage,
    ) -> (Stage, bool)
    where
        S: ByteSource + ?Sized,
    {
        let wanted = frame.buffer.remaining();
        let read = source.read(frame.buffer.unfilled_mut());
        let committed = frame.buffer.commit(read);
        assert!(
            committed.is_ok(),
            "byte source returned {read} bytes for a {wanted}-byte read"
        );

        if frame.buffer.is_complete() {
            self.complete(frame, emit);
            (Stage::idle(), read > 0)
        } else {
            (resume(frame), read > 0)
        }
    }

    fn complete(&mut self, frame: InFlightFrame, emit: &mut dyn FnMut(usize, F::Packet)) {
        let InFlightFrame { header, buffer } = frame;
        debug!(
            packet_type = %header.packet_type(),
            field = header.field(),
            payload_len = header.declared_len(),
            "frame reassembled"
        );
        self.stats.frames += 1;
        metrics::inc_frames(header.packet_type());
        emit(header.wire_len(), self.format.finalize(&header, buffer));
    }
}

impl<F, A> fmt::Debug for Reassembler<F, A>
where
    F: PacketFormat + fmt::Debug,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reassembler")
            .field("format", &self.format)
            .field("allocator", &self.allocator)
            .field("config", &self.config)
            .field("state", &self.stage.state())
            .field("stats", &self.stats)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
