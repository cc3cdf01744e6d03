//! Framing of stack-originated packets for transmission, and the envelope
//! handed to the stack for inbound packets.
//!
//! HCI frames already carry their own header, so outbound framing is a copy
//! into a transport-owned buffer tagged with its delivery category.

use bytes::Bytes;

use crate::{
    allocator::PacketAllocator,
    callback::MessageCategory,
    format::{HciPacket, RawPacket},
};

/// Status carried by stack envelopes that have not been processed yet.
pub const STATUS_UNSET: u8 = 0xFF;

/// A packet ready for the transmit queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    category: MessageCategory,
    buffer: Bytes,
}

impl OutboundMessage {
    /// Delivery category. HCI traffic is always asynchronous.
    #[must_use]
    pub const fn category(&self) -> MessageCategory { self.category }

    /// Frame bytes to transmit.
    #[must_use]
    pub fn buffer(&self) -> &[u8] { &self.buffer }

    /// Number of bytes to transmit.
    #[must_use]
    pub fn len(&self) -> usize { self.buffer.len() }

    /// Whether the frame is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    /// Consume the message, returning the frame bytes.
    #[must_use]
    pub fn into_buffer(self) -> Bytes { self.buffer }
}

/// Copy a stack packet into a freshly allocated transmit buffer.
///
/// Returns `None` when the allocator cannot supply the buffer; the packet is
/// not queued in that case.
///
/// # Examples
///
/// ```
/// use hciframe::{HeapAllocator, LimitedAllocator, MessageCategory, frame_outbound};
///
/// let event = [0x04, 0x0E, 0x04, 0x01, 0x03, 0x0C, 0x00];
/// let message = frame_outbound(&mut HeapAllocator, &event).expect("heap allocation");
/// assert_eq!(message.buffer(), &event);
/// assert_eq!(message.category(), MessageCategory::Async);
///
/// assert!(frame_outbound(&mut LimitedAllocator::new(4), &event).is_none());
/// ```
pub fn frame_outbound<A>(allocator: &mut A, packet: &[u8]) -> Option<OutboundMessage>
where
    A: PacketAllocator + ?Sized,
{
    let Some(mut buffer) = allocator.allocate(packet.len()) else {
        tracing::warn!(len = packet.len(), "outbound allocation failed; dropping packet");
        return None;
    };
    buffer.clear();
    buffer.extend_from_slice(packet);
    Some(OutboundMessage {
        category: MessageCategory::Async,
        buffer: buffer.freeze(),
    })
}

/// Envelope delivering an inbound packet to the stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackMessage {
    event: u8,
    status: u8,
    bytes: Bytes,
}

impl StackMessage {
    /// Wrap a raw frame. The event is the frame's leading byte.
    #[must_use]
    pub fn from_raw(packet: &RawPacket) -> Self {
        Self {
            event: packet.packet_type().tag(),
            status: STATUS_UNSET,
            bytes: packet.clone().into_bytes(),
        }
    }

    /// Stack event code.
    #[must_use]
    pub const fn event(&self) -> u8 { self.event }

    /// Processing status.
    #[must_use]
    pub const fn status(&self) -> u8 { self.status }

    /// Packet bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] { &self.bytes }
}

impl From<&HciPacket> for StackMessage {
    fn from(packet: &HciPacket) -> Self {
        let bytes = match packet {
            HciPacket::Command(command) => command.to_bytes(),
            HciPacket::Data(data) => data.to_payload(),
        };
        Self {
            event: packet.event_code(),
            status: STATUS_UNSET,
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use rstest::rstest;

    use super::{STATUS_UNSET, StackMessage, frame_outbound};
    use crate::{
        allocator::{LimitedAllocator, from_fn},
        buffer::FrameBuffer,
        format::{FrameHeader, HciPacket, PacketFormat, RawFormat, RawPacket, TypedFormat},
        packet::PacketType,
    };

    fn build<F: PacketFormat>(format: &F, header: FrameHeader, payload: &[u8]) -> F::Packet {
        let mut buffer = FrameBuffer::new(
            BytesMut::new(),
            format.header_len(&header),
            usize::from(header.declared_len()),
        );
        format.write_header(&header, buffer.header_mut());
        buffer.append(payload).expect("payload matches declared length");
        format.finalize(&header, buffer)
    }

    #[rstest]
    #[case::fits(8, true)]
    #[case::exact(3, true)]
    #[case::too_small(2, false)]
    fn outbound_framing_respects_the_allocator(#[case] ceiling: usize, #[case] framed: bool) {
        let message = frame_outbound(&mut LimitedAllocator::new(ceiling), &[0x04, 0x0F, 0x00]);
        assert_eq!(message.is_some(), framed);
    }

    #[test]
    fn outbound_framing_copies_into_a_fresh_buffer() {
        let mut requested = Vec::new();
        let mut allocator = from_fn(|len| {
            requested.push(len);
            Some(BytesMut::zeroed(len))
        });

        let message = frame_outbound(&mut allocator, &[0x04, 0x13, 0x05]).expect("allocated");

        assert_eq!(message.buffer(), &[0x04, 0x13, 0x05]);
        assert_eq!(message.len(), 3);
        drop(allocator);
        assert_eq!(requested, vec![3]);
    }

    #[rstest]
    #[case::empty(BytesMut::new())]
    #[case::larger(BytesMut::zeroed(11))]
    fn outbound_framing_ignores_the_storage_length(#[case] storage: BytesMut) {
        let mut storage = Some(storage);
        let mut allocator = from_fn(move |_| storage.take());

        let message = frame_outbound(&mut allocator, &[0x04, 0x0E, 0x00]).expect("allocated");

        assert_eq!(message.buffer(), &[0x04, 0x0E, 0x00]);
    }

    #[test]
    fn raw_envelope_uses_the_leading_byte() {
        let packet: RawPacket = build(
            &RawFormat,
            FrameHeader::new(PacketType::AclData, 0x0001, 1),
            &[0x99],
        );

        let message = StackMessage::from_raw(&packet);

        assert_eq!(message.event(), 0x02);
        assert_eq!(message.status(), STATUS_UNSET);
        assert_eq!(message.bytes(), &[0x02, 0x01, 0x00, 0x01, 0x00, 0x99]);
    }

    #[rstest]
    #[case::vendor_command(FrameHeader::new(PacketType::Command, 0xFC81, 0), 0x93)]
    #[case::standard_command(FrameHeader::new(PacketType::Command, 0x0C03, 0), 0x01)]
    #[case::data(FrameHeader::new(PacketType::AclData, 0x0001, 0), 0x02)]
    fn typed_envelope_uses_the_routing_event(#[case] header: FrameHeader, #[case] event: u8) {
        let packet: HciPacket = build(&TypedFormat, header, &[]);

        let message = StackMessage::from(&packet);

        assert_eq!(message.event(), event);
        assert_eq!(message.status(), STATUS_UNSET);
    }
}
