//! Delivery of completed packets to the owner of the reassembler.

use serde::{Deserialize, Serialize};

/// Category attached to every delivered message.
///
/// All frames arriving from the host are asynchronous; the category travels
/// with each packet so the receiving queue can route it without inspecting
/// the payload.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageCategory {
    /// Asynchronous message with no paired response.
    #[default]
    Async,
}

/// Receiver of reassembled packets.
///
/// The callback takes ownership of the packet; the reassembler keeps no
/// reference to it afterwards. Closures of the matching shape implement this
/// trait directly.
///
/// # Examples
///
/// ```
/// use hciframe::{MessageCategory, RawFormat, RawPacket, Reassembler, ReassemblerConfig};
///
/// let mut reassembler = Reassembler::new(RawFormat, ReassemblerConfig::default());
/// reassembler.initialize(|size: usize, packet: RawPacket, category: MessageCategory| {
///     assert_eq!(size, packet.as_bytes().len());
///     assert_eq!(category, MessageCategory::Async);
/// });
/// reassembler.pump(&mut &[0x01_u8, 0x03, 0x0C, 0x00][..]);
/// ```
pub trait PacketCallback<P> {
    /// Accept a completed packet of `total_size` wire bytes.
    fn on_packet_complete(&mut self, total_size: usize, packet: P, category: MessageCategory);
}

impl<P, F> PacketCallback<P> for F
where
    F: FnMut(usize, P, MessageCategory),
{
    fn on_packet_complete(&mut self, total_size: usize, packet: P, category: MessageCategory) {
        self(total_size, packet, category);
    }
}
