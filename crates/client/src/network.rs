//! Network thread hook

use tracing::trace;

use lucid_core::Event;
use lucid_sdk::Packet;

use crate::ClientHooks;

/// What the host should do with a packet after subscribers saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketVerdict {
    /// Hand the packet to the host's own handler
    Process,
    /// A subscriber cancelled the packet; skip the host's handler
    Drop,
}

impl ClientHooks {
    /// Called on the network thread for every inbound packet
    ///
    /// Subscribers run on the network thread too. Work that must touch
    /// game state should go through the task scheduler.
    pub fn channel_read(&self, packet: &Packet) -> PacketVerdict {
        let result = self.lucid.bus().post(&Event::receive_packet(packet));
        if result.is_cancelled() {
            trace!("Dropping {} packet (0x{:02x})", packet.name(), packet.id());
            PacketVerdict::Drop
        } else {
            PacketVerdict::Process
        }
    }
}
