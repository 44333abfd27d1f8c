use std::net::SocketAddrV4;

use typed_builder::TypedBuilder;

use manetsim_core::bucket::TimeUS;
use manetsim_core::node::NodeId;
use manetsim_models::net::packet::{ByteTag, Packet};

/// Constant bit rate UDP source paired with one sink. Every packet is stamped with its
/// send time.
#[derive(Clone, Debug, TypedBuilder)]
pub struct Sender {
    pub node: NodeId,
    pub source: SocketAddrV4,
    pub destination: SocketAddrV4,
    pub start: TimeUS,
    packet_size: u32,
    interval: TimeUS,
    total: u32,
    #[builder(default)]
    sent: u32,
}

impl Sender {
    pub fn next_packet(&mut self, uid: u64, now: TimeUS) -> Option<Packet> {
        if self.sent >= self.total {
            return None;
        }
        self.sent += 1;
        let mut packet = Packet::builder().uid(uid).payload_size(self.packet_size).build();
        packet.add_byte_tag(ByteTag::Timestamp(now));
        Some(packet)
    }

    pub fn next_send(&self, now: TimeUS) -> Option<TimeUS> {
        (self.sent < self.total).then(|| now + self.interval)
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }
}
