use std::net::{Ipv4Addr, SocketAddrV4};

use hashbrown::HashSet;

use crate::net::address::SenderAddress;
use crate::net::chain::{DownTarget, Segment};
use crate::net::packet::{Header, Packet, UdpHeader};

/// A packet that made it through the transport to a bound port.
#[derive(Clone, Debug)]
pub struct Delivery {
    pub port: u16,
    pub packet: Packet,
    pub from: SenderAddress,
}

/// UDP as seen by the harness: it frames payloads into segments, hands them to whatever
/// its down target is, and demultiplexes inbound segments to bound ports.
#[derive(Clone, Debug, Default)]
pub struct UdpProtocol {
    down_target: DownTarget,
    bound_ports: HashSet<u16>,
}

impl UdpProtocol {
    pub fn down_target(&self) -> DownTarget {
        self.down_target
    }

    pub fn set_down_target(&mut self, down_target: DownTarget) {
        self.down_target = down_target;
    }

    /// Returns false when the port is already taken.
    pub fn bind(&mut self, port: u16) -> bool {
        self.bound_ports.insert(port)
    }

    pub fn is_bound(&self, port: u16) -> bool {
        self.bound_ports.contains(&port)
    }

    pub fn segment(
        &self,
        mut packet: Packet,
        source: SocketAddrV4,
        destination: SocketAddrV4,
    ) -> Segment {
        packet.add_header(Header::Udp(
            UdpHeader::builder()
                .source_port(source.port())
                .destination_port(destination.port())
                .build(),
        ));
        Segment {
            packet,
            source: *source.ip(),
            destination: *destination.ip(),
        }
    }

    /// Strips the UDP header. Segments for unbound ports or without a UDP header are dropped.
    pub fn deliver(&self, mut packet: Packet, source: Option<Ipv4Addr>) -> Option<Delivery> {
        let header = match packet.peek_header() {
            Some(Header::Udp(header)) => *header,
            _ => return None,
        };
        if !self.is_bound(header.destination_port) {
            return None;
        }
        packet.remove_header();
        let from = match source {
            Some(address) => SenderAddress::Inet(SocketAddrV4::new(address, header.source_port)),
            None => SenderAddress::Unknown,
        };
        Some(Delivery {
            port: header.destination_port,
            packet,
            from,
        })
    }
}
