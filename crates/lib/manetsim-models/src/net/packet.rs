use std::net::Ipv4Addr;

use typed_builder::TypedBuilder;

use manetsim_core::bucket::TimeUS;

use crate::device::mobility::Point2D;

pub const UDP_HEADER_SIZE: u32 = 8;
pub const IPV4_HEADER_SIZE: u32 = 20;
pub const GEO_HEADER_SIZE: u32 = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq, TypedBuilder)]
pub struct UdpHeader {
    pub source_port: u16,
    pub destination_port: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TypedBuilder)]
pub struct Ipv4Header {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub ttl: u8,
}

/// Metadata the geographic router puts in front of a transport segment.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder)]
pub struct GeoHeader {
    pub origin: Point2D,
    pub tx_power: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Header {
    Udp(UdpHeader),
    Ipv4(Ipv4Header),
    Geo(GeoHeader),
}

impl Header {
    pub fn size(&self) -> u32 {
        match self {
            Header::Udp(_) => UDP_HEADER_SIZE,
            Header::Ipv4(_) => IPV4_HEADER_SIZE,
            Header::Geo(_) => GEO_HEADER_SIZE,
        }
    }
}

/// Tags ride along with the packet without changing its size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteTag {
    Timestamp(TimeUS),
}

/// A simulated packet. Headers are kept as a stack, the outermost header is the last one.
#[derive(Clone, Debug, TypedBuilder)]
pub struct Packet {
    pub uid: u64,
    pub payload_size: u32,
    #[builder(default)]
    headers: Vec<Header>,
    #[builder(default)]
    tags: Vec<ByteTag>,
}

impl Packet {
    pub fn size(&self) -> u32 {
        self.payload_size + self.headers.iter().map(Header::size).sum::<u32>()
    }

    pub fn add_header(&mut self, header: Header) {
        self.headers.push(header);
    }

    pub fn peek_header(&self) -> Option<&Header> {
        self.headers.last()
    }

    pub fn remove_header(&mut self) -> Option<Header> {
        self.headers.pop()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn outer_ipv4_mut(&mut self) -> Option<&mut Ipv4Header> {
        match self.headers.last_mut() {
            Some(Header::Ipv4(header)) => Some(header),
            _ => None,
        }
    }

    pub fn add_byte_tag(&mut self, tag: ByteTag) {
        self.tags.push(tag);
    }

    pub fn send_timestamp(&self) -> Option<TimeUS> {
        self.tags.iter().find_map(|tag| match tag {
            ByteTag::Timestamp(at) => Some(*at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_stack_and_count_towards_size() {
        let mut packet = Packet::builder().uid(1).payload_size(64).build();
        packet.add_header(Header::Udp(
            UdpHeader::builder().source_port(49153).destination_port(9).build(),
        ));
        packet.add_header(Header::Ipv4(
            Ipv4Header::builder()
                .source(Ipv4Addr::new(10, 1, 1, 2))
                .destination(Ipv4Addr::new(10, 1, 1, 1))
                .ttl(64)
                .build(),
        ));
        assert_eq!(packet.size(), 64 + UDP_HEADER_SIZE + IPV4_HEADER_SIZE);
        assert!(matches!(packet.remove_header(), Some(Header::Ipv4(_))));
        assert!(matches!(packet.peek_header(), Some(Header::Udp(_))));
    }

    #[test]
    fn timestamp_tag_is_found() {
        let mut packet = Packet::builder().uid(7).payload_size(10).build();
        assert_eq!(packet.send_timestamp(), None);
        packet.add_byte_tag(ByteTag::Timestamp(TimeUS::from(42u64)));
        assert_eq!(packet.send_timestamp(), Some(TimeUS::from(42u64)));
    }
}
