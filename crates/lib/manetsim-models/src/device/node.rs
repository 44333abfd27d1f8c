use std::net::Ipv4Addr;

use log::debug;
use typed_builder::TypedBuilder;

use manetsim_core::error::ConfigError;
use manetsim_core::node::{NodeId, NodeRole};

use crate::device::mobility::{Mobility, Point2D};
use crate::device::netdevice::NetDevice;
use crate::device::phy::WifiPhy;
use crate::net::chain::{DownTarget, Segment};
use crate::net::feedback::notify;
use crate::net::packet::{Header, Ipv4Header, Packet};
use crate::net::transport::UdpProtocol;
use crate::routing::power::PowerAdaptiveRouter;
use crate::routing::RoutingProtocol;

/// A simulated node. Every layer is optional until the run builder installs it; the
/// routing instance is owned by exactly this node.
#[derive(Clone, Debug, TypedBuilder)]
pub struct Node {
    id: NodeId,
    #[builder(default)]
    pub role: NodeRole,
    #[builder(default)]
    pub position: Point2D,
    #[builder(default)]
    pub mobility: Mobility,
    #[builder(default)]
    pub address: Option<Ipv4Addr>,
    #[builder(default)]
    pub device: Option<NetDevice>,
    #[builder(default)]
    transport: Option<UdpProtocol>,
    #[builder(default)]
    routing: Option<RoutingProtocol>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn install_transport(&mut self, transport: UdpProtocol) {
        self.transport = Some(transport);
    }

    pub fn transport(&self) -> Option<&UdpProtocol> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut UdpProtocol> {
        self.transport.as_mut()
    }

    /// Attaches a routing instance. A node carries at most one.
    pub fn aggregate_routing(&mut self, mut routing: RoutingProtocol) -> Result<(), ConfigError> {
        if self.routing.is_some() {
            return Err(ConfigError::RoutingAlreadyAggregated(self.id));
        }
        if let Some(router) = routing.as_power_adaptive_mut() {
            router.mark_installed(self.id)?;
        }
        debug!("Aggregated {} onto node {}", routing.kind(), self.id);
        self.routing = Some(routing);
        Ok(())
    }

    pub fn routing(&self) -> Option<&RoutingProtocol> {
        self.routing.as_ref()
    }

    pub fn routing_mut(&mut self) -> Option<&mut RoutingProtocol> {
        self.routing.as_mut()
    }

    pub fn power_router(&self) -> Option<&PowerAdaptiveRouter> {
        self.routing.as_ref().and_then(RoutingProtocol::as_power_adaptive)
    }

    pub fn power_router_mut(&mut self) -> Option<&mut PowerAdaptiveRouter> {
        self.routing
            .as_mut()
            .and_then(RoutingProtocol::as_power_adaptive_mut)
    }

    pub fn wifi_phy(&self) -> Option<&WifiPhy> {
        self.device.as_ref().and_then(NetDevice::wifi_phy)
    }

    pub fn wifi_phy_mut(&mut self) -> Option<&mut WifiPhy> {
        self.device.as_mut().and_then(NetDevice::wifi_phy_mut)
    }

    /// Pushes a transport segment down the chain of send targets until the network layer
    /// takes it. The returned segment carries the complete header stack.
    pub fn send_down(&mut self, segment: Segment, ttl: u8) -> Result<Segment, ConfigError> {
        let mut target = self
            .transport
            .as_ref()
            .ok_or(ConfigError::MissingTransport(self.id))?
            .down_target();
        let mut segment = segment;
        loop {
            match target {
                DownTarget::Ipv4Send => return Ok(ipv4_send(segment, ttl)),
                DownTarget::RoutingAddHeaders => {
                    let position = self.position;
                    let node_id = self.id;
                    let router = self
                        .power_router_mut()
                        .ok_or(ConfigError::MissingRouting(node_id))?;
                    (target, segment) = router.add_headers(segment, position)?;
                }
            }
        }
    }

    /// Hands a frame to the PHY. Returns whether the PHY received it; on success the
    /// cross-layer notification has already been delivered.
    pub fn receive_frame(&mut self, packet: &Packet, rx_power: f64) -> bool {
        let phy = match self.device.as_mut().and_then(NetDevice::wifi_phy_mut) {
            Some(phy) => phy,
            None => return false,
        };
        if !phy.can_receive(rx_power) {
            return false;
        }
        if let Some((target, sample)) = phy.receive(packet, rx_power) {
            notify(self.routing.as_mut(), target, sample);
        }
        true
    }
}

fn ipv4_send(mut segment: Segment, ttl: u8) -> Segment {
    segment.packet.add_header(Header::Ipv4(
        Ipv4Header::builder()
            .source(segment.source)
            .destination(segment.destination)
            .ttl(ttl)
            .build(),
    ));
    segment
}
