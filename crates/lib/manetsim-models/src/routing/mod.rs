use manetsim_core::node::NodeId;

use crate::net::packet::Packet;
use crate::net::topology::Topology;
use crate::routing::greedy::GreedyRouter;
use crate::routing::kind::RoutingKind;
use crate::routing::power::PowerAdaptiveRouter;
use crate::routing::table::TableRouter;

pub mod greedy;
pub mod installer;
pub mod kind;
pub mod policy;
pub mod power;
pub mod table;

/// The routing instance aggregated onto a node. Only the power-adaptive variant takes part
/// in the transport splice and the cross-layer feedback; the others route on their own.
#[derive(Clone, Debug)]
pub enum RoutingProtocol {
    Table(TableRouter),
    Greedy(GreedyRouter),
    PowerAdaptive(PowerAdaptiveRouter),
}

impl RoutingProtocol {
    pub fn kind(&self) -> RoutingKind {
        match self {
            RoutingProtocol::Table(router) => router.kind(),
            RoutingProtocol::Greedy(_) => RoutingKind::Gpsr,
            RoutingProtocol::PowerAdaptive(_) => RoutingKind::PowerGpsr,
        }
    }

    pub fn next_hop(&self, me: NodeId, destination: NodeId, topology: &Topology) -> Option<NodeId> {
        match self {
            RoutingProtocol::Table(router) => router.next_hop(me, destination, topology),
            RoutingProtocol::Greedy(router) => router.next_hop(me, destination, topology),
            RoutingProtocol::PowerAdaptive(router) => router.next_hop(me, destination, topology),
        }
    }

    /// Strips the routing metadata before a packet is handed to the transport.
    pub fn remove_headers(&self, packet: &mut Packet) {
        if let RoutingProtocol::PowerAdaptive(router) = self {
            router.remove_headers(packet);
        }
    }

    pub fn as_power_adaptive(&self) -> Option<&PowerAdaptiveRouter> {
        match self {
            RoutingProtocol::PowerAdaptive(router) => Some(router),
            _ => None,
        }
    }

    pub fn as_power_adaptive_mut(&mut self) -> Option<&mut PowerAdaptiveRouter> {
        match self {
            RoutingProtocol::PowerAdaptive(router) => Some(router),
            _ => None,
        }
    }

    pub fn teardown(&mut self) {
        if let RoutingProtocol::PowerAdaptive(router) = self {
            router.teardown();
        }
    }
}
