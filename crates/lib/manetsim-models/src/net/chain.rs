use std::net::Ipv4Addr;

use log::debug;

use manetsim_core::error::ConfigError;

use crate::device::node::Node;
use crate::net::packet::Packet;

/// Send entry points a layer can hand an outgoing segment to. The transport and the router
/// each store one of these as their down target, so the chain from transport to network
/// layer is plain data that can be inspected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DownTarget {
    #[default]
    Ipv4Send,
    RoutingAddHeaders,
}

/// A transport segment on its way down to the network layer.
#[derive(Clone, Debug)]
pub struct Segment {
    pub packet: Packet,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

/// Puts the node's power-adaptive router between its transport and the network layer.
///
/// The steps must run in this order: capture the transport's target, hand it to the
/// router, then point the transport at the router. A second splice on the same node is
/// rejected so that the chain never grows more than one hop.
pub fn splice_routing(node: &mut Node) -> Result<(), ConfigError> {
    let node_id = node.id();
    let captured = node
        .transport()
        .ok_or(ConfigError::MissingTransport(node_id))?
        .down_target();
    if captured == DownTarget::RoutingAddHeaders {
        return Err(ConfigError::AlreadySpliced(node_id));
    }

    node.power_router_mut()
        .ok_or(ConfigError::MissingRouting(node_id))?
        .set_down_target(captured)?;

    node.transport_mut()
        .ok_or(ConfigError::MissingTransport(node_id))?
        .set_down_target(DownTarget::RoutingAddHeaders);
    debug!("Spliced router of node {} below its transport", node_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use manetsim_core::node::NodeId;

    use super::*;
    use crate::net::transport::UdpProtocol;

    #[test]
    fn splice_without_router_leaves_transport_untouched() {
        let mut node = Node::builder().id(NodeId::from(3u32)).build();
        node.install_transport(UdpProtocol::default());
        assert!(matches!(
            splice_routing(&mut node),
            Err(ConfigError::MissingRouting(_))
        ));
        assert_eq!(
            node.transport().map(UdpProtocol::down_target),
            Some(DownTarget::Ipv4Send)
        );
    }

    #[test]
    fn splice_without_transport_fails() {
        let mut node = Node::builder().id(NodeId::from(4u32)).build();
        assert!(matches!(
            splice_routing(&mut node),
            Err(ConfigError::MissingTransport(_))
        ));
    }
}
