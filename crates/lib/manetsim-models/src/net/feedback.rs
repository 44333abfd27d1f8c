use log::trace;

use manetsim_core::error::ConfigError;

use crate::device::node::Node;
use crate::routing::RoutingProtocol;

/// One reception report from a PHY to the router of the same node. It only lives for the
/// duration of the notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerRangeSample {
    pub packet_uid: u64,
    pub rx_power: f64,
}

/// The receiver of a PHY's reception reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackTarget {
    RoutingPowerUpdate,
}

/// Hands a sample to the node's router. Without a power-adaptive router this is a no-op.
pub fn notify(routing: Option<&mut RoutingProtocol>, target: FeedbackTarget, sample: PowerRangeSample) {
    match target {
        FeedbackTarget::RoutingPowerUpdate => {
            match routing.and_then(RoutingProtocol::as_power_adaptive_mut) {
                Some(router) => router.on_feedback(sample),
                None => trace!("No router registered for packet {}", sample.packet_uid),
            }
        }
    }
}

/// Points the node's Wi-Fi PHY at its router's power update handler.
pub fn wire_feedback(node: &mut Node) -> Result<(), ConfigError> {
    let node_id = node.id();
    if node.power_router().is_none() {
        return Err(ConfigError::MissingRouting(node_id));
    }
    node.wifi_phy_mut()
        .ok_or(ConfigError::MissingWifiPhy(node_id))?
        .set_cross_layer(FeedbackTarget::RoutingPowerUpdate);
    node.power_router_mut()
        .ok_or(ConfigError::MissingRouting(node_id))?
        .wire_feedback()
}
