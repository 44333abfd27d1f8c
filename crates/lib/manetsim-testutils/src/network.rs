use manetsim_core::model::Model;
use manetsim_core::node::NodeId;
use manetsim_models::device::channel::{LinkBudget, LogDistanceChannel, PhySettings};
use manetsim_models::device::mobility::Point2D;
use manetsim_models::device::netdevice::{DeviceContainer, DeviceHandle, NetDevice};
use manetsim_models::device::node::Node;
use manetsim_models::device::phy::WifiPhy;
use manetsim_models::net::transport::UdpProtocol;
use manetsim_models::routing::installer::PowerRoutingHelper;
use manetsim_models::routing::policy::RoutingSettings;

pub const TX_POWER: f64 = 20.0;

pub fn link_budget() -> LinkBudget {
    LogDistanceChannel::with_settings(&PhySettings::default()).budget()
}

pub fn power_helper() -> PowerRoutingHelper {
    PowerRoutingHelper::new(TX_POWER, link_budget(), RoutingSettings::default())
}

pub fn wifi_device() -> NetDevice {
    NetDevice::Wifi(
        WifiPhy::builder()
            .tx_power(TX_POWER)
            .rx_sensitivity(PhySettings::default().rx_sensitivity)
            .build(),
    )
}

pub fn make_node(id: u32, position: Point2D, device: NetDevice) -> Node {
    let mut node = Node::builder()
        .id(NodeId::from(id))
        .position(position)
        .device(Some(device))
        .build();
    node.install_transport(UdpProtocol::default());
    node
}

/// Nodes on a horizontal line, `spacing` metres apart, each with a Wi-Fi PHY and UDP.
pub fn line_of_nodes(count: u32, spacing: f64) -> (Vec<Node>, DeviceContainer) {
    let nodes: Vec<Node> = (0..count)
        .map(|id| make_node(id, Point2D::new(f64::from(id) * spacing, 0.0), wifi_device()))
        .collect();
    let devices = nodes
        .iter()
        .map(|node| DeviceHandle { node: node.id() })
        .collect();
    (nodes, devices)
}
