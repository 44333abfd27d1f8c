use std::net::{Ipv4Addr, SocketAddrV4};

use manetsim_core::error::ConfigError;
use manetsim_core::node::NodeId;
use manetsim_models::device::mobility::Point2D;
use manetsim_models::device::netdevice::{DeviceContainer, DeviceHandle, NetDevice};
use manetsim_models::net::chain::{splice_routing, DownTarget};
use manetsim_models::net::packet::{Header, Packet};
use manetsim_models::routing::power::RouterState;
use manetsim_testutils::network::{line_of_nodes, make_node, power_helper, wifi_device};

#[test]
fn every_node_ends_up_active() {
    let (mut nodes, devices) = line_of_nodes(5, 40.0);
    let helper = power_helper();
    helper.aggregate(&mut nodes).unwrap();
    helper.install(&mut nodes, &devices).unwrap();
    for node in &nodes {
        let router = node.power_router().unwrap();
        assert_eq!(router.state(), RouterState::Active);
        assert_eq!(router.down_target(), Some(DownTarget::Ipv4Send));
        assert_eq!(
            node.transport().unwrap().down_target(),
            DownTarget::RoutingAddHeaders
        );
    }
}

#[test]
fn installation_order_does_not_matter() {
    let helper = power_helper();
    let (mut forward, devices) = line_of_nodes(4, 40.0);
    helper.aggregate(&mut forward).unwrap();
    helper.install(&mut forward, &devices).unwrap();

    let (mut reversed, _) = line_of_nodes(4, 40.0);
    reversed.reverse();
    let reversed_devices: DeviceContainer = reversed
        .iter()
        .map(|node| DeviceHandle { node: node.id() })
        .collect();
    helper.aggregate(&mut reversed).unwrap();
    helper.install(&mut reversed, &reversed_devices).unwrap();

    for node in &forward {
        let twin = reversed.iter().find(|other| other.id() == node.id()).unwrap();
        assert_eq!(
            node.power_router().unwrap().state(),
            twin.power_router().unwrap().state()
        );
        assert_eq!(
            node.transport().unwrap().down_target(),
            twin.transport().unwrap().down_target()
        );
    }
}

#[test]
fn second_splice_is_rejected() {
    let (mut nodes, devices) = line_of_nodes(2, 40.0);
    let helper = power_helper();
    helper.aggregate(&mut nodes).unwrap();
    helper.install(&mut nodes, &devices).unwrap();

    assert!(matches!(
        splice_routing(&mut nodes[0]),
        Err(ConfigError::AlreadySpliced(_))
    ));
    assert_eq!(
        nodes[0].power_router().unwrap().down_target(),
        Some(DownTarget::Ipv4Send)
    );
}

#[test]
fn node_without_wifi_phy_aborts_the_installation() {
    let (mut nodes, mut devices) = line_of_nodes(3, 40.0);
    nodes.push(make_node(3, Point2D::new(120.0, 0.0), NetDevice::Loopback));
    devices.add(DeviceHandle {
        node: NodeId::from(3u32),
    });
    let helper = power_helper();
    helper.aggregate(&mut nodes).unwrap();
    assert!(matches!(
        helper.install(&mut nodes, &devices),
        Err(ConfigError::MissingWifiPhy(id)) if id == NodeId::from(3u32)
    ));
}

#[test]
fn node_without_router_aborts_the_installation() {
    let (mut nodes, devices) = line_of_nodes(2, 40.0);
    assert!(matches!(
        power_helper().install(&mut nodes, &devices),
        Err(ConfigError::MissingRouting(_))
    ));
}

#[test]
fn a_node_takes_one_router_only() {
    let mut node = make_node(0, Point2D::default(), wifi_device());
    let helper = power_helper();
    node.aggregate_routing(helper.create().unwrap()).unwrap();
    assert!(matches!(
        node.aggregate_routing(helper.create().unwrap()),
        Err(ConfigError::RoutingAlreadyAggregated(_))
    ));
}

#[test]
fn spliced_send_path_stacks_geo_under_ipv4() {
    let (mut nodes, devices) = line_of_nodes(2, 40.0);
    let helper = power_helper();
    helper.aggregate(&mut nodes).unwrap();
    helper.install(&mut nodes, &devices).unwrap();

    let node = &mut nodes[1];
    let segment = node.transport().unwrap().segment(
        Packet::builder().uid(9).payload_size(64).build(),
        SocketAddrV4::new(Ipv4Addr::new(10, 1, 1, 2), 49153),
        SocketAddrV4::new(Ipv4Addr::new(10, 1, 1, 1), 9),
    );
    let sent = node.send_down(segment, 64).unwrap();
    let headers = sent.packet.headers();
    assert_eq!(headers.len(), 3);
    assert!(matches!(headers[0], Header::Udp(_)));
    assert!(matches!(headers[1], Header::Geo(_)));
    assert!(matches!(headers[2], Header::Ipv4(_)));
    assert_eq!(sent.packet.size(), 64 + 8 + 24 + 20);
}
