use std::net::SocketAddrV4;

use log::{debug, info};
use rand::Rng;

use manetsim_core::bucket::TimeUS;
use manetsim_core::error::ConfigError;
use manetsim_core::model::Model;
use manetsim_core::node::{NodeId, NodeRole};
use manetsim_models::device::channel::LogDistanceChannel;
use manetsim_models::device::mobility::Mobility;
use manetsim_models::device::netdevice::{DeviceContainer, DeviceHandle, NetDevice};
use manetsim_models::device::node::Node;
use manetsim_models::device::phy::WifiPhy;
use manetsim_models::net::address::{AddressBook, AddressHelper};
use manetsim_models::net::transport::UdpProtocol;
use manetsim_models::routing::installer::{BaselineHelper, PowerRoutingHelper};
use manetsim_models::routing::kind::RoutingKind;
use manetsim_models::{seeded_rng, SimRng};

use crate::apps::sender::Sender;
use crate::net::bucket::{NetworkBucket, RunSettings};
use crate::simulation::config::{BaseConfig, SUBNET_BASE, SUBNET_PREFIX};
use crate::stats::collector::Collector;

const SOURCE_PORT: u16 = 49153;

/// A run whose nodes, devices and addresses exist but whose routing is not installed yet.
pub struct PreparedRun {
    pub kind: RoutingKind,
    pub nodes: Vec<Node>,
    pub devices: DeviceContainer,
    pub book: AddressBook,
    pub rng: SimRng,
}

/// Builds the world of one run from the sweep configuration.
pub struct RunBuilder<'a> {
    config: &'a BaseConfig,
    channel: LogDistanceChannel,
}

impl<'a> RunBuilder<'a> {
    pub fn new(config: &'a BaseConfig) -> Self {
        Self {
            config,
            channel: LogDistanceChannel::with_settings(&config.phy_settings),
        }
    }

    /// Every protocol sees the same positions and start times for a given node count.
    fn run_seed(&self, node_count: u32) -> u64 {
        self.config
            .simulation_settings
            .seed
            .wrapping_add(u64::from(node_count))
    }

    fn role_of(&self, id: u32) -> NodeRole {
        let sinks = self.config.sweep_settings.sinks;
        if id < sinks {
            NodeRole::Sink
        } else if id < 2 * sinks {
            NodeRole::Source
        } else {
            NodeRole::Relay
        }
    }

    pub fn prepare(&self, kind: RoutingKind, node_count: u32) -> Result<PreparedRun, ConfigError> {
        let mut rng = seeded_rng(self.run_seed(node_count));
        let phy = &self.config.phy_settings;
        let tx_power = self.config.sweep_settings.tx_power;

        info!("Building {} nodes for {}", node_count, kind);
        let mut nodes = Vec::with_capacity(node_count as usize);
        for id in 0..node_count {
            let position = self.config.field_settings.random_position(&mut rng);
            let mobility = Mobility::new(&self.config.mobility_settings, &mut rng)?;
            let device = NetDevice::Wifi(
                WifiPhy::builder()
                    .tx_power(tx_power)
                    .rx_sensitivity(phy.rx_sensitivity)
                    .build(),
            );
            let mut node = Node::builder()
                .id(NodeId::from(id))
                .role(self.role_of(id))
                .position(position)
                .mobility(mobility)
                .device(Some(device))
                .build();
            node.install_transport(UdpProtocol::default());
            nodes.push(node);
        }
        let devices: DeviceContainer = nodes
            .iter()
            .map(|node| DeviceHandle { node: node.id() })
            .collect();
        let book = AddressHelper::new(SUBNET_BASE, SUBNET_PREFIX).assign(&mut nodes, &devices)?;
        Ok(PreparedRun {
            kind,
            nodes,
            devices,
            book,
            rng,
        })
    }

    pub fn install_routing(&self, prepared: &mut PreparedRun) -> Result<(), ConfigError> {
        let tx_power = self.config.sweep_settings.tx_power;
        let budget = self.channel.budget();
        if prepared.kind.is_cross_layer() {
            let helper = PowerRoutingHelper::new(
                tx_power,
                budget,
                self.config.routing_settings.clone(),
            );
            helper.aggregate(&mut prepared.nodes)?;
            helper.install(&mut prepared.nodes, &prepared.devices)
        } else {
            BaselineHelper::new(prepared.kind, budget.range_for(tx_power))
                .install(&mut prepared.nodes)
        }
    }

    fn socket_of(&self, nodes: &[Node], node_id: NodeId, port: u16) -> Result<SocketAddrV4, ConfigError> {
        let address = nodes
            .get(node_id.as_index())
            .ok_or(ConfigError::UnknownNode(node_id))?
            .address
            .ok_or_else(|| ConfigError::Settings(format!("node {} has no address", node_id)))?;
        Ok(SocketAddrV4::new(address, port))
    }

    /// Binds one socket per sink and pairs it with a sender on the node `sinks` further up.
    fn install_traffic(&self, prepared: &mut PreparedRun) -> Result<Vec<Sender>, ConfigError> {
        let traffic = &self.config.traffic_settings;
        let sinks = self.config.sweep_settings.sinks;
        let sink_ids: Vec<NodeId> = prepared
            .nodes
            .iter()
            .filter(|node| node.role == NodeRole::Sink)
            .map(|node| node.id())
            .collect();
        let mut senders = Vec::with_capacity(sink_ids.len());
        for sink_id in sink_ids {
            let bound = prepared
                .nodes
                .get_mut(sink_id.as_index())
                .ok_or(ConfigError::UnknownNode(sink_id))?
                .transport_mut()
                .ok_or(ConfigError::MissingTransport(sink_id))?
                .bind(traffic.port);
            if !bound {
                debug!("Port {} already bound on node {}", traffic.port, sink_id);
            }

            let source = NodeId::from(sink_id.as_u32() + sinks);
            let source_role = prepared
                .nodes
                .get(source.as_index())
                .ok_or(ConfigError::UnknownNode(source))?
                .role;
            if source_role != NodeRole::Source {
                return Err(ConfigError::Settings(format!(
                    "node {} pairs with sink {} but is a {}",
                    source, sink_id, source_role
                )));
            }
            let start = prepared
                .rng
                .gen_range(traffic.start_min.as_u64()..=traffic.start_max.as_u64());
            senders.push(
                Sender::builder()
                    .node(source)
                    .source(self.socket_of(&prepared.nodes, source, SOURCE_PORT)?)
                    .destination(self.socket_of(&prepared.nodes, sink_id, traffic.port)?)
                    .start(TimeUS::from(start))
                    .packet_size(traffic.packet_size)
                    .interval(traffic.interval)
                    .total(traffic.packets_per_sink)
                    .build(),
            );
        }
        Ok(senders)
    }

    /// Finishes a prepared run whose routing is installed.
    pub fn build_bucket(&self, mut prepared: PreparedRun) -> Result<NetworkBucket, ConfigError> {
        let senders = self.install_traffic(&mut prepared)?;
        let sim = &self.config.simulation_settings;
        let sweep = &self.config.sweep_settings;
        let expected_packets =
            u64::from(sweep.sinks) * u64::from(self.config.traffic_settings.packets_per_sink);
        let collector = Collector::builder()
            .sinks(sweep.sinks)
            .protocol(prepared.kind)
            .tx_power(sweep.tx_power)
            .expected_packets(expected_packets)
            .stats_interval(sim.stats_interval)
            .console_trace(sim.console_trace)
            .build();
        let settings = RunSettings::builder()
            .protocol(prepared.kind)
            .mobility_step(sim.mobility_step)
            .stats_interval(sim.stats_interval)
            .interval_stats(sim.interval_stats)
            .ttl(self.config.routing_settings.max_hops)
            .trace_mobility(self.config.output_settings.trace_mobility)
            .build();
        Ok(NetworkBucket::builder()
            .nodes(prepared.nodes)
            .channel(self.channel.clone())
            .field(self.config.field_settings)
            .book(prepared.book)
            .senders(senders)
            .collector(collector)
            .settings(settings)
            .rng(prepared.rng)
            .build())
    }
}
