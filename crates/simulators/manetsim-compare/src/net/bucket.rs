use log::{debug, info};
use typed_builder::TypedBuilder;

use manetsim_core::bucket::{Bucket, TimeUS};
use manetsim_core::error::ConfigError;
use manetsim_core::node::NodeId;
use manetsim_core::scheduler::EventQueue;
use manetsim_models::device::channel::LogDistanceChannel;
use manetsim_models::device::mobility::FieldSettings;
use manetsim_models::device::node::Node;
use manetsim_models::net::address::AddressBook;
use manetsim_models::net::packet::{Header, Packet};
use manetsim_models::net::topology::Topology;
use manetsim_models::routing::kind::RoutingKind;
use manetsim_models::SimRng;
use manetsim_output::tables::position::PositionRow;
use manetsim_output::tables::run::RunStatsRow;
use manetsim_output::tables::throughput::ThroughputRow;

use crate::apps::sender::Sender;
use crate::stats::collector::Collector;

#[derive(Clone, Debug)]
pub enum NetEvent {
    MobilityStep,
    AppSend(usize),
    FrameArrival {
        to: NodeId,
        next_hop: NodeId,
        rx_power: f64,
        packet: Packet,
    },
    FlushInterval,
}

#[derive(Clone, Copy, Debug, TypedBuilder)]
pub struct RunSettings {
    pub protocol: RoutingKind,
    pub mobility_step: TimeUS,
    pub stats_interval: TimeUS,
    pub interval_stats: bool,
    pub ttl: u8,
    #[builder(default)]
    pub trace_mobility: bool,
}

/// What a finished run hands back to the driver.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub throughput: Vec<ThroughputRow>,
    pub run_stats: RunStatsRow,
    pub positions: Vec<PositionRow>,
}

/// The world of one run: every node, the shared channel and the reception statistics.
#[derive(TypedBuilder)]
pub struct NetworkBucket {
    pub nodes: Vec<Node>,
    pub channel: LogDistanceChannel,
    pub field: FieldSettings,
    pub book: AddressBook,
    pub senders: Vec<Sender>,
    pub collector: Collector,
    pub settings: RunSettings,
    rng: SimRng,
    #[builder(default)]
    topology: Topology,
    #[builder(default)]
    next_uid: u64,
    #[builder(default)]
    dropped: u64,
    #[builder(default)]
    run_stats: Option<RunStatsRow>,
    #[builder(default)]
    positions: Vec<PositionRow>,
}

impl NetworkBucket {
    fn refresh_topology(&mut self) {
        let positions = self.nodes.iter().map(|node| node.position).collect();
        self.topology.rebuild(positions);
    }

    fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node, ConfigError> {
        self.nodes
            .get_mut(node_id.as_index())
            .ok_or(ConfigError::UnknownNode(node_id))
    }

    fn move_nodes(&mut self, elapsed: f64) {
        for node in self.nodes.iter_mut() {
            node.position = node
                .mobility
                .advance(node.position, elapsed, &self.field, &mut self.rng);
        }
        self.refresh_topology();
    }

    fn trace_positions(&mut self, now: TimeUS) {
        if !self.settings.trace_mobility {
            return;
        }
        let protocol = self.settings.protocol.to_string();
        let node_counts = self.nodes.len() as u32;
        self.positions.extend(self.nodes.iter().map(|node| PositionRow {
            routing_protocol: protocol.clone(),
            node_counts,
            time_step: now.as_u64(),
            node_id: node.id().as_u64(),
            x: node.position.x,
            y: node.position.y,
        }));
    }

    fn send_from_app(
        &mut self,
        now: TimeUS,
        app: usize,
        queue: &mut EventQueue<NetEvent>,
    ) -> Result<(), ConfigError> {
        let uid = self.next_uid;
        let ttl = self.settings.ttl;
        let sender = match self.senders.get_mut(app) {
            Some(sender) => sender,
            None => return Ok(()),
        };
        let packet = match sender.next_packet(uid, now) {
            Some(packet) => packet,
            None => return Ok(()),
        };
        self.next_uid += 1;
        if let Some(at) = sender.next_send(now) {
            queue.schedule(at, NetEvent::AppSend(app));
        }
        let (node_id, source, destination) = (sender.node, sender.source, sender.destination);

        let node = self.node_mut(node_id)?;
        let segment = node
            .transport()
            .ok_or(ConfigError::MissingTransport(node_id))?
            .segment(packet, source, destination);
        let segment = node.send_down(segment, ttl)?;
        self.transmit(now, node_id, segment.packet, queue)
    }

    /// Puts a frame on the air. Every PHY in reach hears it, only the chosen next hop
    /// takes it further.
    fn transmit(
        &mut self,
        now: TimeUS,
        from: NodeId,
        packet: Packet,
        queue: &mut EventQueue<NetEvent>,
    ) -> Result<(), ConfigError> {
        let destination = match packet.peek_header() {
            Some(Header::Ipv4(header)) => header.destination,
            _ => {
                debug!("Packet {} has no network header, dropped", packet.uid);
                self.dropped += 1;
                return Ok(());
            }
        };
        let destination = self
            .book
            .node_of(&destination)
            .ok_or(ConfigError::UnknownAddress(destination))?;

        let node = self
            .nodes
            .get(from.as_index())
            .ok_or(ConfigError::UnknownNode(from))?;
        let next_hop = match node
            .routing()
            .ok_or(ConfigError::MissingRouting(from))?
            .next_hop(from, destination, &self.topology)
        {
            Some(next_hop) => next_hop,
            None => {
                debug!("Node {} has no route to {} for packet {}", from, destination, packet.uid);
                self.dropped += 1;
                return Ok(());
            }
        };
        let tx_power = node
            .wifi_phy()
            .ok_or(ConfigError::MissingWifiPhy(from))?
            .tx_power;

        let reach = self.channel.reach(tx_power);
        for neighbor in self.topology.neighbors_of(from, reach) {
            let rx_power = self
                .channel
                .rx_power(tx_power, neighbor.distance, &mut self.rng);
            let delay = self.channel.hop_delay(packet.size(), neighbor.distance);
            queue.schedule(
                now + delay,
                NetEvent::FrameArrival {
                    to: neighbor.node_id,
                    next_hop,
                    rx_power,
                    packet: packet.clone(),
                },
            );
        }
        Ok(())
    }

    fn on_frame(
        &mut self,
        now: TimeUS,
        to: NodeId,
        next_hop: NodeId,
        rx_power: f64,
        mut packet: Packet,
        queue: &mut EventQueue<NetEvent>,
    ) -> Result<(), ConfigError> {
        let node = self.node_mut(to)?;
        if !node.receive_frame(&packet, rx_power) || to != next_hop {
            if to == next_hop {
                debug!("Packet {} lost on the way to node {}", packet.uid, to);
                self.dropped += 1;
            }
            return Ok(());
        }

        let header = match packet.peek_header() {
            Some(Header::Ipv4(header)) => *header,
            _ => return Ok(()),
        };
        if node.address != Some(header.destination) {
            match packet.outer_ipv4_mut() {
                Some(ipv4) if ipv4.ttl > 1 => ipv4.ttl -= 1,
                _ => {
                    debug!("Packet {} expired at node {}", packet.uid, to);
                    self.dropped += 1;
                    return Ok(());
                }
            }
            return self.transmit(now, to, packet, queue);
        }

        packet.remove_header();
        if let Some(routing) = node.routing() {
            routing.remove_headers(&mut packet);
        }
        let delivery = node
            .transport()
            .ok_or(ConfigError::MissingTransport(to))?
            .deliver(packet, Some(header.source));
        match delivery {
            Some(delivery) => self.collector.on_receive(now, to, &delivery.packet, delivery.from),
            None => debug!("Node {} has no socket for the packet", to),
        }
        Ok(())
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Hands back the rows of the run. Only meaningful after the scheduler terminated.
    pub fn into_outcome(mut self) -> Result<RunOutcome, ConfigError> {
        let run_stats = self
            .run_stats
            .take()
            .ok_or_else(|| ConfigError::Settings("run has not been terminated".to_string()))?;
        Ok(RunOutcome {
            throughput: self.collector.take_throughput_rows(),
            run_stats,
            positions: std::mem::take(&mut self.positions),
        })
    }
}

impl Bucket for NetworkBucket {
    type Event = NetEvent;

    fn initialize(&mut self, queue: &mut EventQueue<NetEvent>) -> Result<(), ConfigError> {
        self.refresh_topology();
        self.trace_positions(TimeUS::ZERO);
        if self.nodes.iter().any(|node| !node.mobility.is_static()) {
            queue.schedule(self.settings.mobility_step, NetEvent::MobilityStep);
        }
        for (app, sender) in self.senders.iter().enumerate() {
            queue.schedule(sender.start, NetEvent::AppSend(app));
        }
        if self.settings.interval_stats {
            queue.schedule(self.settings.stats_interval, NetEvent::FlushInterval);
        }
        info!(
            "Initialized run with {} nodes and {} senders",
            self.nodes.len(),
            self.senders.len()
        );
        Ok(())
    }

    fn handle(
        &mut self,
        now: TimeUS,
        event: NetEvent,
        queue: &mut EventQueue<NetEvent>,
    ) -> Result<(), ConfigError> {
        match event {
            NetEvent::MobilityStep => {
                let step = self.settings.mobility_step;
                self.move_nodes(step.as_secs_f64());
                self.trace_positions(now);
                queue.schedule(now + step, NetEvent::MobilityStep);
                Ok(())
            }
            NetEvent::AppSend(app) => self.send_from_app(now, app, queue),
            NetEvent::FrameArrival {
                to,
                next_hop,
                rx_power,
                packet,
            } => self.on_frame(now, to, next_hop, rx_power, packet, queue),
            NetEvent::FlushInterval => {
                self.collector.flush_interval(now);
                queue.schedule(now + self.settings.stats_interval, NetEvent::FlushInterval);
                Ok(())
            }
        }
    }

    fn terminate(&mut self, now: TimeUS) {
        let run_stats = self.collector.flush_run(self.nodes.len() as u32);
        let frames_heard: u64 = self
            .nodes
            .iter()
            .filter_map(|node| node.wifi_phy())
            .map(|phy| phy.rx_count())
            .sum();
        info!(
            "Run over at {}: {} of {} packets received, {} dropped, {} frames heard",
            now,
            run_stats.total_received_packets,
            run_stats.total_packets,
            self.dropped,
            frames_heard
        );
        self.run_stats = Some(run_stats);
        for node in self.nodes.iter_mut() {
            if let Some(routing) = node.routing_mut() {
                routing.teardown();
            }
        }
    }
}
