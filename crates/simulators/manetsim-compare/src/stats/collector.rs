use log::debug;
use typed_builder::TypedBuilder;

use manetsim_core::bucket::TimeUS;
use manetsim_core::node::NodeId;
use manetsim_models::net::address::SenderAddress;
use manetsim_models::net::packet::Packet;
use manetsim_models::routing::kind::RoutingKind;
use manetsim_output::tables::run::RunStatsRow;
use manetsim_output::tables::throughput::ThroughputRow;

/// Running totals since the last flush.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReceptionRecord {
    pub bytes: u64,
    pub packets: u64,
    pub latency: TimeUS,
}

impl ReceptionRecord {
    fn add(&mut self, bytes: u64, latency: Option<TimeUS>) {
        self.bytes += bytes;
        self.packets += 1;
        if let Some(latency) = latency {
            self.latency += latency;
        }
    }
}

/// Counts what the sinks of one run receive.
///
/// The interval record feeds the periodic throughput rows and the run record feeds the
/// per-run row. They are reset independently, so the periodic flush never eats into the
/// run totals.
#[derive(Clone, Debug, TypedBuilder)]
pub struct Collector {
    sinks: u32,
    protocol: RoutingKind,
    tx_power: f64,
    expected_packets: u64,
    stats_interval: TimeUS,
    #[builder(default = true)]
    console_trace: bool,
    #[builder(default)]
    interval: ReceptionRecord,
    #[builder(default)]
    run: ReceptionRecord,
    #[builder(default)]
    throughput_rows: Vec<ThroughputRow>,
}

impl Collector {
    pub fn on_receive(&mut self, now: TimeUS, sink: NodeId, packet: &Packet, from: SenderAddress) {
        let bytes = u64::from(packet.size());
        let latency = packet.send_timestamp().map(|sent| now - sent);
        if latency.is_none() {
            debug!("Packet {} carries no send timestamp", packet.uid);
        }
        self.interval.add(bytes, latency);
        self.run.add(bytes, latency);
        if self.console_trace {
            println!("{}", trace_line(now, sink, from));
        }
    }

    /// Interval throughput in kbit/s. The row is buffered until the run ends.
    pub fn flush_interval(&mut self, now: TimeUS) -> &ThroughputRow {
        let seconds = self.stats_interval.as_secs_f64();
        let kilobits = self.interval.bytes as f64 * 8.0 / 1000.0;
        let receive_rate = if seconds > 0.0 { kilobits / seconds } else { 0.0 };
        self.throughput_rows.push(ThroughputRow {
            simulation_second: now.as_secs_f64(),
            receive_rate,
            packets_received: self.interval.packets,
            number_of_sinks: self.sinks,
            routing_protocol: self.protocol.to_string(),
            transmission_power: self.tx_power,
        });
        self.interval = ReceptionRecord::default();
        &self.throughput_rows[self.throughput_rows.len() - 1]
    }

    /// Closes the run. Averages over zero packets are reported as zero.
    pub fn flush_run(&mut self, node_count: u32) -> RunStatsRow {
        let received = self.run.packets;
        let total_time = self.run.latency.as_secs_f64();
        let average_time = if received == 0 {
            0.0
        } else {
            total_time / received as f64
        };
        let pdr = if self.expected_packets == 0 {
            0.0
        } else {
            received as f64 / self.expected_packets as f64
        };
        self.run = ReceptionRecord::default();
        self.interval = ReceptionRecord::default();
        RunStatsRow {
            node_counts: node_count,
            total_packets: self.expected_packets,
            total_received_packets: received,
            total_time,
            average_time,
            pdr,
        }
    }

    pub fn take_throughput_rows(&mut self) -> Vec<ThroughputRow> {
        std::mem::take(&mut self.throughput_rows)
    }

    pub fn run_record(&self) -> &ReceptionRecord {
        &self.run
    }

    pub fn interval_record(&self) -> &ReceptionRecord {
        &self.interval
    }
}

pub fn trace_line(now: TimeUS, sink: NodeId, from: SenderAddress) -> String {
    match from {
        SenderAddress::Inet(_) => {
            format!("{} {} received one packet from {}", now.as_secs_f64(), sink, from)
        }
        SenderAddress::Unknown => format!("{} {} received one packet!", now.as_secs_f64(), sink),
    }
}
