use std::net::Ipv4Addr;
use std::path::PathBuf;

use serde::Deserialize;

use manetsim_core::bucket::TimeUS;
use manetsim_core::error::ConfigError;
use manetsim_models::device::channel::PhySettings;
use manetsim_models::device::mobility::{FieldSettings, MobilitySettings, MobilityType};
use manetsim_models::net::address::AddressHelper;
use manetsim_models::routing::kind::RoutingKind;
use manetsim_models::routing::policy::RoutingSettings;
use manetsim_output::logger::LogSettings;
use manetsim_output::result::OutputSettings;

use crate::error::ExperimentError;

/// Every run numbers its nodes out of this subnet.
pub const SUBNET_BASE: Ipv4Addr = Ipv4Addr::new(10, 1, 1, 0);
pub const SUBNET_PREFIX: u8 = 24;

#[derive(Deserialize, Debug, Clone)]
pub struct BaseConfig {
    pub simulation_settings: SimSettings,
    pub sweep_settings: SweepSettings,
    pub field_settings: FieldSettings,
    #[serde(default)]
    pub mobility_settings: MobilitySettings,
    #[serde(default)]
    pub phy_settings: PhySettings,
    #[serde(default)]
    pub traffic_settings: TrafficSettings,
    #[serde(default)]
    pub routing_settings: RoutingSettings,
    pub log_settings: LogSettings,
    pub output_settings: OutputSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SimSettings {
    pub scenario: String,
    #[serde(default = "default_duration")]
    pub duration: TimeUS,
    pub seed: u64,
    #[serde(default = "default_mobility_step")]
    pub mobility_step: TimeUS,
    #[serde(default = "default_stats_interval")]
    pub stats_interval: TimeUS,
    #[serde(default)]
    pub interval_stats: bool,
    #[serde(default = "default_console_trace")]
    pub console_trace: bool,
}

fn default_duration() -> TimeUS {
    TimeUS::from_secs(53)
}

fn default_mobility_step() -> TimeUS {
    TimeUS::from_secs(1)
}

fn default_stats_interval() -> TimeUS {
    TimeUS::from_secs(1)
}

fn default_console_trace() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCountRange {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

impl NodeCountRange {
    /// Inclusive of `end`, like the loop bounds of a sweep usually read.
    pub fn counts(&self) -> Vec<u32> {
        (self.start..=self.end).step_by(self.step.max(1) as usize).collect()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SweepSettings {
    pub sinks: u32,
    pub tx_power: f64,
    pub protocols: Vec<u32>,
    pub node_counts: NodeCountRange,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrafficSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_packet_size")]
    pub packet_size: u32,
    #[serde(default = "default_packets_per_sink")]
    pub packets_per_sink: u32,
    #[serde(default = "default_interval")]
    pub interval: TimeUS,
    #[serde(default = "default_start_min")]
    pub start_min: TimeUS,
    #[serde(default = "default_start_max")]
    pub start_max: TimeUS,
}

fn default_port() -> u16 {
    9
}

fn default_packet_size() -> u32 {
    64
}

fn default_packets_per_sink() -> u32 {
    100
}

fn default_interval() -> TimeUS {
    TimeUS::from(500_000u64)
}

fn default_start_min() -> TimeUS {
    TimeUS::from_secs(1)
}

fn default_start_max() -> TimeUS {
    TimeUS::from_secs(2)
}

impl Default for TrafficSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            packet_size: default_packet_size(),
            packets_per_sink: default_packets_per_sink(),
            interval: default_interval(),
            start_min: default_start_min(),
            start_max: default_start_max(),
        }
    }
}

impl BaseConfig {
    /// Checks everything a sweep depends on before the first node is built. Returns the
    /// protocols in the order they are to be run.
    pub fn validate(&self) -> Result<Vec<RoutingKind>, ConfigError> {
        let protocols = self
            .sweep_settings
            .protocols
            .iter()
            .map(|selector| RoutingKind::try_from(*selector))
            .collect::<Result<Vec<RoutingKind>, ConfigError>>()?;
        if protocols.is_empty() {
            return Err(ConfigError::InvalidSweep("no protocol selected".to_string()));
        }

        let sweep = &self.sweep_settings;
        let range = sweep.node_counts;
        if range.step == 0 || range.start > range.end {
            return Err(ConfigError::InvalidSweep(format!(
                "node counts {}..={} step {}",
                range.start, range.end, range.step
            )));
        }
        let capacity = AddressHelper::new(SUBNET_BASE, SUBNET_PREFIX).capacity();
        if range.end > capacity {
            return Err(ConfigError::InvalidSweep(format!(
                "{} nodes do not fit the {} host addresses of {}/{}",
                range.end, capacity, SUBNET_BASE, SUBNET_PREFIX
            )));
        }
        if sweep.sinks == 0 {
            return Err(ConfigError::InvalidSweep("at least one sink is needed".to_string()));
        }
        if range.start < 2 * sweep.sinks {
            return Err(ConfigError::InvalidSweep(format!(
                "{} nodes cannot host {} sinks and their sources",
                range.start, sweep.sinks
            )));
        }

        self.field_settings.validate()?;
        self.phy_settings.validate()?;

        let traffic = &self.traffic_settings;
        if traffic.start_min > traffic.start_max {
            return Err(ConfigError::Settings(format!(
                "traffic start window {}..{} is empty",
                traffic.start_min, traffic.start_max
            )));
        }
        if traffic.interval == TimeUS::ZERO {
            return Err(ConfigError::Settings("traffic interval is zero".to_string()));
        }
        let sim = &self.simulation_settings;
        if sim.interval_stats && sim.stats_interval == TimeUS::ZERO {
            return Err(ConfigError::Settings("stats interval is zero".to_string()));
        }
        if self.mobility_settings.mobility_type != MobilityType::Static
            && sim.mobility_step == TimeUS::ZERO
        {
            return Err(ConfigError::Settings("mobility step is zero".to_string()));
        }
        Ok(protocols)
    }
}

pub struct BaseConfigReader {
    file_path: PathBuf,
}

impl BaseConfigReader {
    pub fn new(file_name: &str) -> Self {
        let file_path = PathBuf::from(file_name);
        Self { file_path }
    }

    pub fn parse(&self) -> Result<BaseConfig, ExperimentError> {
        let parsing_result = std::fs::read_to_string(&self.file_path)?;
        let config: BaseConfig = toml::from_str(&parsing_result)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses_and_validates() {
        let config: BaseConfig = toml::from_str(include_str!("../../configs/compare.toml")).unwrap();
        assert_eq!(config.simulation_settings.duration, TimeUS::from_secs(53));
        assert_eq!(config.traffic_settings.packets_per_sink, 100);
        assert_eq!(config.phy_settings.nakagami_m, Some(1.0));
        assert!(!config.output_settings.trace_mobility);
        let protocols = config.validate().unwrap();
        assert_eq!(protocols, vec![RoutingKind::Gpsr, RoutingKind::PowerGpsr]);
        assert_eq!(config.sweep_settings.node_counts.counts().len(), 17);
    }

    #[test]
    fn node_count_range_includes_the_end() {
        let range = NodeCountRange {
            start: 20,
            end: 30,
            step: 5,
        };
        assert_eq!(range.counts(), vec![20, 25, 30]);
    }
}
