use std::fs;
use std::path::PathBuf;

use manetsim_compare::error::ExperimentError;
use manetsim_compare::simulation::builder::PreparedRun;
use manetsim_compare::simulation::config::BaseConfig;
use manetsim_compare::simulation::driver::ExperimentDriver;
use manetsim_core::error::ConfigError;
use manetsim_core::node::NodeId;
use manetsim_models::device::netdevice::NetDevice;
use manetsim_models::routing::kind::RoutingKind;
use manetsim_output::result::Results;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("manetsim-sweep-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

struct Scenario {
    protocols: &'static str,
    nodes: (u32, u32, u32),
    sinks: u32,
    field: (f64, f64),
    mobility: &'static str,
    interval_stats: bool,
    trace_mobility: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            protocols: "[6]",
            nodes: (50, 50, 5),
            sinks: 10,
            field: (60.0, 60.0),
            mobility: "static",
            interval_stats: false,
            trace_mobility: false,
        }
    }
}

impl Scenario {
    fn config(&self) -> BaseConfig {
        let text = format!(
            r#"
[simulation_settings]
scenario = "test"
seed = 42
interval_stats = {interval_stats}
console_trace = false

[sweep_settings]
sinks = {sinks}
tx_power = 20.0
protocols = {protocols}
node_counts = {{ start = {start}, end = {end}, step = {step} }}

[field_settings]
width = {width}
height = {height}

[mobility_settings]
mobility_type = "{mobility}"

[log_settings]
log_path = "output"
log_level = "info"
log_file_name = "test.log"
log_overwrite = true

[output_settings]
output_path = "statistics"
throughput_file = "throughput.csv"
run_stats_file = "runs.csv"
trace_mobility = {trace_mobility}
position_file = "positions.csv"
"#,
            interval_stats = self.interval_stats,
            sinks = self.sinks,
            protocols = self.protocols,
            start = self.nodes.0,
            end = self.nodes.1,
            step = self.nodes.2,
            width = self.field.0,
            height = self.field.1,
            mobility = self.mobility,
            trace_mobility = self.trace_mobility,
        );
        toml::from_str(&text).unwrap()
    }
}

fn run_rows(base: &PathBuf) -> Vec<Vec<String>> {
    fs::read_to_string(base.join("statistics/runs.csv"))
        .unwrap()
        .lines()
        .skip(1)
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

#[test]
fn dense_static_network_delivers_every_packet() {
    let base = scratch("dense");
    let config = Scenario {
        protocols: "[1, 5, 6]",
        ..Default::default()
    }
    .config();
    let driver = ExperimentDriver::new(config).unwrap();
    let mut results = Results::new(&base, &driver.config().output_settings).unwrap();
    driver.run(&mut results).unwrap();
    results.close_files().unwrap();

    let rows = run_rows(&base);
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row[0], "50");
        assert_eq!(row[1], "1000");
        assert_eq!(row[2], "1000");
        assert_eq!(row[5], "1.0");
        assert!(row[4].parse::<f64>().unwrap() > 0.0);
    }
    fs::remove_dir_all(&base).unwrap();
}

#[test]
fn missing_wifi_phy_aborts_before_any_row() {
    let base = scratch("no-phy");
    let driver = ExperimentDriver::new(Scenario::default().config()).unwrap();
    let mut results = Results::new(&base, &driver.config().output_settings).unwrap();
    let outcome = driver.run_with(&mut results, |prepared| {
        prepared.nodes[3].device = Some(NetDevice::Loopback);
    });
    assert!(matches!(
        outcome,
        Err(ExperimentError::Config(ConfigError::MissingWifiPhy(id))) if id == NodeId::from(3u32)
    ));
    results.close_files().unwrap();
    assert!(run_rows(&base).is_empty());
    fs::remove_dir_all(&base).unwrap();
}

#[test]
fn unknown_selector_stops_the_sweep_up_front() {
    let config = Scenario {
        protocols: "[5, 7]",
        ..Default::default()
    }
    .config();
    assert!(matches!(
        ExperimentDriver::new(config),
        Err(ConfigError::UnknownProtocol(7))
    ));
}

#[test]
fn too_few_nodes_for_the_sinks_is_rejected() {
    let config = Scenario {
        nodes: (15, 30, 5),
        ..Default::default()
    }
    .config();
    assert!(matches!(
        ExperimentDriver::new(config),
        Err(ConfigError::InvalidSweep(_))
    ));
}

#[test]
fn repeated_runs_do_not_share_state() {
    let driver = ExperimentDriver::new(Scenario::default().config()).unwrap();
    let first = driver.run_once(RoutingKind::PowerGpsr, 50, &mut |_: &mut PreparedRun| {}).unwrap();
    let second = driver.run_once(RoutingKind::PowerGpsr, 50, &mut |_: &mut PreparedRun| {}).unwrap();
    assert_eq!(first.run_stats, second.run_stats);
}

#[test]
fn sparse_mobile_network_never_exceeds_the_expected_count() {
    let config = Scenario {
        protocols: "[5, 6]",
        nodes: (20, 30, 10),
        field: (1500.0, 300.0),
        mobility: "gauss_markov",
        ..Default::default()
    }
    .config();
    let driver = ExperimentDriver::new(config).unwrap();
    for kind in [RoutingKind::Gpsr, RoutingKind::PowerGpsr] {
        for node_count in [20, 30] {
            let outcome = driver.run_once(kind, node_count, &mut |_: &mut PreparedRun| {}).unwrap();
            let stats = outcome.run_stats;
            assert!(stats.total_received_packets <= stats.total_packets);
            assert!((0.0..=1.0).contains(&stats.pdr));
        }
    }
}

#[test]
fn periodic_rows_add_up_to_the_run_total() {
    let config = Scenario {
        interval_stats: true,
        ..Default::default()
    }
    .config();
    let driver = ExperimentDriver::new(config).unwrap();
    let outcome = driver.run_once(RoutingKind::Gpsr, 50, &mut |_: &mut PreparedRun| {}).unwrap();
    assert_eq!(outcome.throughput.len(), 53);
    let periodic: u64 = outcome.throughput.iter().map(|row| row.packets_received).sum();
    assert_eq!(periodic, outcome.run_stats.total_received_packets);
    assert!(outcome.throughput.iter().all(|row| row.routing_protocol == "GPSR"));
}

#[test]
fn node_counts_beyond_the_subnet_are_rejected_before_any_run() {
    let config = Scenario {
        protocols: "[5]",
        nodes: (250, 260, 5),
        ..Default::default()
    }
    .config();
    assert!(matches!(
        ExperimentDriver::new(config),
        Err(ConfigError::InvalidSweep(_))
    ));

    let full = Scenario {
        nodes: (240, 254, 7),
        ..Default::default()
    }
    .config();
    assert!(ExperimentDriver::new(full).is_ok());
}

#[test]
fn degenerate_field_is_a_config_error() {
    for (width, height) in [(-10.0, 60.0), (60.0, 0.0), (f64::NAN, 60.0)] {
        let mut config = Scenario::default().config();
        config.field_settings.width = width;
        config.field_settings.height = height;
        assert!(matches!(
            ExperimentDriver::new(config),
            Err(ConfigError::Settings(_))
        ));
    }
}

#[test]
fn unusable_phy_settings_are_a_config_error() {
    let mut config = Scenario::default().config();
    config.phy_settings.data_rate = 0.0;
    assert!(matches!(
        ExperimentDriver::new(config),
        Err(ConfigError::Settings(_))
    ));

    let mut config = Scenario::default().config();
    config.phy_settings.nakagami_m = Some(0.0);
    assert!(ExperimentDriver::new(config).is_err());
}

#[test]
fn mobility_trace_follows_every_step_when_enabled() {
    let mobile = Scenario {
        protocols: "[5]",
        nodes: (20, 20, 5),
        field: (1500.0, 300.0),
        mobility: "gauss_markov",
        ..Default::default()
    };

    let driver = ExperimentDriver::new(mobile.config()).unwrap();
    let outcome = driver.run_once(RoutingKind::Gpsr, 20, &mut |_: &mut PreparedRun| {}).unwrap();
    assert!(outcome.positions.is_empty());

    let base = scratch("mobility");
    let traced = Scenario {
        trace_mobility: true,
        ..mobile
    };
    let driver = ExperimentDriver::new(traced.config()).unwrap();
    let mut results = Results::new(&base, &driver.config().output_settings).unwrap();
    driver.run(&mut results).unwrap();
    results.close_files().unwrap();

    let trace = fs::read_to_string(base.join("statistics/positions.csv")).unwrap();
    let rows: Vec<Vec<&str>> = trace.lines().skip(1).map(|line| line.split(',').collect()).collect();
    // the initial placement plus one row set per second of the 53 s run
    assert_eq!(rows.len(), 20 * 54);
    assert!(rows.iter().all(|row| row[0] == "GPSR" && row[1] == "20"));
    assert_eq!(rows[0][2], "0");
    assert_eq!(rows[rows.len() - 1][2], "53000000");
    for row in &rows {
        let x: f64 = row[4].parse().unwrap();
        let y: f64 = row[5].parse().unwrap();
        assert!((0.0..=1500.0).contains(&x));
        assert!((0.0..=300.0).contains(&y));
    }
    fs::remove_dir_all(&base).unwrap();
}
