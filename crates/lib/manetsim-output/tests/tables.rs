use std::fs;
use std::path::PathBuf;

use manetsim_output::result::{OutputSettings, ResultWriter, Results};
use manetsim_output::tables::position::PositionRow;
use manetsim_output::tables::run::RunStatsRow;
use manetsim_output::tables::throughput::ThroughputRow;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("manetsim-output-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn settings() -> OutputSettings {
    OutputSettings {
        output_path: "stats".to_string(),
        throughput_file: "throughput.csv".to_string(),
        run_stats_file: "runs.csv".to_string(),
        trace_mobility: false,
        position_file: "positions.csv".to_string(),
    }
}

#[test]
fn fresh_files_hold_only_the_headers() {
    let base = scratch("headers");
    let results = Results::new(&base, &settings()).unwrap();
    results.close_files().unwrap();

    let throughput = fs::read_to_string(base.join("stats/throughput.csv")).unwrap();
    assert_eq!(
        throughput,
        "SimulationSecond,ReceiveRate,PacketsReceived,NumberOfSinks,RoutingProtocol,TransmissionPower\n"
    );
    let runs = fs::read_to_string(base.join("stats/runs.csv")).unwrap();
    assert_eq!(
        runs,
        "NodeCounts,TotalPackets,TotalReceivedPackets,TotalTime,AverageTime,PDR\n"
    );
    fs::remove_dir_all(&base).unwrap();
}

#[test]
fn rows_are_appended_after_the_header() {
    let base = scratch("append");
    let mut results = Results::new(&base, &settings()).unwrap();
    for node_counts in [50, 55] {
        results.run_stats.add_data(RunStatsRow {
            node_counts,
            total_packets: 1000,
            total_received_packets: 1000,
            total_time: 2.5,
            average_time: 0.0025,
            pdr: 1.0,
        });
        results.run_stats.write_to_file().unwrap();
    }
    results.throughput.add_data(vec![ThroughputRow {
        simulation_second: 1.0,
        receive_rate: 1.024,
        packets_received: 2,
        number_of_sinks: 10,
        routing_protocol: "MYGPSR".to_string(),
        transmission_power: 20.0,
    }]);
    results.close_files().unwrap();

    let runs = fs::read_to_string(base.join("stats/runs.csv")).unwrap();
    let lines: Vec<&str> = runs.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "50,1000,1000,2.5,0.0025,1.0");
    assert_eq!(lines[2], "55,1000,1000,2.5,0.0025,1.0");

    let throughput = fs::read_to_string(base.join("stats/throughput.csv")).unwrap();
    assert_eq!(throughput.lines().nth(1), Some("1.0,1.024,2,10,MYGPSR,20.0"));
    fs::remove_dir_all(&base).unwrap();
}

#[test]
fn mobility_trace_is_only_written_when_switched_on() {
    let base = scratch("positions-off");
    let results = Results::new(&base, &settings()).unwrap();
    assert!(results.positions.is_none());
    results.close_files().unwrap();
    assert!(!base.join("stats/positions.csv").exists());
    fs::remove_dir_all(&base).unwrap();

    let base = scratch("positions-on");
    let traced = OutputSettings {
        trace_mobility: true,
        ..settings()
    };
    let mut results = Results::new(&base, &traced).unwrap();
    if let Some(positions) = results.positions.as_mut() {
        positions.add_data(vec![PositionRow {
            routing_protocol: "GPSR".to_string(),
            node_counts: 20,
            time_step: 1_000_000,
            node_id: 4,
            x: 12.5,
            y: 80.0,
        }]);
    }
    results.close_files().unwrap();

    let trace = fs::read_to_string(base.join("stats/positions.csv")).unwrap();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(lines, vec!["RoutingProtocol,NodeCounts,TimeStep,NodeId,X,Y", "GPSR,20,1000000,4,12.5,80.0"]);
    fs::remove_dir_all(&base).unwrap();
}
