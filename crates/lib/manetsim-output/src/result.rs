use std::path::Path;

use serde::Deserialize;

use crate::error::OutputError;
use crate::tables::position::PositionWriter;
use crate::tables::run::RunStatsWriter;
use crate::tables::throughput::ThroughputWriter;

#[derive(Deserialize, Debug, Clone)]
pub struct OutputSettings {
    pub output_path: String,
    #[serde(default = "default_throughput_file")]
    pub throughput_file: String,
    #[serde(default = "default_run_stats_file")]
    pub run_stats_file: String,
    #[serde(default)]
    pub trace_mobility: bool,
    #[serde(default = "default_position_file")]
    pub position_file: String,
}

fn default_throughput_file() -> String {
    "vanet-routing.output.csv".to_string()
}

fn default_run_stats_file() -> String {
    "vanet-routing.time.csv".to_string()
}

fn default_position_file() -> String {
    "vanet-routing.mob.csv".to_string()
}

pub trait ResultWriter {
    fn headers() -> &'static [&'static str];
    fn write_to_file(&mut self) -> Result<(), OutputError>;
    fn close_file(self) -> Result<(), OutputError>;
}

/// The statistics tables of a sweep. The mobility trace exists only when it is switched on.
#[derive(Debug)]
pub struct Results {
    pub throughput: ThroughputWriter,
    pub run_stats: RunStatsWriter,
    pub positions: Option<PositionWriter>,
}

impl Results {
    /// Creates the files under `config_path/output_path`, replacing earlier ones.
    pub fn new(config_path: &Path, output_settings: &OutputSettings) -> Result<Self, OutputError> {
        let output_path = config_path.join(&output_settings.output_path);
        let positions = if output_settings.trace_mobility {
            Some(PositionWriter::new(&output_path.join(&output_settings.position_file))?)
        } else {
            None
        };
        Ok(Self {
            throughput: ThroughputWriter::new(&output_path.join(&output_settings.throughput_file))?,
            run_stats: RunStatsWriter::new(&output_path.join(&output_settings.run_stats_file))?,
            positions,
        })
    }

    pub fn write_to_file(&mut self) -> Result<(), OutputError> {
        self.throughput.write_to_file()?;
        self.run_stats.write_to_file()?;
        if let Some(positions) = self.positions.as_mut() {
            positions.write_to_file()?;
        }
        Ok(())
    }

    pub fn close_files(self) -> Result<(), OutputError> {
        self.throughput.close_file()?;
        self.run_stats.close_file()?;
        if let Some(positions) = self.positions {
            positions.close_file()?;
        }
        Ok(())
    }
}
