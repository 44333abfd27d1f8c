use std::path::Path;

use serde::Serialize;

use crate::error::OutputError;
use crate::result::ResultWriter;
use crate::writer::WriterCsv;

/// Where one node stood at one mobility step of a run. `time_step` is in µs.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PositionRow {
    #[serde(rename = "RoutingProtocol")]
    pub routing_protocol: String,
    #[serde(rename = "NodeCounts")]
    pub node_counts: u32,
    #[serde(rename = "TimeStep")]
    pub time_step: u64,
    #[serde(rename = "NodeId")]
    pub node_id: u64,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
}

#[derive(Debug)]
pub struct PositionWriter {
    rows: Vec<PositionRow>,
    to_output: WriterCsv,
}

impl PositionWriter {
    pub fn new(output_file: &Path) -> Result<Self, OutputError> {
        Ok(Self {
            rows: Vec::new(),
            to_output: WriterCsv::create(output_file, Self::headers())?,
        })
    }

    pub fn add_data(&mut self, rows: Vec<PositionRow>) {
        self.rows.extend(rows);
    }
}

impl ResultWriter for PositionWriter {
    fn headers() -> &'static [&'static str] {
        &["RoutingProtocol", "NodeCounts", "TimeStep", "NodeId", "X", "Y"]
    }

    fn write_to_file(&mut self) -> Result<(), OutputError> {
        self.to_output.append(&self.rows)?;
        self.rows.clear();
        Ok(())
    }

    fn close_file(mut self) -> Result<(), OutputError> {
        self.write_to_file()
    }
}
