use std::path::Path;

use serde::Serialize;

use crate::error::OutputError;
use crate::result::ResultWriter;
use crate::writer::WriterCsv;

/// Totals of one run. Times are in seconds, `total_time` sums the one-way latencies.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RunStatsRow {
    #[serde(rename = "NodeCounts")]
    pub node_counts: u32,
    #[serde(rename = "TotalPackets")]
    pub total_packets: u64,
    #[serde(rename = "TotalReceivedPackets")]
    pub total_received_packets: u64,
    #[serde(rename = "TotalTime")]
    pub total_time: f64,
    #[serde(rename = "AverageTime")]
    pub average_time: f64,
    #[serde(rename = "PDR")]
    pub pdr: f64,
}

#[derive(Debug)]
pub struct RunStatsWriter {
    rows: Vec<RunStatsRow>,
    to_output: WriterCsv,
}

impl RunStatsWriter {
    pub fn new(output_file: &Path) -> Result<Self, OutputError> {
        Ok(Self {
            rows: Vec::new(),
            to_output: WriterCsv::create(output_file, Self::headers())?,
        })
    }

    pub fn add_data(&mut self, row: RunStatsRow) {
        self.rows.push(row);
    }
}

impl ResultWriter for RunStatsWriter {
    fn headers() -> &'static [&'static str] {
        &[
            "NodeCounts",
            "TotalPackets",
            "TotalReceivedPackets",
            "TotalTime",
            "AverageTime",
            "PDR",
        ]
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
