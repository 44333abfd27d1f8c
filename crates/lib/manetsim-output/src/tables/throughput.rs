use std::path::Path;

use serde::Serialize;

use crate::error::OutputError;
use crate::result::ResultWriter;
use crate::writer::WriterCsv;

/// One periodic reception sample. `receive_rate` is in kbit/s.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ThroughputRow {
    #[serde(rename = "SimulationSecond")]
    pub simulation_second: f64,
    #[serde(rename = "ReceiveRate")]
    pub receive_rate: f64,
    #[serde(rename = "PacketsReceived")]
    pub packets_received: u64,
    #[serde(rename = "NumberOfSinks")]
    pub number_of_sinks: u32,
    #[serde(rename = "RoutingProtocol")]
    pub routing_protocol: String,
    #[serde(rename = "TransmissionPower")]
    pub transmission_power: f64,
}

#[derive(Debug)]
pub struct ThroughputWriter {
    rows: Vec<ThroughputRow>,
    to_output: WriterCsv,
}

impl ThroughputWriter {
    pub fn new(output_file: &Path) -> Result<Self, OutputError> {
        Ok(Self {
            rows: Vec::new(),
            to_output: WriterCsv::create(output_file, Self::headers())?,
        })
    }

    pub fn add_data(&mut self, rows: Vec<ThroughputRow>) {
        self.rows.extend(rows);
    }

    pub fn pending(&self) -> usize {
        self.rows.len()
    }
}

impl ResultWriter for ThroughputWriter {
    fn headers() -> &'static [&'static str] {
        &[
            "SimulationSecond",
            "ReceiveRate",
            "PacketsReceived",
            "NumberOfSinks",
            "RoutingProtocol",
            "TransmissionPower",
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
