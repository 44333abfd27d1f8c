use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use log::debug;
use serde::Serialize;

use crate::error::OutputError;

/// An append-only CSV file. The header row is written once when the file is created;
/// every later write reopens the file and appends rows only.
#[derive(Debug, Clone)]
pub struct WriterCsv {
    file_name: PathBuf,
}

impl WriterCsv {
    /// Truncates `file_name` and writes the header row.
    pub fn create(file_name: &Path, headers: &[&str]) -> Result<Self, OutputError> {
        if let Some(parent) = file_name.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = Writer::from_path(file_name)?;
        writer.write_record(headers)?;
        writer.flush()?;
        debug!("Created {}", file_name.display());
        Ok(Self {
            file_name: file_name.to_owned(),
        })
    }

    fn build_writer(&self) -> Result<Writer<File>, OutputError> {
        let file = OpenOptions::new().append(true).open(&self.file_name)?;
        Ok(WriterBuilder::new().has_headers(false).from_writer(file))
    }

    pub fn append<R: Serialize>(&self, rows: &[R]) -> Result<(), OutputError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut writer = self.build_writer()?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!("Appended {} rows to {}", rows.len(), self.file_name.display());
        Ok(())
    }
}
