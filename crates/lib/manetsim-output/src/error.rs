use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("logger setup failed: {0}")]
    Logger(String),
}
