use thiserror::Error;

use manetsim_core::error::ConfigError;
use manetsim_output::error::OutputError;

/// Everything that stops a sweep.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("failed to read the configuration file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse the configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}
