//! Configuration loading errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, #[source] source: serde_yaml::Error },
    #[error("bootstrap peer {0:?} has an empty identity")]
    EmptyBootstrapIdentity(String),
}
