//! Command-line overrides layered on top of the YAML config file.

use crate::{config::Config, error::ConfigError};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};

#[derive(Debug, Parser)]
#[command(name = "lightnode", about = "JSON-RPC gateway in front of a Darknode cluster")]
pub struct Cli {
    /// Path to the YAML config file.
    #[arg(long, env = "LIGHTNODE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides `listen_addr`.
    #[arg(long, env = "LIGHTNODE_LISTEN_ADDR")]
    pub listen_addr: Option<SocketAddr>,

    /// Overrides `data_dir`.
    #[arg(long, env = "LIGHTNODE_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Overrides `log_level`.
    #[arg(long, env = "LIGHTNODE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Loads `self.config` (or the built-in defaults if unset) and applies
    /// the scalar CLI/env overrides on top.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(listen_addr) = self.listen_addr {
            config.listen_addr = listen_addr;
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone();
        }

        Ok(config)
    }
}
