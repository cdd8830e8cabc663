//! Typed process configuration, loaded from YAML and overridable from the
//! command line.

use crate::error::ConfigError;
use lightnode_types::{Peer, PeerAddr, PeerId};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, net::SocketAddr, path::Path, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// A bootstrap peer as written in the config file: `identity@host:grpc_port`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapPeer {
    pub id: String,
    pub host: String,
    pub grpc_port: u16,
}

impl BootstrapPeer {
    fn into_peer(self) -> Result<Peer, ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::EmptyBootstrapIdentity(format!("{}:{}", self.host, self.grpc_port)));
        }
        Ok(Peer::new(PeerId(self.id), PeerAddr::new(self.host, self.grpc_port)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confirmer tick period.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Tx age before pruning.
    #[serde(with = "humantime_serde")]
    pub expiry: Duration,
    /// Dispatcher worker pool size.
    pub dispatcher_workers: usize,
    /// Dispatcher bounded queue capacity.
    pub dispatcher_cap: usize,
    /// Per-request Dispatcher aggregation deadline.
    #[serde(with = "humantime_serde")]
    pub dispatcher_timeout: Duration,
    /// Updater sampling tick period.
    #[serde(with = "humantime_serde")]
    pub updater_poll_rate: Duration,
    /// Updater per-tick `queryPeers` fan-out deadline.
    #[serde(with = "humantime_serde")]
    pub updater_timeout: Duration,
    /// Updater split-identity `queryStats` probe sub-deadline.
    #[serde(with = "humantime_serde")]
    pub updater_probe_timeout: Duration,
    /// Peers sampled by the Updater per tick.
    pub updater_sample_size: usize,
    /// Bootstrap peers additionally sampled by the Updater per tick.
    pub updater_bootstrap_sample_size: usize,
    /// Seed peers, never deleted by normal churn.
    pub bootstrap_addrs: Vec<BootstrapPeer>,
    /// Chain-adapter endpoint URL per source chain name, e.g. `Bitcoin`.
    pub chain_oracle_endpoints: HashMap<String, String>,
    /// RPC bind address.
    pub listen_addr: SocketAddr,
    /// redb file location for the Transaction Store.
    pub data_dir: String,
    /// redb file location for the Peer Store's persisted dynamic peer set.
    pub peer_store_path: String,
    pub log_format: LogFormat,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            expiry: Duration::from_secs(14 * 24 * 3600),
            dispatcher_workers: 16,
            dispatcher_cap: 1024,
            dispatcher_timeout: Duration::from_secs(30),
            updater_poll_rate: Duration::from_secs(10),
            updater_timeout: Duration::from_secs(10),
            updater_probe_timeout: Duration::from_secs(1),
            updater_sample_size: 50,
            updater_bootstrap_sample_size: 5,
            bootstrap_addrs: Vec::new(),
            chain_oracle_endpoints: HashMap::new(),
            listen_addr: "0.0.0.0:5000".parse().expect("hardcoded default listen address is valid"),
            data_dir: "./data/lightnode.redb".to_string(),
            peer_store_path: "./data/peers.redb".to_string(),
            log_format: LogFormat::Json,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents)
            .map_err(|source| ConfigError::Parse { path: "<inline>".to_string(), source })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        serde_yaml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }

    /// Resolved bootstrap peers, validated once at startup.
    pub fn bootstrap_peers(&self) -> Result<Vec<Peer>, ConfigError> {
        self.bootstrap_addrs.iter().cloned().map(BootstrapPeer::into_peer).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.listen_addr, Config::default().listen_addr);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config = Config::from_yaml_str("log_level: debug\n").unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.dispatcher_workers, Config::default().dispatcher_workers);
    }

    #[test]
    fn empty_bootstrap_identity_is_rejected() {
        let config = Config {
            bootstrap_addrs: vec![BootstrapPeer { id: String::new(), host: "10.0.0.1".into(), grpc_port: 9000 }],
            ..Config::default()
        };
        assert!(config.bootstrap_peers().is_err());
    }

    #[test]
    fn from_file_reads_and_parses_a_real_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dispatcher_workers: 32").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.dispatcher_workers, 32);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(Config::from_file("/nonexistent/lightnode.yaml"), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn bootstrap_peers_resolve_to_peer_store_entries() {
        let config = Config {
            bootstrap_addrs: vec![BootstrapPeer { id: "node-a".into(), host: "10.0.0.1".into(), grpc_port: 9000 }],
            ..Config::default()
        };
        let peers = config.bootstrap_peers().unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].addr.json_rpc_port(), 9001);
    }
}
