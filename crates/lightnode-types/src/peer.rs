//! Peer identity and network address.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Public-key-derived identity of a Darknode peer.
///
/// This is the primary key of the Peer Store; two different addresses
/// reported for the same identity force a probe to break the tie (see
/// `lightnode-updater`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(pub String);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A peer's network address, i.e. the gRPC host:port it advertises.
///
/// The JSON-RPC port for a peer is always `grpc_port + 1` (legacy
/// convention, preserved verbatim).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAddr {
    pub host: String,
    pub grpc_port: u16,
}

impl PeerAddr {
    pub fn new(host: impl Into<String>, grpc_port: u16) -> Self {
        Self { host: host.into(), grpc_port }
    }

    /// The JSON-RPC port on this peer: `grpc_port + 1`.
    ///
    /// Load-bearing convention from the original implementation; do not bury
    /// this computation in ad hoc call sites.
    pub fn json_rpc_port(&self) -> u16 {
        self.grpc_port + 1
    }

    pub fn json_rpc_url(&self) -> String {
        format!("http://{}:{}", self.host, self.json_rpc_port())
    }
}

/// A known Darknode peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: PeerId,
    pub addr: PeerAddr,
}

impl Peer {
    pub fn new(id: PeerId, addr: PeerAddr) -> Self {
        Self { id, addr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_rpc_port_is_grpc_port_plus_one() {
        let addr = PeerAddr::new("10.0.0.1", 9000);
        assert_eq!(addr.json_rpc_port(), 9001);
        assert_eq!(addr.json_rpc_url(), "http://10.0.0.1:9001");
    }
}
