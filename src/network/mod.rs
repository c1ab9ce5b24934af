pub mod client;
pub mod consensus;
pub mod peers;

use serde::{Deserialize, Serialize};

use crate::blockchain::Block;

pub use client::{HttpPeerClient, PeerTransport};
pub use peers::PeerRegistry;

/// Route prefix shared by every node.
pub const API_PREFIX: &str = "/api/v1";

/// A node's full chain plus the peers it knows about, as served by
/// `GET /chain/` and `POST /register_node/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub length: usize,
    pub chain: Vec<Block>,
    #[serde(default)]
    pub peers: Vec<String>,
}

impl ChainSnapshot {
    /// The reported length must agree with the blocks actually sent.
    pub fn is_well_formed(&self) -> bool {
        self.length == self.chain.len() && self.length > 0
    }
}

/// Body of the peer registration endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub node_address: Option<String>,
}
