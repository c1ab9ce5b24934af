use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::{GENESIS_PREVIOUS_HASH, GENESIS_TIMESTAMP};

/// A user submitted record. Only `author` and `content` are required;
/// anything else the submitter sent is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub author: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>, // Unix timestamp (UTC), stamped by the receiving node
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            timestamp: None,
            extra: Map::new(),
        }
    }

    /// Record the arrival time, overriding anything the submitter claimed.
    pub fn stamped(mut self) -> Self {
        self.extra.remove("timestamp");
        self.timestamp = Some(Utc::now().timestamp());
        self
    }
}

/// A block of transactions linked to its predecessor by hash.
///
/// `nonce` stays `None` until proof-of-work runs and `hash` stays `None`
/// until the ledger accepts the block. Neither the hash nor an absent nonce
/// take part in the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub timestamp: i64, // Unix timestamp (UTC)
    pub previous_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Block {
    /// The fixed root of every chain. It is identical on every node so that
    /// independently started nodes agree on where the chain begins.
    pub fn genesis() -> Self {
        let mut block = Self::new(0, Vec::new(), GENESIS_TIMESTAMP, GENESIS_PREVIOUS_HASH.into());
        block.hash = Some(block.compute_hash());
        block
    }

    /// Create an unsealed block. Run proof-of-work and append it to a ledger
    /// to seal it.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        timestamp: i64,
        previous_hash: String,
    ) -> Self {
        Self {
            index,
            transactions,
            timestamp,
            previous_hash,
            nonce: None,
            hash: None,
        }
    }

    pub fn hash(&self) -> &str {
        self.hash.as_deref().unwrap_or_default()
    }

    /// SHA-256 over the canonical JSON form of the block.
    ///
    /// The preimage goes through `serde_json::Value`, whose object map keeps
    /// keys sorted, so every node produces the same bytes for the same block.
    pub fn compute_hash(&self) -> String {
        let mut preimage = serde_json::json!({
            "index": self.index,
            "transactions": self.transactions,
            "timestamp": self.timestamp,
            "previous_hash": self.previous_hash,
        });
        if let Some(nonce) = self.nonce {
            preimage["nonce"] = Value::from(nonce);
        }
        let digest = Sha256::digest(preimage.to_string().as_bytes());
        hex::encode(digest)
    }

    /// Two blocks are the same block iff they serialise to the same bytes.
    pub fn same_content(&self, other: &Block) -> bool {
        self.compute_hash() == other.compute_hash()
    }
}
