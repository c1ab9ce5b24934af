use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::blockchain::{Block, Transaction};

/* ---------- TX API Models ---------- */

/// Missing fields deserialize as empty and are rejected by the node, so
/// clients get the node's own message instead of a JSON parse error.
#[derive(Deserialize)]
pub struct NewTxRequest {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<NewTxRequest> for Transaction {
    fn from(req: NewTxRequest) -> Self {
        Transaction {
            author: req.author,
            content: req.content,
            timestamp: None,
            extra: req.extra,
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct MineResponse {
    pub mined_index: u64,
    pub hash: String,
    pub nonce: u64,
    pub difficulty: u32,
    pub announced: bool,
}

#[derive(Serialize)]
pub struct ConsensusResponse {
    pub replaced: bool,
    pub length: usize,
}

/// A block mined by another node, as announced to `/add_block/`.
#[derive(Deserialize)]
pub struct AddBlockRequest {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub timestamp: i64,
    pub previous_hash: String,
    #[serde(default)]
    pub nonce: Option<u64>,
    pub hash: String,
}

impl AddBlockRequest {
    /// Split into the unsealed block and the proof it claims.
    pub fn into_parts(self) -> (Block, String) {
        let mut block = Block::new(
            self.index,
            self.transactions,
            self.timestamp,
            self.previous_hash,
        );
        block.nonce = self.nonce;
        (block, self.hash)
    }
}
