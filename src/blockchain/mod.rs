pub mod block;
pub mod model;
pub mod pow;

pub use block::{Block, Transaction};
pub use model::Ledger;
pub use pow::ProofOfWork;

/// Default Proof-of-Work difficulty (number of leading marker characters).
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Character a digest must start with, `difficulty` times.
pub const DIFFICULTY_MARKER: char = '0';

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Creation time of the genesis block (Unix seconds).
pub const GENESIS_TIMESTAMP: i64 = 0;
