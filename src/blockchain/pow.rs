use super::{Block, DIFFICULTY_MARKER};

/// Proof-of-Work engine for a fixed difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// True when `digest` starts with `difficulty` marker characters.
    pub fn meets_difficulty(&self, digest: &str) -> bool {
        digest.len() >= self.difficulty as usize
            && digest
                .chars()
                .take(self.difficulty as usize)
                .all(|c| c == DIFFICULTY_MARKER)
    }

    /// Search nonces from zero until the block digest meets the difficulty,
    /// asking `should_stop` before every attempt. Leaves the last tried
    /// nonce on the block and returns the digest, or `None` once stopped.
    pub fn proof_of_work_until(
        &self,
        block: &mut Block,
        should_stop: impl Fn() -> bool,
    ) -> Option<String> {
        let mut nonce = 0u64;
        loop {
            if should_stop() {
                return None;
            }
            block.nonce = Some(nonce);
            let digest = block.compute_hash();
            if self.meets_difficulty(&digest) {
                return Some(digest);
            }
            nonce = nonce.wrapping_add(1);
        }
    }

    /// Search that never stops early; fixtures build sealed blocks with it.
    #[cfg(test)]
    pub fn proof_of_work(&self, block: &mut Block) -> String {
        self.proof_of_work_until(block, || false)
            .expect("an unstoppable search always finds a proof")
    }

    /// The digest must meet the difficulty and be the block's own digest.
    pub fn is_valid_proof(&self, block: &Block, digest: &str) -> bool {
        self.meets_difficulty(digest) && digest == block.compute_hash()
    }
}
