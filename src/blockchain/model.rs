use log::debug;

use super::{Block, GENESIS_PREVIOUS_HASH, ProofOfWork};
use crate::error::NodeError;

/// In-memory, hash-linked chain of sealed blocks. Never empty.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    pow: ProofOfWork,
}

impl Ledger {
    /// Initialize a new ledger holding only the genesis block.
    pub fn new(pow: ProofOfWork) -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pow,
        };
        ledger.create_genesis();
        ledger
    }

    fn create_genesis(&mut self) {
        self.chain.push(Block::genesis());
    }

    /// Rebuild a ledger from a peer's full dump by replaying every block
    /// after genesis through [`Ledger::append`]. Any rejected block aborts
    /// the import.
    pub fn from_dump(dump: Vec<Block>, pow: ProofOfWork) -> Result<Self, NodeError> {
        let mut blocks = dump.into_iter();
        let genesis = blocks.next().ok_or(NodeError::TamperedChain(0))?;
        if !is_valid_genesis(&genesis) {
            return Err(NodeError::TamperedChain(0));
        }

        let mut ledger = Self {
            chain: vec![genesis],
            pow,
        };
        for block in blocks {
            let index = block.index;
            let Some(proof) = block.hash.clone() else {
                return Err(NodeError::TamperedChain(index));
            };
            if !ledger.append(block, proof) {
                return Err(NodeError::TamperedChain(index));
            }
        }
        debug!("LEDGER - imported dump of {} blocks", ledger.len());
        Ok(ledger)
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger always holds at least the genesis block")
    }

    /// Seal `block` with `proof` and append it, provided it is the next
    /// index, links to the current tip and the proof is valid. Leaves the
    /// ledger untouched and returns `false` otherwise.
    pub fn append(&mut self, mut block: Block, proof: String) -> bool {
        let tip = self.last_block();
        if tip.index.checked_add(1) != Some(block.index) || block.previous_hash != tip.hash() {
            return false;
        }
        if !self.pow.is_valid_proof(&block, &proof) {
            return false;
        }
        block.hash = Some(proof);
        self.chain.push(block);
        true
    }

    /// Replay `chain` from genesis, checking linkage and proof-of-work of
    /// every block after it.
    pub fn check_chain_validity(chain: &[Block], pow: &ProofOfWork) -> bool {
        let Some((genesis, rest)) = chain.split_first() else {
            return false;
        };
        if !is_valid_genesis(genesis) {
            return false;
        }

        let mut previous = genesis;
        for block in rest {
            let Some(digest) = block.hash.as_deref() else {
                return false;
            };
            if previous.index.checked_add(1) != Some(block.index)
                || block.previous_hash != previous.hash()
                || !pow.is_valid_proof(block, digest)
            {
                return false;
            }
            previous = block;
        }
        true
    }

    /// Swap in a chain already accepted by [`Ledger::check_chain_validity`].
    pub fn replace(&mut self, chain: Vec<Block>) {
        debug_assert!(Self::check_chain_validity(&chain, &self.pow));
        self.chain = chain;
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn pow(&self) -> ProofOfWork {
        self.pow
    }
}

/// Genesis is exempt from proof-of-work, so it may carry no transactions
/// and no nonce, and its hash must match its content.
fn is_valid_genesis(block: &Block) -> bool {
    block.index == 0
        && block.transactions.is_empty()
        && block.nonce.is_none()
        && block.previous_hash == GENESIS_PREVIOUS_HASH
        && block.hash.as_deref() == Some(block.compute_hash().as_str())
}

#[cfg(test)]
mod tests {
    use super::Ledger;
    use crate::blockchain::{Block, ProofOfWork, Transaction};
    use crate::error::NodeError;

    const DIFFICULTY: u32 = 2;

    fn mine_next(ledger: &mut Ledger, content: &str) {
        let last = ledger.last_block();
        let mut block = Block::new(
            last.index + 1,
            vec![Transaction::new("alice", content)],
            1_700_000_000 + last.index as i64,
            last.hash().to_string(),
        );
        let proof = ledger.pow().proof_of_work(&mut block);
        assert!(ledger.append(block, proof));
    }

    fn ledger_with(blocks: usize) -> Ledger {
        let mut ledger = Ledger::new(ProofOfWork::new(DIFFICULTY));
        for i in 0..blocks {
            mine_next(&mut ledger, &format!("post {i}"));
        }
        ledger
    }

    #[test]
    fn starts_with_genesis() {
        let ledger = Ledger::new(ProofOfWork::new(DIFFICULTY));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.last_block(), &Block::genesis());
    }

    #[test]
    fn appended_blocks_are_linked_and_valid() {
        let ledger = ledger_with(3);
        let pow = ledger.pow();
        for pair in ledger.blocks().windows(2) {
            assert_eq!(pair[1].previous_hash, pair[0].hash());
            assert!(pow.is_valid_proof(&pair[1], pair[1].hash()));
        }
        assert!(Ledger::check_chain_validity(ledger.blocks(), &pow));
    }

    #[test]
    fn append_rejects_wrong_parent_even_with_valid_proof() {
        let mut ledger = ledger_with(1);
        let pow = ledger.pow();
        let mut orphan = Block::new(2, vec![Transaction::new("bob", "x")], 1, "deadbeef".into());
        let proof = pow.proof_of_work(&mut orphan);
        assert!(pow.is_valid_proof(&orphan, &proof));

        let before = ledger.blocks().to_vec();
        assert!(!ledger.append(orphan, proof));
        assert_eq!(ledger.blocks(), before.as_slice());
    }

    #[test]
    fn append_rejects_forged_proof() {
        let mut ledger = ledger_with(0);
        let block = Block::new(
            1,
            vec![Transaction::new("bob", "x")],
            1,
            ledger.last_block().hash().to_string(),
        );
        assert!(!ledger.append(block, format!("00{}", "a".repeat(62))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn validity_rejects_corruption_anywhere() {
        let ledger = ledger_with(4);
        let pow = ledger.pow();

        for i in 1..ledger.len() {
            let mut chain = ledger.blocks().to_vec();
            chain[i].previous_hash.replace_range(0..1, "f");
            assert!(
                !Ledger::check_chain_validity(&chain, &pow),
                "corrupted link at {i} accepted"
            );
        }
    }

    #[test]
    fn validity_rejects_tampered_content() {
        let ledger = ledger_with(3);
        let mut chain = ledger.blocks().to_vec();
        chain[1].transactions[0].content = "rewritten".into();
        assert!(!Ledger::check_chain_validity(&chain, &ledger.pow()));
    }

    #[test]
    fn validity_rejects_empty_and_bad_genesis() {
        let pow = ProofOfWork::new(DIFFICULTY);
        assert!(!Ledger::check_chain_validity(&[], &pow));

        let mut genesis = Block::genesis();
        genesis.previous_hash = "1".into();
        assert!(!Ledger::check_chain_validity(&[genesis], &pow));
    }

    fn mined_after(tip: &Block, index: u64, pow: &ProofOfWork) -> (Block, String) {
        let mut block = Block::new(
            index,
            vec![Transaction::new("mallory", "skip")],
            1_700_000_000,
            tip.hash().to_string(),
        );
        let proof = pow.proof_of_work(&mut block);
        (block, proof)
    }

    #[test]
    fn append_rejects_skipped_index() {
        let mut ledger = ledger_with(1);
        let pow = ledger.pow();
        let (block, proof) = mined_after(ledger.last_block(), 7, &pow);
        assert!(pow.is_valid_proof(&block, &proof));

        assert!(!ledger.append(block, proof));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.last_block().index, 1);
    }

    #[test]
    fn append_rejects_max_index() {
        let mut ledger = ledger_with(0);
        let pow = ledger.pow();
        let (block, proof) = mined_after(ledger.last_block(), u64::MAX, &pow);

        assert!(!ledger.append(block, proof));
        assert_eq!(ledger.len(), 1);
        assert!(Ledger::check_chain_validity(ledger.blocks(), &pow));
    }

    #[test]
    fn dump_with_skipped_index_is_refused() {
        let ledger = ledger_with(0);
        let pow = ledger.pow();
        let (mut block, proof) = mined_after(ledger.last_block(), 3, &pow);
        block.hash = Some(proof);

        let dump = vec![ledger.last_block().clone(), block];
        assert!(matches!(
            Ledger::from_dump(dump, pow),
            Err(NodeError::TamperedChain(3))
        ));
    }

    fn loaded_genesis() -> Block {
        let mut genesis = Block::new(
            0,
            vec![Transaction::new("mallory", "unmined payload")],
            0,
            "0".into(),
        );
        genesis.hash = Some(genesis.compute_hash());
        genesis
    }

    fn chain_on(genesis: Block, pow: &ProofOfWork) -> Vec<Block> {
        let (mut block, proof) = mined_after(&genesis, 1, pow);
        block.hash = Some(proof);
        vec![genesis, block]
    }

    #[test]
    fn genesis_carrying_transactions_is_refused() {
        let pow = ProofOfWork::new(DIFFICULTY);
        let chain = chain_on(loaded_genesis(), &pow);

        assert!(!Ledger::check_chain_validity(&chain, &pow));
        assert!(matches!(
            Ledger::from_dump(chain, pow),
            Err(NodeError::TamperedChain(0))
        ));
    }

    #[test]
    fn genesis_carrying_nonce_is_refused() {
        let pow = ProofOfWork::new(DIFFICULTY);
        let mut genesis = Block::genesis();
        genesis.nonce = Some(1);
        genesis.hash = Some(genesis.compute_hash());
        let chain = chain_on(genesis, &pow);

        assert!(!Ledger::check_chain_validity(&chain, &pow));
        assert!(Ledger::from_dump(chain, pow).is_err());
    }

    #[test]
    fn dump_round_trips() {
        let ledger = ledger_with(2);
        let imported = Ledger::from_dump(ledger.blocks().to_vec(), ledger.pow()).unwrap();
        assert_eq!(imported.blocks(), ledger.blocks());
    }

    #[test]
    fn tampered_dump_is_refused() {
        let ledger = ledger_with(3);
        let mut dump = ledger.blocks().to_vec();
        dump[2].timestamp += 1;

        match Ledger::from_dump(dump, ledger.pow()) {
            Err(NodeError::TamperedChain(index)) => assert_eq!(index, 2),
            other => panic!("expected tampered chain, got {other:?}"),
        }
    }

    #[test]
    fn replace_swaps_whole_chain() {
        let mut short = ledger_with(1);
        let long = ledger_with(3);
        short.replace(long.blocks().to_vec());
        assert_eq!(short.blocks(), long.blocks());
    }
}
