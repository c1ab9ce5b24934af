use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures_util::future::join_all;
use log::{debug, info, warn};

use crate::blockchain::{Block, Ledger, ProofOfWork, Transaction};
use crate::error::NodeError;
use crate::mempool::PendingPool;
use crate::network::consensus::longest_valid_chain;
use crate::network::{ChainSnapshot, PeerRegistry, PeerTransport};

/// Result of a mining request that did not fail.
#[derive(Debug)]
pub enum MineOutcome {
    /// The pool was empty.
    NothingToMine,
    /// A new block was sealed and appended.
    Mined(Block),
    /// The tip moved during the search; the block and its transactions
    /// were dropped.
    Discarded { index: u64, dropped: usize },
    /// The search was stopped; the transactions went back to the pool.
    Cancelled,
}

const IDLE: u8 = 0;
const MINING: u8 = 1;
const CANCELLED: u8 = 2;

/// Everything a running node owns: the ledger, the pending pool and the
/// peer registry, plus the transport used to talk to peers.
///
/// Each piece of state sits behind its own mutex. Mining only holds the
/// pool lock while draining and the ledger lock while reading the tip and
/// appending, so submissions and registrations proceed during the search.
pub struct Node {
    ledger: Mutex<Ledger>,
    pool: Mutex<PendingPool>,
    peers: Mutex<PeerRegistry>,
    mining: AtomicU8,
    transport: Arc<dyn PeerTransport>,
    public_address: String,
}

/// Resets the mining state when a search ends, however it ends.
struct MiningGuard<'a>(&'a AtomicU8);

impl Drop for MiningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(IDLE, Ordering::Release);
    }
}

impl Node {
    pub fn new(difficulty: u32, transport: Arc<dyn PeerTransport>, public_address: &str) -> Self {
        Self {
            ledger: Mutex::new(Ledger::new(ProofOfWork::new(difficulty))),
            pool: Mutex::new(PendingPool::new()),
            peers: Mutex::new(PeerRegistry::new()),
            mining: AtomicU8::new(IDLE),
            transport,
            public_address: PeerRegistry::normalize(public_address)
                .unwrap_or_else(|| public_address.to_string()),
        }
    }

    pub fn difficulty(&self) -> u32 {
        self.ledger.lock().expect("mutex poisoned").pow().difficulty()
    }

    pub fn public_address(&self) -> &str {
        &self.public_address
    }

    /* -------------------- Transactions -------------------- */

    /// Queue a transaction for the next block. `author` and `content` must
    /// be present and non-empty; the node stamps the arrival time.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<(), NodeError> {
        if tx.author.is_empty() {
            return Err(NodeError::InvalidTransaction("author"));
        }
        if tx.content.is_empty() {
            return Err(NodeError::InvalidTransaction("content"));
        }

        let mut pool = self.pool.lock().expect("mutex poisoned");
        pool.add(tx.stamped());
        debug!("POOL - transaction accepted (pending: {})", pool.len());
        Ok(())
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.pool.lock().expect("mutex poisoned").snapshot()
    }

    /* -------------------- Chain -------------------- */

    pub fn chain_snapshot(&self) -> ChainSnapshot {
        let chain = self.ledger.lock().expect("mutex poisoned").blocks().to_vec();
        let peers = self.peers.lock().expect("mutex poisoned").snapshot();
        ChainSnapshot {
            length: chain.len(),
            chain,
            peers,
        }
    }

    pub fn chain_len(&self) -> usize {
        self.ledger.lock().expect("mutex poisoned").len()
    }

    pub fn last_block(&self) -> Block {
        self.ledger.lock().expect("mutex poisoned").last_block().clone()
    }

    /// Mine the pending pool into a new block.
    ///
    /// CPU bound and potentially long; call it off the request workers.
    /// Only one search runs at a time. If the chain tip moves while
    /// searching, the block is discarded and its transactions are lost.
    pub fn mine(&self) -> Result<MineOutcome, NodeError> {
        if self
            .mining
            .compare_exchange(IDLE, MINING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(NodeError::MiningInProgress);
        }
        let _guard = MiningGuard(&self.mining);

        let Some((mut block, pow)) = self.next_candidate() else {
            return Ok(MineOutcome::NothingToMine);
        };

        let stopped = || self.mining.load(Ordering::Acquire) == CANCELLED;
        let Some(proof) = pow.proof_of_work_until(&mut block, stopped) else {
            let index = block.index;
            let mut pool = self.pool.lock().expect("mutex poisoned");
            pool.requeue(block.transactions);
            info!(
                "MINER - search for block #{index} cancelled (pending: {})",
                pool.len()
            );
            return Ok(MineOutcome::Cancelled);
        };
        debug!(
            "MINER - found proof for block #{} (nonce={:?})",
            block.index, block.nonce
        );
        Ok(self.seal(block, proof))
    }

    /// Ask a running search to stop. Returns `false` when nothing is
    /// being mined.
    pub fn cancel_mining(&self) -> bool {
        self.mining
            .compare_exchange(MINING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_mining(&self) -> bool {
        self.mining.load(Ordering::Acquire) != IDLE
    }

    /// Drain the pool into an unsealed block on top of the current tip.
    fn next_candidate(&self) -> Option<(Block, ProofOfWork)> {
        let transactions = self.pool.lock().expect("mutex poisoned").drain_for_mining();
        if transactions.is_empty() {
            return None;
        }

        let ledger = self.ledger.lock().expect("mutex poisoned");
        let last = ledger.last_block();
        // a tip at u64::MAX has no successor; append refuses the candidate
        let block = Block::new(
            last.index.saturating_add(1),
            transactions,
            Utc::now().timestamp(),
            last.hash().to_string(),
        );
        Some((block, ledger.pow()))
    }

    /// Append a block whose proof was just found.
    fn seal(&self, block: Block, proof: String) -> MineOutcome {
        let (index, tx_count) = (block.index, block.transactions.len());
        let mut ledger = self.ledger.lock().expect("mutex poisoned");
        if !ledger.append(block, proof) {
            warn!("MINER - block #{index} lost the race for the tip; dropped {tx_count} txs");
            return MineOutcome::Discarded {
                index,
                dropped: tx_count,
            };
        }
        let sealed = ledger.last_block().clone();
        info!(
            "MINER - sealed block #{} (hash={}, txs={tx_count})",
            sealed.index,
            sealed.hash()
        );
        MineOutcome::Mined(sealed)
    }

    /// Try to append a block mined elsewhere. Rejection is routine.
    pub fn ingest(&self, mut block: Block, proof: String) -> bool {
        block.hash = None;
        let index = block.index;
        let mut ledger = self.ledger.lock().expect("mutex poisoned");
        if ledger.last_block().same_content(&block) {
            debug!("SYNC - block #{index} is already our tip");
            return false;
        }
        if ledger.append(block, proof) {
            info!("SYNC - accepted external block #{index}");
            true
        } else {
            warn!("SYNC - discarded external block #{index}");
            false
        }
    }

    /* -------------------- Peers -------------------- */

    /// Remember a peer and hand back our chain so it can sync.
    pub fn register_peer(&self, address: Option<&str>) -> Result<ChainSnapshot, NodeError> {
        let address = address
            .and_then(PeerRegistry::normalize)
            .ok_or(NodeError::InvalidPeerAddress)?;
        if address != self.public_address
            && self.peers.lock().expect("mutex poisoned").insert(address.clone())
        {
            info!("PEERS - registered {address}");
        }
        Ok(self.chain_snapshot())
    }

    /// Register with a remote node and adopt its chain and peers.
    ///
    /// The remote chain is replayed block by block; if any block fails,
    /// nothing is adopted and the current state is kept.
    pub async fn register_with(&self, address: Option<&str>) -> Result<(), NodeError> {
        let remote = address
            .and_then(PeerRegistry::normalize)
            .ok_or(NodeError::InvalidPeerAddress)?;

        let snapshot = self
            .transport
            .register_with(&remote, &self.public_address)
            .await?;
        let pow = self.ledger.lock().expect("mutex poisoned").pow();
        let imported = Ledger::from_dump(snapshot.chain, pow).inspect_err(|e| {
            warn!("PEERS - refusing chain from {remote}: {e}");
        })?;

        let length = imported.len();
        *self.ledger.lock().expect("mutex poisoned") = imported;

        let mut peers = self.peers.lock().expect("mutex poisoned");
        for peer in std::iter::once(remote.clone())
            .chain(snapshot.peers.iter().filter_map(|p| PeerRegistry::normalize(p)))
        {
            if peer != self.public_address {
                peers.insert(peer);
            }
        }
        info!(
            "PEERS - registered with {remote}: adopted {length} blocks, {} known peers",
            peers.len()
        );
        Ok(())
    }

    pub fn peers(&self) -> Vec<String> {
        self.peers.lock().expect("mutex poisoned").snapshot()
    }

    /* -------------------- Consensus & announcement -------------------- */

    /// Replace the local chain with the longest valid peer chain, if one is
    /// strictly longer. Returns whether the chain was replaced.
    pub async fn resolve(&self) -> bool {
        let peers = self.peers();
        let (current_len, pow) = {
            let ledger = self.ledger.lock().expect("mutex poisoned");
            (ledger.len(), ledger.pow())
        };

        let Some(candidate) =
            longest_valid_chain(self.transport.as_ref(), &peers, current_len, &pow).await
        else {
            return false;
        };

        // the ledger may have grown while peers were being queried
        let mut ledger = self.ledger.lock().expect("mutex poisoned");
        if candidate.len() <= ledger.len() {
            return false;
        }
        let (before, after) = (ledger.len(), candidate.len());
        ledger.replace(candidate);
        info!("CONSENSUS - replaced local chain ({before} -> {after} blocks)");
        true
    }

    /// Send a sealed block to every known peer. Best effort: failures are
    /// logged and otherwise ignored.
    pub async fn announce(&self, block: &Block) {
        let peers = self.peers();
        let results = join_all(
            peers
                .iter()
                .map(|peer| self.transport.announce_block(peer, block)),
        )
        .await;

        for (peer, result) in peers.iter().zip(results) {
            if let Err(e) = result {
                warn!("ANNOUNCE - block #{} not delivered to {peer}: {e}", block.index);
            }
        }
    }

    /// After mining: reconcile with peers first and announce the block
    /// only if our chain was not overtaken. Returns whether it was announced.
    pub async fn publish_mined(&self, block: &Block) -> bool {
        if self.resolve().await {
            debug!("ANNOUNCE - chain replaced, not announcing block #{}", block.index);
            return false;
        }
        self.announce(block).await;
        true
    }
}
