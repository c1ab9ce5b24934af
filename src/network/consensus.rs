use futures_util::future::join_all;
use log::{debug, warn};

use super::PeerTransport;
use crate::blockchain::{Block, Ledger, ProofOfWork};

/// Ask every peer for its chain and keep the longest one that is valid and
/// strictly longer than `current_len`.
///
/// Peers are queried concurrently. A peer that cannot be reached, answers
/// with garbage or serves an invalid chain simply contributes nothing.
pub async fn longest_valid_chain(
    transport: &dyn PeerTransport,
    peers: &[String],
    current_len: usize,
    pow: &ProofOfWork,
) -> Option<Vec<Block>> {
    let responses = join_all(peers.iter().map(|peer| transport.fetch_chain(peer))).await;

    let mut best: Option<Vec<Block>> = None;
    let mut best_len = current_len;

    for (peer, response) in peers.iter().zip(responses) {
        let snapshot = match response {
            Ok(snapshot) if snapshot.is_well_formed() => snapshot,
            Ok(_) => {
                warn!("CONSENSUS - {peer} reported a length that does not match its chain");
                continue;
            }
            Err(e) => {
                warn!("CONSENSUS - skipping {peer}: {e}");
                continue;
            }
        };

        if snapshot.length <= best_len {
            debug!(
                "CONSENSUS - {peer} chain length {} not longer than {best_len}",
                snapshot.length
            );
            continue;
        }
        if !Ledger::check_chain_validity(&snapshot.chain, pow) {
            warn!("CONSENSUS - {peer} served an invalid chain, ignoring it");
            continue;
        }

        best_len = snapshot.length;
        best = Some(snapshot.chain);
    }

    best
}
