use actix_web::{HttpResponse, Responder, get, post, web};
use log::info;

use super::models::{ConsensusResponse, MineResponse};
use crate::error::NodeError;
use crate::node::{MineOutcome, Node};

/// Get the full blockchain along with the known peers.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<Node>) -> impl Responder {
    HttpResponse::Ok().json(state.chain_snapshot())
}

/// Mine the pending transactions into a new block:
/// - Run Proof-of-Work on the blocking pool
/// - Reconcile with peers
/// - Announce the block unless a longer chain replaced ours
#[post("/mine/")]
pub async fn mine_block(state: web::Data<Node>) -> Result<HttpResponse, NodeError> {
    let node = state.clone();
    let outcome = web::block(move || node.mine()).await??;

    let block = match outcome {
        MineOutcome::NothingToMine => {
            return Ok(HttpResponse::Ok().body("No transactions to mine"));
        }
        MineOutcome::Mined(block) => block,
        MineOutcome::Discarded { index, dropped } => {
            return Err(NodeError::MinedBlockDiscarded { index, dropped });
        }
        MineOutcome::Cancelled => return Err(NodeError::MiningCancelled),
    };

    let announced = state.publish_mined(&block).await;
    info!(
        "MINER - block #{} {}",
        block.index,
        if announced { "announced" } else { "superseded by a peer chain" }
    );

    Ok(HttpResponse::Ok().json(MineResponse {
        mined_index: block.index,
        hash: block.hash().to_string(),
        nonce: block.nonce.unwrap_or_default(),
        difficulty: state.difficulty(),
        announced,
    }))
}

/// Adopt the longest valid chain among peers, if longer than ours.
#[get("/consensus/")]
pub async fn run_consensus(state: web::Data<Node>) -> impl Responder {
    let replaced = state.resolve().await;
    HttpResponse::Ok().json(ConsensusResponse {
        replaced,
        length: state.chain_len(),
    })
}
