use actix_web::{HttpResponse, Responder, post, web};

use super::models::AddBlockRequest;
use crate::node::Node;

/// Accept a block mined by another node.
#[post("/add_block/")]
pub async fn add_block(state: web::Data<Node>, body: web::Json<AddBlockRequest>) -> impl Responder {
    let (block, proof) = body.into_inner().into_parts();
    if state.ingest(block, proof) {
        HttpResponse::Created().body("Block added to the chain")
    } else {
        HttpResponse::BadRequest().body("The block was discarded by the node")
    }
}
