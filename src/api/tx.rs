use actix_web::{HttpResponse, Responder, get, post, web};
use log::debug;

use super::models::NewTxRequest;
use crate::error::NodeError;
use crate::node::Node;

/// Submit a new transaction into the pending pool.
#[post("/new_transaction/")]
pub async fn post_transaction(
    state: web::Data<Node>,
    body: web::Json<NewTxRequest>,
) -> Result<HttpResponse, NodeError> {
    state
        .submit_transaction(body.into_inner().into())
        .inspect_err(|e| debug!("POST /new_transaction/ - rejected: {e}"))?;
    Ok(HttpResponse::Created().body("Success"))
}

/// List transactions not yet mined.
#[get("/pending_tx/")]
pub async fn get_pending(state: web::Data<Node>) -> impl Responder {
    HttpResponse::Ok().json(state.pending_transactions())
}
