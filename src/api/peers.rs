use actix_web::{HttpResponse, post, web};

use crate::error::NodeError;
use crate::network::RegisterRequest;
use crate::node::Node;

/// Add a new peer and return our chain so it can sync.
#[post("/register_node/")]
pub async fn register_node(
    state: web::Data<Node>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, NodeError> {
    let snapshot = state.register_peer(body.node_address.as_deref())?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// Register this node with a remote one and adopt its chain and peers.
/// A refusal from the remote is passed back as-is.
#[post("/register_with/")]
pub async fn register_with(
    state: web::Data<Node>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, NodeError> {
    state.register_with(body.node_address.as_deref()).await?;
    Ok(HttpResponse::Ok().body("Registration successful"))
}
