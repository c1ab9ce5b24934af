mod api;
mod blockchain;
mod config;
mod error;
mod mempool;
mod network;
mod node;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{info, warn};

use config::NodeConfig;
use network::HttpPeerClient;
use node::Node;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env();

    println!(
        "⛓️ Starting blockchain node at http://{}:{} (difficulty {})",
        config.host, config.port, config.difficulty
    );

    let transport = HttpPeerClient::new(config.peer_timeout).map_err(std::io::Error::other)?;
    let state = web::Data::new(Node::new(
        config.difficulty,
        Arc::new(transport),
        &config.public_url,
    ));

    if let Some(peer) = config.bootstrap_peer.as_deref() {
        match state.register_with(Some(peer)).await {
            Ok(()) => info!(
                "Bootstrapped from {peer}: {} blocks, {} peers",
                state.chain_len(),
                state.peers().len()
            ),
            Err(e) => warn!("Bootstrap from {peer} failed, starting from genesis: {e}"),
        }
    }

    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    // let a search still running on the blocking pool wind down
    if state.cancel_mining() {
        info!("Shutdown: cancelled the running proof-of-work search");
    }
    Ok(())
}
