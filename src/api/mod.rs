mod blocks;
mod chain;
mod health;
pub mod models;
mod peers;
mod tx;

use actix_web::web::{self, ServiceConfig};

use crate::network::API_PREFIX;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope(API_PREFIX)
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::mine_block)
            .service(chain::run_consensus)
            .service(tx::post_transaction)
            .service(tx::get_pending)
            .service(peers::register_node)
            .service(peers::register_with)
            .service(blocks::add_block),
    );
}
