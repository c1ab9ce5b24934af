use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Invalid transaction data: `{0}` is required")]
    InvalidTransaction(&'static str),
    #[error("Invalid data: `node_address` is required")]
    InvalidPeerAddress,
    #[error("A block is already being mined")]
    MiningInProgress,
    #[error("Mined block #{index} was discarded with {dropped} transactions: the chain moved on while mining")]
    MinedBlockDiscarded { index: u64, dropped: usize },
    #[error("Mining was cancelled; pending transactions were kept")]
    MiningCancelled,
    #[error("Peer request failed: {0}")]
    PeerRequest(#[from] reqwest::Error),
    #[error("Peer {peer} answered {status}: {body}")]
    PeerRejected {
        peer: String,
        status: u16,
        body: String,
    },
    #[error("Peer {0} sent a malformed chain")]
    MalformedChain(String),
    #[error("The chain dump is tampered (block #{0})")]
    TamperedChain(u64),
    #[error("Background task failed")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl ResponseError for NodeError {
    fn status_code(&self) -> StatusCode {
        match self {
            NodeError::InvalidTransaction(_) | NodeError::InvalidPeerAddress => {
                StatusCode::BAD_REQUEST
            }
            NodeError::MiningInProgress
            | NodeError::MinedBlockDiscarded { .. }
            | NodeError::MiningCancelled => StatusCode::CONFLICT,
            NodeError::PeerRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            NodeError::PeerRequest(_)
            | NodeError::MalformedChain(_)
            | NodeError::TamperedChain(_) => StatusCode::BAD_GATEWAY,
            NodeError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // a remote refusal is passed back to our caller as the remote sent it
        let body = match self {
            NodeError::PeerRejected { body, .. } => body.clone(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).body(body)
    }
}
