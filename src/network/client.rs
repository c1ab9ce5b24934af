use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::{API_PREFIX, ChainSnapshot, RegisterRequest};
use crate::blockchain::Block;
use crate::error::NodeError;

/// Outbound calls a node makes to its peers. Every call stands alone: a
/// failure only concerns the peer it was addressed to.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Fetch the peer's full chain.
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, NodeError>;

    /// Hand a freshly sealed block to the peer.
    async fn announce_block(&self, peer: &str, block: &Block) -> Result<(), NodeError>;

    /// Register `own_address` with the peer and receive its chain in return.
    async fn register_with(
        &self,
        peer: &str,
        own_address: &str,
    ) -> Result<ChainSnapshot, NodeError>;
}

/// [`PeerTransport`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpPeerClient {
    client: Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Result<Self, NodeError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    fn url(peer: &str, route: &str) -> String {
        format!("{peer}{API_PREFIX}{route}")
    }

    async fn read_snapshot(
        peer: &str,
        response: reqwest::Response,
    ) -> Result<ChainSnapshot, NodeError> {
        let status = response.status();
        if !status.is_success() {
            return Err(NodeError::PeerRejected {
                peer: peer.to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let snapshot = response
            .json::<ChainSnapshot>()
            .await
            .map_err(|_| NodeError::MalformedChain(peer.to_string()))?;
        if !snapshot.is_well_formed() {
            return Err(NodeError::MalformedChain(peer.to_string()));
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl PeerTransport for HttpPeerClient {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, NodeError> {
        let response = self.client.get(Self::url(peer, "/chain/")).send().await?;
        Self::read_snapshot(peer, response).await
    }

    async fn announce_block(&self, peer: &str, block: &Block) -> Result<(), NodeError> {
        let response = self
            .client
            .post(Self::url(peer, "/add_block/"))
            .json(block)
            .send()
            .await?;
        let status = response.status();
        debug!("ANNOUNCE - {peer} answered {status} for block #{}", block.index);
        if status.is_success() {
            Ok(())
        } else {
            Err(NodeError::PeerRejected {
                peer: peer.to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    async fn register_with(
        &self,
        peer: &str,
        own_address: &str,
    ) -> Result<ChainSnapshot, NodeError> {
        let body = RegisterRequest {
            node_address: Some(own_address.to_string()),
        };
        let response = self
            .client
            .post(Self::url(peer, "/register_node/"))
            .json(&body)
            .send()
            .await?;
        Self::read_snapshot(peer, response).await
    }
}
