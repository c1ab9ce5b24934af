use std::env;
use std::time::Duration;

use crate::blockchain::DEFAULT_DIFFICULTY;

/// Node settings read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    /// Address advertised to peers when registering with them.
    pub public_url: String,
    pub peer_timeout: Duration,
    /// Node to register with at startup.
    pub bootstrap_peer: Option<String>,
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = lookup("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000);
        let difficulty = lookup("DIFFICULTY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DIFFICULTY);
        let public_url = lookup("PUBLIC_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("http://{host}:{port}"));
        let peer_timeout = lookup("PEER_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));
        let bootstrap_peer = lookup("BOOTSTRAP_PEER").filter(|v| !v.trim().is_empty());

        Self {
            host,
            port,
            difficulty,
            public_url,
            peer_timeout,
            bootstrap_peer,
        }
    }
}
