use std::collections::BTreeSet;

/// Known peer base URLs. Grows only through registration; nothing is ever
/// removed.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical form of a peer address: trimmed, with a scheme and
    /// without trailing slashes. `None` for blank input.
    pub fn normalize(address: &str) -> Option<String> {
        let trimmed = address.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.contains("://") {
            Some(trimmed.to_string())
        } else {
            Some(format!("http://{trimmed}"))
        }
    }

    /// Insert an already normalized address. Returns `true` if it was new.
    pub fn insert(&mut self, address: String) -> bool {
        self.peers.insert(address)
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }
}
