use dashmap::DashMap;

/// Resolves a peer identity to a live handle.
///
/// `None` means the peer is no longer connected. Its queue is discarded on
/// the next drain pass.
pub trait PeerDirectory {
    type Handle;

    fn resolve(&self, peer: &str) -> Option<Self::Handle>;

    fn is_connected(&self, peer: &str) -> bool {
        self.resolve(peer).is_some()
    }
}

/// Concurrent table of connected peers and their handles.
#[derive(Debug)]
pub struct ConnectedPeers<H> {
    peers: DashMap<String, H>,
}

impl<H: Clone> ConnectedPeers<H> {
    pub fn new() -> Self {
        Self {
            peers: DashMap::new(),
        }
    }

    /// Record `peer` as connected, returning the handle it replaced.
    pub fn connect(&self, peer: impl Into<String>, handle: H) -> Option<H> {
        let peer = peer.into();
        tracing::debug!(peer = %peer, "peer connected");
        self.peers.insert(peer, handle)
    }

    pub fn disconnect(&self, peer: &str) -> Option<H> {
        let removed = self.peers.remove(peer).map(|(_, handle)| handle);
        if removed.is_some() {
            tracing::debug!(peer, "peer disconnected");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl<H: Clone> Default for ConnectedPeers<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Clone> PeerDirectory for ConnectedPeers<H> {
    type Handle = H;

    fn resolve(&self, peer: &str) -> Option<H> {
        self.peers.get(peer).map(|handle| handle.value().clone())
    }

    fn is_connected(&self, peer: &str) -> bool {
        self.peers.contains_key(peer)
    }
}
