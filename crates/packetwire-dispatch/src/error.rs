use packetwire_frame::FrameError;

/// Errors surfaced by the dispatch layer.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The transport refused or failed to deliver a frame.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport has no link to the named peer.
    #[error("unknown peer: {0}")]
    UnknownPeer(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
