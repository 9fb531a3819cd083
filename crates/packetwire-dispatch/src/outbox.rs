use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use packetwire_frame::{FrameCodec, Packet};

use crate::error::Result;

/// Destination of an outbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The remote end of an initiating link.
    Server,
    /// One connected peer.
    Peer(String),
    /// Every connected peer.
    All,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Peer(peer) => write!(f, "peer {peer}"),
            Self::All => write!(f, "all peers"),
        }
    }
}

/// Delivers complete frames. Framing on the stream is the transport's job.
pub trait Transport {
    fn send(&self, target: &Target, frame: Bytes) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, target: &Target, frame: Bytes) -> Result<()> {
        (**self).send(target, frame)
    }
}

/// Encodes packets and hands the frames to a [`Transport`].
pub struct Outbox<T> {
    codec: Arc<FrameCodec>,
    transport: T,
}

impl<T: Transport> Outbox<T> {
    pub fn new(codec: Arc<FrameCodec>, transport: T) -> Self {
        Self { codec, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn send_to_server(&self, packet: &dyn Packet) -> Result<()> {
        self.send(&Target::Server, packet)
    }

    pub fn send_to(&self, peer: &str, packet: &dyn Packet) -> Result<()> {
        self.send(&Target::Peer(peer.to_string()), packet)
    }

    pub fn send_to_all(&self, packet: &dyn Packet) -> Result<()> {
        self.send(&Target::All, packet)
    }

    /// Encode `packet` once and send it to `target`.
    pub fn send(&self, target: &Target, packet: &dyn Packet) -> Result<()> {
        let frame = self.codec.encode(packet).inspect_err(|err| {
            tracing::warn!(
                destination = %target,
                packet = ?packet,
                error = %err,
                "failed to encode packet"
            );
        })?;
        let size = frame.len();
        self.transport.send(target, frame).inspect_err(|err| {
            tracing::warn!(destination = %target, size, error = %err, "failed to send frame");
        })?;
        tracing::trace!(destination = %target, size, "frame sent");
        Ok(())
    }
}
