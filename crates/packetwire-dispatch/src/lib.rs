//! Inbound queues and single-turn handler dispatch for decoded packets.
//!
//! Decoded packets land in [`DispatchQueues`]: one queue for the local
//! (initiating) side and one queue per peer identity for the responding
//! side. Producers may enqueue from any thread. A [`Dispatcher`] drains the
//! queues on the consuming side's own turn and hands every packet to the
//! handler registered for its type.

pub mod config;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod inbox;
pub mod outbox;
pub mod queues;

pub use config::DispatchConfig;
pub use directory::{ConnectedPeers, PeerDirectory};
pub use dispatcher::{Dispatcher, DrainReport};
pub use error::{DispatchError, Result};
pub use inbox::{Inbox, Role};
pub use outbox::{Outbox, Target, Transport};
pub use queues::{DispatchQueues, PacketQueue};

#[cfg(test)]
mod fixtures;
