//! Discriminator-prefixed packet frames over a frozen type registry.
//!
//! Every frame is:
//! - A 1-byte discriminator, the packet type's index in the frozen registry
//! - The payload, written and read by the packet type itself
//!
//! [`FrameReader`] and [`FrameWriter`] carry frames over any byte stream
//! with a 4-byte big-endian length prefix.

pub mod codec;
pub mod delimited;
pub mod error;
pub mod packet;
pub mod reader;
pub mod writer;

#[cfg(test)]
mod fixtures;

pub use codec::{FrameCodec, FrameConfig, DEFAULT_MAX_FRAME_SIZE};
pub use delimited::{decode_delimited, encode_delimited, LENGTH_PREFIX_SIZE};
pub use error::{FrameError, Result};
pub use packet::{AsAny, Packet, PacketKind, PacketRegistry, PacketType};
pub use reader::FrameReader;
pub use writer::FrameWriter;
