//! Self-describing tagged value encoding for packet payloads.
//!
//! Every value is written as a one-byte kind tag followed by its body:
//! - Fixed-width big-endian primitives (tags 0-7)
//! - Length-prefixed UTF-8 strings (tag 8)
//! - Named nested elements resolved through an [`ElementResolver`] (tag 9)
//! - Counted arrays, sequences and mappings of recursively tagged values (tags 10-12)
//! - Domain-opaque values delegated to an [`OpaqueCodec`] (tag 13)
//! - `0xFF` for an absent value
//!
//! The tag space is closed. Decoding an unknown tag is an error, never a fallback.

pub mod codec;
pub mod config;
pub mod element;
pub mod error;
pub mod opaque;
pub mod value;
pub mod wire;

pub use codec::{tag, DecodeScope, ValueCodec};
pub use config::CodecConfig;
pub use element::{DecodeFn, DynElement, Element, ElementRegistry, ElementResolver, Object};
pub use error::{Result, ValueError};
pub use opaque::{Blob, BlobCodec, OpaqueCodec};
pub use value::{Value, ValueMap};
