use bytes::{Bytes, BytesMut};

use crate::codec::{DecodeScope, ValueCodec};
use crate::config::DEFAULT_MAX_STRING_LEN;
use crate::element::{Element, Object};
use crate::error::{Result, ValueError};
use crate::wire;

/// External codec for domain-opaque values (tag 13).
///
/// The tagged codec writes the tag and hands the rest of the body to this
/// codec in both directions.
pub trait OpaqueCodec: Send + Sync {
    fn encode(&self, value: &Object, dst: &mut BytesMut) -> Result<()>;

    fn decode(&self, src: &mut Bytes) -> Result<Object>;
}

/// An opaque byte payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob(pub Bytes);

impl Blob {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Element for Blob {
    const TYPE_NAME: &'static str = "packetwire.Blob";

    fn encode_into(&self, dst: &mut BytesMut, _codec: &ValueCodec) -> Result<()> {
        wire::put_blob(dst, &self.0)
    }

    fn decode_from(&mut self, src: &mut Bytes, scope: &DecodeScope<'_>) -> Result<()> {
        self.0 = wire::get_blob(src, scope.config().max_string_len)?;
        Ok(())
    }
}

/// Opaque codec carrying [`Blob`]s as length-prefixed bytes.
#[derive(Debug, Clone, Copy)]
pub struct BlobCodec {
    max_len: usize,
}

impl BlobCodec {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }
}

impl Default for BlobCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STRING_LEN)
    }
}

impl OpaqueCodec for BlobCodec {
    fn encode(&self, value: &Object, dst: &mut BytesMut) -> Result<()> {
        let blob = value.downcast_ref::<Blob>().ok_or_else(|| {
            ValueError::Unsupported(format!("opaque value of type {}", value.type_name()))
        })?;
        wire::put_blob(dst, &blob.0)
    }

    fn decode(&self, src: &mut Bytes) -> Result<Object> {
        Ok(Object::new(Blob(wire::get_blob(src, self.max_len)?)))
    }
}
