use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::CodecConfig;
use crate::element::{ElementRegistry, ElementResolver, Object};
use crate::error::{Result, ValueError};
use crate::opaque::OpaqueCodec;
use crate::value::{Value, ValueMap};
use crate::wire;

/// Kind tags of the tagged-value encoding.
pub mod tag {
    pub const NULL: u8 = 0xFF;
    pub const INT: u8 = 0;
    pub const DOUBLE: u8 = 1;
    pub const BOOL: u8 = 2;
    pub const FLOAT: u8 = 3;
    pub const SHORT: u8 = 4;
    pub const BYTE: u8 = 5;
    pub const LONG: u8 = 6;
    pub const CHAR: u8 = 7;
    pub const STRING: u8 = 8;
    pub const OBJECT: u8 = 9;
    pub const ARRAY: u8 = 10;
    pub const LIST: u8 = 11;
    pub const MAP: u8 = 12;
    pub const OPAQUE: u8 = 13;
}

/// Encodes and decodes [`Value`]s.
///
/// Wire format of one value:
/// ```text
/// ┌──────────┬──────────────────────────────────────────────┐
/// │ Tag (1B) │ Body                                         │
/// ├──────────┼──────────────────────────────────────────────┤
/// │ 0xFF     │ (none)                                       │
/// │ 0-7      │ fixed-width big-endian primitive             │
/// │ 8        │ length (4B BE) + UTF-8 bytes                 │
/// │ 9        │ type name (string) + element body            │
/// │ 10, 11   │ count (4B BE) + count tagged values          │
/// │ 12       │ count (4B BE) + count (key, value) pairs     │
/// │ 13       │ opaque codec body                            │
/// └──────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone)]
pub struct ValueCodec {
    resolver: Arc<dyn ElementResolver>,
    opaque: Option<Arc<dyn OpaqueCodec>>,
    config: CodecConfig,
}

impl ValueCodec {
    /// Create a codec resolving nested elements through `resolver`.
    pub fn new(resolver: Arc<dyn ElementResolver>) -> Self {
        Self::with_config(resolver, CodecConfig::default())
    }

    /// Create a codec with explicit decode limits.
    pub fn with_config(resolver: Arc<dyn ElementResolver>, config: CodecConfig) -> Self {
        Self {
            resolver,
            opaque: None,
            config,
        }
    }

    /// Attach the codec used for opaque (tag 13) values.
    pub fn with_opaque_codec(mut self, codec: Arc<dyn OpaqueCodec>) -> Self {
        self.opaque = Some(codec);
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Append the tagged encoding of `value` to `dst`.
    ///
    /// On error `dst` is restored to its length before the call.
    pub fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<()> {
        let mark = dst.len();
        let result = self.encode_value(value, dst);
        if result.is_err() {
            dst.truncate(mark);
        }
        result
    }

    /// Encode `value` into a fresh buffer.
    pub fn encode_to_bytes(&self, value: &Value) -> Result<Bytes> {
        let mut dst = BytesMut::new();
        self.encode_value(value, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Decode one tagged value from the front of `src`.
    pub fn decode(&self, src: &mut Bytes) -> Result<Value> {
        self.decode_at(src, 0)
    }

    fn encode_value(&self, value: &Value, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(value.tag());
        match value {
            Value::Null => {}
            Value::Int(v) => dst.put_i32(*v),
            Value::Double(v) => dst.put_f64(*v),
            Value::Bool(v) => dst.put_u8(u8::from(*v)),
            Value::Float(v) => dst.put_f32(*v),
            Value::Short(v) => dst.put_i16(*v),
            Value::Byte(v) => dst.put_i8(*v),
            Value::Long(v) => dst.put_i64(*v),
            Value::Char(v) => dst.put_u16(*v),
            Value::String(v) => wire::put_string(dst, v)?,
            Value::Object(object) => {
                wire::put_string(dst, object.type_name())?;
                object.encode_into(dst, self)?;
            }
            Value::Array(items) | Value::List(items) => {
                wire::put_len(dst, items.len())?;
                for item in items {
                    self.encode_value(item, dst)?;
                }
            }
            Value::Map(map) => {
                wire::put_len(dst, map.len())?;
                for (key, value) in map.iter() {
                    self.encode_value(key, dst)?;
                    self.encode_value(value, dst)?;
                }
            }
            Value::Opaque(object) => {
                let codec = self.opaque.as_ref().ok_or(ValueError::NoOpaqueCodec)?;
                codec.encode(object, dst)?;
            }
        }
        Ok(())
    }

    fn decode_at(&self, src: &mut Bytes, depth: usize) -> Result<Value> {
        if depth > self.config.max_depth {
            return Err(ValueError::DepthExceeded(self.config.max_depth));
        }

        let value = match wire::get_u8(src)? {
            tag::NULL => Value::Null,
            tag::INT => Value::Int(wire::get_i32(src)?),
            tag::DOUBLE => Value::Double(wire::get_f64(src)?),
            tag::BOOL => Value::Bool(wire::get_bool(src)?),
            tag::FLOAT => Value::Float(wire::get_f32(src)?),
            tag::SHORT => Value::Short(wire::get_i16(src)?),
            tag::BYTE => Value::Byte(wire::get_i8(src)?),
            tag::LONG => Value::Long(wire::get_i64(src)?),
            tag::CHAR => Value::Char(wire::get_u16(src)?),
            tag::STRING => Value::String(wire::get_string_bounded(
                src,
                self.config.max_string_len,
            )?),
            tag::OBJECT => Value::Object(self.decode_object(src, depth)?),
            tag::ARRAY => Value::Array(self.decode_items(src, depth)?),
            tag::LIST => Value::List(self.decode_items(src, depth)?),
            tag::MAP => Value::Map(self.decode_map(src, depth)?),
            tag::OPAQUE => {
                let codec = self.opaque.as_ref().ok_or(ValueError::NoOpaqueCodec)?;
                Value::Opaque(codec.decode(src)?)
            }
            other => return Err(ValueError::UnknownTag(other)),
        };
        Ok(value)
    }

    fn decode_object(&self, src: &mut Bytes, depth: usize) -> Result<Object> {
        let type_name = wire::get_string_bounded(src, self.config.max_string_len)?;
        let decoder = self
            .resolver
            .decoder(&type_name)
            .ok_or(ValueError::UnknownTypeName(type_name))?;
        decoder(
            src,
            &DecodeScope {
                codec: self,
                depth: depth + 1,
            },
        )
    }

    fn decode_items(&self, src: &mut Bytes, depth: usize) -> Result<Vec<Value>> {
        let count = wire::get_len(src, self.config.max_collection_len)?;
        // Every element takes at least one byte, so the remaining input bounds the allocation.
        let mut items = Vec::with_capacity(count.min(src.len()));
        for _ in 0..count {
            items.push(self.decode_at(src, depth + 1)?);
        }
        Ok(items)
    }

    fn decode_map(&self, src: &mut Bytes, depth: usize) -> Result<ValueMap> {
        let count = wire::get_len(src, self.config.max_collection_len)?;
        let mut map = ValueMap::with_capacity(count.min(src.len() / 2));
        for _ in 0..count {
            let key = self.decode_at(src, depth + 1)?;
            let value = self.decode_at(src, depth + 1)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl Default for ValueCodec {
    /// A codec with no registered element types and no opaque codec.
    fn default() -> Self {
        Self::new(Arc::new(ElementRegistry::new()))
    }
}

impl std::fmt::Debug for ValueCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueCodec")
            .field("config", &self.config)
            .field("opaque", &self.opaque.is_some())
            .finish()
    }
}

/// Decoding context handed to [`Element::decode_from`](crate::Element::decode_from).
///
/// Values decoded through the scope count toward the nesting limit of the
/// enclosing value.
pub struct DecodeScope<'a> {
    codec: &'a ValueCodec,
    depth: usize,
}

impl DecodeScope<'_> {
    /// Decode a nested tagged value.
    pub fn decode(&self, src: &mut Bytes) -> Result<Value> {
        self.codec.decode_at(src, self.depth)
    }

    /// Limits of the enclosing codec.
    ///
    /// The codec itself is not exposed: nested values must go through
    /// [`decode`](Self::decode) to count toward the depth limit.
    pub fn config(&self) -> &CodecConfig {
        self.codec.config()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}
