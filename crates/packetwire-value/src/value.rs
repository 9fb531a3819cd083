use std::hash::{DefaultHasher, Hash, Hasher};

use indexmap::{Equivalent, IndexMap};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::codec::tag;
use crate::element::{Element, Object};

/// A value of the closed tagged-value union.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    Int(i32),
    Double(f64),
    Bool(bool),
    Float(f32),
    Short(i16),
    Byte(i8),
    Long(i64),
    /// A single UTF-16 code unit.
    Char(u16),
    String(String),
    /// A named nested element.
    Object(Object),
    /// Fixed-length array.
    Array(Vec<Value>),
    /// Ordered variable-length sequence.
    List(Vec<Value>),
    /// Key/value mapping.
    Map(ValueMap),
    /// Domain value encoded by an external codec.
    Opaque(Object),
}

impl Value {
    /// Wire tag of this value's kind.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Null => tag::NULL,
            Value::Int(_) => tag::INT,
            Value::Double(_) => tag::DOUBLE,
            Value::Bool(_) => tag::BOOL,
            Value::Float(_) => tag::FLOAT,
            Value::Short(_) => tag::SHORT,
            Value::Byte(_) => tag::BYTE,
            Value::Long(_) => tag::LONG,
            Value::Char(_) => tag::CHAR,
            Value::String(_) => tag::STRING,
            Value::Object(_) => tag::OBJECT,
            Value::Array(_) => tag::ARRAY,
            Value::List(_) => tag::LIST,
            Value::Map(_) => tag::MAP,
            Value::Opaque(_) => tag::OPAQUE,
        }
    }

    /// Human-readable kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::Float(_) => "float",
            Value::Short(_) => "short",
            Value::Byte(_) => "byte",
            Value::Long(_) => "long",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Build a `Char` from a character in the Basic Multilingual Plane.
    ///
    /// Returns `None` for characters that need a surrogate pair.
    pub fn from_char(c: char) -> Option<Self> {
        u16::try_from(u32::from(c)).ok().map(Value::Char)
    }

    /// Wrap a nested element.
    pub fn object<T: Element>(element: T) -> Self {
        Value::Object(Object::new(element))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(unit) => char::from_u32(u32::from(*unit)),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) | Value::Opaque(object) => Some(object),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Byte(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<ValueMap> for Value {
    fn from(v: ValueMap) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Key/value association that keeps insertion order.
///
/// Inserting an existing key replaces its value in place, so a decode stream
/// that repeats a key keeps the last value at the first key's position.
/// Equality ignores order. Lookups are hashed.
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: IndexMap<MapKey, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert a pair, returning the previous value for `key` if any.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(MapKey(key.into()), value.into())
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Remove `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (&k.0, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys().map(|k| &k.0)
    }
}

impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

// Order-independent, so equal maps hash equal whatever their insertion order.
impl Hash for ValueMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.iter().fold(0u64, |acc, (k, v)| {
            let mut entry = DefaultHasher::new();
            k.hash(&mut entry);
            v.hash(&mut entry);
            acc.wrapping_add(entry.finish())
        });
        self.len().hash(state);
        combined.hash(state);
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for ValueMap {
    type Item = (Value, Value);
    type IntoIter = std::iter::Map<
        indexmap::map::IntoIter<MapKey, Value>,
        fn((MapKey, Value)) -> (Value, Value),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let unwrap: fn((MapKey, Value)) -> (Value, Value) = |(k, v)| (k.0, v);
        self.entries.into_iter().map(unwrap)
    }
}

/// Map key with [`Value`] equality.
///
/// NaN keys never compare equal, so each one is a separate entry.
#[derive(Debug, Clone)]
pub struct MapKey(Value);

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for MapKey {}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Equivalent<MapKey> for Value {
    fn equivalent(&self, key: &MapKey) -> bool {
        *self == key.0
    }
}

// Consistent with `PartialEq`: floats hash with both zeros folded together
// and elements hash by type name.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        match self {
            Value::Null => {}
            Value::Int(v) => v.hash(state),
            Value::Double(v) => hash_f64(*v, state),
            Value::Bool(v) => v.hash(state),
            Value::Float(v) => hash_f64(f64::from(*v), state),
            Value::Short(v) => v.hash(state),
            Value::Byte(v) => v.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Char(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::Object(object) | Value::Opaque(object) => object.type_name().hash(state),
            Value::Array(items) | Value::List(items) => items.hash(state),
            Value::Map(map) => map.hash(state),
        }
    }
}

fn hash_f64<H: Hasher>(v: f64, state: &mut H) {
    let bits = if v == 0.0 { 0 } else { v.to_bits() };
    bits.hash(state);
}

// Elements serialize as their type name only; their fields are not visible
// through the erased handle.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Float(v) => serializer.serialize_f32(*v),
            Value::Short(v) => serializer.serialize_i16(*v),
            Value::Byte(v) => serializer.serialize_i8(*v),
            Value::Long(v) => serializer.serialize_i64(*v),
            Value::Char(unit) => match char::from_u32(u32::from(*unit)) {
                Some(c) => serializer.serialize_char(c),
                None => serializer.serialize_u16(*unit),
            },
            Value::String(v) => serializer.serialize_str(v),
            Value::Object(object) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$element", object.type_name())?;
                map.end()
            }
            Value::Opaque(object) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$opaque", object.type_name())?;
                map.end()
            }
            Value::Array(items) | Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for pair in entries.iter() {
                    seq.serialize_element(&pair)?;
                }
                seq.end()
            }
        }
    }
}
