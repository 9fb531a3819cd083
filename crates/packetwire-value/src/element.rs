//! Named nested elements and the type-name resolver used to decode them.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use crate::codec::{DecodeScope, ValueCodec};
use crate::error::Result;

/// A user-defined type that can travel inside a tagged value.
///
/// On the wire an element is its [`TYPE_NAME`](Element::TYPE_NAME) followed
/// by whatever [`encode_into`](Element::encode_into) writes. Decoding builds
/// a `Default` instance, runs [`decode_from`](Element::decode_from), and
/// returns the result of [`resolve`](Element::resolve).
pub trait Element: Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Stable type identifier written ahead of the element body.
    const TYPE_NAME: &'static str;

    fn encode_into(&self, dst: &mut BytesMut, codec: &ValueCodec) -> Result<()>;

    fn decode_from(&mut self, src: &mut Bytes, scope: &DecodeScope<'_>) -> Result<()>;

    /// Substitute the freshly decoded instance.
    ///
    /// Override to hand back a canonical shared instance (for example an
    /// interned one) instead of the decoded value.
    fn resolve(self) -> Object {
        Object::new(self)
    }
}

/// Object-safe view of an [`Element`]. Implemented for every element.
pub trait DynElement: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;

    fn encode_erased(&self, dst: &mut BytesMut, codec: &ValueCodec) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn eq_erased(&self, other: &dyn DynElement) -> bool;
}

impl<T: Element> DynElement for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn encode_erased(&self, dst: &mut BytesMut, codec: &ValueCodec) -> Result<()> {
        self.encode_into(dst, codec)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_erased(&self, other: &dyn DynElement) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// Shared handle to a type-erased element.
#[derive(Clone)]
pub struct Object(Arc<dyn DynElement>);

impl Object {
    pub fn new<T: Element>(element: T) -> Self {
        Self(Arc::new(element))
    }

    /// Wrap an already shared element without copying it.
    pub fn from_shared<T: Element>(element: Arc<T>) -> Self {
        Self(element)
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn downcast_ref<T: Element>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Element>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// True if both handles point at the same shared instance.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn encode_into(&self, dst: &mut BytesMut, codec: &ValueCodec) -> Result<()> {
        self.0.encode_erased(dst, codec)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.eq_erased(other.0.as_ref())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// Decodes one element body into an [`Object`].
pub type DecodeFn = fn(&mut Bytes, &DecodeScope<'_>) -> Result<Object>;

/// Maps a serialized element type name to its decoder.
pub trait ElementResolver: Send + Sync {
    fn decoder(&self, type_name: &str) -> Option<DecodeFn>;
}

/// Type-name keyed table of element decoders, filled at start-up.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element type. Returns `false` if its name is already taken.
    pub fn register<T: Element>(&mut self) -> bool {
        if self.decoders.contains_key(T::TYPE_NAME) {
            tracing::warn!(type_name = T::TYPE_NAME, "element type registered twice");
            return false;
        }
        self.decoders.insert(T::TYPE_NAME, decode_element::<T>);
        true
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<T: Element>(mut self) -> Self {
        self.register::<T>();
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.decoders.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.decoders.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl ElementResolver for ElementRegistry {
    fn decoder(&self, type_name: &str) -> Option<DecodeFn> {
        self.decoders.get(type_name).copied()
    }
}

fn decode_element<T: Element>(src: &mut Bytes, scope: &DecodeScope<'_>) -> Result<Object> {
    let mut element = T::default();
    element.decode_from(src, scope)?;
    Ok(element.resolve())
}
