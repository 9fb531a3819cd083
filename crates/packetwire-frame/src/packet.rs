use std::any::{Any, TypeId};
use std::fmt;

use bytes::{Bytes, BytesMut};
use packetwire_registry::{Registrable, TypeRegistry};
use packetwire_value::ValueCodec;

/// Registry of packet types, indexed by discriminator once frozen.
pub type PacketRegistry = TypeRegistry<PacketKind>;

/// Upcasts for type-erased packets. Implemented for every sized type.
pub trait AsAny: Any + Send {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;

    /// Rust type name, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A message that can be framed and dispatched.
///
/// Payload codecs write everything after the discriminator byte. They may
/// use the raw helpers in `packetwire_value::wire` or embed tagged values
/// through `values`.
pub trait Packet: AsAny + fmt::Debug {
    fn encode_into(&self, dst: &mut BytesMut, values: &ValueCodec) -> packetwire_value::Result<()>;

    fn decode_from(&mut self, src: &mut Bytes, values: &ValueCodec) -> packetwire_value::Result<()>;

    /// True only for instances produced by a successful frame decode.
    fn is_received(&self) -> bool;

    fn mark_received(&mut self);
}

/// A concrete packet type with a canonical name.
///
/// The name decides the type's discriminator, so it must be identical on
/// every peer.
pub trait PacketType: Packet + Default {
    const NAME: &'static str;
}

impl dyn Packet {
    pub fn is<P: Packet>(&self) -> bool {
        self.as_any().is::<P>()
    }

    pub fn downcast_ref<P: Packet>(&self) -> Option<&P> {
        self.as_any().downcast_ref::<P>()
    }

    /// Unbox into the concrete packet, or `None` on a type mismatch.
    pub fn into_inner<P: Packet>(self: Box<Self>) -> Option<P> {
        self.into_any().downcast::<P>().ok().map(|packet| *packet)
    }

    pub fn packet_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }
}

/// Registry entry describing one packet type.
#[derive(Clone, Copy)]
pub struct PacketKind {
    name: &'static str,
    type_id: TypeId,
    construct: fn() -> Box<dyn Packet>,
}

impl PacketKind {
    pub fn of<P: PacketType>() -> Self {
        Self {
            name: P::NAME,
            type_id: TypeId::of::<P>(),
            construct: construct::<P>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// A fresh, never-received instance.
    pub fn construct(&self) -> Box<dyn Packet> {
        (self.construct)()
    }
}

impl PartialEq for PacketKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PacketKind").field(&self.name).finish()
    }
}

impl Registrable for PacketKind {
    fn canonical_name(&self) -> &str {
        self.name
    }
}

fn construct<P: PacketType>() -> Box<dyn Packet> {
    Box::new(P::default())
}
