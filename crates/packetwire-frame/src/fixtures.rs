//! Packet types shared by the crate's unit tests.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use packetwire_value::{wire, Value, ValueCodec};

use crate::codec::FrameCodec;
use crate::packet::{Packet, PacketKind, PacketRegistry, PacketType};

#[derive(Debug, Default, PartialEq)]
pub struct Ping {
    pub received: bool,
}

impl Packet for Ping {
    fn encode_into(
        &self,
        _dst: &mut BytesMut,
        _values: &ValueCodec,
    ) -> packetwire_value::Result<()> {
        Ok(())
    }

    fn decode_from(
        &mut self,
        _src: &mut Bytes,
        _values: &ValueCodec,
    ) -> packetwire_value::Result<()> {
        Ok(())
    }

    fn is_received(&self) -> bool {
        self.received
    }

    fn mark_received(&mut self) {
        self.received = true;
    }
}

impl PacketType for Ping {
    const NAME: &'static str = "Ping";
}

#[derive(Debug, Default, PartialEq)]
pub struct Chat {
    pub text: String,
    pub received: bool,
}

impl Chat {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            received: false,
        }
    }
}

impl Packet for Chat {
    fn encode_into(
        &self,
        dst: &mut BytesMut,
        _values: &ValueCodec,
    ) -> packetwire_value::Result<()> {
        wire::put_string(dst, &self.text)
    }

    fn decode_from(
        &mut self,
        src: &mut Bytes,
        values: &ValueCodec,
    ) -> packetwire_value::Result<()> {
        self.text = wire::get_string_bounded(src, values.config().max_string_len)?;
        Ok(())
    }

    fn is_received(&self) -> bool {
        self.received
    }

    fn mark_received(&mut self) {
        self.received = true;
    }
}

impl PacketType for Chat {
    const NAME: &'static str = "Chat";
}

/// Carries one tagged value as its whole payload.
#[derive(Debug, Default, PartialEq)]
pub struct Note {
    pub body: Value,
    pub received: bool,
}

impl Packet for Note {
    fn encode_into(
        &self,
        dst: &mut BytesMut,
        values: &ValueCodec,
    ) -> packetwire_value::Result<()> {
        values.encode(&self.body, dst)
    }

    fn decode_from(
        &mut self,
        src: &mut Bytes,
        values: &ValueCodec,
    ) -> packetwire_value::Result<()> {
        self.body = values.decode(src)?;
        Ok(())
    }

    fn is_received(&self) -> bool {
        self.received
    }

    fn mark_received(&mut self) {
        self.received = true;
    }
}

impl PacketType for Note {
    const NAME: &'static str = "Note";
}

pub fn frozen_registry(kinds: impl IntoIterator<Item = PacketKind>) -> Arc<PacketRegistry> {
    let mut registry = PacketRegistry::new();
    registry.register_all(kinds);
    registry.freeze();
    Arc::new(registry)
}

/// Codec over `Ping` and `Chat`, registered in that order.
pub fn chat_codec() -> FrameCodec {
    FrameCodec::new(
        frozen_registry([PacketKind::of::<Ping>(), PacketKind::of::<Chat>()]),
        ValueCodec::default(),
    )
}
