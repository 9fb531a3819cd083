//! Packet types shared by the crate's unit tests.

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use packetwire_frame::{FrameCodec, Packet, PacketKind, PacketRegistry, PacketType};
use packetwire_value::{wire, ValueCodec};

#[derive(Debug, Default)]
pub struct Ping {
    pub seq: i32,
    pub received: bool,
}

impl Packet for Ping {
    fn encode_into(
        &self,
        dst: &mut BytesMut,
        _values: &ValueCodec,
    ) -> packetwire_value::Result<()> {
        dst.put_i32(self.seq);
        Ok(())
    }

    fn decode_from(
        &mut self,
        src: &mut Bytes,
        _values: &ValueCodec,
    ) -> packetwire_value::Result<()> {
        self.seq = wire::get_i32(src)?;
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

#[derive(Debug, Default)]
pub struct Chat {
    pub text: String,
    pub received: bool,
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
        _values: &ValueCodec,
    ) -> packetwire_value::Result<()> {
        self.text = wire::get_string(src)?;
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

pub fn ping(seq: i32) -> Box<dyn Packet> {
    Box::new(Ping {
        seq,
        received: true,
    })
}

pub fn chat(text: &str) -> Box<dyn Packet> {
    Box::new(Chat {
        text: text.to_string(),
        received: true,
    })
}

pub fn seq_of(packet: &dyn Packet) -> i32 {
    packet.downcast_ref::<Ping>().map_or(-1, |ping| ping.seq)
}

/// Codec over `Chat` (discriminator 0) and `Ping` (discriminator 1).
pub fn codec() -> Arc<FrameCodec> {
    let mut registry = PacketRegistry::new();
    registry.register(PacketKind::of::<Ping>());
    registry.register(PacketKind::of::<Chat>());
    registry.freeze();
    Arc::new(FrameCodec::new(Arc::new(registry), ValueCodec::default()))
}
