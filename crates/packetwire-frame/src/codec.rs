use std::any::TypeId;
use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use packetwire_value::ValueCodec;

use crate::error::{FrameError, Result};
use crate::packet::{Packet, PacketKind, PacketRegistry, PacketType};

/// Default maximum frame size (discriminator + payload): 16 MiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Frame codec configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum accepted frame size in bytes, discriminator included.
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Encodes packets as `[discriminator][payload]` and decodes them back.
///
/// The registry must be frozen before the codec will carry any traffic, so
/// every discriminator it writes is final.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    registry: Arc<PacketRegistry>,
    values: ValueCodec,
    config: FrameConfig,
}

impl FrameCodec {
    pub fn new(registry: Arc<PacketRegistry>, values: ValueCodec) -> Self {
        Self::with_config(registry, values, FrameConfig::default())
    }

    pub fn with_config(
        registry: Arc<PacketRegistry>,
        values: ValueCodec,
        config: FrameConfig,
    ) -> Self {
        if !registry.is_frozen() {
            tracing::warn!("frame codec built over an open type registry");
        }
        Self {
            registry,
            values,
            config,
        }
    }

    pub fn registry(&self) -> &PacketRegistry {
        &self.registry
    }

    /// Value codec handed to packet payload codecs.
    pub fn values(&self) -> &ValueCodec {
        &self.values
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Discriminator assigned to `P`.
    pub fn discriminator_of<P: PacketType>(&self) -> Result<u8> {
        self.discriminator_for(TypeId::of::<P>(), P::NAME)
    }

    /// Encode `packet` into a fresh frame.
    pub fn encode(&self, packet: &dyn Packet) -> Result<Bytes> {
        let mut dst = BytesMut::new();
        self.encode_into(packet, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Append the frame for `packet` to `dst`.
    ///
    /// On error `dst` is restored to its length before the call.
    pub fn encode_into(&self, packet: &dyn Packet, dst: &mut BytesMut) -> Result<()> {
        let discriminator = self.discriminator_for(packet.packet_type_id(), packet.type_name())?;

        let mark = dst.len();
        dst.put_u8(discriminator);
        let result = packet
            .encode_into(dst, &self.values)
            .map_err(FrameError::from)
            .and_then(|()| {
                let size = dst.len() - mark;
                if size > self.config.max_frame_size {
                    return Err(FrameError::FrameTooLarge {
                        size,
                        max: self.config.max_frame_size,
                    });
                }
                Ok(())
            });
        if result.is_err() {
            dst.truncate(mark);
        }
        result
    }

    /// Decode one frame into a received packet.
    pub fn decode(&self, mut frame: Bytes) -> Result<Box<dyn Packet>> {
        if !self.registry.is_frozen() {
            return Err(FrameError::RegistryOpen);
        }
        if frame.len() > self.config.max_frame_size {
            return Err(FrameError::FrameTooLarge {
                size: frame.len(),
                max: self.config.max_frame_size,
            });
        }
        if !frame.has_remaining() {
            return Err(FrameError::EmptyFrame);
        }

        let discriminator = frame.get_u8();
        let kind = self.kind_at(discriminator)?;
        let mut packet = kind.construct();
        packet.decode_from(&mut frame, &self.values)?;
        if frame.has_remaining() {
            tracing::debug!(
                packet = kind.name(),
                trailing = frame.remaining(),
                "ignoring trailing payload bytes"
            );
        }
        packet.mark_received();

        tracing::trace!(packet = kind.name(), discriminator, "frame decoded");
        Ok(packet)
    }

    /// Decode one frame, logging and discarding it on failure.
    pub fn decode_or_drop(&self, frame: Bytes) -> Option<Box<dyn Packet>> {
        let size = frame.len();
        let discriminator = frame.first().copied();
        match self.decode(frame) {
            Ok(packet) => Some(packet),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    size,
                    discriminator = ?discriminator,
                    "dropping undecodable frame"
                );
                None
            }
        }
    }

    /// Registry entry behind `discriminator`.
    pub fn kind_at(&self, discriminator: u8) -> Result<&PacketKind> {
        self.registry
            .type_at(discriminator)
            .map_err(|_| FrameError::UnknownDiscriminator {
                discriminator,
                registered: self.registry.len(),
            })
    }

    fn discriminator_for(&self, type_id: TypeId, name: &'static str) -> Result<u8> {
        if !self.registry.is_frozen() {
            return Err(FrameError::RegistryOpen);
        }
        self.registry
            .discriminator_where(|kind| kind.type_id() == type_id)
            .ok_or(FrameError::NotRegistered(name))
    }
}
