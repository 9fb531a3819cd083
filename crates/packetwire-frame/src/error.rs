/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The packet type was never registered.
    #[error("packet type not registered: {0}")]
    NotRegistered(&'static str),

    /// The discriminator byte does not index a registered type.
    #[error("unknown discriminator {discriminator} ({registered} types registered)")]
    UnknownDiscriminator { discriminator: u8, registered: usize },

    /// The frame carries no discriminator byte.
    #[error("empty frame")]
    EmptyFrame,

    /// Traffic was attempted before the registry was frozen.
    #[error("type registry is not frozen")]
    RegistryOpen,

    /// The packet payload could not be encoded or decoded.
    #[error("payload error: {0}")]
    Payload(#[from] packetwire_value::ValueError),

    /// The frame exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
