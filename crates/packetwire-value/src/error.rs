/// Errors that can occur while encoding or decoding tagged values.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// The input contains a kind tag outside the defined tag space.
    #[error("unknown value tag 0x{0:02x}")]
    UnknownTag(u8),

    /// A nested element names a type the resolver does not know.
    #[error("unknown element type name: {0}")]
    UnknownTypeName(String),

    /// The value cannot be represented in the tagged encoding.
    #[error("unsupported value: {0}")]
    Unsupported(String),

    /// The input ended before the value was complete.
    #[error("truncated input (needed {needed} bytes, {remaining} remaining)")]
    Truncated { needed: usize, remaining: usize },

    /// A string body is not valid UTF-8.
    #[error("string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A length or element count exceeds the configured limit.
    #[error("length {len} exceeds maximum {max}")]
    LengthExceeded { len: usize, max: usize },

    /// Nested containers or elements exceed the configured depth.
    #[error("value nesting exceeds maximum depth {0}")]
    DepthExceeded(usize),

    /// An opaque value was encountered but no opaque codec is configured.
    #[error("no codec configured for opaque values")]
    NoOpaqueCodec,
}

pub type Result<T> = std::result::Result<T, ValueError>;
