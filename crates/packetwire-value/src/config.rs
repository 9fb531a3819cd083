/// Default maximum nesting of containers and elements.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum element count of a single array, sequence or mapping.
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1 << 20;

/// Default maximum string body size: 16 MiB.
pub const DEFAULT_MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Limits applied while decoding values from untrusted frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum nesting depth. Top-level values are depth 0.
    pub max_depth: usize,
    /// Maximum declared count of a container.
    pub max_collection_len: usize,
    /// Maximum declared byte length of a string.
    pub max_string_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}
