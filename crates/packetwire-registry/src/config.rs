/// Hard upper bound on registered types: discriminators are one byte.
pub const MAX_CAPACITY: usize = 256;

/// Controls registry admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of registered types. Clamped to [`MAX_CAPACITY`].
    pub capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_CAPACITY,
        }
    }
}
