/// Reasons a type was refused by the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// The registry already holds its maximum number of types.
    #[error("registry capacity of {capacity} exceeded by {name}")]
    CapacityExceeded { name: String, capacity: usize },

    /// The type, or another type with the same canonical name, is already registered.
    #[error("{0} is already registered")]
    Duplicate(String),

    /// The registry was frozen before this registration.
    #[error("{0} registered after the registry was frozen")]
    Frozen(String),
}

/// Errors from discriminator lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No registered type sits at the given discriminator.
    #[error("no registered type for discriminator {discriminator} ({registered} registered)")]
    NoSuchDiscriminator { discriminator: u8, registered: usize },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
