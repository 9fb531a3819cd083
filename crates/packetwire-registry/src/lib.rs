//! Ordered, freezable type table assigning single-byte discriminators.
//!
//! Types are registered during start-up, then the table is frozen once:
//! entries are sorted by canonical name (case-insensitive, case-sensitive
//! tie-break) and each entry's index becomes its discriminator. Two peers
//! that register the same set of types agree on every discriminator
//! regardless of registration order.

pub mod config;
pub mod error;
pub mod registry;

pub use config::{RegistryConfig, MAX_CAPACITY};
pub use error::{RegistrationError, RegistryError, Result};
pub use registry::{compare_names, Registrable, TypeRegistry};
