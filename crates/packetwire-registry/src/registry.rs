use std::cmp::Ordering;

use crate::config::{RegistryConfig, MAX_CAPACITY};
use crate::error::{RegistrationError, RegistryError, Result};

/// An entry that can be placed in a [`TypeRegistry`].
///
/// Equality is type identity; the canonical name fixes the frozen order.
pub trait Registrable: PartialEq {
    fn canonical_name(&self) -> &str;
}

/// Append-only table of types, frozen once into discriminator order.
#[derive(Debug, Clone)]
pub struct TypeRegistry<T> {
    entries: Vec<T>,
    frozen: bool,
    config: RegistryConfig,
}

impl<T: Registrable> TypeRegistry<T> {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        let config = RegistryConfig {
            capacity: config.capacity.min(MAX_CAPACITY),
        };
        Self {
            entries: Vec::with_capacity(config.capacity),
            frozen: false,
            config,
        }
    }

    /// Register a type. Refusals are logged and reported as `false`.
    pub fn register(&mut self, entry: T) -> bool {
        match self.try_register(entry) {
            Ok(()) => true,
            Err(err @ RegistrationError::CapacityExceeded { .. }) => {
                tracing::error!(error = %err, "type registration refused");
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "type registration refused");
                false
            }
        }
    }

    /// Register a type, returning the typed refusal reason.
    ///
    /// A refused registration leaves the registry unchanged.
    pub fn try_register(&mut self, entry: T) -> std::result::Result<(), RegistrationError> {
        let name = entry.canonical_name();
        if self.entries.len() >= self.config.capacity {
            return Err(RegistrationError::CapacityExceeded {
                name: name.to_string(),
                capacity: self.config.capacity,
            });
        }
        if self
            .entries
            .iter()
            .any(|existing| *existing == entry || existing.canonical_name() == name)
        {
            return Err(RegistrationError::Duplicate(name.to_string()));
        }
        if self.frozen {
            return Err(RegistrationError::Frozen(name.to_string()));
        }

        self.entries.push(entry);
        Ok(())
    }

    /// Register every entry, returning how many were accepted.
    pub fn register_all(&mut self, entries: impl IntoIterator<Item = T>) -> usize {
        entries
            .into_iter()
            .map(|entry| self.register(entry))
            .filter(|accepted| *accepted)
            .count()
    }

    /// Sort entries into discriminator order and close registration.
    ///
    /// Only the first call has an effect. Returns `true` if this call froze
    /// the registry.
    pub fn freeze(&mut self) -> bool {
        if self.frozen {
            return false;
        }
        self.entries
            .sort_by(|a, b| compare_names(a.canonical_name(), b.canonical_name()));
        self.frozen = true;
        tracing::debug!(types = self.entries.len(), "type registry frozen");
        true
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &T) -> bool {
        self.entries.contains(entry)
    }

    /// Index of `entry` in the current order.
    ///
    /// Before [`freeze`](Self::freeze) this is the registration index, which
    /// peers do not agree on.
    pub fn discriminator_of(&self, entry: &T) -> Option<u8> {
        self.discriminator_where(|candidate| candidate == entry)
    }

    /// Index of the first entry matching `predicate`.
    pub fn discriminator_where(&self, predicate: impl Fn(&T) -> bool) -> Option<u8> {
        self.entries
            .iter()
            .position(predicate)
            .and_then(|index| u8::try_from(index).ok())
    }

    /// Entry at `discriminator`.
    pub fn type_at(&self, discriminator: u8) -> Result<&T> {
        self.entries
            .get(usize::from(discriminator))
            .ok_or(RegistryError::NoSuchDiscriminator {
                discriminator,
                registered: self.entries.len(),
            })
    }

    /// Entries with their discriminators, in order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &T)> {
        // Capacity is clamped to 256, so every index fits in a byte.
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index as u8, entry))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Registrable::canonical_name).collect()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl<T: Registrable> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Total order on canonical names: case-insensitive, then case-sensitive.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(fold_case)
        .cmp(b.chars().map(fold_case))
        .then_with(|| a.cmp(b))
}

// Upper then lower, each applied only where the mapping is one character.
// Multi-character expansions such as `ß` -> `SS` leave the char as is.
fn fold_case(c: char) -> char {
    let upper = single_char(c.to_uppercase()).unwrap_or(c);
    single_char(upper.to_lowercase()).unwrap_or(upper)
}

fn single_char(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    let first = mapped.next()?;
    mapped.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Named(String);

    impl Registrable for Named {
        fn canonical_name(&self) -> &str {
            &self.0
        }
    }

    fn named(name: &str) -> Named {
        Named(name.to_string())
    }

    fn frozen_names(order: &[&str]) -> Vec<String> {
        let mut registry = TypeRegistry::new();
        for name in order {
            assert!(registry.register(named(name)));
        }
        registry.freeze();
        registry.names().into_iter().map(str::to_string).collect()
    }

    #[test]
    fn freeze_orders_alphabetically() {
        let mut registry = TypeRegistry::new();
        registry.register(named("net.Ping"));
        registry.register(named("net.Chat"));
        assert_eq!(registry.discriminator_of(&named("net.Ping")), Some(0));

        assert!(registry.freeze());
        assert_eq!(registry.discriminator_of(&named("net.Chat")), Some(0));
        assert_eq!(registry.discriminator_of(&named("net.Ping")), Some(1));
    }

    #[test]
    fn discriminators_ignore_registration_order() {
        let expected = frozen_names(&["A", "B", "C"]);
        for order in [
            ["A", "C", "B"],
            ["B", "A", "C"],
            ["B", "C", "A"],
            ["C", "A", "B"],
            ["C", "B", "A"],
        ] {
            assert_eq!(frozen_names(&order), expected);
        }
    }

    #[test]
    fn ordering_is_case_insensitive_with_case_sensitive_tie_break() {
        assert_eq!(
            frozen_names(&["b", "B", "a", "C"]),
            vec!["a", "B", "b", "C"]
        );
        assert_eq!(compare_names("Apple", "apple"), Ordering::Less);
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[test]
    fn folding_keeps_characters_without_a_single_char_mapping() {
        assert_eq!(fold_case('ß'), 'ß');
        assert_eq!(fold_case('É'), 'é');
        assert_eq!(compare_names("ß", "t"), Ordering::Greater);
        assert_eq!(compare_names("straße", "STRASSE"), Ordering::Greater);
        assert_eq!(
            frozen_names(&["Zeta", "émile", "Émile", "alpha"]),
            vec!["alpha", "Zeta", "Émile", "émile"]
        );
    }

    #[test]
    fn freeze_is_idempotent() {
        let mut registry = TypeRegistry::new();
        registry.register(named("b"));
        registry.register(named("a"));

        assert!(registry.freeze());
        assert!(!registry.freeze());
        assert!(registry.is_frozen());
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn capacity_boundary() {
        let mut registry = TypeRegistry::new();
        for i in 0..MAX_CAPACITY {
            assert!(registry.register(named(&format!("type{i:03}"))));
        }
        assert_eq!(registry.len(), 256);

        assert_eq!(
            registry.try_register(named("overflow")),
            Err(RegistrationError::CapacityExceeded {
                name: "overflow".to_string(),
                capacity: 256
            })
        );
        assert!(!registry.register(named("overflow")));
        assert_eq!(registry.len(), 256);
        assert!(!registry.contains(&named("overflow")));

        registry.freeze();
        assert!(registry.type_at(255).is_ok());
    }

    #[test]
    fn configured_capacity_is_clamped() {
        let registry: TypeRegistry<Named> =
            TypeRegistry::with_config(RegistryConfig { capacity: 1000 });
        assert_eq!(registry.config().capacity, MAX_CAPACITY);

        let mut small = TypeRegistry::with_config(RegistryConfig { capacity: 1 });
        assert!(small.register(named("one")));
        assert!(!small.register(named("two")));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register(named("net.Chat")));
        assert_eq!(
            registry.try_register(named("net.Chat")),
            Err(RegistrationError::Duplicate("net.Chat".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registration_after_freeze_fails() {
        let mut registry = TypeRegistry::new();
        registry.register(named("b"));
        registry.register(named("a"));
        registry.freeze();

        assert_eq!(
            registry.try_register(named("c")),
            Err(RegistrationError::Frozen("c".to_string()))
        );
        assert!(!registry.register(named("0first")));
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn register_all_counts_accepted() {
        let mut registry = TypeRegistry::new();
        let accepted = registry.register_all([named("x"), named("y"), named("x")]);
        assert_eq!(accepted, 2);
    }

    #[test]
    fn type_at_out_of_range() {
        let mut registry = TypeRegistry::new();
        registry.register(named("only"));
        registry.freeze();

        assert_eq!(registry.type_at(0).map(|e| e.0.as_str()), Ok("only"));
        assert_eq!(
            registry.type_at(1),
            Err(RegistryError::NoSuchDiscriminator {
                discriminator: 1,
                registered: 1
            })
        );
    }

    #[test]
    fn unregistered_entry_has_no_discriminator() {
        let mut registry = TypeRegistry::new();
        registry.register(named("known"));
        registry.freeze();
        assert_eq!(registry.discriminator_of(&named("unknown")), None);
    }

    #[test]
    fn iter_yields_discriminators_in_order() {
        let mut registry = TypeRegistry::new();
        registry.register_all([named("c"), named("a"), named("b")]);
        registry.freeze();

        let pairs: Vec<_> = registry
            .iter()
            .map(|(d, entry)| (d, entry.canonical_name().to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (0, "a".to_string()),
                (1, "b".to_string()),
                (2, "c".to_string())
            ]
        );
    }
}
