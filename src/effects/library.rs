//! Effect library for definition lookup.
//!
//! The `EffectLibrary` stores the effect definitions a game ships with.
//! Definitions are looked up by `EffectId` or by name, and the whole library
//! packs to bytes so tools can bake it into an asset.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::definition::{EffectDefinition, EffectId};

/// Errors from registering or unpacking definitions.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Another definition already uses this id.
    #[error("Effect ID {0} already registered")]
    DuplicateId(EffectId),

    /// Another definition already uses this name.
    #[error("Effect name '{0}' already registered")]
    DuplicateName(String),

    /// Packing or unpacking failed.
    #[error("Library encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Registry of effect definitions.
///
/// ## Example
///
/// ```
/// use gameplay_effects::effects::{EffectDefinition, EffectId, EffectLibrary};
///
/// let mut library = EffectLibrary::new();
/// library
///     .register(EffectDefinition::duration(EffectId::new(1), "Haste", 8.0))
///     .unwrap();
///
/// let haste = library.by_name("Haste").unwrap();
/// assert_eq!(haste.id, EffectId::new(1));
///
/// let bytes = library.to_bytes().unwrap();
/// let restored = EffectLibrary::from_bytes(&bytes).unwrap();
/// assert_eq!(restored.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct EffectLibrary {
    effects: FxHashMap<EffectId, Arc<EffectDefinition>>,
    names: FxHashMap<String, EffectId>,
}

impl EffectLibrary {
    /// Create a new empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, returning the shared handle.
    pub fn register(
        &mut self,
        definition: EffectDefinition,
    ) -> Result<Arc<EffectDefinition>, LibraryError> {
        if self.effects.contains_key(&definition.id) {
            return Err(LibraryError::DuplicateId(definition.id));
        }
        if self.names.contains_key(&definition.name) {
            return Err(LibraryError::DuplicateName(definition.name));
        }
        let shared = Arc::new(definition);
        self.names.insert(shared.name.clone(), shared.id);
        self.effects.insert(shared.id, Arc::clone(&shared));
        Ok(shared)
    }

    /// Get a definition by ID.
    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&Arc<EffectDefinition>> {
        self.effects.get(&id)
    }

    /// Get a definition by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Arc<EffectDefinition>> {
        self.names.get(name).and_then(|id| self.effects.get(id))
    }

    /// Check if an ID is registered.
    #[must_use]
    pub fn contains(&self, id: EffectId) -> bool {
        self.effects.contains_key(&id)
    }

    /// Get the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Iterate over all definitions in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EffectDefinition>> {
        let mut sorted: Vec<_> = self.effects.values().collect();
        sorted.sort_by_key(|d| d.id);
        sorted.into_iter()
    }

    /// Pack every definition to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LibraryError> {
        let definitions: Vec<&EffectDefinition> = self.iter().map(|d| &**d).collect();
        Ok(bincode::serialize(&definitions)?)
    }

    /// Unpack a library produced by [`EffectLibrary::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LibraryError> {
        let definitions: Vec<EffectDefinition> = bincode::deserialize(bytes)?;
        let mut library = Self::new();
        for definition in definitions {
            library.register(definition)?;
        }
        Ok(library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::definition::{InstantConfig, ModifierConfig};
    use crate::effects::EffectKind;

    #[test]
    fn test_register_and_lookup() {
        let mut library = EffectLibrary::new();
        let fireball = library
            .register(
                EffectDefinition::instant(EffectId::new(2), "Fireball")
                    .with_modifier(ModifierConfig::add("Health", -40.0)),
            )
            .unwrap();

        assert_eq!(fireball.name, "Fireball");
        assert!(library.contains(EffectId::new(2)));
        assert!(Arc::ptr_eq(library.get(EffectId::new(2)).unwrap(), &fireball));
        assert!(library.by_name("Frostbolt").is_none());
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut library = EffectLibrary::new();
        library
            .register(EffectDefinition::instant(EffectId::new(1), "Heal"))
            .unwrap();

        let err = library
            .register(EffectDefinition::instant(EffectId::new(1), "Other"))
            .unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateId(id) if id == EffectId::new(1)));

        let err = library
            .register(EffectDefinition::instant(EffectId::new(2), "Heal"))
            .unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateName(ref n) if n == "Heal"));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_iter_in_id_order() {
        let mut library = EffectLibrary::new();
        for id in [5, 1, 3] {
            library
                .register(EffectDefinition::infinite(EffectId::new(id), format!("E{id}")))
                .unwrap();
        }
        let ids: Vec<u32> = library.iter().map(|d| d.id.raw()).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_pack_round_trip() {
        let mut library = EffectLibrary::new();
        let spark = library
            .register(EffectDefinition::instant(EffectId::new(1), "Spark"))
            .unwrap();
        library
            .register(EffectDefinition::new(
                EffectId::new(2),
                "Storm",
                EffectKind::Instant(InstantConfig::new().with_critical(0.25, 2.0).chain(
                    crate::effects::ChainedEffect::new(spark).with_chance(0.5),
                )),
            ))
            .unwrap();

        let bytes = library.to_bytes().unwrap();
        let restored = EffectLibrary::from_bytes(&bytes).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.by_name("Storm").map(|d| &**d),
            library.by_name("Storm").map(|d| &**d)
        );
    }

    #[test]
    fn test_corrupt_bytes() {
        let result = EffectLibrary::from_bytes(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(LibraryError::Encoding(_))));
    }
}
