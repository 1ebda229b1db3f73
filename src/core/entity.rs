//! Entity and instance identification.
//!
//! Every actor the engine can affect has an `EntityId`. The engine never
//! allocates entity ids itself; they come from the host game.
//!
//! Every live effect application has an `InstanceId`. Instance ids are
//! allocated by the engine, never reused, and double as the modifier
//! source id handed to attribute stores.
//!
//! ## Usage
//!
//! ```
//! use gameplay_effects::core::{EntityId, InstanceId};
//!
//! let hero = EntityId(7);
//! assert_eq!(hero.raw(), 7);
//! assert_eq!(format!("{}", hero), "Entity(7)");
//!
//! let first = InstanceId::new(1);
//! assert!(first < first.next());
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any entity effects can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Identifier of one live effect instance.
///
/// Monotonically allocated by the engine. A handle holding an id whose
/// instance is gone is stale, and every operation treats it as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl InstanceId {
    /// Create an instance ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The id allocated after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance({})", self.0)
    }
}
