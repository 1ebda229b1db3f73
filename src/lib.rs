//! # gameplay-effects
//!
//! A gameplay effect engine: timed, stacking, numeric modifications of
//! entity attributes, independent of rendering, input and physics.
//!
//! ## Design Principles
//!
//! 1. **Engine-Owned State**: The engine owns every live effect instance in a
//!    per-target registry. Callers hold handles, never references.
//!
//! 2. **One Clock**: A single `EffectEngine::tick(world, dt)` per frame drives
//!    durations, periodic ticks, conditional removal, growth and auras.
//!
//! 3. **Borrowed World**: Attribute stores, tag stores, positions and the
//!    renderer belong to the game. The engine sees them through the
//!    `EffectWorld` trait for the duration of one call.
//!
//! ## Modules
//!
//! - `core`: Entity and instance IDs, deterministic RNG, configuration
//! - `attributes`: Numeric attributes with source-owned modifier stacks
//! - `tags`: Hierarchical tags and tag requirement expressions
//! - `world`: The engine's view of the game world
//! - `effects`: Effect definitions, instances, events and the engine

pub mod core;
pub mod attributes;
pub mod tags;
pub mod world;
pub mod effects;

// Re-export commonly used types
pub use crate::core::{EffectRng, EffectRngState, EngineConfig, EntityId, InstanceId};

pub use crate::attributes::{AttributeId, AttributeSet, AttributeStore, ModifierOp};

pub use crate::tags::{Tag, TagContainer, TagRequirement, TagStore};

pub use crate::world::{EffectWorld, EntityRecord, Presentation, SimpleWorld, VisualHandle};

pub use crate::effects::{
    ApplyError, Curve, EffectContext, EffectDefinition, EffectEngine, EffectEvent, EffectId,
    EffectInstance, EffectKind, EffectLibrary, ExecuteError, InstanceHandle, ModifierConfig,
    RemovalCause, RemoveError, StackingPolicy,
};
