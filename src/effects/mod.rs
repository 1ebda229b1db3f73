//! Gameplay effects: definitions, live instances and the engine that runs them.
//!
//! Effects are the building blocks of buffs, debuffs, damage and auras:
//! - `EffectDefinition`: Immutable template, one `EffectKind` variant each
//! - `EffectContext`: One application attempt (source, magnitude, data)
//! - `EffectInstance`: Runtime record of a definition on a target
//! - `EffectEngine`: Applies, stacks, ticks and removes instances
//!
//! ## Effect kinds
//!
//! | Kind | Stored | Ends |
//! |---|---|---|
//! | `Instant` | no | immediately |
//! | `Duration` | yes | when its countdown runs out |
//! | `Periodic` | yes | like `Duration`, ticking along the way |
//! | `Infinite` | yes | on dispel, condition or forced removal |
//!
//! Persistent modifiers live in the target's attribute store and are owned
//! by the instance that added them. Instant effects and periodic ticks
//! change base values directly instead.

mod context;
mod curve;
mod definition;
mod engine;
mod error;
mod event;
mod instance;
mod library;

pub use context::{ContextValue, EffectContext};
pub use curve::{Curve, CurveKey};
pub use definition::{
    Acceleration, AttributeScaling, AuraConfig, ChainMode, ChainedEffect, ConditionalRemoval,
    CriticalConfig, DurationConfig, DurationPolicy, DynamicGrowth, EffectDefinition, EffectId,
    EffectKind, InfiniteConfig, InstantConfig, ModifierConfig, PeriodicConfig, StackingPolicy,
    TickEffectMode,
};
pub use engine::EffectEngine;
pub use error::{ApplyError, Collaborator, ExecuteError, RemoveError};
pub use event::{EffectEvent, RemovalCause};
pub use instance::{AuraTracker, EffectInstance, InstanceHandle, PeriodicTracker, PollTimer, Trackers};
pub use library::{EffectLibrary, LibraryError};
