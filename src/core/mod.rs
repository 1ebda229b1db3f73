//! Core engine types: identifiers, RNG, configuration.
//!
//! This module contains the building blocks every other module shares.
//! Games configure the engine via `EngineConfig` rather than modifying it.

pub mod entity;
pub mod rng;
pub mod config;

pub use entity::{EntityId, InstanceId};
pub use rng::{EffectRng, EffectRngState};
pub use config::{EngineConfig, AURA_GRANTED_KEY, AURA_OWNER_KEY, DISPEL_POWER_KEY};
