//! Attribute system: named numeric values per entity.
//!
//! Entities have attributes like "Health", "AttackPower", "MoveSpeed".
//! These are game-specific - the engine doesn't interpret them.
//!
//! ## Resolution
//!
//! An attribute has a base value plus a stack of modifiers. The resolved
//! value folds modifiers over the base in priority order:
//!
//! - `Add`: `current + value`
//! - `Multiply`: `current * value`
//! - `Override`: `value`
//!
//! Every modifier carries the `InstanceId` of the effect that added it, so an
//! effect removes all of its modifiers at once and never one at a time.
//!
//! The engine consumes the [`AttributeStore`] trait; [`AttributeSet`] is the
//! in-memory implementation shipped with the crate.

mod modifier;
mod set;

pub use modifier::{AttributeId, Modifier, ModifierId, ModifierOp};
pub use set::{AttributeEntry, AttributeSet};

use crate::core::InstanceId;

/// Per-entity attribute storage consumed by the engine.
///
/// `get_value` must reflect every active modifier; the engine never assumes
/// the resolved value equals the base value.
pub trait AttributeStore {
    /// Whether the attribute exists on this entity.
    fn has_attribute(&self, attribute: &AttributeId) -> bool;

    /// Resolved value including modifiers. Missing attributes read as 0.
    fn get_value(&self, attribute: &AttributeId) -> f64;

    /// Base value without modifiers. Missing attributes read as 0.
    fn base_value(&self, attribute: &AttributeId) -> f64;

    /// Set the base value, creating the attribute if needed.
    fn set_base_value(&mut self, attribute: &AttributeId, value: f64);

    /// Add a modifier owned by `source`.
    fn add_modifier(
        &mut self,
        attribute: &AttributeId,
        operation: ModifierOp,
        value: f64,
        priority: i32,
        source: InstanceId,
    ) -> ModifierId;

    /// Remove every modifier owned by `source`, returning how many were removed.
    fn remove_all_modifiers_from_source(&mut self, source: InstanceId) -> usize;
}
