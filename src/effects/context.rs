//! Effect application context.
//!
//! An `EffectContext` describes one application attempt: who applies the
//! effect to whom, how strongly, and any out-of-band data the effect or its
//! trackers need (dispel power, aura provenance, ...).

use im::HashMap as ImHashMap;
use serde::{Deserialize, Serialize};

use crate::core::EntityId;
use crate::tags::Tag;

/// Value stored in the context data bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ContextValue {
    /// Floating point value (dispel power, scaling inputs).
    Float(f64),
    /// Integer value.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Text value.
    Text(String),
    /// Entity reference.
    Entity(EntityId),
}

impl ContextValue {
    /// Get as float. Integers widen.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ContextValue::Float(v) => Some(*v),
            ContextValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ContextValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ContextValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContextValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as entity if this is an Entity value.
    #[must_use]
    pub fn as_entity(&self) -> Option<EntityId> {
        match self {
            ContextValue::Entity(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        ContextValue::Float(v)
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        ContextValue::Int(v)
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        ContextValue::Bool(v)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        ContextValue::Text(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        ContextValue::Text(v)
    }
}

impl From<EntityId> for ContextValue {
    fn from(v: EntityId) -> Self {
        ContextValue::Entity(v)
    }
}

/// One application attempt.
///
/// Cloning is cheap: the data bag is a persistent map, so a nested effect
/// gets an independent copy that shares structure with its parent.
///
/// ```
/// use gameplay_effects::core::EntityId;
/// use gameplay_effects::effects::EffectContext;
///
/// let ctx = EffectContext::new(EntityId(1))
///     .with_magnitude(2.0)
///     .with_data("DispelPower", 0.8)
///     .with_tag("Damage.Fire");
///
/// let mut nested = ctx.clone();
/// nested.set_data("DispelPower", 0.1);
///
/// assert_eq!(ctx.float("DispelPower"), Some(0.8));
/// assert_eq!(nested.float("DispelPower"), Some(0.1));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectContext {
    /// Entity applying the effect.
    pub source: EntityId,

    /// Entity receiving the effect. Set by the engine on apply.
    pub target: Option<EntityId>,

    /// Multiplier on modifier values (and finite durations).
    pub magnitude: f64,

    /// Stacks contributed by this application (>= 1).
    pub stack_count: u32,

    /// Keyed out-of-band data.
    #[serde(default)]
    pub data: ImHashMap<String, ContextValue>,

    /// Tags valid for this application only.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl EffectContext {
    /// Create a context with magnitude 1 and a single stack.
    pub fn new(source: EntityId) -> Self {
        Self {
            source,
            target: None,
            magnitude: 1.0,
            stack_count: 1,
            data: ImHashMap::new(),
            tags: Vec::new(),
        }
    }

    /// Set the magnitude (builder pattern).
    #[must_use]
    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Set the stack count, clamped to at least 1 (builder pattern).
    #[must_use]
    pub fn with_stack_count(mut self, stack_count: u32) -> Self {
        self.stack_count = stack_count.max(1);
        self
    }

    /// Set a data entry (builder pattern).
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.set_data(key, value);
        self
    }

    /// Add a contextual tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<Tag>) -> Self {
        self.add_tag(tag);
        self
    }

    /// Set a data entry.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.data.insert(key.into(), value.into());
    }

    /// Get a data entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.data.get(key)
    }

    /// Get a data entry as float.
    #[must_use]
    pub fn float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ContextValue::as_float)
    }

    /// Get a data entry as bool, `false` when absent.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(ContextValue::as_bool).unwrap_or(false)
    }

    /// Add a contextual tag if not already present.
    pub fn add_tag(&mut self, tag: impl Into<Tag>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Check if the context carries a tag (or a child of it).
    #[must_use]
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.iter().any(|t| t.matches(tag))
    }

    /// Derive a context for a nested application on `target`.
    ///
    /// The data bag and tags are copied; the source is kept.
    #[must_use]
    pub fn nested(&self, target: EntityId) -> Self {
        let mut nested = self.clone();
        nested.target = Some(target);
        nested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = EffectContext::new(EntityId(3));
        assert_eq!(ctx.source, EntityId(3));
        assert_eq!(ctx.target, None);
        assert_eq!(ctx.magnitude, 1.0);
        assert_eq!(ctx.stack_count, 1);
        assert!(ctx.data.is_empty());
    }

    #[test]
    fn test_stack_count_floor() {
        let ctx = EffectContext::new(EntityId(1)).with_stack_count(0);
        assert_eq!(ctx.stack_count, 1);
    }

    #[test]
    fn test_context_values() {
        let ctx = EffectContext::new(EntityId(1))
            .with_data("power", 3i64)
            .with_data("aura", true)
            .with_data("owner", EntityId(9))
            .with_data("label", "burn");

        assert_eq!(ctx.float("power"), Some(3.0));
        assert_eq!(ctx.get("power").and_then(ContextValue::as_int), Some(3));
        assert!(ctx.flag("aura"));
        assert!(!ctx.flag("missing"));
        assert_eq!(ctx.get("owner").and_then(ContextValue::as_entity), Some(EntityId(9)));
        assert_eq!(ctx.get("label").and_then(ContextValue::as_text), Some("burn"));
    }

    #[test]
    fn test_tags_deduplicate() {
        let ctx = EffectContext::new(EntityId(1))
            .with_tag("Damage.Fire")
            .with_tag("Damage.Fire");
        assert_eq!(ctx.tags.len(), 1);
        assert!(ctx.has_tag(&Tag::new("Damage")));
    }

    #[test]
    fn test_nested_is_independent() {
        let parent = EffectContext::new(EntityId(1)).with_data("k", 1.0);
        let mut child = parent.nested(EntityId(2));
        child.set_data("k", 2.0);
        child.add_tag("Child");

        assert_eq!(child.target, Some(EntityId(2)));
        assert_eq!(parent.float("k"), Some(1.0));
        assert!(parent.tags.is_empty());
    }

    #[test]
    fn test_context_serialization() {
        let ctx = EffectContext::new(EntityId(1))
            .with_magnitude(1.5)
            .with_data("DispelPower", 0.5);
        let json = serde_json::to_string(&ctx).unwrap();
        let deserialized: EffectContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, deserialized);
    }
}
