//! Attribute identifiers and modifier operations.

use serde::{Deserialize, Serialize};

use crate::core::InstanceId;

/// Key for accessing an entity attribute ("Health", "AttackPower", ...).
///
/// The engine doesn't interpret attribute names - games define them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttributeId(pub String);

impl AttributeId {
    /// Create a new attribute key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the attribute name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AttributeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AttributeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a modifier combines with the value it is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierOp {
    /// `current + value`
    Add,
    /// `current * value`
    Multiply,
    /// `value`, ignoring `current`
    Override,
}

impl ModifierOp {
    /// Combine `value` with `current`.
    #[must_use]
    pub fn apply(self, current: f64, value: f64) -> f64 {
        match self {
            ModifierOp::Add => current + value,
            ModifierOp::Multiply => current * value,
            ModifierOp::Override => value,
        }
    }

    /// Scale a configured modifier value by an effect magnitude.
    ///
    /// Additive values scale linearly, multipliers scale their distance
    /// from 1.0, and overrides are never scaled.
    #[must_use]
    pub fn scale(self, value: f64, magnitude: f64) -> f64 {
        match self {
            ModifierOp::Add => value * magnitude,
            ModifierOp::Multiply => 1.0 + (value - 1.0) * magnitude,
            ModifierOp::Override => value,
        }
    }
}

/// Handle to one modifier inside an attribute store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModifierId(pub u64);

/// A modifier living on an attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// Store-assigned id.
    pub id: ModifierId,
    /// How the value combines.
    pub operation: ModifierOp,
    /// Already-scaled value.
    pub value: f64,
    /// Lower priorities resolve first; ties resolve in insertion order.
    pub priority: i32,
    /// The effect instance that owns this modifier.
    pub source: InstanceId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_id() {
        let a = AttributeId::new("Health");
        let b: AttributeId = "Health".into();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Health");
        assert_eq!(format!("{}", a), "Health");
    }

    #[test]
    fn test_apply() {
        assert_eq!(ModifierOp::Add.apply(10.0, 5.0), 15.0);
        assert_eq!(ModifierOp::Multiply.apply(10.0, 1.5), 15.0);
        assert_eq!(ModifierOp::Override.apply(10.0, 3.0), 3.0);
    }

    #[test]
    fn test_scale() {
        assert_eq!(ModifierOp::Add.scale(10.0, 2.0), 20.0);
        assert_eq!(ModifierOp::Multiply.scale(1.5, 2.0), 2.0);
        assert_eq!(ModifierOp::Multiply.scale(0.5, 1.0), 0.5);
        assert_eq!(ModifierOp::Override.scale(42.0, 3.0), 42.0);
    }
}
