//! Reference attribute store.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::InstanceId;

use super::modifier::{AttributeId, Modifier, ModifierId, ModifierOp};
use super::AttributeStore;

/// One attribute: a base value plus its ordered modifier stack.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeEntry {
    /// Base value, mutated by instant effects and periodic ticks.
    pub base: f64,
    /// Modifiers sorted by `(priority, id)`.
    pub modifiers: SmallVec<[Modifier; 4]>,
}

impl AttributeEntry {
    /// Resolve base and modifiers into the current value.
    #[must_use]
    pub fn resolve(&self) -> f64 {
        self.modifiers
            .iter()
            .fold(self.base, |value, m| m.operation.apply(value, m.value))
    }
}

/// In-memory `AttributeStore`.
///
/// ## Example
///
/// ```
/// use gameplay_effects::attributes::{AttributeSet, AttributeStore, ModifierOp};
/// use gameplay_effects::core::InstanceId;
///
/// let mut attrs = AttributeSet::new().with_attribute("AttackPower", 10.0);
/// let power = "AttackPower".into();
///
/// attrs.add_modifier(&power, ModifierOp::Add, 5.0, 0, InstanceId(1));
/// attrs.add_modifier(&power, ModifierOp::Multiply, 2.0, 10, InstanceId(1));
/// assert_eq!(attrs.get_value(&power), 30.0);
///
/// assert_eq!(attrs.remove_all_modifiers_from_source(InstanceId(1)), 2);
/// assert_eq!(attrs.get_value(&power), 10.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    entries: FxHashMap<AttributeId, AttributeEntry>,
    next_modifier: u64,
}

impl AttributeSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute with a base value (builder pattern).
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<AttributeId>, base: f64) -> Self {
        self.set_base_value(&attribute.into(), base);
        self
    }

    /// Look up an attribute entry.
    #[must_use]
    pub fn entry(&self, attribute: &AttributeId) -> Option<&AttributeEntry> {
        self.entries.get(attribute)
    }

    /// Number of modifiers currently owned by `source` across all attributes.
    #[must_use]
    pub fn modifier_count_from(&self, source: InstanceId) -> usize {
        self.entries
            .values()
            .map(|e| e.modifiers.iter().filter(|m| m.source == source).count())
            .sum()
    }

    /// Total number of modifiers across all attributes.
    #[must_use]
    pub fn modifier_count(&self) -> usize {
        self.entries.values().map(|e| e.modifiers.len()).sum()
    }
}

impl AttributeStore for AttributeSet {
    fn has_attribute(&self, attribute: &AttributeId) -> bool {
        self.entries.contains_key(attribute)
    }

    fn get_value(&self, attribute: &AttributeId) -> f64 {
        self.entries.get(attribute).map_or(0.0, AttributeEntry::resolve)
    }

    fn base_value(&self, attribute: &AttributeId) -> f64 {
        self.entries.get(attribute).map_or(0.0, |e| e.base)
    }

    fn set_base_value(&mut self, attribute: &AttributeId, value: f64) {
        self.entries.entry(attribute.clone()).or_default().base = value;
    }

    fn add_modifier(
        &mut self,
        attribute: &AttributeId,
        operation: ModifierOp,
        value: f64,
        priority: i32,
        source: InstanceId,
    ) -> ModifierId {
        self.next_modifier += 1;
        let id = ModifierId(self.next_modifier);
        let entry = self.entries.entry(attribute.clone()).or_default();

        // Ids grow monotonically, so equal priorities keep insertion order
        let at = entry
            .modifiers
            .partition_point(|m| (m.priority, m.id) <= (priority, id));
        entry.modifiers.insert(
            at,
            Modifier {
                id,
                operation,
                value,
                priority,
                source,
            },
        );
        id
    }

    fn remove_all_modifiers_from_source(&mut self, source: InstanceId) -> usize {
        let mut removed = 0;
        for entry in self.entries.values_mut() {
            let before = entry.modifiers.len();
            entry.modifiers.retain(|m| m.source != source);
            removed += before - entry.modifiers.len();
        }
        removed
    }
}
