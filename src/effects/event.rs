//! Events produced by the engine.
//!
//! The engine buffers events as they happen; subscribers (UI, audio, combat
//! log) pull them with `EffectEngine::drain_events` once per frame.

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeId;
use crate::core::{EntityId, InstanceId};

/// Why an instance left its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Duration ran out.
    Expired,
    /// Removed on request, or forced by handle.
    Removed,
    /// Infinite effect removed by a successful dispel.
    Dispelled,
    /// Conditional-removal tracker fired.
    ConditionMet,
    /// Replaced by a new application under `Override`.
    Overridden,
    /// Aura-granted effect whose holder left the radius.
    AuraLeft,
    /// Aura-granted effect whose aura was removed.
    AuraEnded,
    /// Cleared in bulk (`clear_definition`, `clear_target`).
    Cleared,
}

impl std::fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RemovalCause::Expired => "expired",
            RemovalCause::Removed => "removed",
            RemovalCause::Dispelled => "dispelled",
            RemovalCause::ConditionMet => "condition met",
            RemovalCause::Overridden => "overridden",
            RemovalCause::AuraLeft => "aura left",
            RemovalCause::AuraEnded => "aura ended",
            RemovalCause::Cleared => "cleared",
        };
        f.write_str(name)
    }
}

/// Something observers may want to react to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectEvent {
    /// A new instance was stored.
    Applied {
        target: EntityId,
        instance: InstanceId,
        name: String,
    },

    /// An instance was deleted.
    Removed {
        target: EntityId,
        instance: InstanceId,
        name: String,
        cause: RemovalCause,
    },

    /// An application stacked into an existing instance.
    Stacked {
        target: EntityId,
        instance: InstanceId,
        name: String,
        stack_count: u32,
    },

    /// A base value changed through an instant modifier or a tick.
    AttributeChanged {
        target: EntityId,
        attribute: AttributeId,
        old: f64,
        new: f64,
    },
}

impl EffectEvent {
    /// Entity the event concerns.
    #[must_use]
    pub fn target(&self) -> EntityId {
        match self {
            EffectEvent::Applied { target, .. }
            | EffectEvent::Removed { target, .. }
            | EffectEvent::Stacked { target, .. }
            | EffectEvent::AttributeChanged { target, .. } => *target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_target() {
        let event = EffectEvent::Removed {
            target: EntityId(7),
            instance: InstanceId(1),
            name: "Burn".into(),
            cause: RemovalCause::Expired,
        };
        assert_eq!(event.target(), EntityId(7));
        assert_eq!(RemovalCause::ConditionMet.to_string(), "condition met");
    }

    #[test]
    fn test_event_serialization() {
        let event = EffectEvent::AttributeChanged {
            target: EntityId(1),
            attribute: AttributeId::new("Health"),
            old: 100.0,
            new: 90.0,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: EffectEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
