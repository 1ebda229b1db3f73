//! Live effect instances and their trackers.
//!
//! An `EffectInstance` is the runtime record of one definition on one target.
//! The engine owns every instance; callers refer to them through
//! `InstanceHandle`s, which go stale once the instance is removed.
//!
//! Time-driven behavior lives in [`Trackers`], one optional state per tracker
//! kind. The engine advances every enabled tracker once per `tick`.
//! Cancelling an instance clears its trackers before it leaves the registry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::attributes::ModifierId;
use crate::core::{EntityId, InstanceId};
use crate::tags::Tag;
use crate::world::VisualHandle;

use super::context::EffectContext;
use super::definition::{EffectDefinition, EffectId};

/// Reference to one instance on one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceHandle {
    /// Entity holding the instance.
    pub target: EntityId,
    /// Instance id.
    pub instance: InstanceId,
}

impl std::fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.instance, self.target)
    }
}

/// Fires at most once per advance, every `interval` seconds of accumulated time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollTimer {
    interval: f64,
    accumulated: f64,
}

impl PollTimer {
    /// Create a timer. Non-positive intervals fire on every advance.
    #[must_use]
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            accumulated: 0.0,
        }
    }

    /// Interval in seconds.
    #[must_use]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Advance by `dt`. Returns `true` when the interval elapsed.
    pub fn advance(&mut self, dt: f64, epsilon: f64) -> bool {
        if self.interval <= 0.0 {
            return true;
        }
        self.accumulated += dt;
        if self.accumulated + epsilon < self.interval {
            return false;
        }
        // Long frames fire once, keeping only the phase
        self.accumulated = (self.accumulated - self.interval).max(0.0) % self.interval;
        true
    }

    /// Restart from zero.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

/// Tick scheduling of a periodic instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicTracker {
    /// Seconds until the next scheduled tick.
    pub until_next: f64,
}

/// Aura bookkeeping: scan timer and the entities currently granted.
#[derive(Clone, Debug, PartialEq)]
pub struct AuraTracker {
    /// Rescan timer.
    pub scan: PollTimer,
    /// Entities holding the granted effect, sorted.
    pub affected: Vec<EntityId>,
}

impl AuraTracker {
    /// A tracker with nothing affected yet.
    #[must_use]
    pub fn new(scan_interval: f64) -> Self {
        Self {
            scan: PollTimer::new(scan_interval),
            affected: Vec::new(),
        }
    }
}

/// Typed set of tracker states. `None` means disabled or cancelled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trackers {
    /// Duration countdown with its magnitude-curve poll.
    pub duration: Option<PollTimer>,
    /// Periodic ticks.
    pub periodic: Option<PeriodicTracker>,
    /// Conditional removal check.
    pub conditional: Option<PollTimer>,
    /// Dynamic growth update.
    pub growth: Option<PollTimer>,
    /// Aura scan.
    pub aura: Option<AuraTracker>,
}

impl Trackers {
    /// Cancel every tracker.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether no tracker is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.duration.is_none()
            && self.periodic.is_none()
            && self.conditional.is_none()
            && self.growth.is_none()
            && self.aura.is_none()
    }
}

/// Runtime record of one definition on one target.
#[derive(Clone, Debug)]
pub struct EffectInstance {
    /// Unique id; also the source of every modifier this instance adds.
    pub id: InstanceId,
    /// Entity holding the instance.
    pub target: EntityId,
    /// Shared template.
    pub definition: Arc<EffectDefinition>,
    /// Context of the first application.
    pub context: EffectContext,
    /// Accumulated stacks (>= 1).
    pub stack_count: u32,
    /// Seconds left. `f64::INFINITY` for infinite effects.
    pub remaining: f64,
    /// Duration the current countdown started from.
    pub total_duration: f64,
    /// Seconds alive.
    pub elapsed: f64,
    /// Periodic ticks executed since the last schedule restart.
    pub executions: u32,
    /// `elapsed` at the most recent tick.
    pub last_tick_at: Option<f64>,
    /// Current tick period before jitter.
    pub current_period: f64,
    /// Curve-driven factor applied on top of magnitude and stacks.
    pub modifier_scale: f64,
    /// Set once removal has begun.
    pub expired: bool,
    /// Modifiers currently held in the target's attribute store.
    pub modifiers: SmallVec<[ModifierId; 4]>,
    /// Tags granted to the target, revoked once on removal.
    pub granted_tags: SmallVec<[Tag; 2]>,
    /// Active visual, destroyed on removal.
    pub visual: Option<VisualHandle>,
    /// Tracker states.
    pub trackers: Trackers,
}

impl EffectInstance {
    /// A fresh instance with no modifiers, tags or trackers.
    pub fn new(
        id: InstanceId,
        target: EntityId,
        definition: Arc<EffectDefinition>,
        context: EffectContext,
    ) -> Self {
        let stack_count = context.stack_count.max(1);
        Self {
            id,
            target,
            definition,
            context,
            stack_count,
            remaining: f64::INFINITY,
            total_duration: f64::INFINITY,
            elapsed: 0.0,
            executions: 0,
            last_tick_at: None,
            current_period: 0.0,
            modifier_scale: 1.0,
            expired: false,
            modifiers: SmallVec::new(),
            granted_tags: SmallVec::new(),
            visual: None,
            trackers: Trackers::default(),
        }
    }

    /// Handle to this instance.
    #[must_use]
    pub fn handle(&self) -> InstanceHandle {
        InstanceHandle {
            target: self.target,
            instance: self.id,
        }
    }

    /// Definition id.
    #[must_use]
    pub fn effect_id(&self) -> EffectId {
        self.definition.id
    }

    /// Definition name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Whether the instance never expires on its own.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.total_duration.is_infinite()
    }

    /// Fraction of the current countdown consumed, in `[0, 1]`.
    ///
    /// Infinite instances report 0.
    #[must_use]
    pub fn progress(&self) -> f64 {
        progress_at(self.total_duration, self.remaining)
    }

    /// Magnitude persistent modifiers are scaled by.
    #[must_use]
    pub fn effective_magnitude(&self) -> f64 {
        self.context.magnitude * f64::from(self.stack_count) * self.modifier_scale
    }
}

/// Progress of a countdown from `total` with `remaining` left.
pub(crate) fn progress_at(total: f64, remaining: f64) -> f64 {
    if !total.is_finite() || total <= 0.0 {
        return 0.0;
    }
    (1.0 - remaining / total).clamp(0.0, 1.0)
}
