//! Effect definitions.
//!
//! An `EffectDefinition` is an immutable template. The engine never mutates
//! it; runtime state lives on `EffectInstance`. Definitions are shared as
//! `Arc<EffectDefinition>` and identified by `EffectId`, so the same
//! definition can be live on any number of targets at once.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeId, ModifierOp};
use crate::tags::{Tag, TagRequirement};

use super::curve::Curve;

/// Unique identifier for an effect definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u32);

impl EffectId {
    /// Create a new effect ID.
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

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// One attribute adjustment of an effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModifierConfig {
    /// Attribute to modify.
    pub attribute: AttributeId,
    /// How the value combines.
    pub operation: ModifierOp,
    /// Unscaled value; the effect magnitude scales it on application.
    pub value: f64,
    /// Resolution priority inside the attribute store.
    pub priority: i32,
}

impl ModifierConfig {
    /// Create a modifier.
    pub fn new(attribute: impl Into<AttributeId>, operation: ModifierOp, value: f64) -> Self {
        Self {
            attribute: attribute.into(),
            operation,
            value,
            priority: 0,
        }
    }

    /// Additive modifier.
    pub fn add(attribute: impl Into<AttributeId>, value: f64) -> Self {
        Self::new(attribute, ModifierOp::Add, value)
    }

    /// Multiplicative modifier.
    pub fn multiply(attribute: impl Into<AttributeId>, value: f64) -> Self {
        Self::new(attribute, ModifierOp::Multiply, value)
    }

    /// Override modifier.
    pub fn override_with(attribute: impl Into<AttributeId>, value: f64) -> Self {
        Self::new(attribute, ModifierOp::Override, value)
    }

    /// Set priority (builder pattern).
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Value after magnitude scaling.
    #[must_use]
    pub fn scaled(&self, magnitude: f64) -> f64 {
        self.operation.scale(self.value, magnitude)
    }
}

/// How reapplying an active effect to the same target resolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackingPolicy {
    /// Remove the existing instance, then apply fresh.
    #[default]
    Override,
    /// Accumulate stacks into the existing instance.
    Stack,
    /// Merge per source. Semantics undefined; rejected on stacking.
    AggregateBySource,
    /// Merge per target. Semantics undefined; rejected on stacking.
    AggregateByTarget,
}

impl std::fmt::Display for StackingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StackingPolicy::Override => "Override",
            StackingPolicy::Stack => "Stack",
            StackingPolicy::AggregateBySource => "AggregateBySource",
            StackingPolicy::AggregateByTarget => "AggregateByTarget",
        };
        f.write_str(name)
    }
}

/// Lifetime class of an effect, derived from its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationPolicy {
    /// Applied once, nothing stored.
    Instant,
    /// Stored until its duration elapses.
    HasDuration,
    /// Stored until removed.
    Infinite,
}

// === Instant ===

/// Scale an instant effect by an attribute of its source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeScaling {
    /// Source attribute to read.
    pub attribute: AttributeId,
    /// Factor applied to the attribute value before the curve.
    pub factor: f64,
    /// Optional curve over `value * factor`.
    pub curve: Option<Curve>,
}

impl AttributeScaling {
    /// Scale linearly by `attribute * factor`.
    pub fn new(attribute: impl Into<AttributeId>, factor: f64) -> Self {
        Self {
            attribute: attribute.into(),
            factor,
            curve: None,
        }
    }

    /// Map the product through a curve (builder pattern).
    #[must_use]
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }
}

/// Critical hit roll.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CriticalConfig {
    /// Probability in `[0, 1]`.
    pub chance: f64,
    /// Magnitude multiplier on success.
    pub multiplier: f64,
}

/// A nested instant effect fired after an instant effect resolves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainedEffect {
    /// Effect to apply to the same target.
    pub effect: Arc<EffectDefinition>,
    /// Gate evaluated against the target's tags.
    pub requirement: TagRequirement,
    /// Probability gate in `[0, 1]`.
    pub chance: f64,
    /// Selection weight in `WeightedOne` mode.
    pub weight: f64,
}

impl ChainedEffect {
    /// Always fire `effect`.
    pub fn new(effect: Arc<EffectDefinition>) -> Self {
        Self {
            effect,
            requirement: TagRequirement::Always,
            chance: 1.0,
            weight: 1.0,
        }
    }

    /// Set the tag gate (builder pattern).
    #[must_use]
    pub fn when(mut self, requirement: TagRequirement) -> Self {
        self.requirement = requirement;
        self
    }

    /// Set the probability (builder pattern).
    #[must_use]
    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = chance;
        self
    }

    /// Set the weight (builder pattern).
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// How chained effects are selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainMode {
    /// Every eligible entry rolls independently.
    #[default]
    All,
    /// One eligible entry is picked by weight, then rolls its chance.
    WeightedOne,
}

/// Instant-only fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstantConfig {
    /// Source attribute scaling.
    pub scaling: Option<AttributeScaling>,
    /// Critical roll.
    pub critical: Option<CriticalConfig>,
    /// Nested effects.
    pub chained: Vec<ChainedEffect>,
    /// Selection mode for `chained`.
    pub chain_mode: ChainMode,
}

impl InstantConfig {
    /// Create an empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale by a source attribute (builder pattern).
    #[must_use]
    pub fn with_scaling(mut self, scaling: AttributeScaling) -> Self {
        self.scaling = Some(scaling);
        self
    }

    /// Enable critical hits (builder pattern).
    #[must_use]
    pub fn with_critical(mut self, chance: f64, multiplier: f64) -> Self {
        self.critical = Some(CriticalConfig { chance, multiplier });
        self
    }

    /// Add a chained effect (builder pattern).
    #[must_use]
    pub fn chain(mut self, chained: ChainedEffect) -> Self {
        self.chained.push(chained);
        self
    }

    /// Set the chain mode (builder pattern).
    #[must_use]
    pub fn with_chain_mode(mut self, mode: ChainMode) -> Self {
        self.chain_mode = mode;
        self
    }
}

// === Duration ===

/// Fields shared by duration and periodic effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationConfig {
    /// Base duration in seconds.
    pub duration: f64,
    /// Extra seconds per stack beyond the first.
    pub duration_per_stack: Option<f64>,
    /// Reset remaining duration when a stack is added.
    pub refresh_on_stack: bool,
    /// Modifier scale over progress `[0, 1]`.
    pub magnitude_curve: Option<Curve>,
    /// Instant effects fired on the target when the duration runs out.
    pub on_expiration: Vec<Arc<EffectDefinition>>,
    /// Revoke granted tags on natural expiration.
    pub remove_tags_on_expiration: bool,
}

impl DurationConfig {
    /// Create a config lasting `duration` seconds.
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            duration_per_stack: None,
            refresh_on_stack: false,
            magnitude_curve: None,
            on_expiration: Vec::new(),
            remove_tags_on_expiration: true,
        }
    }

    /// Add seconds per extra stack (builder pattern).
    #[must_use]
    pub fn with_duration_per_stack(mut self, seconds: f64) -> Self {
        self.duration_per_stack = Some(seconds);
        self
    }

    /// Refresh on stack (builder pattern).
    #[must_use]
    pub fn refresh_on_stack(mut self) -> Self {
        self.refresh_on_stack = true;
        self
    }

    /// Scale modifiers over progress (builder pattern).
    #[must_use]
    pub fn with_magnitude_curve(mut self, curve: Curve) -> Self {
        self.magnitude_curve = Some(curve);
        self
    }

    /// Fire an effect on expiration (builder pattern).
    #[must_use]
    pub fn on_expiration(mut self, effect: Arc<EffectDefinition>) -> Self {
        self.on_expiration.push(effect);
        self
    }

    /// Keep granted tags after natural expiration (builder pattern).
    #[must_use]
    pub fn keep_tags_on_expiration(mut self) -> Self {
        self.remove_tags_on_expiration = false;
        self
    }
}

// === Periodic ===

/// How per-tick instant effects are fired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickEffectMode {
    /// Fire every configured effect.
    #[default]
    All,
    /// Fire one effect chosen uniformly.
    RandomOne,
}

/// Period shrinkage per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Acceleration {
    /// Multiplier applied to the period after each tick.
    pub rate: f64,
    /// Period floor.
    pub min_period: f64,
}

/// Tick-specific fields of a periodic effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodicConfig {
    /// Seconds between ticks.
    pub period: f64,
    /// Tick budget. `None` ticks for the whole duration.
    pub max_ticks: Option<u32>,
    /// Tick once immediately on apply.
    pub execute_on_first_application: bool,
    /// Force a final tick at expiration when one is not already due.
    pub execute_on_last_tick: bool,
    /// Multiply tick magnitude by the stack count.
    pub scale_tick_with_stack: bool,
    /// One-shot base-value adjustments per tick.
    pub tick_modifiers: Vec<ModifierConfig>,
    /// Instant effects fired per tick.
    pub tick_effects: Vec<Arc<EffectDefinition>>,
    /// Selection mode for `tick_effects`.
    pub tick_effect_mode: TickEffectMode,
    /// Tick magnitude over progress `[0, 1]`.
    pub tick_curve: Option<Curve>,
    /// Uniform `+/-` jitter added to each period.
    pub jitter: f64,
    /// Period shrinkage.
    pub acceleration: Option<Acceleration>,
    /// Restart tick counter and schedule when a stack is added.
    pub reset_on_stack: bool,
}

impl PeriodicConfig {
    /// Tick every `period` seconds.
    #[must_use]
    pub fn new(period: f64) -> Self {
        Self {
            period,
            max_ticks: None,
            execute_on_first_application: false,
            execute_on_last_tick: false,
            scale_tick_with_stack: false,
            tick_modifiers: Vec::new(),
            tick_effects: Vec::new(),
            tick_effect_mode: TickEffectMode::All,
            tick_curve: None,
            jitter: 0.0,
            acceleration: None,
            reset_on_stack: false,
        }
    }

    /// Limit the number of ticks (builder pattern).
    #[must_use]
    pub fn with_max_ticks(mut self, max: u32) -> Self {
        self.max_ticks = Some(max);
        self
    }

    /// Tick on apply (builder pattern).
    #[must_use]
    pub fn execute_on_first_application(mut self) -> Self {
        self.execute_on_first_application = true;
        self
    }

    /// Force a tick at expiration (builder pattern).
    #[must_use]
    pub fn execute_on_last_tick(mut self) -> Self {
        self.execute_on_last_tick = true;
        self
    }

    /// Scale ticks by stacks (builder pattern).
    #[must_use]
    pub fn scale_with_stack(mut self) -> Self {
        self.scale_tick_with_stack = true;
        self
    }

    /// Add a tick modifier (builder pattern).
    #[must_use]
    pub fn with_tick_modifier(mut self, modifier: ModifierConfig) -> Self {
        self.tick_modifiers.push(modifier);
        self
    }

    /// Add a tick effect (builder pattern).
    #[must_use]
    pub fn with_tick_effect(mut self, effect: Arc<EffectDefinition>) -> Self {
        self.tick_effects.push(effect);
        self
    }

    /// Set the tick effect mode (builder pattern).
    #[must_use]
    pub fn with_tick_effect_mode(mut self, mode: TickEffectMode) -> Self {
        self.tick_effect_mode = mode;
        self
    }

    /// Scale ticks over progress (builder pattern).
    #[must_use]
    pub fn with_tick_curve(mut self, curve: Curve) -> Self {
        self.tick_curve = Some(curve);
        self
    }

    /// Add period jitter (builder pattern).
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Shrink the period each tick (builder pattern).
    #[must_use]
    pub fn accelerate(mut self, rate: f64, min_period: f64) -> Self {
        self.acceleration = Some(Acceleration { rate, min_period });
        self
    }

    /// Reset tick schedule on stack (builder pattern).
    #[must_use]
    pub fn reset_on_stack(mut self) -> Self {
        self.reset_on_stack = true;
        self
    }
}

// === Infinite ===

/// Automatic removal when the target's tags change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRemoval {
    /// Seconds between checks.
    pub check_interval: f64,
    /// Remove when satisfied.
    pub requirement: Option<TagRequirement>,
    /// Remove when the target holds any of these.
    pub watch_tags: Vec<Tag>,
}

impl ConditionalRemoval {
    /// Check every `check_interval` seconds.
    #[must_use]
    pub fn new(check_interval: f64) -> Self {
        Self {
            check_interval,
            requirement: None,
            watch_tags: Vec::new(),
        }
    }

    /// Remove when `requirement` holds (builder pattern).
    #[must_use]
    pub fn when(mut self, requirement: TagRequirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    /// Remove when `tag` appears (builder pattern).
    #[must_use]
    pub fn watch(mut self, tag: impl Into<Tag>) -> Self {
        self.watch_tags.push(tag.into());
        self
    }
}

/// Modifier growth over time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicGrowth {
    /// Seconds between reapplications.
    pub update_interval: f64,
    /// Multiplier keyed by seconds alive.
    pub curve: Curve,
    /// Multiplier cap.
    pub max_multiplier: f64,
}

/// Secondary effect propagated to entities near the owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuraConfig {
    /// Radius around the owner.
    pub radius: f32,
    /// Effect applied to entities inside the radius.
    pub granted: Arc<EffectDefinition>,
    /// Gate evaluated against candidate tags.
    pub target_requirement: TagRequirement,
    /// Whether the owner itself receives the granted effect.
    pub include_owner: bool,
}

impl AuraConfig {
    /// Grant `granted` within `radius`.
    pub fn new(radius: f32, granted: Arc<EffectDefinition>) -> Self {
        Self {
            radius,
            granted,
            target_requirement: TagRequirement::Always,
            include_owner: false,
        }
    }

    /// Gate candidates (builder pattern).
    #[must_use]
    pub fn affecting(mut self, requirement: TagRequirement) -> Self {
        self.target_requirement = requirement;
        self
    }

    /// Include the owner (builder pattern).
    #[must_use]
    pub fn include_owner(mut self) -> Self {
        self.include_owner = true;
        self
    }
}

/// Infinite-only fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfiniteConfig {
    /// Whether `remove` may dispel this effect.
    pub can_be_dispelled: bool,
    /// Dispel power needed to remove it. 0 disables the check.
    pub dispel_resistance: f64,
    /// Conditional removal tracker.
    pub conditional: Option<ConditionalRemoval>,
    /// Dynamic growth tracker.
    pub growth: Option<DynamicGrowth>,
    /// Aura tracker.
    pub aura: Option<AuraConfig>,
}

impl Default for InfiniteConfig {
    fn default() -> Self {
        Self {
            can_be_dispelled: true,
            dispel_resistance: 0.0,
            conditional: None,
            growth: None,
            aura: None,
        }
    }
}

impl InfiniteConfig {
    /// Create a dispellable config with no trackers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid dispels (builder pattern).
    #[must_use]
    pub fn undispellable(mut self) -> Self {
        self.can_be_dispelled = false;
        self
    }

    /// Require dispel power (builder pattern).
    #[must_use]
    pub fn with_dispel_resistance(mut self, resistance: f64) -> Self {
        self.dispel_resistance = resistance;
        self
    }

    /// Remove conditionally (builder pattern).
    #[must_use]
    pub fn with_conditional_removal(mut self, conditional: ConditionalRemoval) -> Self {
        self.conditional = Some(conditional);
        self
    }

    /// Grow modifiers over time (builder pattern).
    #[must_use]
    pub fn with_growth(mut self, update_interval: f64, curve: Curve, max_multiplier: f64) -> Self {
        self.growth = Some(DynamicGrowth {
            update_interval,
            curve,
            max_multiplier,
        });
        self
    }

    /// Propagate an aura (builder pattern).
    #[must_use]
    pub fn with_aura(mut self, aura: AuraConfig) -> Self {
        self.aura = Some(aura);
        self
    }
}

/// Variant-specific configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// One-shot base value changes.
    Instant(InstantConfig),
    /// Persistent modifiers for a finite time.
    Duration(DurationConfig),
    /// A duration effect that also ticks.
    Periodic {
        duration: DurationConfig,
        periodic: PeriodicConfig,
    },
    /// Persistent modifiers until removed.
    Infinite(InfiniteConfig),
}

impl EffectKind {
    /// Short variant name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Instant(_) => "Instant",
            EffectKind::Duration(_) => "Duration",
            EffectKind::Periodic { .. } => "Periodic",
            EffectKind::Infinite(_) => "Infinite",
        }
    }

    /// Duration fields, for Duration and Periodic.
    #[must_use]
    pub fn duration_config(&self) -> Option<&DurationConfig> {
        match self {
            EffectKind::Duration(d) => Some(d),
            EffectKind::Periodic { duration, .. } => Some(duration),
            _ => None,
        }
    }

    /// Tick fields, for Periodic.
    #[must_use]
    pub fn periodic_config(&self) -> Option<&PeriodicConfig> {
        match self {
            EffectKind::Periodic { periodic, .. } => Some(periodic),
            _ => None,
        }
    }

    /// Infinite fields.
    #[must_use]
    pub fn infinite_config(&self) -> Option<&InfiniteConfig> {
        match self {
            EffectKind::Infinite(i) => Some(i),
            _ => None,
        }
    }
}

/// An immutable effect template.
///
/// ## Example
///
/// ```
/// use gameplay_effects::effects::{
///     DurationConfig, EffectDefinition, EffectId, EffectKind, ModifierConfig, StackingPolicy,
/// };
///
/// let battle_shout = EffectDefinition::new(
///     EffectId::new(1),
///     "Battle Shout",
///     EffectKind::Duration(DurationConfig::new(10.0).refresh_on_stack()),
/// )
/// .with_modifier(ModifierConfig::add("AttackPower", 10.0))
/// .with_stacking(StackingPolicy::Stack)
/// .grant_tag("Buff.Shout");
///
/// assert_eq!(battle_shout.kind.name(), "Duration");
/// assert_eq!(battle_shout.grant_tags.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectDefinition {
    /// Unique identifier.
    pub id: EffectId,
    /// Human-readable name (events, logs).
    pub name: String,
    /// Variant-specific configuration.
    pub kind: EffectKind,
    /// Attribute adjustments.
    pub modifiers: Vec<ModifierConfig>,
    /// Reapplication policy.
    pub stacking: StackingPolicy,
    /// Tags held by the target while active.
    pub grant_tags: Vec<Tag>,
    /// Gate evaluated on apply.
    pub required_tags: TagRequirement,
    /// Visual spawned at the target while active (or once, for instants).
    pub visual: Option<String>,
    /// Sound played on apply.
    pub sound: Option<String>,
}

impl EffectDefinition {
    /// Create a definition.
    pub fn new(id: EffectId, name: impl Into<String>, kind: EffectKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            modifiers: Vec::new(),
            stacking: StackingPolicy::default(),
            grant_tags: Vec::new(),
            required_tags: TagRequirement::Always,
            visual: None,
            sound: None,
        }
    }

    /// Instant definition with default instant fields.
    pub fn instant(id: EffectId, name: impl Into<String>) -> Self {
        Self::new(id, name, EffectKind::Instant(InstantConfig::new()))
    }

    /// Duration definition lasting `duration` seconds.
    pub fn duration(id: EffectId, name: impl Into<String>, duration: f64) -> Self {
        Self::new(id, name, EffectKind::Duration(DurationConfig::new(duration)))
    }

    /// Periodic definition lasting `duration` seconds, ticking every `period`.
    pub fn periodic(id: EffectId, name: impl Into<String>, duration: f64, period: f64) -> Self {
        Self::new(
            id,
            name,
            EffectKind::Periodic {
                duration: DurationConfig::new(duration),
                periodic: PeriodicConfig::new(period),
            },
        )
    }

    /// Infinite definition with default infinite fields.
    pub fn infinite(id: EffectId, name: impl Into<String>) -> Self {
        Self::new(id, name, EffectKind::Infinite(InfiniteConfig::new()))
    }

    /// Add a modifier (builder pattern).
    #[must_use]
    pub fn with_modifier(mut self, modifier: ModifierConfig) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Set the stacking policy (builder pattern).
    #[must_use]
    pub fn with_stacking(mut self, stacking: StackingPolicy) -> Self {
        self.stacking = stacking;
        self
    }

    /// Grant a tag while active (builder pattern).
    #[must_use]
    pub fn grant_tag(mut self, tag: impl Into<Tag>) -> Self {
        self.grant_tags.push(tag.into());
        self
    }

    /// Gate application (builder pattern).
    #[must_use]
    pub fn require(mut self, requirement: TagRequirement) -> Self {
        self.required_tags = requirement;
        self
    }

    /// Set the visual (builder pattern).
    #[must_use]
    pub fn with_visual(mut self, visual: impl Into<String>) -> Self {
        self.visual = Some(visual.into());
        self
    }

    /// Set the sound (builder pattern).
    #[must_use]
    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    /// Wrap in an `Arc` for sharing.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Lifetime class derived from the kind.
    #[must_use]
    pub fn duration_policy(&self) -> DurationPolicy {
        match self.kind {
            EffectKind::Instant(_) => DurationPolicy::Instant,
            EffectKind::Duration(_) | EffectKind::Periodic { .. } => DurationPolicy::HasDuration,
            EffectKind::Infinite(_) => DurationPolicy::Infinite,
        }
    }

    /// Whether applying this effect needs the target's attribute store.
    #[must_use]
    pub fn needs_attributes(&self) -> bool {
        !self.modifiers.is_empty()
            || self
                .kind
                .periodic_config()
                .is_some_and(|p| !p.tick_modifiers.is_empty())
    }

    /// Whether applying this effect needs the target's tag store.
    #[must_use]
    pub fn needs_tags(&self) -> bool {
        !self.grant_tags.is_empty() || !self.required_tags.is_always()
    }
}
