//! Instant effects and one-shot base value changes.

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::core::EntityId;
use crate::effects::context::EffectContext;
use crate::effects::definition::{
    ChainMode, ChainedEffect, EffectDefinition, InstantConfig, ModifierConfig, StackingPolicy,
};
use crate::effects::error::ApplyError;
use crate::effects::event::EffectEvent;
use crate::world::EffectWorld;

use super::{play_presentation, requirement_met, EffectEngine};

impl EffectEngine {
    /// Resolve an instant effect. Nothing is stored.
    pub(super) fn execute_instant(
        &mut self,
        world: &mut dyn EffectWorld,
        definition: &Arc<EffectDefinition>,
        instant: &InstantConfig,
        mut context: EffectContext,
        target: EntityId,
    ) -> Result<(), ApplyError> {
        let mut magnitude = context.magnitude;

        if let Some(scaling) = &instant.scaling {
            let input = world
                .attributes(context.source)
                .filter(|attributes| attributes.has_attribute(&scaling.attribute))
                .map(|attributes| attributes.get_value(&scaling.attribute) * scaling.factor);
            let Some(input) = input else {
                debug!(
                    "'{}' needs {} on {}",
                    definition.name, scaling.attribute, context.source
                );
                return Err(ApplyError::precondition(format!(
                    "{} has no attribute {}",
                    context.source, scaling.attribute
                )));
            };
            magnitude *= scaling
                .curve
                .as_ref()
                .map_or(input, |curve| curve.evaluate(input));
        }

        if definition.stacking == StackingPolicy::Stack {
            magnitude *= f64::from(context.stack_count);
        }

        if let Some(critical) = instant.critical {
            if self.rng.roll(critical.chance) {
                magnitude *= critical.multiplier;
                context.add_tag(self.config.critical_tag.as_str());
                trace!("'{}' critical on {}", definition.name, target);
            }
        }

        for modifier in &definition.modifiers {
            self.apply_base_change(world, target, modifier, magnitude);
        }
        play_presentation(world, definition, target);

        self.fire_chain(world, instant, &context, target);
        Ok(())
    }

    fn fire_chain(
        &mut self,
        world: &mut dyn EffectWorld,
        instant: &InstantConfig,
        context: &EffectContext,
        target: EntityId,
    ) {
        if instant.chained.is_empty() {
            return;
        }
        let eligible: Vec<&ChainedEffect> = instant
            .chained
            .iter()
            .filter(|c| requirement_met(&*world, target, &c.requirement, &context.tags) == Some(true))
            .collect();

        let picked: Vec<&ChainedEffect> = match instant.chain_mode {
            ChainMode::All => eligible,
            ChainMode::WeightedOne => {
                let weights: Vec<f64> = eligible.iter().map(|c| c.weight).collect();
                self.rng
                    .choose_weighted(&weights)
                    .and_then(|index| eligible.get(index).copied())
                    .into_iter()
                    .collect()
            }
        };

        for chained in picked {
            if self.rng.roll(chained.chance) {
                self.apply_nested(world, &chained.effect, context.nested(target), target);
            }
        }
    }

    /// Change the target's base value once, outside the modifier stack.
    pub(super) fn apply_base_change(
        &mut self,
        world: &mut dyn EffectWorld,
        target: EntityId,
        modifier: &ModifierConfig,
        magnitude: f64,
    ) {
        let Some(attributes) = world.attributes_mut(target) else {
            warn!("{} has no attribute store; {} unchanged", target, modifier.attribute);
            return;
        };
        let old = attributes.get_value(&modifier.attribute);
        let base = attributes.base_value(&modifier.attribute);
        let value = modifier.operation.apply(base, modifier.scaled(magnitude));
        attributes.set_base_value(&modifier.attribute, value);
        let new = attributes.get_value(&modifier.attribute);

        self.emit(EffectEvent::AttributeChanged {
            target,
            attribute: modifier.attribute.clone(),
            old,
            new,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{EngineConfig, EntityId};
    use crate::effects::{
        ApplyError, AttributeScaling, ChainMode, ChainedEffect, Curve, EffectContext,
        EffectDefinition, EffectEngine, EffectId, EffectKind, InstantConfig, ModifierConfig,
        RemoveError, StackingPolicy,
    };
    use crate::tags::TagRequirement;
    use crate::world::{EntityRecord, SimpleWorld};

    const CASTER: EntityId = EntityId(1);
    const DUMMY: EntityId = EntityId(2);

    fn setup() -> (EffectEngine, SimpleWorld) {
        let mut world = SimpleWorld::new();
        world.spawn(CASTER, EntityRecord::new().with_attribute("SpellPower", 50.0));
        world.spawn(DUMMY, EntityRecord::new().with_attribute("Health", 1000.0));
        (EffectEngine::new(EngineConfig::default().with_seed(3)), world)
    }

    fn bolt(config: InstantConfig) -> EffectDefinition {
        EffectDefinition::new(EffectId::new(1), "Bolt", EffectKind::Instant(config))
            .with_modifier(ModifierConfig::add("Health", -10.0))
    }

    #[test]
    fn test_instant_stores_nothing() {
        let (mut engine, mut world) = setup();
        let bolt = bolt(InstantConfig::new()).shared();

        let result = engine.apply(&mut world, &bolt, EffectContext::new(CASTER), DUMMY);
        assert_eq!(result, Ok(None));
        assert_eq!(world.value(DUMMY, "Health"), 990.0);
        assert_eq!(engine.active_count(), 0);

        let err = engine.remove(&mut world, &bolt, DUMMY, None).unwrap_err();
        assert!(matches!(err, RemoveError::NotRemovable { .. }));
    }

    #[test]
    fn test_attribute_scaling() {
        let (mut engine, mut world) = setup();
        let linear = bolt(InstantConfig::new().with_scaling(AttributeScaling::new("SpellPower", 0.1))).shared();
        engine.apply(&mut world, &linear, EffectContext::new(CASTER), DUMMY).unwrap();
        assert_eq!(world.value(DUMMY, "Health"), 950.0);

        let curved = bolt(InstantConfig::new().with_scaling(
            AttributeScaling::new("SpellPower", 1.0).with_curve(Curve::linear(0.0, 1.0, 100.0, 3.0)),
        ))
        .shared();
        engine.apply(&mut world, &curved, EffectContext::new(CASTER), DUMMY).unwrap();
        assert_eq!(world.value(DUMMY, "Health"), 930.0);
    }

    #[test]
    fn test_missing_scaling_attribute() {
        let (mut engine, mut world) = setup();
        let scaled = bolt(InstantConfig::new().with_scaling(AttributeScaling::new("Strength", 1.0))).shared();

        let err = engine
            .apply(&mut world, &scaled, EffectContext::new(CASTER), DUMMY)
            .unwrap_err();
        assert!(matches!(err, ApplyError::PreconditionFailed { .. }));
        assert_eq!(world.value(DUMMY, "Health"), 1000.0);
    }

    #[test]
    fn test_stack_policy_multiplies() {
        let (mut engine, mut world) = setup();
        let volley = bolt(InstantConfig::new()).with_stacking(StackingPolicy::Stack).shared();
        engine
            .apply(&mut world, &volley, EffectContext::new(CASTER).with_stack_count(4), DUMMY)
            .unwrap();
        assert_eq!(world.value(DUMMY, "Health"), 960.0);
    }

    #[test]
    fn test_guaranteed_critical_triggers_gated_chain() {
        let (mut engine, mut world) = setup();
        let ignite = EffectDefinition::instant(EffectId::new(2), "Ignite")
            .with_modifier(ModifierConfig::add("Health", -1.0))
            .shared();
        let config = InstantConfig::new()
            .with_critical(1.0, 3.0)
            .chain(ChainedEffect::new(ignite).when(TagRequirement::has("Effect.Critical")));
        let crit_bolt = bolt(config).shared();

        engine.apply(&mut world, &crit_bolt, EffectContext::new(CASTER), DUMMY).unwrap();
        assert_eq!(world.value(DUMMY, "Health"), 969.0);
    }

    #[test]
    fn test_chain_gate_blocks_without_critical() {
        let (mut engine, mut world) = setup();
        let ignite = EffectDefinition::instant(EffectId::new(2), "Ignite")
            .with_modifier(ModifierConfig::add("Health", -1.0))
            .shared();
        let config = InstantConfig::new()
            .with_critical(0.0, 3.0)
            .chain(ChainedEffect::new(ignite).when(TagRequirement::has("Effect.Critical")));
        let plain_bolt = bolt(config).shared();

        engine.apply(&mut world, &plain_bolt, EffectContext::new(CASTER), DUMMY).unwrap();
        assert_eq!(world.value(DUMMY, "Health"), 990.0);
    }

    #[test]
    fn test_weighted_one_picks_single_entry() {
        let (mut engine, mut world) = setup();
        let small = EffectDefinition::instant(EffectId::new(2), "Small")
            .with_modifier(ModifierConfig::add("Health", -1.0))
            .shared();
        let large = EffectDefinition::instant(EffectId::new(3), "Large")
            .with_modifier(ModifierConfig::add("Health", -100.0))
            .shared();
        let config = InstantConfig::new()
            .chain(ChainedEffect::new(small).with_weight(1.0))
            .chain(ChainedEffect::new(large).with_weight(0.0))
            .with_chain_mode(ChainMode::WeightedOne);
        let roulette = bolt(config).shared();

        engine.apply(&mut world, &roulette, EffectContext::new(CASTER), DUMMY).unwrap();
        assert_eq!(world.value(DUMMY, "Health"), 989.0);
    }

    #[test]
    fn test_missing_attribute_store() {
        let (mut engine, mut world) = setup();
        world.spawn(EntityId(3), EntityRecord::new().without_attributes());
        let bolt = bolt(InstantConfig::new()).shared();

        let err = engine
            .apply(&mut world, &bolt, EffectContext::new(CASTER), EntityId(3))
            .unwrap_err();
        assert!(matches!(err, ApplyError::MissingCollaborator { .. }));
    }
}
