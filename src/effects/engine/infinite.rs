//! Infinite effects: dispels, conditional removal, growth and auras.

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::core::{EntityId, AURA_GRANTED_KEY, AURA_OWNER_KEY, DISPEL_POWER_KEY};
use crate::effects::context::{ContextValue, EffectContext};
use crate::effects::definition::{
    ConditionalRemoval, DynamicGrowth, EffectDefinition, InfiniteConfig,
};
use crate::effects::error::RemoveError;
use crate::effects::event::RemovalCause;
use crate::effects::instance::{AuraTracker, EffectInstance, InstanceHandle, PollTimer};
use crate::world::EffectWorld;

use super::{requirement_met, EffectEngine};

/// Growth multiplier after `elapsed` seconds.
pub(super) fn growth_multiplier(growth: &DynamicGrowth, elapsed: f64) -> f64 {
    growth.curve.evaluate(elapsed).min(growth.max_multiplier)
}

/// Whether a dispel carrying `context` may remove this effect.
pub(super) fn check_dispel(
    definition: &EffectDefinition,
    infinite: &InfiniteConfig,
    context: Option<&EffectContext>,
) -> Result<(), RemoveError> {
    if !infinite.can_be_dispelled {
        debug!("'{}' cannot be dispelled", definition.name);
        return Err(RemoveError::NotDispellable {
            name: definition.name.clone(),
        });
    }
    if infinite.dispel_resistance > 0.0 {
        let power = context
            .and_then(|c| c.float(DISPEL_POWER_KEY))
            .unwrap_or(0.0);
        if power < infinite.dispel_resistance {
            debug!(
                "Dispel of '{}' resisted ({} < {})",
                definition.name, power, infinite.dispel_resistance
            );
            return Err(RemoveError::DispelResisted {
                power,
                resistance: infinite.dispel_resistance,
            });
        }
    }
    Ok(())
}

fn condition_met(world: &dyn EffectWorld, target: EntityId, conditional: &ConditionalRemoval) -> bool {
    let Some(tags) = world.tags(target) else {
        warn!("{} has no tag store; conditional removal skipped", target);
        return false;
    };
    conditional.watch_tags.iter().any(|tag| tags.has_tag(tag))
        || conditional
            .requirement
            .as_ref()
            .is_some_and(|requirement| tags.satisfies(requirement))
}

impl EffectEngine {
    pub(super) fn start_infinite(&self, instance: &mut EffectInstance, infinite: &InfiniteConfig) {
        instance.remaining = f64::INFINITY;
        instance.total_duration = f64::INFINITY;
        instance.trackers.conditional = infinite
            .conditional
            .as_ref()
            .map(|c| PollTimer::new(c.check_interval));
        if let Some(growth) = &infinite.growth {
            instance.trackers.growth = Some(PollTimer::new(growth.update_interval));
            instance.modifier_scale = growth_multiplier(growth, 0.0);
        }
        if infinite.aura.is_some() {
            instance.trackers.aura = Some(AuraTracker::new(self.config.aura_scan_interval));
        }
    }

    pub(super) fn advance_infinite(
        &mut self,
        world: &mut dyn EffectWorld,
        handle: InstanceHandle,
        infinite: &InfiniteConfig,
        dt: f64,
    ) {
        let epsilon = self.config.time_epsilon;
        let Some(instance) = self.live_mut(handle) else {
            return;
        };
        instance.elapsed += dt;
        let elapsed = instance.elapsed;
        let trackers = &mut instance.trackers;
        let check = trackers.conditional.as_mut().is_some_and(|t| t.advance(dt, epsilon));
        let grow = trackers.growth.as_mut().is_some_and(|t| t.advance(dt, epsilon));
        let scan = trackers.aura.as_mut().is_some_and(|a| a.scan.advance(dt, epsilon));

        if check {
            if let Some(conditional) = &infinite.conditional {
                if condition_met(&*world, handle.target, conditional) {
                    self.detach(world, handle, RemovalCause::ConditionMet, true);
                    return;
                }
            }
        }

        if grow {
            if let Some(growth) = &infinite.growth {
                let scale = growth_multiplier(growth, elapsed);
                let changed = match self.live_mut(handle) {
                    Some(instance) if (scale - instance.modifier_scale).abs() > epsilon => {
                        instance.modifier_scale = scale;
                        true
                    }
                    _ => false,
                };
                if changed {
                    self.reapply_modifiers(world, handle);
                }
            }
        }

        if scan {
            self.scan_aura(world, handle);
        }
    }

    /// Diff the entities in range against the previous scan.
    pub(super) fn scan_aura(&mut self, world: &mut dyn EffectWorld, handle: InstanceHandle) {
        let Some(instance) = self.live(handle) else {
            return;
        };
        let Some(aura) = instance
            .definition
            .kind
            .infinite_config()
            .and_then(|i| i.aura.clone())
        else {
            return;
        };
        let magnitude = instance.context.magnitude;
        let previous = instance
            .trackers
            .aura
            .as_ref()
            .map(|a| a.affected.clone())
            .unwrap_or_default();
        let owner = handle.target;

        let inside: Vec<EntityId> = match world.position(owner) {
            Some(center) => {
                let mut found: Vec<EntityId> = world
                    .entities_within(center, aura.radius)
                    .into_iter()
                    .filter(|e| aura.include_owner || *e != owner)
                    .filter(|e| requirement_met(&*world, *e, &aura.target_requirement, &[]) == Some(true))
                    .collect();
                found.sort_unstable();
                found.dedup();
                found
            }
            None => {
                trace!("Aura owner {} has no position", owner);
                Vec::new()
            }
        };

        for entity in &previous {
            if inside.binary_search(entity).is_err() {
                self.remove_aura_grant(world, *entity, &aura.granted, owner, RemovalCause::AuraLeft);
            }
        }

        let mut affected = Vec::with_capacity(inside.len());
        for entity in inside {
            if previous.binary_search(&entity).is_ok() {
                // Grants lost while in range (overridden, removed) come back
                if self.find(entity, aura.granted.id).is_some() {
                    affected.push(entity);
                    continue;
                }
                trace!("Re-granting '{}' to {}", aura.granted.name, entity);
            }
            let context = EffectContext::new(owner)
                .with_magnitude(magnitude)
                .with_data(AURA_GRANTED_KEY, true)
                .with_data(AURA_OWNER_KEY, owner);
            match self.apply(world, &aura.granted, context, entity) {
                Ok(_) => affected.push(entity),
                Err(err) => warn!("Aura '{}' could not grant to {}: {}", aura.granted.name, entity, err),
            }
        }

        match self.live_mut(handle).and_then(|i| i.trackers.aura.as_mut()) {
            Some(tracker) => tracker.affected = affected,
            None => {
                // The aura went away while granting
                for entity in affected {
                    self.remove_aura_grant(world, entity, &aura.granted, owner, RemovalCause::AuraEnded);
                }
            }
        }
    }

    /// Force-remove the effect `owner`'s aura granted to `entity`.
    pub(super) fn remove_aura_grant(
        &mut self,
        world: &mut dyn EffectWorld,
        entity: EntityId,
        granted: &Arc<EffectDefinition>,
        owner: EntityId,
        cause: RemovalCause,
    ) {
        let Some(handle) = self.find(entity, granted.id) else {
            return;
        };
        let from_owner = self
            .instance(handle)
            .and_then(|i| i.context.get(AURA_OWNER_KEY))
            .and_then(ContextValue::as_entity)
            == Some(owner);
        if from_owner {
            self.detach(world, handle, cause, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{EngineConfig, EntityId, DISPEL_POWER_KEY};
    use crate::effects::{
        ConditionalRemoval, Curve, EffectContext, EffectDefinition, EffectEngine, EffectEvent,
        EffectId, EffectKind, InfiniteConfig, ModifierConfig, RemovalCause, RemoveError,
    };
    use crate::tags::{TagRequirement, TagStore};
    use crate::world::{EntityRecord, SimpleWorld};

    const HERO: EntityId = EntityId(1);

    fn setup() -> (EffectEngine, SimpleWorld) {
        let mut world = SimpleWorld::new();
        world.spawn(HERO, EntityRecord::new().with_attribute("Strength", 10.0));
        (EffectEngine::new(EngineConfig::default()), world)
    }

    fn blessing(config: InfiniteConfig) -> EffectDefinition {
        EffectDefinition::new(EffectId::new(1), "Blessing", EffectKind::Infinite(config))
            .with_modifier(ModifierConfig::add("Strength", 5.0))
            .grant_tag("Buff.Blessed")
    }

    #[test]
    fn test_infinite_never_expires() {
        let (mut engine, mut world) = setup();
        let def = blessing(InfiniteConfig::new()).shared();
        let handle = engine
            .apply(&mut world, &def, EffectContext::new(HERO), HERO)
            .unwrap()
            .unwrap();

        engine.tick(&mut world, 10_000.0);
        assert!(engine.instance(handle).is_some_and(|i| i.remaining.is_infinite()));
        assert_eq!(world.value(HERO, "Strength"), 15.0);
    }

    #[test]
    fn test_dispel() {
        let (mut engine, mut world) = setup();
        let def = blessing(InfiniteConfig::new()).shared();
        engine.apply(&mut world, &def, EffectContext::new(HERO), HERO).unwrap();

        engine.remove(&mut world, &def, HERO, None).unwrap();
        assert_eq!(world.value(HERO, "Strength"), 10.0);
        assert!(!world.has_tag(HERO, "Buff.Blessed"));

        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            EffectEvent::Removed { cause: RemovalCause::Dispelled, .. }
        )));
    }

    #[test]
    fn test_dispel_resistance() {
        let (mut engine, mut world) = setup();
        let def = blessing(InfiniteConfig::new().with_dispel_resistance(2.0)).shared();
        engine.apply(&mut world, &def, EffectContext::new(HERO), HERO).unwrap();

        let weak = EffectContext::new(EntityId(5)).with_data(DISPEL_POWER_KEY, 1.0);
        let err = engine.remove(&mut world, &def, HERO, Some(&weak)).unwrap_err();
        assert_eq!(
            err,
            RemoveError::DispelResisted {
                power: 1.0,
                resistance: 2.0
            }
        );
        let err = engine.remove(&mut world, &def, HERO, None).unwrap_err();
        assert!(matches!(err, RemoveError::DispelResisted { power, .. } if power == 0.0));
        assert_eq!(engine.active_count(), 1);

        let strong = EffectContext::new(EntityId(5)).with_data(DISPEL_POWER_KEY, 2.0);
        engine.remove(&mut world, &def, HERO, Some(&strong)).unwrap();
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_conditional_removal() {
        let (mut engine, mut world) = setup();
        let conditional = ConditionalRemoval::new(0.5).watch("Status.Silenced");
        let def = blessing(InfiniteConfig::new().with_conditional_removal(conditional)).shared();
        engine.apply(&mut world, &def, EffectContext::new(HERO), HERO).unwrap();

        engine.tick(&mut world, 1.0);
        assert_eq!(engine.active_count(), 1);

        if let Some(tags) = world.entity_mut(HERO).and_then(|r| r.tags.as_mut()) {
            tags.add_tag(&"Status.Silenced".into());
        }
        engine.tick(&mut world, 0.25);
        assert_eq!(engine.active_count(), 1);
        engine.tick(&mut world, 0.25);
        assert_eq!(engine.active_count(), 0);

        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            EffectEvent::Removed { cause: RemovalCause::ConditionMet, .. }
        )));
    }

    #[test]
    fn test_conditional_requirement() {
        let (mut engine, mut world) = setup();
        let conditional = ConditionalRemoval::new(0.1).when(TagRequirement::lacks("Stance.Defensive"));
        let def = blessing(InfiniteConfig::new().with_conditional_removal(conditional)).shared();
        engine.apply(&mut world, &def, EffectContext::new(HERO), HERO).unwrap();

        engine.tick(&mut world, 0.1);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_dynamic_growth() {
        let (mut engine, mut world) = setup();
        let config = InfiniteConfig::new().with_growth(1.0, Curve::linear(0.0, 1.0, 10.0, 11.0), 3.0);
        let def = blessing(config).shared();
        engine.apply(&mut world, &def, EffectContext::new(HERO), HERO).unwrap();
        assert_eq!(world.value(HERO, "Strength"), 15.0);

        engine.tick(&mut world, 1.0);
        assert_eq!(world.value(HERO, "Strength"), 20.0);

        engine.tick(&mut world, 1.0);
        assert_eq!(world.value(HERO, "Strength"), 25.0);

        // Capped at the max multiplier
        engine.tick(&mut world, 5.0);
        assert_eq!(world.value(HERO, "Strength"), 25.0);
    }
}
