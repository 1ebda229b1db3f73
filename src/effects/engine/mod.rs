//! Effect engine: applies, stacks, ticks and removes effect instances.
//!
//! The engine owns a registry of live instances per target and drives all of
//! their time-based behavior from a single [`EffectEngine::tick`] call per
//! frame. It never owns entities; every store it touches is borrowed from the
//! [`EffectWorld`] passed to each call.
//!
//! ## Processing order
//!
//! Each frame visits the instances that existed when the frame started, in
//! ascending target id and then registration order. Instances created during
//! the frame (by tick effects, auras, expiration effects) are first advanced
//! on the next frame. An instance removed earlier in the frame is skipped.
//!
//! ## Removal
//!
//! Every removal path (explicit, forced, expiration, conditional, aura,
//! override) goes through one routine that cancels trackers, removes the
//! instance's modifiers by source, revokes granted tags, destroys the visual
//! and emits `Removed`. Removing something already gone is a no-op.

mod duration;
mod infinite;
mod instant;
mod periodic;
mod stacking;

use std::sync::Arc;

use glam::Vec3;
use log::{debug, trace, warn};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::attributes::ModifierId;
use crate::core::{EffectRng, EffectRngState, EngineConfig, EntityId, InstanceId};
use crate::tags::{RequirementContext, RequirementEvaluator, Tag, TagRequirement};
use crate::world::{EffectWorld, VisualHandle};

use super::context::EffectContext;
use super::definition::{EffectDefinition, EffectId, EffectKind};
use super::error::{ApplyError, Collaborator, ExecuteError, RemoveError};
use super::event::{EffectEvent, RemovalCause};
use super::instance::{EffectInstance, InstanceHandle};

/// Orchestrates effect instances for every target.
///
/// ## Example
///
/// ```
/// use gameplay_effects::core::{EngineConfig, EntityId};
/// use gameplay_effects::effects::{
///     EffectContext, EffectDefinition, EffectEngine, EffectId, ModifierConfig,
/// };
/// use gameplay_effects::world::{EntityRecord, SimpleWorld};
///
/// let mut world = SimpleWorld::new();
/// let hero = EntityId(1);
/// world.spawn(hero, EntityRecord::new().with_attribute("AttackPower", 20.0));
///
/// let mut engine = EffectEngine::new(EngineConfig::default());
/// let shout = EffectDefinition::duration(EffectId::new(1), "Battle Shout", 5.0)
///     .with_modifier(ModifierConfig::add("AttackPower", 10.0))
///     .shared();
///
/// engine.apply(&mut world, &shout, EffectContext::new(hero), hero).unwrap();
/// assert_eq!(world.value(hero, "AttackPower"), 30.0);
///
/// engine.tick(&mut world, 5.1);
/// assert_eq!(world.value(hero, "AttackPower"), 20.0);
/// assert_eq!(engine.active_count(), 0);
/// ```
pub struct EffectEngine {
    config: EngineConfig,
    rng: EffectRng,
    registry: FxHashMap<EntityId, Vec<EffectInstance>>,
    next_instance: InstanceId,
    now: f64,
    events: Vec<EffectEvent>,
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EffectEngine {
    /// Create an engine with no active effects.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            rng: EffectRng::new(config.seed),
            config,
            registry: FxHashMap::default(),
            next_instance: InstanceId::new(1),
            now: 0.0,
            events: Vec::new(),
        }
    }

    /// Engine tunables.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Capture the RNG position (for replays).
    #[must_use]
    pub fn rng_state(&self) -> EffectRngState {
        self.rng.state()
    }

    /// Restore a captured RNG position.
    pub fn restore_rng(&mut self, state: &EffectRngState) {
        self.rng = EffectRng::from_state(state);
    }

    /// Game time advanced through `tick`, in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of live instances across all targets.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.registry
            .values()
            .map(|list| list.iter().filter(|i| !i.expired).count())
            .sum()
    }

    /// Instances on `target`, in registration order.
    #[must_use]
    pub fn instances(&self, target: EntityId) -> &[EffectInstance] {
        self.registry.get(&target).map_or(&[], Vec::as_slice)
    }

    /// Look up an instance by handle. `None` once it is removed.
    #[must_use]
    pub fn instance(&self, handle: InstanceHandle) -> Option<&EffectInstance> {
        self.registry
            .get(&handle.target)?
            .iter()
            .find(|i| i.id == handle.instance)
    }

    /// Handle of the live instance of `effect` on `target`.
    #[must_use]
    pub fn find(&self, target: EntityId, effect: EffectId) -> Option<InstanceHandle> {
        self.registry
            .get(&target)?
            .iter()
            .find(|i| !i.expired && i.effect_id() == effect)
            .map(EffectInstance::handle)
    }

    /// Take every event buffered since the last drain.
    pub fn drain_events(&mut self) -> Vec<EffectEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply `definition` to `target`.
    ///
    /// Instant effects resolve immediately and return `Ok(None)`. Other
    /// effects either create a new instance or resolve against the live one
    /// through the definition's stacking policy.
    pub fn apply(
        &mut self,
        world: &mut dyn EffectWorld,
        definition: &Arc<EffectDefinition>,
        mut context: EffectContext,
        target: EntityId,
    ) -> Result<Option<InstanceHandle>, ApplyError> {
        context.target = Some(target);
        context.stack_count = context.stack_count.max(1);

        if let Err(err) = check_collaborators(&*world, definition, target) {
            warn!("Cannot apply '{}': {}", definition.name, err);
            return Err(err);
        }

        let met = requirement_met(&*world, target, &definition.required_tags, &context.tags);
        if met != Some(true) {
            debug!("{} does not meet the requirements of '{}'", target, definition.name);
            return Err(ApplyError::precondition(format!(
                "{} does not meet the tag requirement of '{}'",
                target, definition.name
            )));
        }

        match &definition.kind {
            EffectKind::Instant(instant) => {
                self.execute_instant(world, definition, instant, context, target)?;
                Ok(None)
            }
            _ => match self.find(target, definition.id) {
                Some(existing) => self.stack_into(world, definition, context, existing).map(Some),
                None => Ok(Some(self.create_instance(world, definition, context, target))),
            },
        }
    }

    /// Remove the live instance of `definition` from `target`.
    ///
    /// Succeeds without doing anything when the effect is not active.
    /// Infinite effects are dispels: they may be refused, and the dispel
    /// power is read from `context`.
    pub fn remove(
        &mut self,
        world: &mut dyn EffectWorld,
        definition: &EffectDefinition,
        target: EntityId,
        context: Option<&EffectContext>,
    ) -> Result<(), RemoveError> {
        if matches!(definition.kind, EffectKind::Instant(_)) {
            return Err(RemoveError::NotRemovable {
                name: definition.name.clone(),
            });
        }

        let Some(handle) = self.find(target, definition.id) else {
            trace!("'{}' is not active on {}; nothing to remove", definition.name, target);
            return Ok(());
        };

        let mut cause = RemovalCause::Removed;
        if let Some(instance) = self.instance(handle) {
            if let EffectKind::Infinite(infinite) = &instance.definition.kind {
                infinite::check_dispel(&instance.definition, infinite, context)?;
                cause = RemovalCause::Dispelled;
            }
            if !instance.modifiers.is_empty() && world.attributes(target).is_none() {
                return Err(RemoveError::MissingCollaborator {
                    entity: target,
                    collaborator: Collaborator::Attributes,
                });
            }
            if !instance.granted_tags.is_empty() && world.tags(target).is_none() {
                return Err(RemoveError::MissingCollaborator {
                    entity: target,
                    collaborator: Collaborator::Tags,
                });
            }
        }

        self.detach(world, handle, cause, true);
        Ok(())
    }

    /// Force-remove one instance, bypassing dispel rules.
    ///
    /// Returns `false` for a stale handle.
    pub fn remove_instance(&mut self, world: &mut dyn EffectWorld, handle: InstanceHandle) -> bool {
        self.detach(world, handle, RemovalCause::Removed, true)
    }

    /// Force-remove `effect` from every target. Returns how many were removed.
    pub fn clear_definition(&mut self, world: &mut dyn EffectWorld, effect: EffectId) -> usize {
        let handles: Vec<InstanceHandle> = self
            .snapshot()
            .into_iter()
            .filter(|h| self.instance(*h).is_some_and(|i| i.effect_id() == effect))
            .collect();
        let mut removed = 0;
        for handle in handles {
            if self.detach(world, handle, RemovalCause::Cleared, true) {
                removed += 1;
            }
        }
        removed
    }

    /// Force-remove every effect on `target`. Returns how many were removed.
    pub fn clear_target(&mut self, world: &mut dyn EffectWorld, target: EntityId) -> usize {
        let handles: Vec<InstanceHandle> =
            self.instances(target).iter().map(EffectInstance::handle).collect();
        let mut removed = 0;
        for handle in handles {
            if self.detach(world, handle, RemovalCause::Cleared, true) {
                removed += 1;
            }
        }
        removed
    }

    /// Shorten a finite instance by `amount` seconds (negative extends).
    ///
    /// The instance expires on the next tick if nothing is left. Returns
    /// `false` for stale handles and infinite instances.
    pub fn reduce_duration(&mut self, handle: InstanceHandle, amount: f64) -> bool {
        let Some(instance) = self.live_mut(handle) else {
            trace!("reduce_duration on stale handle {}", handle);
            return false;
        };
        if instance.is_infinite() {
            return false;
        }
        instance.remaining = (instance.remaining - amount).max(0.0);
        instance.total_duration = instance.total_duration.max(instance.remaining);
        true
    }

    /// Restart the countdown of a finite instance from its full duration.
    pub fn refresh_duration(&mut self, handle: InstanceHandle) -> bool {
        let Some(instance) = self.live_mut(handle) else {
            trace!("refresh_duration on stale handle {}", handle);
            return false;
        };
        if instance.is_infinite() {
            return false;
        }
        instance.remaining = instance.total_duration;
        if let Some(timer) = instance.trackers.duration.as_mut() {
            timer.reset();
        }
        true
    }

    /// Run one tick of an active periodic effect now, without rescheduling.
    pub fn execute_periodic(
        &mut self,
        world: &mut dyn EffectWorld,
        definition: &EffectDefinition,
        target: EntityId,
    ) -> Result<(), ExecuteError> {
        let Some(periodic) = definition.kind.periodic_config() else {
            return Err(ExecuteError::Unsupported {
                name: definition.name.clone(),
                kind: definition.kind.name(),
            });
        };
        let handle = self
            .find(target, definition.id)
            .ok_or_else(|| ExecuteError::NotActive {
                name: definition.name.clone(),
            })?;
        let progress = self.instance(handle).map_or(0.0, EffectInstance::progress);
        self.fire_tick(world, handle, periodic, progress);
        Ok(())
    }

    /// Advance every instance by `dt` seconds.
    pub fn tick(&mut self, world: &mut dyn EffectWorld, dt: f64) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        self.now += dt;

        for handle in self.snapshot() {
            let Some(definition) = self.live(handle).map(|i| Arc::clone(&i.definition)) else {
                continue;
            };
            match &definition.kind {
                EffectKind::Instant(_) => {}
                EffectKind::Duration(duration) => {
                    self.advance_timed(world, handle, duration, None, dt);
                }
                EffectKind::Periodic { duration, periodic } => {
                    self.advance_timed(world, handle, duration, Some(periodic), dt);
                }
                EffectKind::Infinite(infinite) => {
                    self.advance_infinite(world, handle, infinite, dt);
                }
            }
        }
    }

    // === Registry ===

    fn snapshot(&self) -> Vec<InstanceHandle> {
        let mut targets: Vec<EntityId> = self.registry.keys().copied().collect();
        targets.sort_unstable();
        targets
            .into_iter()
            .flat_map(|t| self.instances(t).iter().filter(|i| !i.expired).map(EffectInstance::handle))
            .collect()
    }

    fn live(&self, handle: InstanceHandle) -> Option<&EffectInstance> {
        self.instance(handle).filter(|i| !i.expired)
    }

    fn live_mut(&mut self, handle: InstanceHandle) -> Option<&mut EffectInstance> {
        self.registry
            .get_mut(&handle.target)?
            .iter_mut()
            .find(|i| i.id == handle.instance && !i.expired)
    }

    fn allocate_id(&mut self) -> InstanceId {
        let id = self.next_instance;
        self.next_instance = id.next();
        id
    }

    fn emit(&mut self, event: EffectEvent) {
        self.events.push(event);
    }

    // === Lifecycle ===

    fn create_instance(
        &mut self,
        world: &mut dyn EffectWorld,
        definition: &Arc<EffectDefinition>,
        context: EffectContext,
        target: EntityId,
    ) -> InstanceHandle {
        let id = self.allocate_id();
        let mut instance = EffectInstance::new(id, target, Arc::clone(definition), context);

        match &definition.kind {
            EffectKind::Instant(_) => {}
            EffectKind::Duration(duration) => self.start_countdown(&mut instance, duration),
            EffectKind::Periodic { duration, periodic } => {
                self.start_countdown(&mut instance, duration);
                self.start_schedule(&mut instance, periodic);
            }
            EffectKind::Infinite(infinite) => self.start_infinite(&mut instance, infinite),
        }

        if !definition.grant_tags.is_empty() {
            if let Some(tags) = world.tags_mut(target) {
                for tag in &definition.grant_tags {
                    tags.add_tag(tag);
                    instance.granted_tags.push(tag.clone());
                }
            }
        }
        instance.visual = play_presentation(world, definition, target);

        let handle = instance.handle();
        self.registry.entry(target).or_default().push(instance);
        self.attach_modifiers(world, handle);

        trace!("Applied '{}' as {}", definition.name, handle);
        self.emit(EffectEvent::Applied {
            target,
            instance: id,
            name: definition.name.clone(),
        });

        match &definition.kind {
            EffectKind::Periodic { periodic, .. } if periodic.execute_on_first_application => {
                self.run_first_tick(world, handle, periodic);
            }
            EffectKind::Infinite(infinite) if infinite.aura.is_some() => {
                self.scan_aura(world, handle);
            }
            _ => {}
        }
        handle
    }

    /// Add the definition's modifiers at the instance's effective magnitude.
    fn attach_modifiers(&mut self, world: &mut dyn EffectWorld, handle: InstanceHandle) {
        let Some(instance) = self.live(handle) else {
            return;
        };
        let definition = Arc::clone(&instance.definition);
        let magnitude = instance.effective_magnitude();
        if definition.modifiers.is_empty() {
            return;
        }
        let Some(attributes) = world.attributes_mut(handle.target) else {
            warn!("{} lost its attribute store; '{}' holds no modifiers", handle.target, definition.name);
            return;
        };

        let ids: SmallVec<[ModifierId; 4]> = definition
            .modifiers
            .iter()
            .map(|m| {
                attributes.add_modifier(
                    &m.attribute,
                    m.operation,
                    m.scaled(magnitude),
                    m.priority,
                    handle.instance,
                )
            })
            .collect();
        if let Some(instance) = self.live_mut(handle) {
            instance.modifiers = ids;
        }
    }

    /// Remove the instance's modifiers, then add them back at its current scale.
    fn reapply_modifiers(&mut self, world: &mut dyn EffectWorld, handle: InstanceHandle) {
        let Some(instance) = self.live_mut(handle) else {
            return;
        };
        if instance.definition.modifiers.is_empty() {
            return;
        }
        instance.modifiers.clear();
        if let Some(attributes) = world.attributes_mut(handle.target) {
            attributes.remove_all_modifiers_from_source(handle.instance);
        }
        self.attach_modifiers(world, handle);
    }

    /// The single removal path. Returns `false` if the instance was already gone.
    fn detach(
        &mut self,
        world: &mut dyn EffectWorld,
        handle: InstanceHandle,
        cause: RemovalCause,
        revoke_tags: bool,
    ) -> bool {
        let Some(list) = self.registry.get_mut(&handle.target) else {
            trace!("{} already removed", handle);
            return false;
        };
        let Some(index) = list.iter().position(|i| i.id == handle.instance) else {
            trace!("{} already removed", handle);
            return false;
        };

        // Cancel trackers before the instance leaves the registry
        list[index].expired = true;
        let aura = list[index].trackers.aura.take();
        list[index].trackers.clear();
        let instance = list.remove(index);
        if list.is_empty() {
            self.registry.remove(&handle.target);
        }

        match world.attributes_mut(handle.target) {
            Some(attributes) => {
                attributes.remove_all_modifiers_from_source(instance.id);
            }
            None if !instance.modifiers.is_empty() => {
                warn!("{} lost its attribute store before '{}' was removed", handle.target, instance.name());
            }
            None => {}
        }

        if revoke_tags && !instance.granted_tags.is_empty() {
            match world.tags_mut(handle.target) {
                Some(tags) => {
                    for tag in &instance.granted_tags {
                        tags.remove_tag(tag);
                    }
                }
                None => warn!("{} lost its tag store before '{}' was removed", handle.target, instance.name()),
            }
        }

        if let Some(visual) = instance.visual {
            if let Some(presentation) = world.presentation() {
                presentation.destroy_visual(visual);
            }
        }

        debug!("Removed '{}' from {} ({})", instance.name(), handle.target, cause);
        self.emit(EffectEvent::Removed {
            target: handle.target,
            instance: instance.id,
            name: instance.definition.name.clone(),
            cause,
        });

        if let Some(aura) = aura {
            if let Some(config) = instance.definition.kind.infinite_config().and_then(|i| i.aura.as_ref()) {
                for entity in aura.affected {
                    self.remove_aura_grant(world, entity, &config.granted, handle.target, RemovalCause::AuraEnded);
                }
            }
        }
        true
    }

    /// Apply an effect on behalf of a tracker or a parent effect.
    fn apply_nested(
        &mut self,
        world: &mut dyn EffectWorld,
        definition: &Arc<EffectDefinition>,
        context: EffectContext,
        target: EntityId,
    ) {
        if let Err(err) = self.apply(world, definition, context, target) {
            warn!("Nested effect '{}' on {} failed: {}", definition.name, target, err);
        }
    }
}

fn check_collaborators(
    world: &dyn EffectWorld,
    definition: &EffectDefinition,
    target: EntityId,
) -> Result<(), ApplyError> {
    if definition.needs_attributes() && world.attributes(target).is_none() {
        return Err(ApplyError::MissingCollaborator {
            entity: target,
            collaborator: Collaborator::Attributes,
        });
    }
    if definition.needs_tags() && world.tags(target).is_none() {
        return Err(ApplyError::MissingCollaborator {
            entity: target,
            collaborator: Collaborator::Tags,
        });
    }
    Ok(())
}

/// Evaluate `requirement` against `entity`'s tags plus `extra`.
///
/// `None` when the requirement needs tags and the entity has no tag store.
fn requirement_met(
    world: &dyn EffectWorld,
    entity: EntityId,
    requirement: &TagRequirement,
    extra: &[Tag],
) -> Option<bool> {
    if requirement.is_always() {
        return Some(true);
    }
    let tags = world.tags(entity)?;
    let lookup = |tag: &Tag| tags.has_tag(tag);
    let ctx = RequirementContext::new(&lookup).with_extra(extra);
    Some(RequirementEvaluator::evaluate(requirement, &ctx))
}

/// Play the definition's sound and spawn its visual at the target.
fn play_presentation(
    world: &mut dyn EffectWorld,
    definition: &EffectDefinition,
    target: EntityId,
) -> Option<VisualHandle> {
    if definition.visual.is_none() && definition.sound.is_none() {
        return None;
    }
    let position = world.position(target).unwrap_or(Vec3::ZERO);
    let presentation = world.presentation()?;
    if let Some(sound) = &definition.sound {
        presentation.play_sound(sound, position);
    }
    definition
        .visual
        .as_ref()
        .map(|visual| presentation.play_visual(visual, position))
}
