//! Reapplication of an effect that is already active on the target.

use std::sync::Arc;

use log::debug;

use crate::effects::context::EffectContext;
use crate::effects::definition::{EffectDefinition, StackingPolicy};
use crate::effects::error::ApplyError;
use crate::effects::event::{EffectEvent, RemovalCause};
use crate::effects::instance::{InstanceHandle, PollTimer};
use crate::world::EffectWorld;

use super::infinite::growth_multiplier;
use super::EffectEngine;

impl EffectEngine {
    /// Resolve a new application against the live instance `existing`.
    pub(super) fn stack_into(
        &mut self,
        world: &mut dyn EffectWorld,
        definition: &Arc<EffectDefinition>,
        context: EffectContext,
        existing: InstanceHandle,
    ) -> Result<InstanceHandle, ApplyError> {
        match definition.stacking {
            StackingPolicy::Override => {
                self.detach(world, existing, RemovalCause::Overridden, true);
                Ok(self.create_instance(world, definition, context, existing.target))
            }
            StackingPolicy::Stack => Ok(self.add_stacks(world, existing, context.stack_count)),
            policy @ (StackingPolicy::AggregateBySource | StackingPolicy::AggregateByTarget) => {
                debug!("'{}' uses unsupported stacking policy {}", definition.name, policy);
                Err(ApplyError::NotImplemented(policy))
            }
        }
    }

    fn add_stacks(
        &mut self,
        world: &mut dyn EffectWorld,
        handle: InstanceHandle,
        added: u32,
    ) -> InstanceHandle {
        let poll_interval = self.config.duration_poll_interval;
        let Some(instance) = self.live_mut(handle) else {
            return handle;
        };
        instance.stack_count = instance.stack_count.saturating_add(added);
        let stack_count = instance.stack_count;
        let magnitude = instance.context.magnitude;
        let elapsed = instance.elapsed;
        let definition = Arc::clone(&instance.definition);

        if let Some(duration) = definition.kind.duration_config() {
            if duration.refresh_on_stack {
                let total = self.final_duration(duration, magnitude, stack_count);
                if let Some(instance) = self.live_mut(handle) {
                    instance.total_duration = total;
                    instance.remaining = total;
                    instance.trackers.duration = Some(PollTimer::new(poll_interval));
                    if let Some(curve) = &duration.magnitude_curve {
                        instance.modifier_scale = curve.evaluate(0.0);
                    }
                }
            }
        }

        if let Some(periodic) = definition.kind.periodic_config() {
            if periodic.reset_on_stack {
                self.restart_schedule(handle, periodic);
            }
        }

        let growth = definition.kind.infinite_config().and_then(|i| i.growth.as_ref());
        if let Some(growth) = growth {
            if let Some(instance) = self.live_mut(handle) {
                instance.modifier_scale = growth_multiplier(growth, elapsed);
            }
        }

        self.reapply_modifiers(world, handle);

        debug!("'{}' on {} now has {} stacks", definition.name, handle.target, stack_count);
        self.emit(EffectEvent::Stacked {
            target: handle.target,
            instance: handle.instance,
            name: definition.name.clone(),
            stack_count,
        });
        handle
    }
}
