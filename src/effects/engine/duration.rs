//! Countdown shared by duration and periodic effects.

use crate::effects::definition::{DurationConfig, PeriodicConfig};
use crate::effects::event::RemovalCause;
use crate::effects::instance::{EffectInstance, InstanceHandle, PollTimer};
use crate::world::EffectWorld;

use super::EffectEngine;

impl EffectEngine {
    /// `(base + per_stack * (stacks - 1)) * magnitude`, floored at the minimum duration.
    pub(super) fn final_duration(&self, duration: &DurationConfig, magnitude: f64, stack_count: u32) -> f64 {
        let extra = duration
            .duration_per_stack
            .map_or(0.0, |per_stack| per_stack * f64::from(stack_count.saturating_sub(1)));
        ((duration.duration + extra) * magnitude).max(self.config.min_duration)
    }

    pub(super) fn start_countdown(&self, instance: &mut EffectInstance, duration: &DurationConfig) {
        let total = self.final_duration(duration, instance.context.magnitude, instance.stack_count);
        instance.total_duration = total;
        instance.remaining = total;
        instance.modifier_scale = duration
            .magnitude_curve
            .as_ref()
            .map_or(1.0, |curve| curve.evaluate(0.0));
        instance.trackers.duration = Some(PollTimer::new(self.config.duration_poll_interval));
    }

    /// Advance a finite instance: due ticks, countdown, curve poll, expiration.
    pub(super) fn advance_timed(
        &mut self,
        world: &mut dyn EffectWorld,
        handle: InstanceHandle,
        duration: &DurationConfig,
        periodic: Option<&PeriodicConfig>,
        dt: f64,
    ) {
        let epsilon = self.config.time_epsilon;
        let Some(remaining) = self.live(handle).map(|i| i.remaining) else {
            return;
        };

        // Ticks due this frame fire before the countdown moves
        if let Some(periodic) = periodic {
            self.run_due_ticks(world, handle, periodic, dt.min(remaining.max(0.0)));
        }

        let Some(instance) = self.live_mut(handle) else {
            return;
        };
        // Elapsed time stops at the end time so a last tick sees the true end
        instance.elapsed += dt.min(instance.remaining);
        instance.remaining = (instance.remaining - dt).max(0.0);

        let poll = instance
            .trackers
            .duration
            .as_mut()
            .is_some_and(|timer| timer.advance(dt, epsilon));
        let mut rescale = false;
        if let (true, Some(curve)) = (poll, &duration.magnitude_curve) {
            let scale = curve.evaluate(instance.progress());
            if (scale - instance.modifier_scale).abs() > epsilon {
                instance.modifier_scale = scale;
                rescale = true;
            }
        }
        let finished = instance.remaining <= epsilon;

        if finished {
            self.expire(world, handle, duration, periodic);
        } else if rescale {
            self.reapply_modifiers(world, handle);
        }
    }

    /// Natural end of a finite instance.
    fn expire(
        &mut self,
        world: &mut dyn EffectWorld,
        handle: InstanceHandle,
        duration: &DurationConfig,
        periodic: Option<&PeriodicConfig>,
    ) {
        if let Some(periodic) = periodic {
            self.run_last_tick(world, handle, periodic);
        }

        let Some(instance) = self.live_mut(handle) else {
            return;
        };
        instance.expired = true;
        instance.trackers.clear();
        let context = instance.context.nested(handle.target);

        for effect in &duration.on_expiration {
            self.apply_nested(world, effect, context.clone(), handle.target);
        }
        self.detach(
            world,
            handle,
            RemovalCause::Expired,
            duration.remove_tags_on_expiration,
        );
    }
}
