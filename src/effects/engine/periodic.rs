//! Tick scheduling for periodic effects.
//!
//! The schedule is relative: the tracker stores the time until the next tick,
//! so refreshing or extending the countdown never shifts pending ticks.

use crate::effects::definition::{PeriodicConfig, TickEffectMode};
use crate::effects::instance::{progress_at, EffectInstance, InstanceHandle, PeriodicTracker};
use crate::world::EffectWorld;

use super::EffectEngine;

/// Hard floor so a zero period cannot stall a frame.
const PERIOD_FLOOR: f64 = 1e-3;

fn tick_budget_spent(periodic: &PeriodicConfig, executions: u32) -> bool {
    periodic.max_ticks.is_some_and(|max| executions >= max)
}

fn accelerated(periodic: &PeriodicConfig, current: f64) -> f64 {
    match periodic.acceleration {
        Some(acceleration) => (current * acceleration.rate).max(acceleration.min_period),
        None => current,
    }
}

impl EffectEngine {
    /// Delay until the next tick for a base period, with jitter and floors.
    fn period_delay(&mut self, periodic: &PeriodicConfig, base: f64) -> f64 {
        let jitter = if periodic.jitter > 0.0 {
            self.rng.gen_spread(periodic.jitter)
        } else {
            0.0
        };
        (base + jitter).max(self.config.min_period).max(PERIOD_FLOOR)
    }

    pub(super) fn start_schedule(&mut self, instance: &mut EffectInstance, periodic: &PeriodicConfig) {
        instance.current_period = periodic.period;
        instance.executions = 0;
        instance.last_tick_at = None;
        let delay = self.period_delay(periodic, periodic.period);
        instance.trackers.periodic = Some(PeriodicTracker { until_next: delay });
    }

    /// Restart the tick counter and schedule of a live instance.
    pub(super) fn restart_schedule(&mut self, handle: InstanceHandle, periodic: &PeriodicConfig) {
        let delay = self.period_delay(periodic, periodic.period);
        if let Some(instance) = self.live_mut(handle) {
            instance.current_period = periodic.period;
            instance.executions = 0;
            instance.last_tick_at = None;
            instance.trackers.periodic = Some(PeriodicTracker { until_next: delay });
        }
    }

    /// Tick on application, counted against the tick budget.
    pub(super) fn run_first_tick(
        &mut self,
        world: &mut dyn EffectWorld,
        handle: InstanceHandle,
        periodic: &PeriodicConfig,
    ) {
        let Some(instance) = self.live_mut(handle) else {
            return;
        };
        if tick_budget_spent(periodic, instance.executions) {
            return;
        }
        instance.executions += 1;
        instance.last_tick_at = Some(instance.elapsed);
        self.fire_tick(world, handle, periodic, 0.0);
    }

    /// Fire every tick due within the next `budget` seconds, in time order.
    pub(super) fn run_due_ticks(
        &mut self,
        world: &mut dyn EffectWorld,
        handle: InstanceHandle,
        periodic: &PeriodicConfig,
        budget: f64,
    ) {
        let epsilon = self.config.time_epsilon;
        let mut consumed = 0.0;

        loop {
            let Some(instance) = self.live_mut(handle) else {
                return;
            };
            let Some(tracker) = instance.trackers.periodic.as_mut() else {
                return;
            };
            let left = budget - consumed;
            if tick_budget_spent(periodic, instance.executions) || tracker.until_next > left + epsilon {
                tracker.until_next -= left;
                return;
            }

            consumed += tracker.until_next.max(0.0);
            let at = instance.elapsed + consumed;
            let progress = progress_at(instance.total_duration, instance.remaining - consumed);
            let next_period = accelerated(periodic, instance.current_period);

            let delay = self.period_delay(periodic, next_period);
            let Some(instance) = self.live_mut(handle) else {
                return;
            };
            instance.executions += 1;
            instance.last_tick_at = Some(at);
            instance.current_period = next_period;
            if let Some(tracker) = instance.trackers.periodic.as_mut() {
                tracker.until_next = delay;
            }

            self.fire_tick(world, handle, periodic, progress);
        }
    }

    /// Forced tick at expiration when the last tick did not land on the end time.
    pub(super) fn run_last_tick(
        &mut self,
        world: &mut dyn EffectWorld,
        handle: InstanceHandle,
        periodic: &PeriodicConfig,
    ) {
        if !periodic.execute_on_last_tick {
            return;
        }
        let epsilon = self.config.time_epsilon;
        let Some(instance) = self.live_mut(handle) else {
            return;
        };
        let end = instance.elapsed;
        let already_ticked = instance.last_tick_at.is_some_and(|at| at >= end - epsilon);
        if already_ticked
            || instance.trackers.periodic.is_none()
            || tick_budget_spent(periodic, instance.executions)
        {
            return;
        }
        instance.executions += 1;
        instance.last_tick_at = Some(end);
        self.fire_tick(world, handle, periodic, 1.0);
    }

    /// Apply one tick's payload. Does not touch the schedule.
    pub(super) fn fire_tick(
        &mut self,
        world: &mut dyn EffectWorld,
        handle: InstanceHandle,
        periodic: &PeriodicConfig,
        progress: f64,
    ) {
        let Some(instance) = self.live(handle) else {
            return;
        };
        let mut magnitude = instance.context.magnitude;
        if periodic.scale_tick_with_stack {
            magnitude *= f64::from(instance.stack_count);
        }
        if let Some(curve) = &periodic.tick_curve {
            magnitude *= curve.evaluate(progress);
        }
        let context = instance.context.nested(handle.target).with_magnitude(magnitude);

        for modifier in &periodic.tick_modifiers {
            self.apply_base_change(world, handle.target, modifier, magnitude);
        }

        match periodic.tick_effect_mode {
            TickEffectMode::All => {
                for effect in &periodic.tick_effects {
                    self.apply_nested(world, effect, context.clone(), handle.target);
                }
            }
            TickEffectMode::RandomOne => {
                let picked = self
                    .rng
                    .gen_index(periodic.tick_effects.len())
                    .and_then(|index| periodic.tick_effects.get(index));
                if let Some(effect) = picked {
                    self.apply_nested(world, effect, context, handle.target);
                }
            }
        }
    }
}
