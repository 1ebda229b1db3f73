//! End-to-end effect scenarios.
//!
//! These tests drive the engine through `SimpleWorld` the way a game would:
//! - Instant damage, timed buffs and permanent effects
//! - Removal rules (idempotence, dispels, instants)
//! - Tag grants and requirements
//! - Presentation and event output

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use gameplay_effects::attributes::AttributeId;
use gameplay_effects::core::{EngineConfig, EntityId, DISPEL_POWER_KEY};
use gameplay_effects::effects::{
    ApplyError, DurationConfig, EffectContext, EffectDefinition, EffectEngine, EffectEvent,
    EffectId, EffectKind, InfiniteConfig, InstantConfig, ModifierConfig, PeriodicConfig,
    RemovalCause, RemoveError,
};
use gameplay_effects::tags::{TagRequirement, TagStore};
use gameplay_effects::world::{EntityRecord, Presentation, SimpleWorld, VisualHandle};

const CASTER: EntityId = EntityId(1);
const TARGET: EntityId = EntityId(2);

fn arena() -> SimpleWorld {
    let mut world = SimpleWorld::new();
    world.spawn(CASTER, EntityRecord::new().with_attribute("Health", 100.0));
    world.spawn(
        TARGET,
        EntityRecord::new()
            .with_attribute("Health", 100.0)
            .with_attribute("AttackPower", 20.0),
    );
    world
}

fn removed_count(events: &[EffectEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, EffectEvent::Removed { .. }))
        .count()
}

/// Instant damage changes the base value and stores nothing.
#[test]
fn test_instant_damage_scenario() {
    let mut world = arena();
    let mut engine = EffectEngine::default();
    let smite = EffectDefinition::instant(EffectId::new(1), "Smite")
        .with_modifier(ModifierConfig::add("Health", -100.0))
        .shared();

    let result = engine.apply(&mut world, &smite, EffectContext::new(CASTER), TARGET);
    assert_eq!(result, Ok(None));
    assert_eq!(world.value(TARGET, "Health"), 0.0);
    assert!(engine.instances(TARGET).is_empty());

    let err = engine.remove(&mut world, &smite, TARGET, None).unwrap_err();
    assert_eq!(
        err,
        RemoveError::NotRemovable {
            name: "Smite".to_string()
        }
    );

    let events = engine.drain_events();
    assert_eq!(
        events,
        vec![EffectEvent::AttributeChanged {
            target: TARGET,
            attribute: AttributeId::new("Health"),
            old: 100.0,
            new: 0.0,
        }]
    );
}

/// A timed buff is gone after its duration with exactly one removal.
#[test]
fn test_duration_buff_scenario() {
    let mut world = arena();
    let mut engine = EffectEngine::default();
    let rally = EffectDefinition::duration(EffectId::new(1), "Rally", 5.0)
        .with_modifier(ModifierConfig::add("AttackPower", 10.0))
        .shared();

    let handle = engine
        .apply(&mut world, &rally, EffectContext::new(CASTER), TARGET)
        .unwrap()
        .expect("duration effects are stored");
    assert_eq!(world.value(TARGET, "AttackPower"), 30.0);

    engine.tick(&mut world, 5.1);

    assert_eq!(world.value(TARGET, "AttackPower"), 20.0);
    assert!(engine.instance(handle).is_none());
    let attributes = world.entity(TARGET).and_then(|r| r.attributes.as_ref()).unwrap();
    assert_eq!(attributes.modifier_count_from(handle.instance), 0);

    let events = engine.drain_events();
    assert_eq!(removed_count(&events), 1);
    assert!(events.contains(&EffectEvent::Removed {
        target: TARGET,
        instance: handle.instance,
        name: "Rally".to_string(),
        cause: RemovalCause::Expired,
    }));

    // Further ticks do nothing
    engine.tick(&mut world, 1.0);
    assert!(engine.drain_events().is_empty());
}

/// A non-dispellable infinite effect survives any dispel.
#[test]
fn test_undispellable_scenario() {
    let mut world = arena();
    let mut engine = EffectEngine::default();
    let curse = EffectDefinition::new(
        EffectId::new(1),
        "Eternal Curse",
        EffectKind::Infinite(InfiniteConfig::new().undispellable()),
    )
    .with_modifier(ModifierConfig::multiply("AttackPower", 0.5))
    .shared();

    engine
        .apply(&mut world, &curse, EffectContext::new(CASTER), TARGET)
        .unwrap();

    for power in [0.0, 1.0, 1_000_000.0] {
        let dispel = EffectContext::new(CASTER).with_data(DISPEL_POWER_KEY, power);
        let err = engine
            .remove(&mut world, &curse, TARGET, Some(&dispel))
            .unwrap_err();
        assert!(matches!(err, RemoveError::NotDispellable { .. }));
    }

    assert_eq!(engine.active_count(), 1);
    assert_eq!(world.value(TARGET, "AttackPower"), 10.0);

    // Forced removal still works
    let handle = engine.find(TARGET, curse.id).unwrap();
    assert!(engine.remove_instance(&mut world, handle));
    assert_eq!(world.value(TARGET, "AttackPower"), 20.0);
}

/// Removing twice removes once.
#[test]
fn test_idempotent_removal() {
    let mut world = arena();
    let mut engine = EffectEngine::default();
    let ward = EffectDefinition::duration(EffectId::new(1), "Ward", 30.0)
        .grant_tag("Buff.Ward")
        .shared();

    let handle = engine
        .apply(&mut world, &ward, EffectContext::new(CASTER), TARGET)
        .unwrap()
        .unwrap();

    assert_eq!(engine.remove(&mut world, &ward, TARGET, None), Ok(()));
    assert_eq!(engine.remove(&mut world, &ward, TARGET, None), Ok(()));
    assert!(!engine.remove_instance(&mut world, handle));

    assert_eq!(removed_count(&engine.drain_events()), 1);
    assert!(!world.has_tag(TARGET, "Buff.Ward"));
}

/// Tags granted by two effects stay until both are gone.
#[test]
fn test_tag_grants_balance() {
    let mut world = arena();
    let mut engine = EffectEngine::default();
    let slow = EffectDefinition::duration(EffectId::new(1), "Frost Slow", 2.0)
        .grant_tag("Status.Chilled")
        .shared();
    let nova = EffectDefinition::duration(EffectId::new(2), "Frost Nova", 4.0)
        .grant_tag("Status.Chilled")
        .shared();

    engine.apply(&mut world, &slow, EffectContext::new(CASTER), TARGET).unwrap();
    engine.apply(&mut world, &nova, EffectContext::new(CASTER), TARGET).unwrap();

    engine.tick(&mut world, 2.0);
    assert!(world.has_tag(TARGET, "Status.Chilled"));

    engine.tick(&mut world, 2.0);
    assert!(!world.has_tag(TARGET, "Status.Chilled"));
    assert_eq!(engine.active_count(), 0);
}

/// Required tags gate application; context tags count.
#[test]
fn test_required_tags() {
    let mut world = arena();
    let mut engine = EffectEngine::default();
    let execute = EffectDefinition::instant(EffectId::new(1), "Execute")
        .with_modifier(ModifierConfig::add("Health", -50.0))
        .require(TagRequirement::has("Status.Wounded"))
        .shared();

    let err = engine
        .apply(&mut world, &execute, EffectContext::new(CASTER), TARGET)
        .unwrap_err();
    assert!(matches!(err, ApplyError::PreconditionFailed { .. }));
    assert_eq!(world.value(TARGET, "Health"), 100.0);

    let ctx = EffectContext::new(CASTER).with_tag("Status.Wounded.Bleeding");
    engine.apply(&mut world, &execute, ctx, TARGET).unwrap();
    assert_eq!(world.value(TARGET, "Health"), 50.0);

    if let Some(tags) = world.entity_mut(TARGET).and_then(|r| r.tags.as_mut()) {
        tags.add_tag(&"Status.Wounded".into());
    }
    engine
        .apply(&mut world, &execute, EffectContext::new(CASTER), TARGET)
        .unwrap();
    assert_eq!(world.value(TARGET, "Health"), 0.0);
}

/// Targets without the stores an effect needs are rejected.
#[test]
fn test_missing_collaborators() {
    let mut world = arena();
    let ghost = EntityId(3);
    world.spawn(ghost, EntityRecord::new().without_tags());
    let mut engine = EffectEngine::default();

    let mark = EffectDefinition::duration(EffectId::new(1), "Mark", 5.0)
        .grant_tag("Status.Marked")
        .shared();
    let err = engine
        .apply(&mut world, &mark, EffectContext::new(CASTER), ghost)
        .unwrap_err();
    assert!(matches!(err, ApplyError::MissingCollaborator { entity, .. } if entity == ghost));
    assert_eq!(engine.active_count(), 0);

    // Nothing to touch, nothing needed
    let empty = EffectDefinition::duration(EffectId::new(2), "Empty", 5.0).shared();
    assert!(engine
        .apply(&mut world, &empty, EffectContext::new(CASTER), ghost)
        .unwrap()
        .is_some());
}

/// Period 1, duration 5, tick on application: six ticks.
#[test]
fn test_periodic_tick_count() {
    let mut world = arena();
    let mut engine = EffectEngine::default();
    let regen = EffectDefinition::new(
        EffectId::new(1),
        "Renew",
        EffectKind::Periodic {
            duration: DurationConfig::new(5.0),
            periodic: PeriodicConfig::new(1.0)
                .execute_on_first_application()
                .with_tick_modifier(ModifierConfig::add("Health", 5.0)),
        },
    )
    .shared();

    engine.apply(&mut world, &regen, EffectContext::new(CASTER), TARGET).unwrap();
    for _ in 0..60 {
        engine.tick(&mut world, 0.1);
    }

    let ticks = engine
        .drain_events()
        .iter()
        .filter(|e| matches!(e, EffectEvent::AttributeChanged { .. }))
        .count();
    assert_eq!(ticks, 6);
    assert_eq!(world.value(TARGET, "Health"), 130.0);
}

/// Effects created during a frame are first advanced on the next frame.
#[test]
fn test_mid_frame_instances_wait_a_frame() {
    let mut world = arena();
    let mut engine = EffectEngine::default();
    let scorch = EffectDefinition::duration(EffectId::new(2), "Scorched", 10.0).shared();
    let flames = EffectDefinition::new(
        EffectId::new(1),
        "Flames",
        EffectKind::Periodic {
            duration: DurationConfig::new(10.0),
            periodic: PeriodicConfig::new(1.0).with_tick_effect(scorch.clone()),
        },
    )
    .shared();

    engine.apply(&mut world, &flames, EffectContext::new(CASTER), TARGET).unwrap();
    engine.tick(&mut world, 1.0);

    let scorched = engine.find(TARGET, scorch.id).unwrap();
    assert_eq!(engine.instance(scorched).unwrap().elapsed, 0.0);

    engine.tick(&mut world, 0.5);
    assert_eq!(engine.instance(scorched).unwrap().elapsed, 0.5);
}

/// Bulk clearing by definition and by target.
#[test]
fn test_clear_definition_and_target() {
    let mut world = arena();
    let mut engine = EffectEngine::default();
    let haste = EffectDefinition::duration(EffectId::new(1), "Haste", 10.0).shared();
    let shield = EffectDefinition::infinite(EffectId::new(2), "Shield").shared();

    for entity in [CASTER, TARGET] {
        engine.apply(&mut world, &haste, EffectContext::new(CASTER), entity).unwrap();
        engine.apply(&mut world, &shield, EffectContext::new(CASTER), entity).unwrap();
    }
    assert_eq!(engine.active_count(), 4);

    assert_eq!(engine.clear_definition(&mut world, haste.id), 2);
    assert_eq!(engine.active_count(), 2);

    assert_eq!(engine.clear_target(&mut world, TARGET), 1);
    assert!(engine.instances(TARGET).is_empty());
    assert_eq!(engine.instances(CASTER).len(), 1);

    let cleared = engine
        .drain_events()
        .iter()
        .filter(|e| matches!(e, EffectEvent::Removed { cause: RemovalCause::Cleared, .. }))
        .count();
    assert_eq!(cleared, 3);
}

/// Same seed, same rolls.
#[test]
fn test_seeded_criticals_are_deterministic() {
    let bolt = EffectDefinition::new(
        EffectId::new(1),
        "Arcane Bolt",
        EffectKind::Instant(InstantConfig::new().with_critical(0.5, 2.0)),
    )
    .with_modifier(ModifierConfig::add("Health", -1.0))
    .shared();

    let run = |seed: u64| {
        let mut world = arena();
        let mut engine = EffectEngine::new(EngineConfig::default().with_seed(seed));
        for _ in 0..20 {
            engine.apply(&mut world, &bolt, EffectContext::new(CASTER), TARGET).unwrap();
        }
        world.value(TARGET, "Health")
    };

    assert_eq!(run(42), run(42));
    let health = run(42);
    assert!((60.0..=80.0).contains(&health));
}

#[derive(Debug, Clone, PartialEq)]
enum Cue {
    Visual(String, Vec3),
    Destroyed(VisualHandle),
    Sound(String),
}

struct Recorder {
    cues: Rc<RefCell<Vec<Cue>>>,
    next: u64,
}

impl Presentation for Recorder {
    fn play_visual(&mut self, effect_id: &str, position: Vec3) -> VisualHandle {
        self.cues.borrow_mut().push(Cue::Visual(effect_id.to_string(), position));
        self.next += 1;
        VisualHandle(self.next)
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.cues.borrow_mut().push(Cue::Destroyed(handle));
    }

    fn play_sound(&mut self, clip: &str, _position: Vec3) {
        self.cues.borrow_mut().push(Cue::Sound(clip.to_string()));
    }
}

/// Visuals follow the instance lifetime; sounds fire once.
#[test]
fn test_presentation_cues() {
    let cues = Rc::new(RefCell::new(Vec::new()));
    let recorder = Recorder {
        cues: Rc::clone(&cues),
        next: 0,
    };
    let mut world = arena().with_presentation(Box::new(recorder));
    world.set_position(TARGET, Vec3::new(1.0, 2.0, 3.0));

    let mut engine = EffectEngine::default();
    let burning = EffectDefinition::duration(EffectId::new(1), "Burning", 1.0)
        .with_visual("fx_fire")
        .with_sound("sfx_ignite")
        .shared();

    engine.apply(&mut world, &burning, EffectContext::new(CASTER), TARGET).unwrap();
    engine.tick(&mut world, 1.0);

    assert_eq!(
        *cues.borrow(),
        vec![
            Cue::Sound("sfx_ignite".to_string()),
            Cue::Visual("fx_fire".to_string(), Vec3::new(1.0, 2.0, 3.0)),
            Cue::Destroyed(VisualHandle(1)),
        ]
    );
}

/// Instant visuals are played and left to the renderer.
#[test]
fn test_instant_visual_is_fire_and_forget() {
    let cues = Rc::new(RefCell::new(Vec::new()));
    let recorder = Recorder {
        cues: Rc::clone(&cues),
        next: 0,
    };
    let mut world = arena().with_presentation(Box::new(recorder));
    let mut engine = EffectEngine::default();
    let spark = EffectDefinition::instant(EffectId::new(1), "Spark")
        .with_modifier(ModifierConfig::add("Health", -5.0))
        .with_visual("fx_spark")
        .shared();

    engine.apply(&mut world, &spark, EffectContext::new(CASTER), TARGET).unwrap();
    engine.tick(&mut world, 10.0);

    assert_eq!(*cues.borrow(), vec![Cue::Visual("fx_spark".to_string(), Vec3::ZERO)]);
    assert_eq!(world.value(TARGET, "Health"), 95.0);
}
