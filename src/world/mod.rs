//! The engine's view of the game world.
//!
//! The engine never owns entities. Games implement [`EffectWorld`] to give it
//! access to per-entity attribute and tag stores, positions for auras, and an
//! optional [`Presentation`] sink for visuals and sounds.
//!
//! [`SimpleWorld`] is a small in-memory implementation, enough for tests,
//! tools and headless simulations.

mod simple;

pub use simple::{EntityRecord, SimpleWorld};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::attributes::AttributeStore;
use crate::core::EntityId;
use crate::tags::TagStore;

/// Opaque handle to a spawned visual, owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// Fire-and-forget visual and audio feedback.
///
/// The engine stores the returned handle on the instance and destroys it
/// when the instance is removed. Visuals spawned by instant effects have no
/// instance; they are fire-and-forget and never destroyed by the engine.
pub trait Presentation {
    /// Spawn a visual effect at `position`.
    fn play_visual(&mut self, effect_id: &str, position: Vec3) -> VisualHandle;

    /// Destroy a visual previously returned by `play_visual`.
    fn destroy_visual(&mut self, handle: VisualHandle);

    /// Play a one-shot sound at `position`.
    fn play_sound(&mut self, clip: &str, position: Vec3);
}

/// Collaborators the engine needs from the host game.
pub trait EffectWorld {
    /// Attribute store of `entity`, if it has one.
    fn attributes(&self, entity: EntityId) -> Option<&dyn AttributeStore>;

    /// Mutable attribute store of `entity`, if it has one.
    fn attributes_mut(&mut self, entity: EntityId) -> Option<&mut dyn AttributeStore>;

    /// Tag store of `entity`, if it has one.
    fn tags(&self, entity: EntityId) -> Option<&dyn TagStore>;

    /// Mutable tag store of `entity`, if it has one.
    fn tags_mut(&mut self, entity: EntityId) -> Option<&mut dyn TagStore>;

    /// World position of `entity`, if it is spatial.
    fn position(&self, entity: EntityId) -> Option<Vec3>;

    /// All entities within `radius` of `center`, in any order.
    fn entities_within(&self, center: Vec3, radius: f32) -> Vec<EntityId>;

    /// Visual/audio sink. Headless worlds return `None`.
    fn presentation(&mut self) -> Option<&mut dyn Presentation> {
        None
    }
}
