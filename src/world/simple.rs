//! In-memory world.

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::attributes::{AttributeSet, AttributeStore};
use crate::core::EntityId;
use crate::tags::{TagContainer, TagStore};

use super::{EffectWorld, Presentation};

/// Per-entity collaborators in a [`SimpleWorld`].
///
/// Each store is optional so tests can model entities that lack one.
#[derive(Clone, Debug, Default)]
pub struct EntityRecord {
    /// Attribute store.
    pub attributes: Option<AttributeSet>,
    /// Tag store.
    pub tags: Option<TagContainer>,
    /// Position for aura queries.
    pub position: Option<Vec3>,
}

impl EntityRecord {
    /// An entity with empty attribute and tag stores and no position.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attributes: Some(AttributeSet::new()),
            tags: Some(TagContainer::new()),
            position: None,
        }
    }

    /// Set a base attribute (builder pattern).
    #[must_use]
    pub fn with_attribute(mut self, name: &str, base: f64) -> Self {
        let attrs = self.attributes.take().unwrap_or_default();
        self.attributes = Some(attrs.with_attribute(name, base));
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        let tags = self.tags.take().unwrap_or_default();
        self.tags = Some(tags.with_tag(tag));
        self
    }

    /// Place the entity (builder pattern).
    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Drop the attribute store (builder pattern).
    #[must_use]
    pub fn without_attributes(mut self) -> Self {
        self.attributes = None;
        self
    }

    /// Drop the tag store (builder pattern).
    #[must_use]
    pub fn without_tags(mut self) -> Self {
        self.tags = None;
        self
    }
}

/// A flat map of entities, queried by linear scan.
///
/// ## Example
///
/// ```
/// use gameplay_effects::core::EntityId;
/// use gameplay_effects::world::{EffectWorld, EntityRecord, SimpleWorld};
/// use glam::Vec3;
///
/// let mut world = SimpleWorld::new();
/// world.spawn(EntityId(1), EntityRecord::new().at(Vec3::ZERO));
/// world.spawn(EntityId(2), EntityRecord::new().at(Vec3::new(3.0, 0.0, 0.0)));
///
/// assert_eq!(world.entities_within(Vec3::ZERO, 1.0), vec![EntityId(1)]);
/// assert_eq!(world.entities_within(Vec3::ZERO, 5.0).len(), 2);
/// ```
#[derive(Default)]
pub struct SimpleWorld {
    entities: FxHashMap<EntityId, EntityRecord>,
    presentation: Option<Box<dyn Presentation>>,
}

impl SimpleWorld {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a presentation sink (builder pattern).
    #[must_use]
    pub fn with_presentation(mut self, presentation: Box<dyn Presentation>) -> Self {
        self.presentation = Some(presentation);
        self
    }

    /// Insert or replace an entity.
    pub fn spawn(&mut self, id: EntityId, record: EntityRecord) {
        self.entities.insert(id, record);
    }

    /// Remove an entity entirely.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityRecord> {
        self.entities.remove(&id)
    }

    /// Borrow an entity record.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    /// Mutably borrow an entity record.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.entities.get_mut(&id)
    }

    /// Move an entity. Returns `false` if it doesn't exist.
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> bool {
        match self.entities.get_mut(&id) {
            Some(record) => {
                record.position = Some(position);
                true
            }
            None => false,
        }
    }

    /// Resolved attribute value, 0 when absent.
    #[must_use]
    pub fn value(&self, id: EntityId, attribute: &str) -> f64 {
        self.attributes(id)
            .map_or(0.0, |a| a.get_value(&attribute.into()))
    }

    /// Whether the entity holds the tag.
    #[must_use]
    pub fn has_tag(&self, id: EntityId, tag: &str) -> bool {
        self.tags(id).is_some_and(|t| t.has_tag(&tag.into()))
    }
}

impl EffectWorld for SimpleWorld {
    fn attributes(&self, entity: EntityId) -> Option<&dyn AttributeStore> {
        self.entities
            .get(&entity)
            .and_then(|r| r.attributes.as_ref())
            .map(|a| a as &dyn AttributeStore)
    }

    fn attributes_mut(&mut self, entity: EntityId) -> Option<&mut dyn AttributeStore> {
        self.entities
            .get_mut(&entity)
            .and_then(|r| r.attributes.as_mut())
            .map(|a| a as &mut dyn AttributeStore)
    }

    fn tags(&self, entity: EntityId) -> Option<&dyn TagStore> {
        self.entities
            .get(&entity)
            .and_then(|r| r.tags.as_ref())
            .map(|t| t as &dyn TagStore)
    }

    fn tags_mut(&mut self, entity: EntityId) -> Option<&mut dyn TagStore> {
        self.entities
            .get_mut(&entity)
            .and_then(|r| r.tags.as_mut())
            .map(|t| t as &mut dyn TagStore)
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.entities.get(&entity).and_then(|r| r.position)
    }

    fn entities_within(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        let mut found: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, r)| {
                r.position
                    .is_some_and(|p| p.distance_squared(center) <= radius_sq)
            })
            .map(|(id, _)| *id)
            .collect();
        found.sort_unstable();
        found
    }

    fn presentation(&mut self) -> Option<&mut dyn Presentation> {
        self.presentation
            .as_deref_mut()
            .map(|p| p as &mut dyn Presentation)
    }
}
