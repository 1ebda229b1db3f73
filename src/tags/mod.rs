//! Tag system for qualitative entity state.
//!
//! Tags are hierarchical names (`Status.Debuff.Poison`) attached to
//! entities. Effects grant tags while active and are gated by
//! [`TagRequirement`] expressions.
//!
//! ## Key Components
//!
//! - [`Tag`]: A hierarchical tag name
//! - [`TagStore`]: The per-entity tag storage the engine consumes
//! - [`TagContainer`]: Reference-counted in-memory `TagStore`
//! - [`TagRequirement`]: Boolean expression over tags
//!
//! ## Example Usage
//!
//! ```
//! use gameplay_effects::tags::{TagContainer, TagRequirement, TagStore};
//!
//! let mut tags = TagContainer::new().with_tag("Status.Debuff.Poison");
//!
//! let cleansable = TagRequirement::has("Status.Debuff")
//!     .and(TagRequirement::lacks("Status.Immune"));
//! assert!(tags.satisfies(&cleansable));
//!
//! tags.add_tag(&"Status.Immune".into());
//! assert!(!tags.satisfies(&cleansable));
//! ```

mod requirement;
mod tag;

pub use requirement::{RequirementContext, RequirementEvaluator, TagRequirement};
pub use tag::{Tag, TagContainer};

/// Per-entity tag storage consumed by the engine.
pub trait TagStore {
    /// Whether the entity holds `tag` or one of its children.
    fn has_tag(&self, tag: &Tag) -> bool;

    /// Grant one reference of `tag`.
    fn add_tag(&mut self, tag: &Tag);

    /// Revoke one reference of `tag`.
    fn remove_tag(&mut self, tag: &Tag);

    /// Whether the entity's tags satisfy `requirement`.
    fn satisfies(&self, requirement: &TagRequirement) -> bool {
        let lookup = |tag: &Tag| self.has_tag(tag);
        RequirementEvaluator::evaluate(requirement, &RequirementContext::new(&lookup))
    }
}
