//! Tag requirements.
//!
//! Requirements gate effect application, nested effect chains, aura
//! targeting and conditional removal. They are evaluated against a tag
//! lookup plus any contextual tags of the current application.

use serde::{Deserialize, Serialize};

use super::tag::Tag;

/// A boolean expression over gameplay tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagRequirement {
    // === Tag Checks ===

    /// Tag (or a child of it) must be present.
    Has(Tag),

    /// Tag (and all its children) must be absent.
    Lacks(Tag),

    // === Combinators ===

    /// All requirements must hold.
    All(Vec<TagRequirement>),

    /// At least one requirement must hold.
    Any(Vec<TagRequirement>),

    /// Requirement must not hold.
    Not(Box<TagRequirement>),

    // === Special ===

    /// Always satisfied (no gate).
    #[default]
    Always,

    /// Never satisfied.
    Never,
}

impl TagRequirement {
    /// Require a tag.
    pub fn has(tag: impl Into<Tag>) -> Self {
        Self::Has(tag.into())
    }

    /// Require the absence of a tag.
    pub fn lacks(tag: impl Into<Tag>) -> Self {
        Self::Lacks(tag.into())
    }

    /// Require every tag in the list.
    pub fn has_all<T: Into<Tag>>(tags: impl IntoIterator<Item = T>) -> Self {
        Self::All(tags.into_iter().map(|t| Self::Has(t.into())).collect())
    }

    /// Require at least one tag in the list.
    pub fn has_any<T: Into<Tag>>(tags: impl IntoIterator<Item = T>) -> Self {
        Self::Any(tags.into_iter().map(|t| Self::Has(t.into())).collect())
    }

    /// Create an AND requirement.
    pub fn all(requirements: impl IntoIterator<Item = TagRequirement>) -> Self {
        Self::All(requirements.into_iter().collect())
    }

    /// Create an OR requirement.
    pub fn any(requirements: impl IntoIterator<Item = TagRequirement>) -> Self {
        Self::Any(requirements.into_iter().collect())
    }

    /// Negate this requirement.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another requirement with AND.
    pub fn and(self, other: TagRequirement) -> Self {
        match self {
            Self::Always => other,
            Self::All(mut requirements) => {
                requirements.push(other);
                Self::All(requirements)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another requirement with OR.
    pub fn or(self, other: TagRequirement) -> Self {
        match self {
            Self::Any(mut requirements) => {
                requirements.push(other);
                Self::Any(requirements)
            }
            _ => Self::Any(vec![self, other]),
        }
    }

    /// Whether this requirement can never fail.
    #[must_use]
    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }
}

/// Context for evaluating tag requirements.
pub struct RequirementContext<'a> {
    /// Tag lookup on the entity being checked.
    pub lookup: &'a dyn Fn(&Tag) -> bool,
    /// Contextual tags valid for this check only.
    pub extra: &'a [Tag],
}

impl<'a> RequirementContext<'a> {
    /// Create a new context.
    pub fn new(lookup: &'a dyn Fn(&Tag) -> bool) -> Self {
        Self { lookup, extra: &[] }
    }

    /// Add contextual tags.
    pub fn with_extra(mut self, extra: &'a [Tag]) -> Self {
        self.extra = extra;
        self
    }

    fn has(&self, tag: &Tag) -> bool {
        (self.lookup)(tag) || self.extra.iter().any(|t| t.matches(tag))
    }
}

/// Evaluator for tag requirements.
pub struct RequirementEvaluator;

impl RequirementEvaluator {
    /// Check if a requirement is satisfied.
    pub fn evaluate(requirement: &TagRequirement, ctx: &RequirementContext) -> bool {
        match requirement {
            TagRequirement::Has(tag) => ctx.has(tag),

            TagRequirement::Lacks(tag) => !ctx.has(tag),

            TagRequirement::All(requirements) => {
                requirements.iter().all(|r| Self::evaluate(r, ctx))
            }

            TagRequirement::Any(requirements) => {
                requirements.iter().any(|r| Self::evaluate(r, ctx))
            }

            TagRequirement::Not(inner) => !Self::evaluate(inner, ctx),

            TagRequirement::Always => true,

            TagRequirement::Never => false,
        }
    }
}
