//! Error types for effect operations.
//!
//! Each engine entry point has its own error enum. Stale handles and repeated
//! removals are not errors: they succeed without doing anything.

use thiserror::Error;

use crate::core::EntityId;

use super::definition::StackingPolicy;

/// A per-entity store the engine needed but the world did not provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collaborator {
    /// `AttributeStore`.
    Attributes,
    /// `TagStore`.
    Tags,
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collaborator::Attributes => f.write_str("attribute store"),
            Collaborator::Tags => f.write_str("tag store"),
        }
    }
}

/// Errors returned by `EffectEngine::apply`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplyError {
    /// Required tags failed or a scaling input was missing.
    #[error("Precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    /// The definition's stacking policy has no defined semantics.
    #[error("Stacking policy {0} is not implemented")]
    NotImplemented(StackingPolicy),

    /// The target lacks a store this definition needs.
    #[error("{entity} has no {collaborator}")]
    MissingCollaborator {
        entity: EntityId,
        collaborator: Collaborator,
    },
}

impl ApplyError {
    pub(crate) fn precondition(reason: impl Into<String>) -> Self {
        ApplyError::PreconditionFailed {
            reason: reason.into(),
        }
    }
}

/// Errors returned by `EffectEngine::remove`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RemoveError {
    /// Instant effects store nothing to remove.
    #[error("Instant effect '{name}' cannot be removed")]
    NotRemovable { name: String },

    /// The infinite effect cannot be dispelled at all.
    #[error("Effect '{name}' cannot be dispelled")]
    NotDispellable { name: String },

    /// Dispel power was below the effect's resistance.
    #[error("Dispel resisted: power {power} below resistance {resistance}")]
    DispelResisted { power: f64, resistance: f64 },

    /// The target lacks a store the removal needs.
    #[error("{entity} has no {collaborator}")]
    MissingCollaborator {
        entity: EntityId,
        collaborator: Collaborator,
    },
}

/// Errors returned by `EffectEngine::execute_periodic`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecuteError {
    /// Only periodic effects tick on demand.
    #[error("{kind} effect '{name}' has no periodic execution")]
    Unsupported { name: String, kind: &'static str },

    /// The effect is not active on the target.
    #[error("Effect '{name}' is not active on the target")]
    NotActive { name: String },
}
