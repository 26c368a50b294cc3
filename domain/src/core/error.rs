//! Domain error types.
//!
//! Every variant here is an expected, recoverable condition returned to the
//! caller as a typed result. Unexpected faults (persistence failures and the
//! like) are carried opaquely in [`DomainError::Internal`]; the outer layer
//! decides retry policy for those.

use super::ids::{ActorId, SpecItemKey};
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("submission is locked by {holder}")]
    AlreadyLocked { holder: ActorId },

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("review is incomplete: {0}")]
    IncompleteReview(IncompleteReview),

    #[error("compilation is incomplete: {0}")]
    IncompleteCompilation(IncompleteCompilation),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn not_authorized(reason: impl Into<String>) -> Self {
        DomainError::NotAuthorized(reason.into())
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        DomainError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Check if this error represents a lock conflict.
    pub fn is_already_locked(&self) -> bool {
        matches!(self, DomainError::AlreadyLocked { .. })
    }

    /// Check if this error blocks a submission on missing required fields.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            DomainError::IncompleteReview(_) | DomainError::IncompleteCompilation(_)
        )
    }
}

/// What is still missing from a review assessment before it can be submitted.
///
/// Carried inside [`DomainError::IncompleteReview`] so the caller can render
/// actionable guidance instead of a bare rejection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncompleteReview {
    /// Specification items still without a vote.
    pub unvoted_items: Vec<SpecItemKey>,
    /// Final-recommendation fields still empty.
    pub missing_fields: Vec<String>,
}

impl IncompleteReview {
    pub fn is_empty(&self) -> bool {
        self.unvoted_items.is_empty() && self.missing_fields.is_empty()
    }
}

impl std::fmt::Display for IncompleteReview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if !self.unvoted_items.is_empty() {
            let items: Vec<String> = self.unvoted_items.iter().map(|k| k.to_string()).collect();
            parts.push(format!("unvoted items: {}", items.join(", ")));
        }
        if !self.missing_fields.is_empty() {
            parts.push(format!("missing fields: {}", self.missing_fields.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// What is still missing from a compilation before it can be submitted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncompleteCompilation {
    /// Items with neither a consensus nor a final determination.
    pub undetermined_items: Vec<SpecItemKey>,
    /// Summary fields still empty.
    pub missing_fields: Vec<String>,
}

impl IncompleteCompilation {
    pub fn is_empty(&self) -> bool {
        self.undetermined_items.is_empty() && self.missing_fields.is_empty()
    }
}

impl std::fmt::Display for IncompleteCompilation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if !self.undetermined_items.is_empty() {
            let items: Vec<String> = self
                .undetermined_items
                .iter()
                .map(|k| k.to_string())
                .collect();
            parts.push(format!("undetermined items: {}", items.join(", ")));
        }
        if !self.missing_fields.is_empty() {
            parts.push(format!("missing fields: {}", self.missing_fields.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}
