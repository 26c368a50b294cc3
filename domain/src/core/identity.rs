//! Actor identity and role model.
//!
//! An [`IdentityContext`] is supplied by the calling layer for every operation
//! that needs authorization. The core never authenticates anyone; it only
//! checks roles and submission assignments.

use super::ids::{ActorId, SubmissionId};
use serde::{Deserialize, Serialize};

/// Role of an actor in the review process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Submitting author of the document under review.
    Author,
    /// Independent reviewer assigned to a submission.
    Reader,
    /// Lead reviewer who compiles the panel's assessments.
    LeadReader,
    /// Coordinator who administers the review cycle.
    Coordinator,
    /// Administrator with override privileges.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Author => "author",
            Role::Reader => "reader",
            Role::LeadReader => "lead_reader",
            Role::Coordinator => "coordinator",
            Role::Admin => "admin",
        }
    }

    /// Whether this role participates in reviewing (may hold the edit lock).
    pub fn can_review(&self) -> bool {
        matches!(self, Role::Reader | Role::LeadReader)
    }

    /// Whether this role may force-release a lock held by someone else.
    pub fn can_force_release(&self) -> bool {
        matches!(self, Role::LeadReader | Role::Admin)
    }

    /// Whether this role may compile assessments and set final determinations.
    pub fn can_compile(&self) -> bool {
        matches!(self, Role::LeadReader | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticated actor context for a single operation.
///
/// Assignment is carried here rather than looked up by the core: the calling
/// layer resolves which submissions the actor is assigned to and hands the
/// result in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityContext {
    pub actor_id: ActorId,
    pub role: Role,
    pub assigned_submission_ids: Vec<SubmissionId>,
}

impl IdentityContext {
    pub fn new(actor_id: impl Into<ActorId>, role: Role) -> Self {
        Self {
            actor_id: actor_id.into(),
            role,
            assigned_submission_ids: Vec::new(),
        }
    }

    /// Add an assigned submission (builder style).
    pub fn with_assignment(mut self, submission_id: impl Into<SubmissionId>) -> Self {
        self.assigned_submission_ids.push(submission_id.into());
        self
    }

    pub fn is_assigned_to(&self, submission_id: &SubmissionId) -> bool {
        self.assigned_submission_ids.contains(submission_id)
    }

    pub fn is(&self, actor_id: &ActorId) -> bool {
        &self.actor_id == actor_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::LeadReader.as_str(), "lead_reader");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_review_roles() {
        assert!(Role::Reader.can_review());
        assert!(Role::LeadReader.can_review());
        assert!(!Role::Author.can_review());
        assert!(!Role::Coordinator.can_review());
        assert!(!Role::Admin.can_review());
    }

    #[test]
    fn test_force_release_roles() {
        assert!(Role::LeadReader.can_force_release());
        assert!(Role::Admin.can_force_release());
        assert!(!Role::Reader.can_force_release());
    }

    #[test]
    fn test_assignment_check() {
        let identity = IdentityContext::new("reader-1", Role::Reader).with_assignment("sub-1");

        assert!(identity.is_assigned_to(&SubmissionId::new("sub-1")));
        assert!(!identity.is_assigned_to(&SubmissionId::new("sub-2")));
    }
}
