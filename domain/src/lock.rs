//! Single-writer document lock over a submission.
//!
//! The lock is submission metadata, not an entity of its own; the persistence
//! layer mutates it atomically with the submission record via compare-and-swap.
//! All transitions here are pure: each method returns the next lock value and
//! never mutates in place, so the caller controls exactly when (and whether)
//! the new state is persisted.
//!
//! "Sent back for correction" is a distinct lock reason rather than an
//! overloaded boolean: while it is set, readers cannot acquire the edit lock,
//! and only the submitting author can clear it.

use crate::core::error::DomainError;
use crate::core::identity::{IdentityContext, Role};
use crate::core::ids::{ActorId, SubmissionId};
use serde::{Deserialize, Serialize};

/// Why a submission is locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum LockReason {
    /// A reader holds the edit lock during active review.
    ReaderReview,
    /// The lead reader holds the edit lock during active review.
    LeadReaderReview,
    /// Returned to the author for correction, with the reviewer's note.
    SentBackForCorrection { note: String },
}

impl LockReason {
    pub fn as_str(&self) -> &str {
        match self {
            LockReason::ReaderReview => "reader_review",
            LockReason::LeadReaderReview => "lead_reader_review",
            LockReason::SentBackForCorrection { .. } => "sent_back_for_correction",
        }
    }

    fn for_role(role: Role) -> Self {
        match role {
            Role::LeadReader => LockReason::LeadReaderReview,
            _ => LockReason::ReaderReview,
        }
    }
}

impl std::fmt::Display for LockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lock state of a submission document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum DocumentLock {
    #[default]
    Unlocked,
    Locked {
        holder: ActorId,
        role: Role,
        reason: LockReason,
    },
}

impl DocumentLock {
    pub fn is_locked(&self) -> bool {
        matches!(self, DocumentLock::Locked { .. })
    }

    pub fn holder(&self) -> Option<&ActorId> {
        match self {
            DocumentLock::Locked { holder, .. } => Some(holder),
            DocumentLock::Unlocked => None,
        }
    }

    pub fn is_sent_back(&self) -> bool {
        matches!(
            self,
            DocumentLock::Locked {
                reason: LockReason::SentBackForCorrection { .. },
                ..
            }
        )
    }

    fn require_reviewer(
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<(), DomainError> {
        if !identity.role.can_review() {
            return Err(DomainError::not_authorized(format!(
                "role {} cannot hold the review lock",
                identity.role
            )));
        }
        if !identity.is_assigned_to(submission_id) {
            return Err(DomainError::not_authorized(format!(
                "{} is not assigned to submission {}",
                identity.actor_id, submission_id
            )));
        }
        Ok(())
    }

    /// Acquire the edit lock for active review.
    ///
    /// Re-acquiring a lock you already hold is a no-op success. A lock held
    /// by anyone else fails with [`DomainError::AlreadyLocked`]; this
    /// includes the sent-back state, which reserves the document for the
    /// author's correction cycle.
    pub fn acquire(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<DocumentLock, DomainError> {
        Self::require_reviewer(identity, submission_id)?;

        match self {
            DocumentLock::Unlocked => Ok(DocumentLock::Locked {
                holder: identity.actor_id.clone(),
                role: identity.role,
                reason: LockReason::for_role(identity.role),
            }),
            DocumentLock::Locked { holder, .. } => {
                if holder == &identity.actor_id && !self.is_sent_back() {
                    Ok(self.clone())
                } else {
                    Err(DomainError::AlreadyLocked {
                        holder: holder.clone(),
                    })
                }
            }
        }
    }

    /// Release the edit lock.
    ///
    /// Succeeds for the original holder, or as an escalated release for a
    /// lead reader or admin (the escape hatch against a disconnected
    /// reviewer). The sent-back state is not an edit lock and must be cleared
    /// via [`DocumentLock::clear_sent_back`] instead.
    pub fn release(&self, identity: &IdentityContext) -> Result<DocumentLock, DomainError> {
        match self {
            DocumentLock::Unlocked => Ok(DocumentLock::Unlocked),
            DocumentLock::Locked { holder, .. } => {
                if self.is_sent_back() {
                    return Err(DomainError::invalid_transition(
                        "sent_back_for_correction",
                        "unlocked",
                    ));
                }
                if holder == &identity.actor_id || identity.role.can_force_release() {
                    Ok(DocumentLock::Unlocked)
                } else {
                    Err(DomainError::not_authorized(format!(
                        "{} did not lock this submission and cannot force-release it",
                        identity.actor_id
                    )))
                }
            }
        }
    }

    /// Return the submission to its author for correction.
    ///
    /// Implicitly releases any active edit lock; the resulting state keeps
    /// the submission out of review until the author clears it.
    pub fn send_back(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        note: impl Into<String>,
    ) -> Result<DocumentLock, DomainError> {
        Self::require_reviewer(identity, submission_id)?;

        if self.is_sent_back() {
            return Err(DomainError::invalid_transition(
                "sent_back_for_correction",
                "sent_back_for_correction",
            ));
        }

        Ok(DocumentLock::Locked {
            holder: identity.actor_id.clone(),
            role: identity.role,
            reason: LockReason::SentBackForCorrection { note: note.into() },
        })
    }

    /// Clear the sent-back state after correcting the submission.
    ///
    /// Only the submitting author may do this, and only while the current
    /// reason is sent-back.
    pub fn clear_sent_back(
        &self,
        identity: &IdentityContext,
        author: &ActorId,
    ) -> Result<DocumentLock, DomainError> {
        if !self.is_sent_back() {
            return Err(DomainError::invalid_transition(
                match self {
                    DocumentLock::Unlocked => "unlocked",
                    DocumentLock::Locked { .. } => "locked",
                },
                "unlocked",
            ));
        }
        if !identity.is(author) {
            return Err(DomainError::not_authorized(format!(
                "only the submitting author may clear a sent-back submission, not {}",
                identity.actor_id
            )));
        }
        Ok(DocumentLock::Unlocked)
    }
}
