//! Repository ports
//!
//! Persistence is a collaborator: these traits define what the workflows
//! need, and adapters in the infrastructure layer decide how to provide it.
//! Every write either fully applies or fully fails; the lock update is an
//! explicit compare-and-swap so concurrent acquisitions cannot both succeed.

use accord_domain::{
    ActorId, ChangeRequest, ChangeRequestId, Compilation, DocumentLock, ReviewAssessment,
    Submission, SubmissionId,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by repository adapters.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

/// Store of submissions and their document locks.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn load(&self, id: &SubmissionId) -> Result<Submission, RepositoryError>;

    async fn save(&self, submission: &Submission) -> Result<(), RepositoryError>;

    /// Atomically replace the lock iff the stored lock still equals
    /// `expected`. Fails with [`RepositoryError::Conflict`] when another
    /// actor changed the lock in between; the caller reloads and decides.
    async fn update_lock(
        &self,
        id: &SubmissionId,
        expected: &DocumentLock,
        next: DocumentLock,
    ) -> Result<(), RepositoryError>;
}

/// Store of per-reviewer assessments, keyed by (submission, reviewer).
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    async fn load(
        &self,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
    ) -> Result<ReviewAssessment, RepositoryError>;

    async fn save(&self, assessment: &ReviewAssessment) -> Result<(), RepositoryError>;

    /// All current (non-superseded) assessments for a submission, ordered by
    /// reviewer id so downstream aggregation is deterministic.
    async fn list_for_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<ReviewAssessment>, RepositoryError>;
}

/// Store of compilations, one per submission.
#[async_trait]
pub trait CompilationRepository: Send + Sync {
    async fn load(&self, submission_id: &SubmissionId) -> Result<Compilation, RepositoryError>;

    async fn save(&self, compilation: &Compilation) -> Result<(), RepositoryError>;

    async fn exists(&self, submission_id: &SubmissionId) -> Result<bool, RepositoryError>;
}

/// Store of dual-approval change requests.
#[async_trait]
pub trait ChangeRequestRepository: Send + Sync {
    async fn load(&self, id: &ChangeRequestId) -> Result<ChangeRequest, RepositoryError>;

    async fn save(&self, request: &ChangeRequest) -> Result<(), RepositoryError>;

    async fn list_for_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<ChangeRequest>, RepositoryError>;
}
