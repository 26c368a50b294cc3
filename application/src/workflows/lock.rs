//! Lock workflow: serialized access to the submission document.
//!
//! Every transition is a load / pure-compute / compare-and-swap cycle. The
//! swap fails when another actor changed the lock in between; we reload and
//! re-decide, so two racing `acquire` calls resolve to exactly one holder and
//! one [`DomainError::AlreadyLocked`].

use super::repo_err;
use crate::ports::notifier::{EventType, Notifier, ReviewEvent};
use crate::ports::repository::SubmissionRepository;
use accord_domain::{DocumentLock, DomainError, IdentityContext, Submission, SubmissionId};
use std::sync::Arc;
use tracing::{info, warn};

/// Bounded retries for the lock compare-and-swap cycle.
const MAX_SWAP_ATTEMPTS: usize = 3;

/// Workflow for acquiring and releasing the submission document lock.
pub struct LockWorkflow {
    submissions: Arc<dyn SubmissionRepository>,
    notifier: Arc<dyn Notifier>,
}

impl LockWorkflow {
    pub fn new(submissions: Arc<dyn SubmissionRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            submissions,
            notifier,
        }
    }

    /// Run one lock transition under compare-and-swap, retrying on races.
    ///
    /// `transition` computes the next lock value from the freshly loaded
    /// submission; domain errors it raises (wrong role, already locked, ...)
    /// propagate immediately and nothing is written.
    async fn swap_lock<F>(
        &self,
        submission_id: &SubmissionId,
        transition: F,
    ) -> Result<(Submission, DocumentLock), DomainError>
    where
        F: Fn(&Submission) -> Result<DocumentLock, DomainError>,
    {
        for _ in 0..MAX_SWAP_ATTEMPTS {
            let submission = self
                .submissions
                .load(submission_id)
                .await
                .map_err(repo_err("submission", submission_id))?;

            let next = transition(&submission)?;
            if next == submission.lock {
                // No-op transition (e.g., re-acquire by the holder)
                return Ok((submission, next));
            }

            match self
                .submissions
                .update_lock(submission_id, &submission.lock, next.clone())
                .await
            {
                Ok(()) => return Ok((submission, next)),
                Err(e) if e.is_conflict() => {
                    warn!("Lock swap on {} raced, retrying", submission_id);
                    continue;
                }
                Err(e) => return Err(repo_err("submission", submission_id)(e)),
            }
        }

        Err(DomainError::Internal(format!(
            "lock contention on submission {}",
            submission_id
        )))
    }

    /// Acquire the edit lock for active review.
    pub async fn acquire(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<DocumentLock, DomainError> {
        let (_, lock) = self
            .swap_lock(submission_id, |submission| {
                submission.lock.acquire(identity, submission_id)
            })
            .await?;
        info!("{} holds the lock on {}", identity.actor_id, submission_id);
        Ok(lock)
    }

    /// Release the edit lock; lead readers and admins may force-release a
    /// lock they do not hold, and the prior holder is notified when they do.
    pub async fn release(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<(), DomainError> {
        let (submission, _) = self
            .swap_lock(submission_id, |submission| {
                submission.lock.release(identity)
            })
            .await?;

        if let Some(holder) = submission.lock.holder() {
            if holder != &identity.actor_id {
                info!(
                    "{} force-released the lock of {} on {}",
                    identity.actor_id, holder, submission_id
                );
                self.notifier.notify(ReviewEvent::new(
                    EventType::LockForceReleased,
                    vec![holder.clone()],
                    serde_json::json!({
                        "submission_id": submission_id.as_str(),
                        "released_by": identity.actor_id.as_str(),
                    }),
                ));
            }
        }
        Ok(())
    }

    /// Return the submission to its author for correction.
    pub async fn send_back(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        note: &str,
    ) -> Result<(), DomainError> {
        let (submission, _) = self
            .swap_lock(submission_id, |submission| {
                submission.lock.send_back(identity, submission_id, note)
            })
            .await?;

        info!("{} sent {} back for correction", identity.actor_id, submission_id);
        self.notifier.notify(ReviewEvent::new(
            EventType::SubmissionSentBack,
            vec![submission.author.clone()],
            serde_json::json!({
                "submission_id": submission_id.as_str(),
                "note": note,
            }),
        ));
        Ok(())
    }

    /// Clear the sent-back state after the author corrected the submission.
    pub async fn clear_sent_back(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<(), DomainError> {
        self.swap_lock(submission_id, |submission| {
            submission.lock.clear_sent_back(identity, &submission.author)
        })
        .await?;
        info!("Sent-back state on {} cleared by author", submission_id);
        Ok(())
    }

    /// Current lock state, for display.
    pub async fn status(&self, submission_id: &SubmissionId) -> Result<DocumentLock, DomainError> {
        let submission = self
            .submissions
            .load(submission_id)
            .await
            .map_err(repo_err("submission", submission_id))?;
        Ok(submission.lock)
    }
}
