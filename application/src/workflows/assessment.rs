//! Assessment workflow: assignment, voting, and gated submission.

use super::repo_err;
use crate::ports::catalog::SpecificationCatalog;
use crate::ports::notifier::{EventType, Notifier, ReviewEvent};
use crate::ports::repository::{AssessmentRepository, SubmissionRepository};
use accord_domain::{
    ActorId, AssessmentProgress, DomainError, FinalRecommendation, IdentityContext,
    ReviewAssessment, Role, SpecItemKey, SubmissionId, VoteValue,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Workflow for the per-reviewer assessment lifecycle.
pub struct AssessmentWorkflow {
    assessments: Arc<dyn AssessmentRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    catalog: Arc<dyn SpecificationCatalog>,
    notifier: Arc<dyn Notifier>,
}

impl AssessmentWorkflow {
    pub fn new(
        assessments: Arc<dyn AssessmentRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        catalog: Arc<dyn SpecificationCatalog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            assessments,
            submissions,
            catalog,
            notifier,
        }
    }

    /// Assign a reviewer to a submission, creating a fresh assessment over
    /// the current catalog.
    ///
    /// Re-assignment supersedes the existing assessment rather than deleting
    /// it; the superseded record stays out of every aggregation.
    pub async fn assign(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        reviewer: impl Into<ActorId>,
    ) -> Result<ReviewAssessment, DomainError> {
        if !matches!(identity.role, Role::Coordinator | Role::Admin) {
            return Err(DomainError::not_authorized(format!(
                "role {} cannot assign reviewers",
                identity.role
            )));
        }

        // Submission must exist before anyone is assigned to it
        let _ = self
            .submissions
            .load(submission_id)
            .await
            .map_err(repo_err("submission", submission_id))?;

        let reviewer = reviewer.into();

        // Supersede any assessment the reviewer already holds
        if let Ok(mut existing) = self.assessments.load(submission_id, &reviewer).await {
            if !existing.superseded {
                existing.supersede();
                self.assessments
                    .save(&existing)
                    .await
                    .map_err(repo_err("assessment", submission_id))?;
                debug!(
                    "Superseded prior assessment of {} by {}",
                    submission_id, reviewer
                );
            }
        }

        let assessment =
            ReviewAssessment::new(submission_id.clone(), reviewer.clone(), self.catalog.keys());
        self.assessments
            .save(&assessment)
            .await
            .map_err(repo_err("assessment", submission_id))?;

        info!("Assigned {} to review {}", reviewer, submission_id);
        self.notifier.notify(ReviewEvent::new(
            EventType::ReviewerAssigned,
            vec![reviewer],
            serde_json::json!({ "submission_id": submission_id.as_str() }),
        ));

        Ok(assessment)
    }

    async fn load_authorized(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
    ) -> Result<ReviewAssessment, DomainError> {
        let assessment = self
            .assessments
            .load(submission_id, reviewer)
            .await
            .map_err(repo_err("assessment", submission_id))?;

        // Only the owning reviewer, or an admin override, may touch it
        if !identity.is(&assessment.reviewer) && identity.role != Role::Admin {
            return Err(DomainError::not_authorized(format!(
                "{} is not the reviewer of this assessment",
                identity.actor_id
            )));
        }
        Ok(assessment)
    }

    /// Record a vote on one specification item.
    pub async fn record_vote(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
        item: &SpecItemKey,
        value: VoteValue,
        comment: impl Into<String>,
    ) -> Result<ReviewAssessment, DomainError> {
        let mut assessment = self.load_authorized(identity, submission_id, reviewer).await?;
        assessment.record_vote(item, value, comment)?;
        self.assessments
            .save(&assessment)
            .await
            .map_err(repo_err("assessment", submission_id))?;
        Ok(assessment)
    }

    /// Toggle the bookmark annotation on one item.
    pub async fn toggle_bookmark(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
        item: &SpecItemKey,
    ) -> Result<bool, DomainError> {
        let mut assessment = self.load_authorized(identity, submission_id, reviewer).await?;
        let bookmarked = assessment.toggle_bookmark(item)?;
        self.assessments
            .save(&assessment)
            .await
            .map_err(repo_err("assessment", submission_id))?;
        Ok(bookmarked)
    }

    /// Flag one item for the lead reader's attention.
    pub async fn flag_item(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
        item: &SpecItemKey,
        reason: impl Into<String>,
    ) -> Result<(), DomainError> {
        let mut assessment = self.load_authorized(identity, submission_id, reviewer).await?;
        assessment.flag(item, reason)?;
        self.assessments
            .save(&assessment)
            .await
            .map_err(repo_err("assessment", submission_id))
    }

    /// Replace the reviewer's final recommendation.
    pub async fn set_recommendation(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
        recommendation: FinalRecommendation,
    ) -> Result<(), DomainError> {
        let mut assessment = self.load_authorized(identity, submission_id, reviewer).await?;
        assessment.set_recommendation(recommendation)?;
        self.assessments
            .save(&assessment)
            .await
            .map_err(repo_err("assessment", submission_id))
    }

    /// Mark the assessment done (reversible).
    pub async fn mark_complete(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
    ) -> Result<(), DomainError> {
        let mut assessment = self.load_authorized(identity, submission_id, reviewer).await?;
        assessment.mark_complete()?;
        self.assessments
            .save(&assessment)
            .await
            .map_err(repo_err("assessment", submission_id))
    }

    /// Submit the assessment to the lead reader.
    ///
    /// The domain gate applies: every item voted and the recommendation
    /// complete, or [`DomainError::IncompleteReview`] with the full list.
    pub async fn submit(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
    ) -> Result<ReviewAssessment, DomainError> {
        let mut assessment = self.load_authorized(identity, submission_id, reviewer).await?;
        assessment.submit()?;
        self.assessments
            .save(&assessment)
            .await
            .map_err(repo_err("assessment", submission_id))?;

        info!("Assessment of {} by {} submitted", submission_id, reviewer);
        self.notifier.notify(ReviewEvent::new(
            EventType::AssessmentSubmitted,
            Vec::new(),
            serde_json::json!({
                "submission_id": submission_id.as_str(),
                "reviewer": reviewer.as_str(),
            }),
        ));

        Ok(assessment)
    }

    /// Derived progress counters for one assessment.
    pub async fn progress(
        &self,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
    ) -> Result<AssessmentProgress, DomainError> {
        let assessment = self
            .assessments
            .load(submission_id, reviewer)
            .await
            .map_err(repo_err("assessment", submission_id))?;
        Ok(assessment.progress())
    }
}
