//! Compilation workflow: the lead reader's rollup of submitted assessments.

use super::repo_err;
use crate::ports::catalog::SpecificationCatalog;
use crate::ports::notifier::{EventType, Notifier, ReviewEvent};
use crate::ports::repository::{AssessmentRepository, CompilationRepository};
use accord_domain::{
    Compilation, CompilationSummary, CompiledItem, ComplianceStatistics, DomainError,
    IdentityContext, ReviewAssessment, ReviewerRecommendation, Role, SpecItemKey, SubmissionId,
    VoteValue,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Workflow orchestrating vote aggregation and the compiled determination.
pub struct CompilationWorkflow {
    compilations: Arc<dyn CompilationRepository>,
    assessments: Arc<dyn AssessmentRepository>,
    catalog: Arc<dyn SpecificationCatalog>,
    notifier: Arc<dyn Notifier>,
}

impl CompilationWorkflow {
    pub fn new(
        compilations: Arc<dyn CompilationRepository>,
        assessments: Arc<dyn AssessmentRepository>,
        catalog: Arc<dyn SpecificationCatalog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            compilations,
            assessments,
            catalog,
            notifier,
        }
    }

    fn authorize_lead(identity: &IdentityContext) -> Result<(), DomainError> {
        if identity.role.can_compile() {
            Ok(())
        } else {
            Err(DomainError::not_authorized(format!(
                "role {} cannot compile assessments",
                identity.role
            )))
        }
    }

    async fn submitted_assessments(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<ReviewAssessment>, DomainError> {
        let assessments = self
            .assessments
            .list_for_submission(submission_id)
            .await
            .map_err(repo_err("assessment", submission_id))?;
        Ok(assessments
            .into_iter()
            .filter(|a| a.is_submitted() && !a.superseded)
            .collect())
    }

    async fn load(&self, submission_id: &SubmissionId) -> Result<Compilation, DomainError> {
        self.compilations
            .load(submission_id)
            .await
            .map_err(repo_err("compilation", submission_id))
    }

    async fn save(&self, compilation: &Compilation) -> Result<(), DomainError> {
        self.compilations
            .save(compilation)
            .await
            .map_err(repo_err("compilation", &compilation.submission_id))
    }

    /// Idempotently create or return the compilation for a submission.
    ///
    /// Creation requires at least one submitted assessment; before that
    /// there is nothing to compile.
    pub async fn create_or_load(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<Compilation, DomainError> {
        Self::authorize_lead(identity)?;

        if self
            .compilations
            .exists(submission_id)
            .await
            .map_err(repo_err("compilation", submission_id))?
        {
            return self.load(submission_id).await;
        }

        if self.submitted_assessments(submission_id).await?.is_empty() {
            return Err(DomainError::invalid_transition(
                "no submitted assessments",
                "compilation in progress",
            ));
        }

        let compilation = Compilation::new(submission_id.clone());
        self.save(&compilation).await?;
        info!("Compilation opened for {}", submission_id);
        Ok(compilation)
    }

    /// Aggregate the panel's votes across every catalog item.
    ///
    /// Additive and idempotent: re-running refreshes vote snapshots and
    /// consensus values without touching final determinations or lead
    /// reader notes, so it is safe to invoke concurrently with a reviewer
    /// submitting.
    pub async fn aggregate(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<Compilation, DomainError> {
        Self::authorize_lead(identity)?;

        let mut compilation = self.load(submission_id).await?;
        let submitted = self.submitted_assessments(submission_id).await?;
        debug!(
            "Aggregating {} submitted assessments for {}",
            submitted.len(),
            submission_id
        );

        for key in self.catalog.keys() {
            let votes = submitted.iter().filter_map(|a| a.vote_for(&key)).collect();
            compilation.upsert_item(key, votes)?;
        }

        let recommendations = submitted
            .iter()
            .filter(|a| a.recommendation.is_complete())
            .filter_map(|a| {
                a.recommendation.category.map(|category| ReviewerRecommendation {
                    reviewer: a.reviewer.clone(),
                    category,
                    strengths: a.recommendation.strengths.clone(),
                    weaknesses: a.recommendation.weaknesses.clone(),
                })
            })
            .collect();
        compilation.set_recommendations(recommendations)?;

        self.save(&compilation).await?;
        Ok(compilation)
    }

    /// Record the lead reader's final determination for one item.
    pub async fn set_final_determination(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        item: &SpecItemKey,
        value: VoteValue,
        notes: Option<String>,
    ) -> Result<(), DomainError> {
        Self::authorize_lead(identity)?;
        let mut compilation = self.load(submission_id).await?;
        compilation.set_final_determination(item, value, notes)?;
        self.save(&compilation).await
    }

    /// Copy the consensus into the override slot for every item without a
    /// manual override. Returns how many items were written.
    pub async fn adopt_consensus(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<usize, DomainError> {
        Self::authorize_lead(identity)?;
        let mut compilation = self.load(submission_id).await?;
        let written = compilation.adopt_consensus()?;
        self.save(&compilation).await?;
        info!("Adopted consensus for {} items of {}", written, submission_id);
        Ok(written)
    }

    /// Replace the final summary.
    pub async fn set_summary(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
        summary: CompilationSummary,
    ) -> Result<(), DomainError> {
        Self::authorize_lead(identity)?;
        let mut compilation = self.load(submission_id).await?;
        compilation.set_summary(summary)?;
        self.save(&compilation).await
    }

    /// Compliance statistics over the current determinations.
    pub async fn statistics(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<ComplianceStatistics, DomainError> {
        Ok(self.load(submission_id).await?.statistics())
    }

    /// Items where the panel split, for the lead reader to inspect.
    pub async fn disagreements(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<CompiledItem>, DomainError> {
        let compilation = self.load(submission_id).await?;
        Ok(compilation.disagreements().cloned().collect())
    }

    /// Mark the compilation done (still editable).
    pub async fn mark_complete(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<(), DomainError> {
        Self::authorize_lead(identity)?;
        let mut compilation = self.load(submission_id).await?;
        compilation.mark_complete()?;
        self.save(&compilation).await
    }

    /// Submit the compiled determination.
    pub async fn submit(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<Compilation, DomainError> {
        Self::authorize_lead(identity)?;
        let mut compilation = self.load(submission_id).await?;
        compilation.submit()?;
        self.save(&compilation).await?;

        let stats = compilation.statistics();
        info!(
            "Compilation for {} submitted ({}/{} compliant)",
            submission_id, stats.compliant, stats.total
        );
        self.notifier.notify(ReviewEvent::new(
            EventType::CompilationSubmitted,
            Vec::new(),
            serde_json::json!({
                "submission_id": submission_id.as_str(),
                "compliance_rate": stats.compliance_rate,
            }),
        ));
        Ok(compilation)
    }

    /// Accept the submitted compilation on behalf of the decision body.
    pub async fn approve(
        &self,
        identity: &IdentityContext,
        submission_id: &SubmissionId,
    ) -> Result<(), DomainError> {
        if !matches!(identity.role, Role::Coordinator | Role::Admin) {
            return Err(DomainError::not_authorized(format!(
                "role {} cannot approve a compilation",
                identity.role
            )));
        }
        let mut compilation = self.load(submission_id).await?;
        compilation.approve()?;
        self.save(&compilation).await
    }
}
