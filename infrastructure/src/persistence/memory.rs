//! In-memory repository adapters.
//!
//! One store backs all four repository ports, guarded by per-collection
//! `RwLock`s. The lock update is a true compare-and-swap under the write
//! lock, so concurrent acquisitions on the same submission serialize exactly
//! as the workflows expect.
//!
//! Superseded assessments move to an archive so re-assignment never destroys
//! history; listings only ever return the current records.

use accord_application::ports::repository::{
    AssessmentRepository, ChangeRequestRepository, CompilationRepository, RepositoryError,
    SubmissionRepository,
};
use accord_domain::{
    ActorId, ChangeRequest, ChangeRequestId, Compilation, DocumentLock, ReviewAssessment,
    Submission, SubmissionId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store implementing every repository port.
#[derive(Default)]
pub struct InMemoryStore {
    submissions: RwLock<HashMap<SubmissionId, Submission>>,
    assessments: RwLock<HashMap<(SubmissionId, ActorId), ReviewAssessment>>,
    superseded_assessments: RwLock<Vec<ReviewAssessment>>,
    compilations: RwLock<HashMap<SubmissionId, Compilation>>,
    change_requests: RwLock<HashMap<ChangeRequestId, ChangeRequest>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> RepositoryError {
        RepositoryError::Backend("store lock poisoned".to_string())
    }

    /// Seed a submission directly, for wiring up scenarios and tests.
    pub fn insert_submission(&self, submission: Submission) -> Result<(), RepositoryError> {
        self.submissions
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(submission.id.clone(), submission);
        Ok(())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryStore {
    async fn load(&self, id: &SubmissionId) -> Result<Submission, RepositoryError> {
        self.submissions
            .read()
            .map_err(|_| Self::poisoned())?
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn save(&self, submission: &Submission) -> Result<(), RepositoryError> {
        self.submissions
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(submission.id.clone(), submission.clone());
        Ok(())
    }

    async fn update_lock(
        &self,
        id: &SubmissionId,
        expected: &DocumentLock,
        next: DocumentLock,
    ) -> Result<(), RepositoryError> {
        let mut rows = self.submissions.write().map_err(|_| Self::poisoned())?;
        let submission = rows
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        if &submission.lock != expected {
            return Err(RepositoryError::Conflict(id.to_string()));
        }
        submission.lock = next;
        Ok(())
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryStore {
    async fn load(
        &self,
        submission_id: &SubmissionId,
        reviewer: &ActorId,
    ) -> Result<ReviewAssessment, RepositoryError> {
        self.assessments
            .read()
            .map_err(|_| Self::poisoned())?
            .get(&(submission_id.clone(), reviewer.clone()))
            .cloned()
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("{}/{}", submission_id, reviewer))
            })
    }

    async fn save(&self, assessment: &ReviewAssessment) -> Result<(), RepositoryError> {
        let key = (assessment.submission_id.clone(), assessment.reviewer.clone());
        if assessment.superseded {
            // Move the record out of the current map into the archive
            self.assessments
                .write()
                .map_err(|_| Self::poisoned())?
                .remove(&key);
            self.superseded_assessments
                .write()
                .map_err(|_| Self::poisoned())?
                .push(assessment.clone());
        } else {
            self.assessments
                .write()
                .map_err(|_| Self::poisoned())?
                .insert(key, assessment.clone());
        }
        Ok(())
    }

    async fn list_for_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<ReviewAssessment>, RepositoryError> {
        let mut assessments: Vec<ReviewAssessment> = self
            .assessments
            .read()
            .map_err(|_| Self::poisoned())?
            .values()
            .filter(|a| &a.submission_id == submission_id)
            .cloned()
            .collect();
        // Deterministic order keeps aggregation idempotent across calls
        assessments.sort_by(|a, b| a.reviewer.cmp(&b.reviewer));
        Ok(assessments)
    }
}

#[async_trait]
impl CompilationRepository for InMemoryStore {
    async fn load(&self, submission_id: &SubmissionId) -> Result<Compilation, RepositoryError> {
        self.compilations
            .read()
            .map_err(|_| Self::poisoned())?
            .get(submission_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(submission_id.to_string()))
    }

    async fn save(&self, compilation: &Compilation) -> Result<(), RepositoryError> {
        self.compilations
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(compilation.submission_id.clone(), compilation.clone());
        Ok(())
    }

    async fn exists(&self, submission_id: &SubmissionId) -> Result<bool, RepositoryError> {
        Ok(self
            .compilations
            .read()
            .map_err(|_| Self::poisoned())?
            .contains_key(submission_id))
    }
}

#[async_trait]
impl ChangeRequestRepository for InMemoryStore {
    async fn load(&self, id: &ChangeRequestId) -> Result<ChangeRequest, RepositoryError> {
        self.change_requests
            .read()
            .map_err(|_| Self::poisoned())?
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn save(&self, request: &ChangeRequest) -> Result<(), RepositoryError> {
        self.change_requests
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(request.id.clone(), request.clone());
        Ok(())
    }

    async fn list_for_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<ChangeRequest>, RepositoryError> {
        let mut requests: Vec<ChangeRequest> = self
            .change_requests
            .read()
            .map_err(|_| Self::poisoned())?
            .values()
            .filter(|r| &r.submission_id == submission_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_application::ports::catalog::StaticCatalog;
    use accord_application::ports::notifier::{EventType, Notifier, ReviewEvent};
    use accord_application::workflows::assessment::AssessmentWorkflow;
    use accord_application::workflows::compilation::CompilationWorkflow;
    use accord_application::workflows::lock::LockWorkflow;
    use accord_domain::{
        DomainError, FinalRecommendation, IdentityContext, RecommendationCategory, Role,
        SpecItemKey, VoteValue,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct CollectingNotifier {
        events: Mutex<Vec<ReviewEvent>>,
    }

    impl CollectingNotifier {
        fn of_type(&self, event_type: EventType) -> Vec<ReviewEvent> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.event_type == event_type)
                .cloned()
                .collect()
        }
    }

    impl Notifier for CollectingNotifier {
        fn notify(&self, event: ReviewEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn keys(codes: &[&str]) -> Vec<SpecItemKey> {
        codes.iter().map(|c| SpecItemKey::new("A", *c)).collect()
    }

    fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_submission(Submission::new("sub-1", "author-1", "Self-Study Report"))
            .unwrap();
        store
    }

    fn reader(id: &str) -> IdentityContext {
        IdentityContext::new(id, Role::Reader).with_assignment("sub-1")
    }

    fn lead() -> IdentityContext {
        IdentityContext::new("lead-1", Role::LeadReader).with_assignment("sub-1")
    }

    fn coordinator() -> IdentityContext {
        IdentityContext::new("coordinator-1", Role::Coordinator)
    }

    fn recommendation() -> FinalRecommendation {
        FinalRecommendation::new(
            "Well documented.",
            "Assessment loop is young.",
            RecommendationCategory::Accredit,
        )
    }

    #[tokio::test]
    async fn test_update_lock_detects_stale_expectation() {
        let store = seeded_store();
        let id = SubmissionId::new("sub-1");
        let held = DocumentLock::Unlocked
            .acquire(&reader("reader-1"), &id)
            .unwrap();

        store
            .update_lock(&id, &DocumentLock::Unlocked, held.clone())
            .await
            .unwrap();

        // A second writer still expecting Unlocked must fail
        let stale = store
            .update_lock(&id, &DocumentLock::Unlocked, DocumentLock::Unlocked)
            .await
            .unwrap_err();
        assert!(stale.is_conflict());
    }

    #[tokio::test]
    async fn test_concurrent_acquire_single_winner() {
        let store = seeded_store();
        let workflow = Arc::new(LockWorkflow::new(
            store.clone(),
            Arc::new(CollectingNotifier::default()),
        ));
        let id = SubmissionId::new("sub-1");

        let first = {
            let workflow = workflow.clone();
            let id = id.clone();
            tokio::spawn(async move { workflow.acquire(&reader("reader-1"), &id).await })
        };
        let second = {
            let workflow = workflow.clone();
            let id = id.clone();
            tokio::spawn(async move { workflow.acquire(&reader("reader-2"), &id).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        let locked_out = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_already_locked()))
            .count();

        assert_eq!(winners, 1);
        assert_eq!(locked_out, 1);
    }

    #[tokio::test]
    async fn test_escalated_release_notifies_prior_holder() {
        let store = seeded_store();
        let notifier = Arc::new(CollectingNotifier::default());
        let workflow = LockWorkflow::new(store.clone(), notifier.clone());
        let id = SubmissionId::new("sub-1");

        workflow.acquire(&reader("reader-1"), &id).await.unwrap();
        workflow.release(&lead(), &id).await.unwrap();

        assert!(!workflow.status(&id).await.unwrap().is_locked());
        let events = notifier.of_type(EventType::LockForceReleased);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipients, vec![ActorId::new("reader-1")]);
    }

    #[tokio::test]
    async fn test_sent_back_cycle() {
        let store = seeded_store();
        let notifier = Arc::new(CollectingNotifier::default());
        let workflow = LockWorkflow::new(store.clone(), notifier.clone());
        let id = SubmissionId::new("sub-1");

        workflow
            .send_back(&reader("reader-1"), &id, "Appendix B is empty.")
            .await
            .unwrap();
        assert!(workflow.status(&id).await.unwrap().is_sent_back());
        assert_eq!(notifier.of_type(EventType::SubmissionSentBack).len(), 1);

        // Another reader cannot take the lock while sent back
        let err = workflow.acquire(&reader("reader-2"), &id).await.unwrap_err();
        assert!(err.is_already_locked());

        // Only the author clears it
        let author = IdentityContext::new("author-1", Role::Author);
        workflow.clear_sent_back(&author, &id).await.unwrap();
        assert!(workflow.acquire(&reader("reader-2"), &id).await.is_ok());
    }

    fn review_workflows(
        store: &Arc<InMemoryStore>,
        catalog: Arc<StaticCatalog>,
        notifier: Arc<CollectingNotifier>,
    ) -> (AssessmentWorkflow, CompilationWorkflow) {
        let assessments = AssessmentWorkflow::new(
            store.clone(),
            store.clone(),
            catalog.clone(),
            notifier.clone(),
        );
        let compilations =
            CompilationWorkflow::new(store.clone(), store.clone(), catalog, notifier);
        (assessments, compilations)
    }

    async fn submit_votes(
        workflow: &AssessmentWorkflow,
        reviewer_id: &str,
        votes: &[(SpecItemKey, VoteValue)],
    ) {
        let identity = reader(reviewer_id);
        let sub = SubmissionId::new("sub-1");
        let actor = ActorId::new(reviewer_id);
        for (item, value) in votes {
            workflow
                .record_vote(&identity, &sub, &actor, item, *value, "noted")
                .await
                .unwrap();
        }
        workflow
            .set_recommendation(&identity, &sub, &actor, recommendation())
            .await
            .unwrap();
        workflow.submit(&identity, &sub, &actor).await.unwrap();
    }

    #[tokio::test]
    async fn test_full_review_round() {
        let store = seeded_store();
        let notifier = Arc::new(CollectingNotifier::default());
        let catalog = Arc::new(StaticCatalog::from_keys(keys(&["A.1", "A.2", "A.3", "A.4"])));
        let (assessments, compilations) = review_workflows(&store, catalog, notifier.clone());

        let sub = SubmissionId::new("sub-1");
        assessments.assign(&coordinator(), &sub, "reader-1").await.unwrap();
        assessments.assign(&coordinator(), &sub, "reader-2").await.unwrap();

        let k = keys(&["A.1", "A.2", "A.3", "A.4"]);
        submit_votes(
            &assessments,
            "reader-1",
            &[
                (k[0].clone(), VoteValue::Compliant),
                (k[1].clone(), VoteValue::Compliant),
                (k[2].clone(), VoteValue::NotApplicable),
                (k[3].clone(), VoteValue::Compliant),
            ],
        )
        .await;
        submit_votes(
            &assessments,
            "reader-2",
            &[
                (k[0].clone(), VoteValue::Compliant),
                (k[1].clone(), VoteValue::NonCompliant),
                (k[2].clone(), VoteValue::NotApplicable),
                (k[3].clone(), VoteValue::Compliant),
            ],
        )
        .await;
        assert_eq!(notifier.of_type(EventType::AssessmentSubmitted).len(), 2);

        let lead = lead();
        compilations.create_or_load(&lead, &sub).await.unwrap();
        let compiled = compilations.aggregate(&lead, &sub).await.unwrap();
        assert_eq!(compiled.items().len(), 4);
        assert_eq!(compiled.recommendations.len(), 2);

        // Only the split item surfaces as a disagreement; the tie went to
        // the conservative category
        let split = compilations.disagreements(&sub).await.unwrap();
        assert_eq!(split.len(), 1);
        assert_eq!(split[0].item, k[1]);
        assert_eq!(split[0].consensus, Some(VoteValue::NonCompliant));

        // Lead reader overrides the tie after checking the evidence
        compilations
            .set_final_determination(
                &lead,
                &sub,
                &k[1],
                VoteValue::Compliant,
                Some("Verified the updated policy on site.".to_string()),
            )
            .await
            .unwrap();

        let stats = compilations.statistics(&sub).await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.compliant, 3);
        assert_eq!(stats.not_applicable, 1);
        assert!((stats.compliance_rate - 1.0).abs() < f64::EPSILON);

        compilations
            .set_summary(
                &lead,
                &sub,
                accord_domain::CompilationSummary {
                    strengths: "Consistent evidence across readers.".to_string(),
                    weaknesses: "One policy updated only recently.".to_string(),
                    overall: Some(RecommendationCategory::Accredit),
                },
            )
            .await
            .unwrap();
        compilations.submit(&lead, &sub).await.unwrap();
        assert_eq!(notifier.of_type(EventType::CompilationSubmitted).len(), 1);

        compilations.approve(&coordinator(), &sub).await.unwrap();
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent_and_keeps_overrides() {
        let store = seeded_store();
        let notifier = Arc::new(CollectingNotifier::default());
        let catalog = Arc::new(StaticCatalog::from_keys(keys(&["A.1"])));
        let (assessments, compilations) = review_workflows(&store, catalog, notifier);

        let sub = SubmissionId::new("sub-1");
        let item = SpecItemKey::new("A", "A.1");
        assessments.assign(&coordinator(), &sub, "reader-1").await.unwrap();
        assessments.assign(&coordinator(), &sub, "reader-2").await.unwrap();
        assessments.assign(&coordinator(), &sub, "reader-3").await.unwrap();

        submit_votes(&assessments, "reader-1", &[(item.clone(), VoteValue::Compliant)]).await;
        submit_votes(&assessments, "reader-2", &[(item.clone(), VoteValue::Compliant)]).await;

        let lead = lead();
        compilations.create_or_load(&lead, &sub).await.unwrap();
        let first = compilations.aggregate(&lead, &sub).await.unwrap();
        let second = compilations.aggregate(&lead, &sub).await.unwrap();
        assert_eq!(first, second);

        compilations
            .set_final_determination(&lead, &sub, &item, VoteValue::NonCompliant, None)
            .await
            .unwrap();

        // A late third submission shifts nothing the lead already decided
        submit_votes(&assessments, "reader-3", &[(item.clone(), VoteValue::Compliant)]).await;
        let refreshed = compilations.aggregate(&lead, &sub).await.unwrap();

        let compiled = refreshed.item(&item).unwrap();
        assert_eq!(compiled.counts.compliant, 3);
        assert_eq!(compiled.consensus, Some(VoteValue::Compliant));
        assert_eq!(compiled.final_determination, Some(VoteValue::NonCompliant));

        let stats = compilations.statistics(&sub).await.unwrap();
        assert_eq!(stats.non_compliant, 1);
        assert_eq!(stats.compliant, 0);
    }

    #[tokio::test]
    async fn test_compilation_requires_a_submitted_assessment() {
        let store = seeded_store();
        let catalog = Arc::new(StaticCatalog::from_keys(keys(&["A.1"])));
        let (assessments, compilations) = review_workflows(
            &store,
            catalog,
            Arc::new(CollectingNotifier::default()),
        );

        let sub = SubmissionId::new("sub-1");
        assessments.assign(&coordinator(), &sub, "reader-1").await.unwrap();

        // Assigned but not submitted: nothing to compile yet
        let err = compilations.create_or_load(&lead(), &sub).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
    }

    #[tokio::test]
    async fn test_incomplete_review_blocks_submission() {
        let store = seeded_store();
        let catalog = Arc::new(StaticCatalog::from_keys(keys(&["A.1", "A.2"])));
        let (assessments, _) = review_workflows(
            &store,
            catalog,
            Arc::new(CollectingNotifier::default()),
        );

        let sub = SubmissionId::new("sub-1");
        let actor = ActorId::new("reader-1");
        assessments.assign(&coordinator(), &sub, "reader-1").await.unwrap();
        assessments
            .record_vote(
                &reader("reader-1"),
                &sub,
                &actor,
                &SpecItemKey::new("A", "A.1"),
                VoteValue::Compliant,
                "",
            )
            .await
            .unwrap();
        assessments
            .set_recommendation(&reader("reader-1"), &sub, &actor, recommendation())
            .await
            .unwrap();

        let err = assessments
            .submit(&reader("reader-1"), &sub, &actor)
            .await
            .unwrap_err();
        match err {
            DomainError::IncompleteReview(incomplete) => {
                assert_eq!(incomplete.unvoted_items, vec![SpecItemKey::new("A", "A.2")]);
            }
            other => panic!("expected IncompleteReview, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reassignment_supersedes() {
        let store = seeded_store();
        let catalog = Arc::new(StaticCatalog::from_keys(keys(&["A.1"])));
        let (assessments, _) = review_workflows(
            &store,
            catalog,
            Arc::new(CollectingNotifier::default()),
        );

        let sub = SubmissionId::new("sub-1");
        let item = SpecItemKey::new("A", "A.1");
        assessments.assign(&coordinator(), &sub, "reader-1").await.unwrap();
        submit_votes(&assessments, "reader-1", &[(item.clone(), VoteValue::Compliant)]).await;

        // Re-assignment replaces the submitted assessment with a fresh one
        let fresh = assessments.assign(&coordinator(), &sub, "reader-1").await.unwrap();
        assert!(!fresh.is_submitted());

        let current = AssessmentRepository::list_for_submission(store.as_ref(), &sub)
            .await
            .unwrap();
        assert_eq!(current.len(), 1);
        assert!(!current[0].superseded);
        assert!(!current[0].is_submitted());
    }

    #[tokio::test]
    async fn test_only_reviewer_or_admin_mutates() {
        let store = seeded_store();
        let catalog = Arc::new(StaticCatalog::from_keys(keys(&["A.1"])));
        let (assessments, _) = review_workflows(
            &store,
            catalog,
            Arc::new(CollectingNotifier::default()),
        );

        let sub = SubmissionId::new("sub-1");
        let actor = ActorId::new("reader-1");
        let item = SpecItemKey::new("A", "A.1");
        assessments.assign(&coordinator(), &sub, "reader-1").await.unwrap();

        let intruder = reader("reader-2");
        assert!(matches!(
            assessments
                .record_vote(&intruder, &sub, &actor, &item, VoteValue::Compliant, "")
                .await,
            Err(DomainError::NotAuthorized(_))
        ));

        let admin = IdentityContext::new("admin-1", Role::Admin);
        assert!(assessments
            .record_vote(&admin, &sub, &actor, &item, VoteValue::Compliant, "")
            .await
            .is_ok());
    }
}
