//! Change-request workflow: dual approval for out-of-band changes.

use super::repo_err;
use crate::ports::notifier::{EventType, Notifier, ReviewEvent};
use crate::ports::repository::ChangeRequestRepository;
use accord_domain::{
    ApprovalParty, ApprovalStatus, ChangeRequest, ChangeRequestId, ChangeRequestKind, DomainError,
    IdentityContext, SubmissionId,
};
use std::sync::Arc;
use tracing::info;

/// Workflow for opening and resolving dual-approval change requests.
pub struct ChangeRequestWorkflow {
    requests: Arc<dyn ChangeRequestRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ChangeRequestWorkflow {
    pub fn new(requests: Arc<dyn ChangeRequestRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { requests, notifier }
    }

    /// The approval slot this actor speaks for.
    fn party_for(identity: &IdentityContext) -> Result<ApprovalParty, DomainError> {
        ApprovalParty::for_role(identity.role).ok_or_else(|| {
            DomainError::not_authorized(format!(
                "role {} holds no approval slot",
                identity.role
            ))
        })
    }

    async fn load(&self, id: &ChangeRequestId) -> Result<ChangeRequest, DomainError> {
        self.requests
            .load(id)
            .await
            .map_err(repo_err("change request", id))
    }

    async fn save(&self, request: &ChangeRequest) -> Result<(), DomainError> {
        self.requests
            .save(request)
            .await
            .map_err(repo_err("change request", &request.id))
    }

    /// Open a new change request. The id is assigned by the calling layer.
    pub async fn open(
        &self,
        identity: &IdentityContext,
        id: impl Into<ChangeRequestId>,
        submission_id: &SubmissionId,
        kind: ChangeRequestKind,
        current_value: impl Into<String>,
        requested_value: impl Into<String>,
    ) -> Result<ChangeRequest, DomainError> {
        let request = ChangeRequest::new(
            id,
            submission_id.clone(),
            kind,
            current_value,
            requested_value,
            identity.actor_id.clone(),
        );
        self.save(&request).await?;
        info!(
            "Change request {} ({}) opened for {}",
            request.id, kind, submission_id
        );
        Ok(request)
    }

    fn notify_if_resolved(&self, request: &ChangeRequest) {
        let status = request.status();
        if !status.is_terminal() || status == ApprovalStatus::Withdrawn {
            return;
        }
        self.notifier.notify(ReviewEvent::new(
            EventType::ChangeRequestResolved,
            vec![request.requested_by.clone()],
            serde_json::json!({
                "change_request_id": request.id.as_str(),
                "status": status.as_str(),
            }),
        ));
    }

    /// Record an approval in the caller's slot.
    pub async fn approve(
        &self,
        identity: &IdentityContext,
        id: &ChangeRequestId,
        comment: impl Into<String>,
    ) -> Result<ApprovalStatus, DomainError> {
        let party = Self::party_for(identity)?;
        let mut request = self.load(id).await?;
        request.approve(party, comment)?;
        self.save(&request).await?;

        let status = request.status();
        info!("{} approved change request {} ({})", party, id, status);
        self.notify_if_resolved(&request);
        Ok(status)
    }

    /// Record a denial in the caller's slot. A single denial resolves the
    /// request.
    pub async fn deny(
        &self,
        identity: &IdentityContext,
        id: &ChangeRequestId,
        reason: impl Into<String>,
    ) -> Result<ApprovalStatus, DomainError> {
        let party = Self::party_for(identity)?;
        let mut request = self.load(id).await?;
        request.deny(party, reason)?;
        self.save(&request).await?;

        let status = request.status();
        info!("{} denied change request {} ({})", party, id, status);
        self.notify_if_resolved(&request);
        Ok(status)
    }

    /// Withdraw a pending request; requester only.
    pub async fn withdraw(
        &self,
        identity: &IdentityContext,
        id: &ChangeRequestId,
    ) -> Result<(), DomainError> {
        let mut request = self.load(id).await?;
        request.withdraw(&identity.actor_id)?;
        self.save(&request).await?;
        info!("Change request {} withdrawn", id);
        Ok(())
    }

    /// All change requests filed against a submission.
    pub async fn list_for_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<ChangeRequest>, DomainError> {
        self.requests
            .list_for_submission(submission_id)
            .await
            .map_err(repo_err("change request", submission_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::notifier::NoNotifier;
    use crate::ports::repository::RepositoryError;
    use accord_domain::Role;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRequests {
        rows: Mutex<HashMap<ChangeRequestId, ChangeRequest>>,
    }

    #[async_trait]
    impl ChangeRequestRepository for FakeRequests {
        async fn load(&self, id: &ChangeRequestId) -> Result<ChangeRequest, RepositoryError> {
            self.rows
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
        }

        async fn save(&self, request: &ChangeRequest) -> Result<(), RepositoryError> {
            self.rows
                .lock()
                .unwrap()
                .insert(request.id.clone(), request.clone());
            Ok(())
        }

        async fn list_for_submission(
            &self,
            submission_id: &SubmissionId,
        ) -> Result<Vec<ChangeRequest>, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|r| &r.submission_id == submission_id)
                .cloned()
                .collect())
        }
    }

    fn workflow() -> ChangeRequestWorkflow {
        ChangeRequestWorkflow::new(Arc::new(FakeRequests::default()), Arc::new(NoNotifier))
    }

    fn identity(id: &str, role: Role) -> IdentityContext {
        IdentityContext::new(id, role)
    }

    #[tokio::test]
    async fn test_open_and_dual_approve() {
        let workflow = workflow();
        let coordinator = identity("coordinator-1", Role::Coordinator);
        let lead = identity("lead-1", Role::LeadReader);
        let sub = SubmissionId::new("sub-1");

        let request = workflow
            .open(
                &coordinator,
                "cr-1",
                &sub,
                ChangeRequestKind::DeadlineChange,
                "2026-09-01",
                "2026-10-01",
            )
            .await
            .unwrap();
        assert_eq!(request.status(), ApprovalStatus::Pending);

        let id = ChangeRequestId::new("cr-1");
        let status = workflow.approve(&lead, &id, "works for the panel").await.unwrap();
        assert_eq!(status, ApprovalStatus::Pending);

        let status = workflow.approve(&coordinator, &id, "fine").await.unwrap();
        assert_eq!(status, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn test_denial_resolves_immediately() {
        let workflow = workflow();
        let coordinator = identity("coordinator-1", Role::Coordinator);
        let lead = identity("lead-1", Role::LeadReader);
        let sub = SubmissionId::new("sub-1");
        let id = ChangeRequestId::new("cr-1");

        workflow
            .open(
                &coordinator,
                "cr-1",
                &sub,
                ChangeRequestKind::ReaderReassignment,
                "reader-2",
                "reader-5",
            )
            .await
            .unwrap();

        let status = workflow.deny(&lead, &id, "reader-5 has a conflict").await.unwrap();
        assert_eq!(status, ApprovalStatus::Denied);

        // Denied is terminal: the coordinator slot can no longer vote
        assert!(workflow.approve(&coordinator, &id, "fine").await.is_err());
    }

    #[tokio::test]
    async fn test_reader_holds_no_slot() {
        let workflow = workflow();
        let coordinator = identity("coordinator-1", Role::Coordinator);
        let reader = identity("reader-1", Role::Reader);
        let sub = SubmissionId::new("sub-1");
        let id = ChangeRequestId::new("cr-1");

        workflow
            .open(
                &coordinator,
                "cr-1",
                &sub,
                ChangeRequestKind::ScopeChange,
                "full review",
                "focused review",
            )
            .await
            .unwrap();

        assert!(matches!(
            workflow.approve(&reader, &id, "sure").await,
            Err(DomainError::NotAuthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_withdraw_by_requester() {
        let workflow = workflow();
        let coordinator = identity("coordinator-1", Role::Coordinator);
        let sub = SubmissionId::new("sub-1");
        let id = ChangeRequestId::new("cr-1");

        workflow
            .open(
                &coordinator,
                "cr-1",
                &sub,
                ChangeRequestKind::DeadlineChange,
                "2026-09-01",
                "2026-10-01",
            )
            .await
            .unwrap();

        workflow.withdraw(&coordinator, &id).await.unwrap();
        let requests = workflow.list_for_submission(&sub).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].status(), ApprovalStatus::Withdrawn);
    }
}
