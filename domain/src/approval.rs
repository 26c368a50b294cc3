//! Two-party approval for out-of-band change requests.
//!
//! Sensitive changes (deadline moves, reader replacements) require both the
//! lead reader and the coordinator to agree: a symmetric veto. The status is
//! a pure function of the two approval slots, so there is no stored status to
//! drift out of sync. A denial is final even while the other slot is empty.

use crate::core::error::DomainError;
use crate::core::ids::{ActorId, ChangeRequestId, SubmissionId};
use crate::core::identity::Role;
use serde::{Deserialize, Serialize};

/// Kind of change being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeRequestKind {
    /// Move a review-cycle deadline.
    DeadlineChange,
    /// Narrow or widen the review scope.
    ScopeChange,
    /// Replace an assigned reader.
    ReaderReassignment,
}

impl ChangeRequestKind {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeRequestKind::DeadlineChange => "deadline_change",
            ChangeRequestKind::ScopeChange => "scope_change",
            ChangeRequestKind::ReaderReassignment => "reader_reassignment",
        }
    }
}

impl std::fmt::Display for ChangeRequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The two parties whose agreement a change request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalParty {
    LeadReader,
    Coordinator,
}

impl ApprovalParty {
    pub fn as_str(&self) -> &str {
        match self {
            ApprovalParty::LeadReader => "lead_reader",
            ApprovalParty::Coordinator => "coordinator",
        }
    }

    /// Which approval slot a role speaks for, if any.
    pub fn for_role(role: Role) -> Option<Self> {
        match role {
            Role::LeadReader => Some(ApprovalParty::LeadReader),
            Role::Coordinator => Some(ApprovalParty::Coordinator),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApprovalParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One party's recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Denied,
}

/// One approval slot: empty until the party votes, then immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ApprovalSlot {
    pub decision: Option<ApprovalDecision>,
    pub comment: Option<String>,
}

impl ApprovalSlot {
    pub fn is_set(&self) -> bool {
        self.decision.is_some()
    }
}

/// Computed status of a change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Denied,
    Withdrawn,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Denied => "denied",
            ApprovalStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An out-of-band change request awaiting dual approval.
///
/// Never hard-deleted while pending; withdrawal is a soft, terminal state the
/// requester alone may set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: ChangeRequestId,
    pub submission_id: SubmissionId,
    pub kind: ChangeRequestKind,
    pub current_value: String,
    pub requested_value: String,
    pub requested_by: ActorId,
    pub lead_reader: ApprovalSlot,
    pub coordinator: ApprovalSlot,
    withdrawn: bool,
}

impl ChangeRequest {
    pub fn new(
        id: impl Into<ChangeRequestId>,
        submission_id: impl Into<SubmissionId>,
        kind: ChangeRequestKind,
        current_value: impl Into<String>,
        requested_value: impl Into<String>,
        requested_by: impl Into<ActorId>,
    ) -> Self {
        Self {
            id: id.into(),
            submission_id: submission_id.into(),
            kind,
            current_value: current_value.into(),
            requested_value: requested_value.into(),
            requested_by: requested_by.into(),
            lead_reader: ApprovalSlot::default(),
            coordinator: ApprovalSlot::default(),
            withdrawn: false,
        }
    }

    pub fn slot(&self, party: ApprovalParty) -> &ApprovalSlot {
        match party {
            ApprovalParty::LeadReader => &self.lead_reader,
            ApprovalParty::Coordinator => &self.coordinator,
        }
    }

    fn slot_mut(&mut self, party: ApprovalParty) -> &mut ApprovalSlot {
        match party {
            ApprovalParty::LeadReader => &mut self.lead_reader,
            ApprovalParty::Coordinator => &mut self.coordinator,
        }
    }

    /// Status as a pure function of the slots: both approvals make it
    /// approved, either denial makes it denied (denial dominates a pending
    /// peer), withdrawal trumps a pending vote count.
    pub fn status(&self) -> ApprovalStatus {
        if self.withdrawn {
            return ApprovalStatus::Withdrawn;
        }
        let decisions = [self.lead_reader.decision, self.coordinator.decision];
        if decisions.contains(&Some(ApprovalDecision::Denied)) {
            return ApprovalStatus::Denied;
        }
        if decisions
            .iter()
            .all(|d| *d == Some(ApprovalDecision::Approved))
        {
            return ApprovalStatus::Approved;
        }
        ApprovalStatus::Pending
    }

    fn record(
        &mut self,
        party: ApprovalParty,
        decision: ApprovalDecision,
        comment: Option<String>,
    ) -> Result<(), DomainError> {
        let status = self.status();
        if status.is_terminal() {
            return Err(DomainError::invalid_transition(status, "voted"));
        }
        let slot = self.slot_mut(party);
        if slot.is_set() {
            // Changing a vote requires withdrawing and re-filing the request
            return Err(DomainError::invalid_transition(
                format!("{} slot already voted", party),
                "voted",
            ));
        }
        slot.decision = Some(decision);
        slot.comment = comment;
        Ok(())
    }

    /// Record an approval for one party's slot. Each slot votes exactly once.
    pub fn approve(
        &mut self,
        party: ApprovalParty,
        comment: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.record(party, ApprovalDecision::Approved, Some(comment.into()))
    }

    /// Record a denial for one party's slot. Denial is final regardless of
    /// the other slot.
    pub fn deny(
        &mut self,
        party: ApprovalParty,
        reason: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.record(party, ApprovalDecision::Denied, Some(reason.into()))
    }

    /// Withdraw the request. Only the requester, only while pending.
    pub fn withdraw(&mut self, actor: &ActorId) -> Result<(), DomainError> {
        let status = self.status();
        if status != ApprovalStatus::Pending {
            return Err(DomainError::invalid_transition(status, ApprovalStatus::Withdrawn));
        }
        if actor != &self.requested_by {
            return Err(DomainError::not_authorized(format!(
                "only the requester may withdraw, not {}",
                actor
            )));
        }
        self.withdrawn = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChangeRequest {
        ChangeRequest::new(
            "cr-1",
            "sub-1",
            ChangeRequestKind::DeadlineChange,
            "2026-09-01",
            "2026-10-01",
            "coordinator-1",
        )
    }

    #[test]
    fn test_new_request_is_pending() {
        assert_eq!(request().status(), ApprovalStatus::Pending);
    }

    #[test]
    fn test_both_approve_either_order() {
        let mut a = request();
        a.approve(ApprovalParty::LeadReader, "fine").unwrap();
        assert_eq!(a.status(), ApprovalStatus::Pending);
        a.approve(ApprovalParty::Coordinator, "fine").unwrap();
        assert_eq!(a.status(), ApprovalStatus::Approved);

        let mut b = request();
        b.approve(ApprovalParty::Coordinator, "fine").unwrap();
        b.approve(ApprovalParty::LeadReader, "fine").unwrap();
        assert_eq!(b.status(), ApprovalStatus::Approved);
    }

    #[test]
    fn test_denial_dominates_regardless_of_order() {
        let mut a = request();
        a.approve(ApprovalParty::LeadReader, "fine").unwrap();
        a.deny(ApprovalParty::Coordinator, "conflicts with site visit").unwrap();
        assert_eq!(a.status(), ApprovalStatus::Denied);

        let mut b = request();
        b.deny(ApprovalParty::Coordinator, "conflicts with site visit").unwrap();
        assert_eq!(b.status(), ApprovalStatus::Denied);
        // Denied is final: the other party can no longer vote
        assert!(b.approve(ApprovalParty::LeadReader, "fine").is_err());
    }

    #[test]
    fn test_single_denial_is_final_while_peer_pending() {
        let mut req = request();
        req.deny(ApprovalParty::LeadReader, "no").unwrap();
        assert_eq!(req.status(), ApprovalStatus::Denied);
    }

    #[test]
    fn test_no_revoting() {
        let mut req = request();
        req.approve(ApprovalParty::LeadReader, "fine").unwrap();
        assert!(matches!(
            req.approve(ApprovalParty::LeadReader, "again"),
            Err(DomainError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            req.deny(ApprovalParty::LeadReader, "changed my mind"),
            Err(DomainError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_withdraw_requester_only_while_pending() {
        let mut req = request();
        assert!(matches!(
            req.withdraw(&ActorId::new("reader-1")),
            Err(DomainError::NotAuthorized(_))
        ));

        req.withdraw(&ActorId::new("coordinator-1")).unwrap();
        assert_eq!(req.status(), ApprovalStatus::Withdrawn);

        // Terminal: no further votes
        assert!(req.approve(ApprovalParty::LeadReader, "fine").is_err());
    }

    #[test]
    fn test_withdraw_after_resolution_rejected() {
        let mut req = request();
        req.approve(ApprovalParty::LeadReader, "fine").unwrap();
        req.approve(ApprovalParty::Coordinator, "fine").unwrap();
        assert!(matches!(
            req.withdraw(&ActorId::new("coordinator-1")),
            Err(DomainError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_party_for_role() {
        assert_eq!(
            ApprovalParty::for_role(Role::LeadReader),
            Some(ApprovalParty::LeadReader)
        );
        assert_eq!(
            ApprovalParty::for_role(Role::Coordinator),
            Some(ApprovalParty::Coordinator)
        );
        assert_eq!(ApprovalParty::for_role(Role::Reader), None);
        assert_eq!(ApprovalParty::for_role(Role::Admin), None);
    }
}
