//! Per-reviewer assessment entity and its state machine.

use super::recommendation::FinalRecommendation;
use crate::core::error::{DomainError, IncompleteReview};
use crate::core::ids::{ActorId, SpecItemKey, SubmissionId};
use crate::vote::{Vote, VoteValue};
use serde::{Deserialize, Serialize};

/// Status of a review assessment.
///
/// Transitions are forward-only with one exception: `Complete` is a manual
/// marker the reviewer may clear again by editing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    /// Assigned to the reviewer, no votes recorded yet.
    #[default]
    Assigned,
    /// At least one vote recorded.
    InProgress,
    /// Reviewer marked the assessment done; still editable.
    Complete,
    /// Submitted to the lead reader; terminal.
    Submitted,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AssessmentStatus::Assigned => "assigned",
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Complete => "complete",
            AssessmentStatus::Submitted => "submitted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AssessmentStatus::Submitted)
    }

    /// Whether votes may still be recorded in this status.
    pub fn is_editable(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One specification item's slot within an assessment: the vote plus side
/// annotations that never touch the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentEntry {
    pub item: SpecItemKey,
    pub vote: VoteValue,
    pub comment: String,
    /// Reviewer bookmark for later revisiting.
    pub bookmarked: bool,
    /// Flag raised for the lead reader's attention, with its reason.
    pub flag: Option<String>,
}

impl AssessmentEntry {
    fn new(item: SpecItemKey) -> Self {
        Self {
            item,
            vote: VoteValue::Unset,
            comment: String::new(),
            bookmarked: false,
            flag: None,
        }
    }
}

/// Derived progress counters over an assessment's entries.
///
/// Always computed from the entries, never stored, so the counters cannot
/// drift from the votes they summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AssessmentProgress {
    pub total: usize,
    pub reviewed: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub not_applicable: usize,
}

impl AssessmentProgress {
    pub fn is_fully_reviewed(&self) -> bool {
        self.reviewed == self.total
    }
}

/// One reviewer's assessment of one submission.
///
/// Created when the reviewer is assigned; mutated only through the methods
/// here; never deleted, only superseded by re-assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAssessment {
    pub submission_id: SubmissionId,
    pub reviewer: ActorId,
    pub status: AssessmentStatus,
    entries: Vec<AssessmentEntry>,
    pub recommendation: FinalRecommendation,
    /// Set when a re-assignment replaced this assessment.
    pub superseded: bool,
}

impl ReviewAssessment {
    /// Create a fresh assessment covering the given specification items, in
    /// catalog order.
    pub fn new(
        submission_id: impl Into<SubmissionId>,
        reviewer: impl Into<ActorId>,
        items: impl IntoIterator<Item = SpecItemKey>,
    ) -> Self {
        Self {
            submission_id: submission_id.into(),
            reviewer: reviewer.into(),
            status: AssessmentStatus::Assigned,
            entries: items.into_iter().map(AssessmentEntry::new).collect(),
            recommendation: FinalRecommendation::default(),
            superseded: false,
        }
    }

    pub fn entries(&self) -> &[AssessmentEntry] {
        &self.entries
    }

    pub fn entry(&self, item: &SpecItemKey) -> Option<&AssessmentEntry> {
        self.entries.iter().find(|e| &e.item == item)
    }

    fn entry_mut(&mut self, item: &SpecItemKey) -> Result<&mut AssessmentEntry, DomainError> {
        let id = item.to_string();
        self.entries
            .iter_mut()
            .find(|e| &e.item == item)
            .ok_or(DomainError::NotFound {
                entity: "specification item",
                id,
            })
    }

    pub fn is_submitted(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a vote on one specification item.
    ///
    /// Moves `Assigned -> InProgress` on the first vote; editing after the
    /// manual `Complete` marker reverts to `InProgress`. Submitted
    /// assessments reject further votes.
    pub fn record_vote(
        &mut self,
        item: &SpecItemKey,
        value: VoteValue,
        comment: impl Into<String>,
    ) -> Result<(), DomainError> {
        if !self.status.is_editable() {
            return Err(DomainError::invalid_transition(
                self.status,
                AssessmentStatus::InProgress,
            ));
        }

        let entry = self.entry_mut(item)?;
        entry.vote = value;
        entry.comment = comment.into();

        self.status = AssessmentStatus::InProgress;
        Ok(())
    }

    /// Manually mark the assessment done. Reversible: any further vote
    /// returns it to `InProgress`.
    pub fn mark_complete(&mut self) -> Result<(), DomainError> {
        match self.status {
            AssessmentStatus::Assigned | AssessmentStatus::InProgress => {
                self.status = AssessmentStatus::Complete;
                Ok(())
            }
            AssessmentStatus::Complete => Ok(()),
            AssessmentStatus::Submitted => Err(DomainError::invalid_transition(
                self.status,
                AssessmentStatus::Complete,
            )),
        }
    }

    /// Everything still blocking submission.
    pub fn incomplete(&self) -> IncompleteReview {
        IncompleteReview {
            unvoted_items: self
                .entries
                .iter()
                .filter(|e| !e.vote.is_set())
                .map(|e| e.item.clone())
                .collect(),
            missing_fields: self.recommendation.missing_fields(),
        }
    }

    /// Submit the assessment to the lead reader.
    ///
    /// Fails with [`DomainError::IncompleteReview`] listing every unvoted
    /// item and missing recommendation field. Success locks the assessment
    /// against further votes; submitting twice is an invalid transition.
    pub fn submit(&mut self) -> Result<(), DomainError> {
        if self.is_submitted() {
            return Err(DomainError::invalid_transition(
                self.status,
                AssessmentStatus::Submitted,
            ));
        }

        let incomplete = self.incomplete();
        if !incomplete.is_empty() {
            return Err(DomainError::IncompleteReview(incomplete));
        }

        self.status = AssessmentStatus::Submitted;
        Ok(())
    }

    /// Toggle the bookmark annotation. Returns the new bookmark state.
    pub fn toggle_bookmark(&mut self, item: &SpecItemKey) -> Result<bool, DomainError> {
        let entry = self.entry_mut(item)?;
        entry.bookmarked = !entry.bookmarked;
        Ok(entry.bookmarked)
    }

    /// Flag an item for the lead reader's attention.
    pub fn flag(&mut self, item: &SpecItemKey, reason: impl Into<String>) -> Result<(), DomainError> {
        let entry = self.entry_mut(item)?;
        entry.flag = Some(reason.into());
        Ok(())
    }

    /// Replace the final recommendation. Rejected once submitted.
    pub fn set_recommendation(
        &mut self,
        recommendation: FinalRecommendation,
    ) -> Result<(), DomainError> {
        if self.is_submitted() {
            return Err(DomainError::invalid_transition(
                self.status,
                AssessmentStatus::InProgress,
            ));
        }
        self.recommendation = recommendation;
        Ok(())
    }

    /// Derived progress counters.
    pub fn progress(&self) -> AssessmentProgress {
        let mut progress = AssessmentProgress {
            total: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            match entry.vote {
                VoteValue::Compliant => progress.compliant += 1,
                VoteValue::NonCompliant => progress.non_compliant += 1,
                VoteValue::NotApplicable => progress.not_applicable += 1,
                VoteValue::Unset => continue,
            }
            progress.reviewed += 1;
        }
        progress
    }

    /// Snapshot the recorded votes, reviewer attached, for aggregation.
    pub fn votes(&self) -> Vec<Vote> {
        self.entries
            .iter()
            .filter(|e| e.vote.is_set())
            .map(|e| Vote::new(self.reviewer.clone(), e.vote, e.comment.clone()))
            .collect()
    }

    /// The recorded vote for one item, if any.
    pub fn vote_for(&self, item: &SpecItemKey) -> Option<Vote> {
        self.entry(item)
            .filter(|e| e.vote.is_set())
            .map(|e| Vote::new(self.reviewer.clone(), e.vote, e.comment.clone()))
    }

    /// Mark this assessment as superseded by a re-assignment.
    pub fn supersede(&mut self) {
        self.superseded = true;
    }
}
