//! Compilation aggregate: the lead reader's rollup of all submitted
//! assessments for one submission.

use super::statistics::ComplianceStatistics;
use crate::assessment::recommendation::RecommendationCategory;
use crate::core::error::{DomainError, IncompleteCompilation};
use crate::core::ids::{ActorId, SpecItemKey, SubmissionId};
use crate::vote::{aggregate, Vote, VoteCounts, VoteValue};
use serde::{Deserialize, Serialize};

/// Status of a compilation. Transitions are forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompilationStatus {
    /// Being assembled by the lead reader.
    #[default]
    InProgress,
    /// Marked done by the lead reader; still editable.
    Complete,
    /// Submitted as the panel's determination.
    Submitted,
    /// Accepted by the decision body.
    Approved,
}

impl CompilationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CompilationStatus::InProgress => "in_progress",
            CompilationStatus::Complete => "complete",
            CompilationStatus::Submitted => "submitted",
            CompilationStatus::Approved => "approved",
        }
    }

    /// Whether items and determinations may still be edited.
    pub fn is_editable(&self) -> bool {
        matches!(self, CompilationStatus::InProgress | CompilationStatus::Complete)
    }
}

impl std::fmt::Display for CompilationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One specification item within the compilation: the immutable vote
/// snapshot, the computed consensus, and the lead reader's optional override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledItem {
    pub item: SpecItemKey,
    /// Snapshot of the panel's votes at the last aggregation.
    pub votes: Vec<Vote>,
    /// Majority category computed from the snapshot.
    pub consensus: Option<VoteValue>,
    /// True iff the panel split across categories.
    pub has_disagreement: bool,
    pub counts: VoteCounts,
    /// Lead reader's explicit override; wins over `consensus` everywhere
    /// downstream once set.
    pub final_determination: Option<VoteValue>,
    pub lead_reader_notes: Option<String>,
}

impl CompiledItem {
    /// Build an item by aggregating a vote snapshot.
    pub fn from_votes(item: SpecItemKey, votes: Vec<Vote>) -> Self {
        let result = aggregate(&votes);
        Self {
            item,
            votes,
            consensus: result.consensus,
            has_disagreement: result.has_disagreement,
            counts: result.counts,
            final_determination: None,
            lead_reader_notes: None,
        }
    }

    /// Replace the vote snapshot and recompute the consensus, preserving any
    /// final determination and lead reader notes.
    pub fn refresh(&mut self, votes: Vec<Vote>) {
        let result = aggregate(&votes);
        self.votes = votes;
        self.consensus = result.consensus;
        self.has_disagreement = result.has_disagreement;
        self.counts = result.counts;
    }

    /// The determination used downstream: override first, consensus second.
    pub fn determination(&self) -> Option<VoteValue> {
        self.final_determination.or(self.consensus)
    }

    /// Compiled reviewer comments, one per non-empty vote comment.
    pub fn comments(&self) -> Vec<&str> {
        self.votes
            .iter()
            .filter(|v| !v.comment.trim().is_empty())
            .map(|v| v.comment.as_str())
            .collect()
    }
}

/// One submitted reviewer's final recommendation, carried into the rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerRecommendation {
    pub reviewer: ActorId,
    pub category: RecommendationCategory,
    pub strengths: String,
    pub weaknesses: String,
}

/// The compilation's final summary, written by the lead reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CompilationSummary {
    pub strengths: String,
    pub weaknesses: String,
    pub overall: Option<RecommendationCategory>,
}

impl CompilationSummary {
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.strengths.trim().is_empty() {
            missing.push("strengths".to_string());
        }
        if self.weaknesses.trim().is_empty() {
            missing.push("weaknesses".to_string());
        }
        if self.overall.is_none() {
            missing.push("overall recommendation".to_string());
        }
        missing
    }
}

/// The aggregated decision document for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compilation {
    pub submission_id: SubmissionId,
    pub status: CompilationStatus,
    items: Vec<CompiledItem>,
    /// One entry per submitted assessment with a populated recommendation.
    pub recommendations: Vec<ReviewerRecommendation>,
    pub summary: CompilationSummary,
}

impl Compilation {
    pub fn new(submission_id: impl Into<SubmissionId>) -> Self {
        Self {
            submission_id: submission_id.into(),
            status: CompilationStatus::InProgress,
            items: Vec::new(),
            recommendations: Vec::new(),
            summary: CompilationSummary::default(),
        }
    }

    pub fn items(&self) -> &[CompiledItem] {
        &self.items
    }

    pub fn item(&self, key: &SpecItemKey) -> Option<&CompiledItem> {
        self.items.iter().find(|i| &i.item == key)
    }

    fn require_editable(&self) -> Result<(), DomainError> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(
                self.status,
                CompilationStatus::InProgress,
            ))
        }
    }

    /// Upsert one item's vote snapshot.
    ///
    /// Refreshing is additive: an existing item keeps its final
    /// determination and lead reader notes; a new item is appended in call
    /// order (the caller iterates the catalog, so items land in catalog
    /// order).
    pub fn upsert_item(
        &mut self,
        key: SpecItemKey,
        votes: Vec<Vote>,
    ) -> Result<(), DomainError> {
        self.require_editable()?;
        match self.items.iter_mut().find(|i| i.item == key) {
            Some(existing) => existing.refresh(votes),
            None => self.items.push(CompiledItem::from_votes(key, votes)),
        }
        Ok(())
    }

    /// Replace the cross-reviewer recommendation roster.
    pub fn set_recommendations(
        &mut self,
        recommendations: Vec<ReviewerRecommendation>,
    ) -> Result<(), DomainError> {
        self.require_editable()?;
        self.recommendations = recommendations;
        Ok(())
    }

    /// Record the lead reader's final determination for one item.
    pub fn set_final_determination(
        &mut self,
        key: &SpecItemKey,
        value: VoteValue,
        notes: Option<String>,
    ) -> Result<(), DomainError> {
        self.require_editable()?;
        let id = key.to_string();
        let item = self
            .items
            .iter_mut()
            .find(|i| &i.item == key)
            .ok_or(DomainError::NotFound {
                entity: "compiled item",
                id,
            })?;
        item.final_determination = Some(value);
        if notes.is_some() {
            item.lead_reader_notes = notes;
        }
        Ok(())
    }

    /// Copy the consensus into the final-determination slot for every item
    /// that has a consensus and no manual override yet. Returns how many
    /// items were written.
    pub fn adopt_consensus(&mut self) -> Result<usize, DomainError> {
        self.require_editable()?;
        let mut written = 0;
        for item in &mut self.items {
            if item.final_determination.is_none() {
                if let Some(consensus) = item.consensus {
                    item.final_determination = Some(consensus);
                    written += 1;
                }
            }
        }
        Ok(written)
    }

    /// Replace the final summary.
    pub fn set_summary(&mut self, summary: CompilationSummary) -> Result<(), DomainError> {
        self.require_editable()?;
        self.summary = summary;
        Ok(())
    }

    /// Items where the panel split, for the lead reader to inspect.
    pub fn disagreements(&self) -> impl Iterator<Item = &CompiledItem> {
        self.items.iter().filter(|i| i.has_disagreement)
    }

    pub fn statistics(&self) -> ComplianceStatistics {
        ComplianceStatistics::from_items(&self.items)
    }

    /// Everything still blocking submission.
    pub fn incomplete(&self) -> IncompleteCompilation {
        IncompleteCompilation {
            undetermined_items: self
                .items
                .iter()
                .filter(|i| i.determination().is_none())
                .map(|i| i.item.clone())
                .collect(),
            missing_fields: self.summary.missing_fields(),
        }
    }

    /// Manually mark the compilation done; still editable.
    pub fn mark_complete(&mut self) -> Result<(), DomainError> {
        match self.status {
            CompilationStatus::InProgress | CompilationStatus::Complete => {
                self.status = CompilationStatus::Complete;
                Ok(())
            }
            _ => Err(DomainError::invalid_transition(
                self.status,
                CompilationStatus::Complete,
            )),
        }
    }

    /// Submit the compiled determination.
    ///
    /// Fails with [`DomainError::IncompleteCompilation`] unless every item
    /// has a determination and the summary is fully populated.
    pub fn submit(&mut self) -> Result<(), DomainError> {
        if !self.status.is_editable() {
            return Err(DomainError::invalid_transition(
                self.status,
                CompilationStatus::Submitted,
            ));
        }

        let incomplete = self.incomplete();
        if !incomplete.is_empty() {
            return Err(DomainError::IncompleteCompilation(incomplete));
        }

        self.status = CompilationStatus::Submitted;
        Ok(())
    }

    /// Accept the submitted compilation.
    pub fn approve(&mut self) -> Result<(), DomainError> {
        if self.status != CompilationStatus::Submitted {
            return Err(DomainError::invalid_transition(
                self.status,
                CompilationStatus::Approved,
            ));
        }
        self.status = CompilationStatus::Approved;
        Ok(())
    }
}
