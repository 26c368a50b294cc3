//! Vote aggregation: turning a panel's independent votes into a consensus.
//!
//! Aggregation is a pure function of the vote multiset. Re-running it on the
//! same votes always yields the same consensus and disagreement flag; there
//! is no hidden ordering dependence.
//!
//! # Tie-break policy
//!
//! When two or more categories tie for the maximum count, the winner is the
//! highest-ranked category in the fixed order
//! `NonCompliant > Compliant > NotApplicable`. The conservative bias ensures
//! a split panel surfaces a possible finding rather than quietly passing the
//! item; the lead reader resolves the tie explicitly via a final
//! determination. This ordering is a product decision, pinned by tests.

use super::ballot::{Vote, VoteValue};
use serde::{Deserialize, Serialize};

/// Categories eligible to win a consensus, in tie-break preference order.
const PREFERENCE: [VoteValue; 3] = [
    VoteValue::NonCompliant,
    VoteValue::Compliant,
    VoteValue::NotApplicable,
];

/// Per-category tally of recorded votes. `Unset` votes are never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VoteCounts {
    pub compliant: usize,
    pub non_compliant: usize,
    pub not_applicable: usize,
}

impl VoteCounts {
    /// Tally the recorded (non-`Unset`) votes.
    pub fn tally<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut counts = Self::default();
        for vote in votes {
            match vote.value {
                VoteValue::Compliant => counts.compliant += 1,
                VoteValue::NonCompliant => counts.non_compliant += 1,
                VoteValue::NotApplicable => counts.not_applicable += 1,
                VoteValue::Unset => {}
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.compliant + self.non_compliant + self.not_applicable
    }

    pub fn for_value(&self, value: VoteValue) -> usize {
        match value {
            VoteValue::Compliant => self.compliant,
            VoteValue::NonCompliant => self.non_compliant,
            VoteValue::NotApplicable => self.not_applicable,
            VoteValue::Unset => 0,
        }
    }

    /// Number of distinct categories with at least one vote.
    pub fn distinct_categories(&self) -> usize {
        PREFERENCE.iter().filter(|v| self.for_value(**v) > 0).count()
    }
}

/// Result of aggregating one specification item's votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedVotes {
    /// Winning category, or `None` when no votes were recorded.
    pub consensus: Option<VoteValue>,
    /// True iff at least two distinct categories were voted.
    pub has_disagreement: bool,
    /// Per-category tallies behind the consensus.
    pub counts: VoteCounts,
}

impl AggregatedVotes {
    /// Whether every recorded vote landed in the same category.
    pub fn is_unanimous(&self) -> bool {
        self.counts.total() > 0 && !self.has_disagreement
    }
}

/// Aggregate a panel's votes on one specification item.
///
/// # Example
///
/// ```
/// use accord_domain::vote::{aggregate, Vote, VoteValue};
///
/// let votes = vec![
///     Vote::compliant("reader-1", "Covered in section 2."),
///     Vote::compliant("reader-2", "Agreed."),
///     Vote::non_compliant("reader-3", "Evidence is outdated."),
/// ];
///
/// let result = aggregate(&votes);
/// assert_eq!(result.consensus, Some(VoteValue::Compliant));
/// assert!(result.has_disagreement);
/// ```
pub fn aggregate(votes: &[Vote]) -> AggregatedVotes {
    let counts = VoteCounts::tally(votes);

    if counts.total() == 0 {
        return AggregatedVotes {
            consensus: None,
            has_disagreement: false,
            counts,
        };
    }

    let max = PREFERENCE
        .iter()
        .map(|v| counts.for_value(*v))
        .max()
        .unwrap_or(0);

    // First category in preference order holding the maximum wins; ties fall
    // to the more conservative category.
    let consensus = PREFERENCE
        .iter()
        .copied()
        .find(|v| counts.for_value(*v) == max);

    AggregatedVotes {
        consensus,
        has_disagreement: counts.distinct_categories() > 1,
        counts,
    }
}
