//! Vote primitives for specification-item assessment.

use crate::core::ids::ActorId;
use serde::{Deserialize, Serialize};

/// Categorical judgment of one specification item by one reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoteValue {
    /// The submission meets this specification.
    Compliant,
    /// The submission does not meet this specification.
    NonCompliant,
    /// This specification does not apply to the submission.
    NotApplicable,
    /// No judgment recorded yet.
    #[default]
    Unset,
}

impl VoteValue {
    pub fn as_str(&self) -> &str {
        match self {
            VoteValue::Compliant => "compliant",
            VoteValue::NonCompliant => "non_compliant",
            VoteValue::NotApplicable => "not_applicable",
            VoteValue::Unset => "unset",
        }
    }

    /// Whether a judgment has been recorded.
    pub fn is_set(&self) -> bool {
        !matches!(self, VoteValue::Unset)
    }
}

impl std::fmt::Display for VoteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VoteValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compliant" => Ok(VoteValue::Compliant),
            "non_compliant" | "noncompliant" => Ok(VoteValue::NonCompliant),
            "not_applicable" | "na" | "n/a" => Ok(VoteValue::NotApplicable),
            "unset" => Ok(VoteValue::Unset),
            _ => Err(format!(
                "Unknown vote value: {}. Valid: compliant, non_compliant, not_applicable, unset",
                s
            )),
        }
    }
}

/// A single reviewer's vote on one specification item.
///
/// Owned by exactly one assessment. When a compilation aggregates votes it
/// takes copies; the compiled copy may later diverge from the original
/// through a lead reader's final determination.
///
/// # Example
///
/// ```
/// use accord_domain::vote::Vote;
///
/// let vote = Vote::compliant("reader-1", "Evidence on p. 12 covers this.");
/// assert!(vote.value.is_set());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// Reviewer who cast the vote.
    pub reviewer: ActorId,
    /// The categorical judgment.
    pub value: VoteValue,
    /// Free-text justification or observation.
    pub comment: String,
}

impl Vote {
    pub fn new(
        reviewer: impl Into<ActorId>,
        value: VoteValue,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            reviewer: reviewer.into(),
            value,
            comment: comment.into(),
        }
    }

    /// Create a compliant vote.
    pub fn compliant(reviewer: impl Into<ActorId>, comment: impl Into<String>) -> Self {
        Self::new(reviewer, VoteValue::Compliant, comment)
    }

    /// Create a non-compliant vote.
    pub fn non_compliant(reviewer: impl Into<ActorId>, comment: impl Into<String>) -> Self {
        Self::new(reviewer, VoteValue::NonCompliant, comment)
    }

    /// Create a not-applicable vote.
    pub fn not_applicable(reviewer: impl Into<ActorId>, comment: impl Into<String>) -> Self {
        Self::new(reviewer, VoteValue::NotApplicable, comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_creation() {
        let vote = Vote::non_compliant("reader-2", "Policy document is missing.");
        assert_eq!(vote.value, VoteValue::NonCompliant);
        assert_eq!(vote.reviewer.as_str(), "reader-2");
        assert_eq!(vote.comment, "Policy document is missing.");
    }

    #[test]
    fn test_unset_is_not_set() {
        assert!(!VoteValue::Unset.is_set());
        assert!(VoteValue::Compliant.is_set());
        assert!(VoteValue::NotApplicable.is_set());
    }

    #[test]
    fn test_parse_vote_value() {
        assert_eq!("compliant".parse::<VoteValue>().ok(), Some(VoteValue::Compliant));
        assert_eq!(
            "non_compliant".parse::<VoteValue>().ok(),
            Some(VoteValue::NonCompliant)
        );
        assert_eq!("n/a".parse::<VoteValue>().ok(), Some(VoteValue::NotApplicable));
        assert!("maybe".parse::<VoteValue>().is_err());
    }

    #[test]
    fn test_default_is_unset() {
        assert_eq!(VoteValue::default(), VoteValue::Unset);
    }
}
