//! Final recommendation of a single reviewer.

use serde::{Deserialize, Serialize};

/// Overall recommendation category for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    /// Grant accreditation.
    Accredit,
    /// Grant accreditation contingent on named corrections.
    AccreditWithConditions,
    /// Defer the decision pending further evidence.
    Defer,
    /// Deny accreditation.
    Deny,
}

impl RecommendationCategory {
    pub fn as_str(&self) -> &str {
        match self {
            RecommendationCategory::Accredit => "accredit",
            RecommendationCategory::AccreditWithConditions => "accredit_with_conditions",
            RecommendationCategory::Defer => "defer",
            RecommendationCategory::Deny => "deny",
        }
    }
}

impl std::fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RecommendationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accredit" => Ok(RecommendationCategory::Accredit),
            "accredit_with_conditions" => Ok(RecommendationCategory::AccreditWithConditions),
            "defer" => Ok(RecommendationCategory::Defer),
            "deny" => Ok(RecommendationCategory::Deny),
            _ => Err(format!(
                "Unknown recommendation: {}. Valid: accredit, accredit_with_conditions, defer, deny",
                s
            )),
        }
    }
}

/// A reviewer's final narrative recommendation.
///
/// All three parts must be populated before the assessment can be submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FinalRecommendation {
    /// Narrative strengths of the submission.
    pub strengths: String,
    /// Narrative weaknesses of the submission.
    pub weaknesses: String,
    /// Overall recommendation category.
    pub category: Option<RecommendationCategory>,
}

impl FinalRecommendation {
    pub fn new(
        strengths: impl Into<String>,
        weaknesses: impl Into<String>,
        category: RecommendationCategory,
    ) -> Self {
        Self {
            strengths: strengths.into(),
            weaknesses: weaknesses.into(),
            category: Some(category),
        }
    }

    /// Names of the fields still empty, for actionable error messages.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.strengths.trim().is_empty() {
            missing.push("strengths".to_string());
        }
        if self.weaknesses.trim().is_empty() {
            missing.push("weaknesses".to_string());
        }
        if self.category.is_none() {
            missing.push("recommendation".to_string());
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
