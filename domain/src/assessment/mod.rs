//! Per-reviewer assessment: the state machine from assignment to submission.

pub mod entities;
pub mod recommendation;

pub use entities::{AssessmentEntry, AssessmentProgress, AssessmentStatus, ReviewAssessment};
pub use recommendation::{FinalRecommendation, RecommendationCategory};
