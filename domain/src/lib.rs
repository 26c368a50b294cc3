//! Domain layer for accord
//!
//! This crate contains the core business logic, entities, and value objects
//! of the review workflow. It has no dependencies on infrastructure or
//! transport concerns.
//!
//! # Core Concepts
//!
//! ## Assessment
//!
//! Each assigned reader assesses a submission independently: one categorical
//! vote per specification item plus a final narrative recommendation.
//! Submission is gated: every item voted, every recommendation field filled.
//!
//! ## Compilation
//!
//! The lead reader compiles all submitted assessments: votes are aggregated
//! per item into a consensus with disagreement detection, and the lead reader
//! may override any consensus with an explicit final determination.
//!
//! ## Document Lock
//!
//! A single-writer lock serializes edits to the submission across roles, with
//! an escalated release for lead readers and admins and a distinct
//! "sent back for correction" state only the author can clear.
//!
//! ## Dual Approval
//!
//! Out-of-band change requests need both the lead reader and the coordinator
//! to agree; either one's denial is final.

pub mod approval;
pub mod assessment;
pub mod compilation;
pub mod core;
pub mod lock;
pub mod submission;
pub mod vote;

// Re-export commonly used types
pub use approval::{
    ApprovalDecision, ApprovalParty, ApprovalSlot, ApprovalStatus, ChangeRequest,
    ChangeRequestKind,
};
pub use assessment::{
    AssessmentEntry, AssessmentProgress, AssessmentStatus, FinalRecommendation,
    RecommendationCategory, ReviewAssessment,
};
pub use compilation::{
    Compilation, CompilationStatus, CompilationSummary, CompiledItem, ComplianceStatistics,
    ReviewerRecommendation,
};
pub use crate::core::error::{DomainError, IncompleteCompilation, IncompleteReview};
pub use crate::core::identity::{IdentityContext, Role};
pub use crate::core::ids::{ActorId, ChangeRequestId, SpecItemKey, SubmissionId};
pub use lock::{DocumentLock, LockReason};
pub use submission::Submission;
pub use vote::{aggregate, AggregatedVotes, Vote, VoteCounts, VoteValue};
