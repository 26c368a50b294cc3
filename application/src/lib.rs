//! Application layer for accord
//!
//! This crate contains the review workflows and the port definitions their
//! adapters implement. It depends only on the domain layer.

pub mod ports;
pub mod workflows;

// Re-export commonly used types
pub use ports::{
    catalog::{SpecItem, SpecificationCatalog, StaticCatalog},
    notifier::{EventType, NoNotifier, Notifier, ReviewEvent},
    repository::{
        AssessmentRepository, ChangeRequestRepository, CompilationRepository, RepositoryError,
        SubmissionRepository,
    },
};
pub use workflows::{
    assessment::AssessmentWorkflow, change_request::ChangeRequestWorkflow,
    compilation::CompilationWorkflow, lock::LockWorkflow,
};
