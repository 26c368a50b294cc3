//! Application workflows
//!
//! Each workflow wires one part of the review process to its ports:
//! repositories for state, the notifier for fan-out, the catalog for the
//! specification items. All methods are short, synchronous state transitions
//! returning typed domain errors; nothing here spawns background work.

pub mod assessment;
pub mod change_request;
pub mod compilation;
pub mod lock;

use crate::ports::repository::RepositoryError;
use accord_domain::DomainError;

/// Translate a repository failure at a load/save site into the domain error
/// taxonomy: missing entities keep their identity, everything else is opaque.
pub(crate) fn repo_err(
    entity: &'static str,
    id: impl ToString,
) -> impl FnOnce(RepositoryError) -> DomainError {
    let id = id.to_string();
    move |error| match error {
        RepositoryError::NotFound(_) => DomainError::NotFound { entity, id },
        RepositoryError::Conflict(_) => {
            DomainError::Internal(format!("write conflict on {} {}", entity, id))
        }
        RepositoryError::Backend(message) => DomainError::Internal(message),
    }
}
