//! Submission entity: the document under review.
//!
//! The narrative content itself is external (file storage is a collaborator);
//! the core tracks identity, authorship, and the document lock, which is
//! mutated atomically with this record.

use crate::core::ids::{ActorId, SubmissionId};
use crate::lock::DocumentLock;
use serde::{Deserialize, Serialize};

/// A document submitted for accreditation review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    /// The submitting author; the only actor who can clear a sent-back state.
    pub author: ActorId,
    pub title: String,
    /// Single-writer guard over the narrative content.
    pub lock: DocumentLock,
}

impl Submission {
    pub fn new(
        id: impl Into<SubmissionId>,
        author: impl Into<ActorId>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            title: title.into(),
            lock: DocumentLock::Unlocked,
        }
    }
}
