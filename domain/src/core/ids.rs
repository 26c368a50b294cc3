//! Core identifier value objects.
//!
//! All cross-aggregate relationships are id-based: entities store these keys
//! and resolve them through repositories at the edges, never through live
//! object references.

use serde::{Deserialize, Serialize};

/// Unique identifier for an actor (author, reader, coordinator, admin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Creates an ActorId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ActorId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a submission under review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for SubmissionId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a change request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangeRequestId(String);

impl ChangeRequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ChangeRequestId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ChangeRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of one gradable specification item: a standard/spec code pair.
///
/// The item text itself lives in the specification catalog; the rest of the
/// system only ever handles keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecItemKey {
    /// Code of the accreditation standard (e.g., "II").
    pub standard_code: String,
    /// Code of the specification within the standard (e.g., "II.3").
    pub spec_code: String,
}

impl SpecItemKey {
    pub fn new(standard_code: impl Into<String>, spec_code: impl Into<String>) -> Self {
        Self {
            standard_code: standard_code.into(),
            spec_code: spec_code.into(),
        }
    }
}

impl std::fmt::Display for SpecItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.standard_code, self.spec_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_roundtrip() {
        let id = ActorId::new("reader-1");
        assert_eq!(id.as_str(), "reader-1");
        assert_eq!(id.to_string(), "reader-1");
    }

    #[test]
    fn test_spec_item_key_display() {
        let key = SpecItemKey::new("II", "II.3");
        assert_eq!(key.to_string(), "II/II.3");
    }

    #[test]
    fn test_spec_item_key_ordering() {
        let a = SpecItemKey::new("I", "I.1");
        let b = SpecItemKey::new("I", "I.2");
        let c = SpecItemKey::new("II", "II.1");
        assert!(a < b);
        assert!(b < c);
    }
}
