//! Specification catalog port
//!
//! The catalog text is maintained outside the core; workflows only need the
//! ordered list of gradable items.

use accord_domain::SpecItemKey;
use serde::{Deserialize, Serialize};

/// One gradable specification item: its key plus the display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecItem {
    pub key: SpecItemKey,
    pub text: String,
}

impl SpecItem {
    pub fn new(key: SpecItemKey, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
        }
    }
}

/// Read-only access to the specification catalog, in catalog order.
pub trait SpecificationCatalog: Send + Sync {
    fn items(&self) -> Vec<SpecItem>;

    fn keys(&self) -> Vec<SpecItemKey> {
        self.items().into_iter().map(|i| i.key).collect()
    }

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// Fixed in-memory catalog, for tests and embedded defaults.
pub struct StaticCatalog {
    items: Vec<SpecItem>,
}

impl StaticCatalog {
    pub fn new(items: Vec<SpecItem>) -> Self {
        Self { items }
    }

    /// Build a catalog from bare keys with empty text.
    pub fn from_keys(keys: impl IntoIterator<Item = SpecItemKey>) -> Self {
        Self {
            items: keys.into_iter().map(|k| SpecItem::new(k, "")).collect(),
        }
    }
}

impl SpecificationCatalog for StaticCatalog {
    fn items(&self) -> Vec<SpecItem> {
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_catalog_preserves_order() {
        let catalog = StaticCatalog::from_keys(vec![
            SpecItemKey::new("II", "II.2"),
            SpecItemKey::new("I", "I.1"),
        ]);

        // Catalog order, not sorted order
        assert_eq!(
            catalog.keys(),
            vec![SpecItemKey::new("II", "II.2"), SpecItemKey::new("I", "I.1")]
        );
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
    }
}
