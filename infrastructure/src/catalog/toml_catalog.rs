//! TOML-backed specification catalog.
//!
//! Catalog files group items under their standard:
//!
//! ```toml
//! [[standard]]
//! code = "I"
//! title = "Mission and Governance"
//!
//! [[standard.item]]
//! code = "I.1"
//! text = "The program publishes a mission statement..."
//! ```

use accord_application::ports::catalog::{SpecItem, SpecificationCatalog};
use accord_domain::SpecItemKey;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a catalog file.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("cannot read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse catalog file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid catalog: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    standard: Vec<StandardSection>,
}

#[derive(Debug, Deserialize)]
struct StandardSection {
    code: String,
    #[serde(default)]
    #[allow(dead_code)]
    title: String,
    #[serde(default, rename = "item")]
    items: Vec<ItemSection>,
}

#[derive(Debug, Deserialize)]
struct ItemSection {
    code: String,
    text: String,
}

/// Specification catalog loaded from a TOML file.
#[derive(Debug)]
pub struct TomlCatalog {
    items: Vec<SpecItem>,
    path: Option<PathBuf>,
}

impl TomlCatalog {
    /// Load and validate a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut catalog = Self::from_toml(&raw)?;
        catalog.path = Some(path.to_path_buf());
        Ok(catalog)
    }

    /// Parse and validate catalog TOML.
    pub fn from_toml(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;

        let mut items = Vec::new();
        let mut seen = HashSet::new();
        for standard in &file.standard {
            if standard.code.trim().is_empty() {
                return Err(CatalogError::Invalid("standard with empty code".to_string()));
            }
            for item in &standard.items {
                let key = SpecItemKey::new(standard.code.clone(), item.code.clone());
                if !seen.insert(key.clone()) {
                    return Err(CatalogError::Invalid(format!("duplicate item {}", key)));
                }
                items.push(SpecItem::new(key, item.text.clone()));
            }
        }

        if items.is_empty() {
            return Err(CatalogError::Invalid("catalog has no items".to_string()));
        }

        Ok(Self { items, path: None })
    }

    /// Source path, when loaded from a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl SpecificationCatalog for TomlCatalog {
    fn items(&self) -> Vec<SpecItem> {
        self.items.clone()
    }
}
