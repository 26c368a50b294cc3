//! Configuration file schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration, merged from defaults and TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub catalog: CatalogConfig,
    pub audit: AuditConfig,
}

/// Where the specification catalog lives.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the catalog TOML file.
    pub path: Option<PathBuf>,
}

/// Audit-trail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Whether review events are appended to the audit log.
    pub enabled: bool,
    /// Path of the JSONL audit log.
    pub log_path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert!(config.catalog.path.is_none());
        assert!(config.audit.enabled);
        assert!(config.audit.log_path.is_none());
    }
}
