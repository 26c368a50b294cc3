//! Configuration loading (figment-based multi-source merge).

pub mod file_config;
pub mod loader;

pub use file_config::{AuditConfig, CatalogConfig, FileConfig};
pub use loader::ConfigLoader;
