//! Specification catalog adapters.

pub mod toml_catalog;

pub use toml_catalog::{CatalogError, TomlCatalog};
