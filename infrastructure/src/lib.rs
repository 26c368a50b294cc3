//! Infrastructure layer for accord
//!
//! Adapters implementing the application layer's ports: in-memory
//! repositories with compare-and-swap lock updates, the TOML specification
//! catalog, notifier sinks, and configuration loading.

pub mod catalog;
pub mod config;
pub mod notify;
pub mod persistence;

// Re-export commonly used types
pub use catalog::{CatalogError, TomlCatalog};
pub use config::{ConfigLoader, FileConfig};
pub use notify::{FanoutNotifier, JsonlNotifier, TracingNotifier};
pub use persistence::InMemoryStore;
