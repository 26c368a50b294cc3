//! CLI entrypoint for accord
//!
//! Operational tooling around the review engine: inspect configuration,
//! validate the specification catalog, and drive a full review round against
//! in-memory adapters as a smoke check.

use anyhow::{anyhow, bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use accord_application::ports::catalog::{SpecItem, SpecificationCatalog, StaticCatalog};
use accord_infrastructure::{ConfigLoader, FileConfig, TomlCatalog};

mod scenario;

#[derive(Parser)]
#[command(name = "accord", version, about = "Accreditation review workflow engine")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Explicit configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip configuration files and use built-in defaults
    #[arg(long, global = true)]
    no_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show configuration sources and the merged result
    Config,
    /// Validate the specification catalog and list its items
    Catalog,
    /// Drive a full review round through the workflows, in memory
    Scenario {
        /// Number of readers on the panel
        #[arg(long, default_value_t = 3)]
        readers: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("invalid configuration: {}", e))?
    };

    match cli.command {
        Command::Config => {
            ConfigLoader::print_config_sources();
            println!();
            match &config.catalog.path {
                Some(path) => println!("Catalog:   {}", path.display()),
                None => println!("Catalog:   (not configured, built-in sample)"),
            }
            println!("Audit:     {}", if config.audit.enabled { "enabled" } else { "disabled" });
            if let Some(path) = &config.audit.log_path {
                println!("Audit log: {}", path.display());
            }
        }
        Command::Catalog => {
            let catalog = load_catalog(&config)?;
            let items = catalog.items();
            info!("Catalog loaded with {} items", items.len());
            for SpecItem { key, text } in &items {
                println!("{:<10} {}", key.to_string(), text);
            }
            println!();
            println!("{} items", items.len());
        }
        Command::Scenario { readers } => {
            if readers == 0 {
                bail!("a review panel needs at least one reader");
            }
            let catalog = load_catalog(&config)?;
            scenario::run(&config, catalog, readers).await?;
        }
    }

    Ok(())
}

/// Load the configured catalog, falling back to a small built-in sample so
/// the scenario command works out of the box.
fn load_catalog(config: &FileConfig) -> Result<Arc<dyn SpecificationCatalog>> {
    match &config.catalog.path {
        Some(path) => {
            let catalog = TomlCatalog::from_path(path)
                .map_err(|e| anyhow!("cannot load catalog {}: {}", path.display(), e))?;
            Ok(Arc::new(catalog))
        }
        None => Ok(Arc::new(StaticCatalog::new(sample_items()))),
    }
}

fn sample_items() -> Vec<SpecItem> {
    use accord_domain::SpecItemKey;

    [
        ("I", "I.1", "The program publishes a current mission statement."),
        ("I", "I.2", "Governance structures and bylaws are documented."),
        ("II", "II.1", "The curriculum covers the defined competencies."),
        ("II", "II.2", "Student assessment is mapped to outcomes."),
        ("III", "III.1", "Faculty credentials are on file and current."),
        ("III", "III.2", "Faculty development is planned and funded."),
    ]
    .into_iter()
    .map(|(standard, code, text)| SpecItem::new(SpecItemKey::new(standard, code), text))
    .collect()
}
