//! CLI command definitions.
//!
//! `validate` normalizes configuration documents; `generate` normalizes them
//! and writes the Terraform project for each.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use craig_spec::{normalize, DocumentReader, NormalizedDocument};

pub mod generate;
pub mod validate;

/// craig - cloud configuration to Terraform generator
#[derive(Parser)]
#[command(name = "craig")]
#[command(version, about = "craig - cloud configuration to Terraform generator")]
#[command(long_about = r#"
craig validates a cloud configuration document (JSON or YAML) and generates
the Terraform project describing it.

WORKFLOWS:
  validate  → Normalize documents and report the first error of each
  generate  → Normalize documents and write their Terraform projects

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  5 - IaC error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and normalize configuration documents
    Validate(validate::ValidateArgs),

    /// Generate Terraform from configuration documents
    Generate(generate::GenerateArgs),
}

/// Read and normalize one document.
pub fn load(path: &Path) -> Result<NormalizedDocument> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    debug!("Loading {:?}", path);
    let document = DocumentReader::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let normalized =
        normalize(document).with_context(|| format!("Validation failed for {}", path.display()))?;
    Ok(normalized)
}

/// Normalize every input on the blocking pool; results keep input order.
pub async fn load_all(inputs: &[PathBuf]) -> Vec<(PathBuf, Result<NormalizedDocument>)> {
    let handles: Vec<_> = inputs
        .iter()
        .cloned()
        .map(|path| {
            tokio::task::spawn_blocking(move || {
                let result = load(&path);
                (path, result)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (handle, input) in handles.into_iter().zip(inputs) {
        match handle.await {
            Ok(loaded) => results.push(loaded),
            Err(e) => results.push((input.clone(), Err(anyhow::Error::new(e)))),
        }
    }
    results
}
