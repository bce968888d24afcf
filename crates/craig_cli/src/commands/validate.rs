//! Validate command - Normalize configuration documents.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::load_all;

#[derive(Args)]
pub struct ValidateArgs {
    /// Configuration documents (.json, .yaml or .yml)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

pub async fn execute(args: ValidateArgs) -> Result<()> {
    info!("Validating {} document(s)", args.inputs.len());

    let mut first_error = None;
    for (path, result) in load_all(&args.inputs).await {
        match result {
            Ok(doc) => {
                println!(
                    "✅ {} is valid (prefix `{}`)",
                    path.display(),
                    doc.options().prefix
                );
            }
            Err(e) => {
                println!("❌ {}: {:#}", path.display(), e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
