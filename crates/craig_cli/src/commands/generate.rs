//! Generate command - Write Terraform projects.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use craig_iac::{generate_with_config, FileMap, GeneratorConfig, ProjectWriter};

use super::load_all;

#[derive(Args)]
pub struct GenerateArgs {
    /// Configuration documents (.json, .yaml or .yml)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory; one subdirectory per input when several are given
    #[arg(short, long, env = "CRAIG_OUTPUT_DIR", default_value = "terraform")]
    output: PathBuf,

    /// Generator configuration file (TOML)
    #[arg(short, long, env = "CRAIG_CONFIG")]
    config: Option<PathBuf>,

    /// Print the file map as JSON instead of writing files
    #[arg(long)]
    print: bool,
}

/// Generator configuration from a TOML file, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let Some(path) = path else {
        return Ok(GeneratorConfig::default());
    };
    debug!("Loading generator configuration from {:?}", path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Invalid generator configuration argument {}", path.display()))?;
    Ok(config)
}

/// Directory for one input: the output directory itself for a single input,
/// otherwise a subdirectory named after the input's file stem.
fn target_dir(output: &Path, input: &Path, multiple: bool) -> PathBuf {
    if !multiple {
        return output.to_path_buf();
    }
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "craig".to_string());
    output.join(stem)
}

fn emit(files: &FileMap, dir: &Path, print: bool) -> Result<()> {
    if print {
        println!("{}", serde_json::to_string_pretty(files)?);
        return Ok(());
    }
    let written = ProjectWriter::new(dir)
        .write(files)
        .with_context(|| format!("Failed to write IaC project to {}", dir.display()))?;
    println!("✅ Wrote {} files to {}", written.len(), dir.display());
    Ok(())
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let multiple = args.inputs.len() > 1;
    info!("Generating {} project(s)", args.inputs.len());

    for (path, result) in load_all(&args.inputs).await {
        let doc = result?;
        let generator_config = config.clone();
        let files = tokio::task::spawn_blocking(move || generate_with_config(&doc, &generator_config))
            .await
            .context("Generation task failed")?;
        emit(&files, &target_dir(&args.output, &path, multiple), args.print)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_from_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("craig.toml");
        fs::write(&path, "provider_version = \"1.62.0\"\n").unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.provider_version, "1.62.0");
        assert_eq!(config.ibmcloud_timeout, 60);
        assert_eq!(load_config(None).unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_target_dir_per_input() {
        let output = Path::new("out");
        assert_eq!(target_dir(output, Path::new("a/dev.json"), false), PathBuf::from("out"));
        assert_eq!(
            target_dir(output, Path::new("a/dev.json"), true),
            PathBuf::from("out").join("dev")
        );
    }
}
