//! Project writer.
//!
//! Writes a [`FileMap`] under a directory: text entries become files, module
//! entries become subdirectories and absent entries are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{IacError, IacResult};
use crate::files::{FileMap, GeneratedFile};

/// Writes generated files under a project directory.
pub struct ProjectWriter {
    root: PathBuf,
}

impl ProjectWriter {
    /// Create a writer for `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write every present entry; returns the written paths in map order.
    pub fn write(&self, files: &FileMap) -> IacResult<Vec<PathBuf>> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(IacError::NotADirectory(self.root.clone()));
        }
        fs::create_dir_all(&self.root)?;
        info!("Writing project to {:?}", self.root);

        let mut written = Vec::new();
        for (name, file) in files.iter() {
            match file {
                GeneratedFile::Absent => debug!("Skipping absent {}", name),
                GeneratedFile::Text(text) => {
                    written.push(write_file(&self.root, name, text)?);
                }
                GeneratedFile::Module(module) => {
                    check_name(name)?;
                    let dir = self.root.join(name);
                    fs::create_dir_all(&dir)?;
                    for (sub_name, text) in module {
                        written.push(write_file(&dir, sub_name, text)?);
                    }
                }
            }
        }

        info!("Wrote {} files", written.len());
        Ok(written)
    }

    /// Every file currently under the project directory, sorted.
    pub fn list(&self) -> IacResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }
}

/// File names in the map are single path components.
fn check_name(name: &str) -> IacResult<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(_)), None) => Ok(()),
        _ => Err(IacError::InvalidFileName(name.to_string())),
    }
}

fn write_file(dir: &Path, name: &str, text: &str) -> IacResult<PathBuf> {
    check_name(name)?;
    let path = dir.join(name);
    debug!("Writing {:?}", path);
    fs::write(&path, text)?;
    Ok(path)
}
