//! Error types for IaC generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while writing a generated project.
///
/// Generation itself never fails: unresolved references are rendered as
/// sentinel text instead.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Output path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid file name in output map: {0}")]
    InvalidFileName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}
