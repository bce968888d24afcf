//! Error types for document validation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for validation operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors raised while reading or normalizing a configuration document.
///
/// Validation stops at the first error, so every variant describes exactly
/// one offending record and field.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Invalid configuration document: {0}")]
    InvalidDocument(String),

    #[error("Unsupported document format for file {0}")]
    UnsupportedFormat(PathBuf),

    #[error("{family} {record}: field `{field}` is missing from input")]
    MissingField {
        family: String,
        record: String,
        field: String,
    },

    #[error("{family} {record}: field `{field}` value is null")]
    NullValue {
        family: String,
        record: String,
        field: String,
    },

    #[error("{family} {record}: {field} references unknown {target} `{name}`")]
    UnknownReference {
        family: String,
        record: String,
        field: String,
        target: String,
        name: String,
    },

    #[error("{family} {record}: {field} `{key}` not found in key management instance `{kms}`")]
    KeyNotFound {
        family: String,
        record: String,
        field: String,
        key: String,
        kms: String,
    },

    #[error("{family} {record}: {kind} `{name}` is not in VPC `{vpc}`")]
    NotInVpc {
        family: String,
        record: String,
        kind: String,
        name: String,
        vpc: String,
    },

    #[error("{family}: duplicate name `{name}`")]
    DuplicateName { family: String, name: String },

    #[error("{family}: name `{name}` collides with `{other}` once converted to an address")]
    NameCollision {
        family: String,
        name: String,
        other: String,
    },

    #[error("{family} {record}: invalid value for `{field}`: {message}")]
    InvalidValue {
        family: String,
        record: String,
        field: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpecError {
    pub fn missing(family: &str, record: &str, field: &str) -> Self {
        SpecError::MissingField {
            family: family.to_string(),
            record: record.to_string(),
            field: field.to_string(),
        }
    }

    pub fn null(family: &str, record: &str, field: &str) -> Self {
        SpecError::NullValue {
            family: family.to_string(),
            record: record.to_string(),
            field: field.to_string(),
        }
    }

    pub fn unknown(family: &str, record: &str, field: &str, target: &str, name: &str) -> Self {
        SpecError::UnknownReference {
            family: family.to_string(),
            record: record.to_string(),
            field: field.to_string(),
            target: target.to_string(),
            name: name.to_string(),
        }
    }

    pub fn invalid(family: &str, record: &str, field: &str, message: impl Into<String>) -> Self {
        SpecError::InvalidValue {
            family: family.to_string(),
            record: record.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}
