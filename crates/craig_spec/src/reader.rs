//! Configuration document reading utilities.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::document::ConfigDocument;
use crate::error::{SpecError, SpecResult};

/// Reader for configuration documents on disk.
pub struct DocumentReader;

impl DocumentReader {
    /// Read a document, choosing the parser from the file extension.
    ///
    /// `.json` files are parsed as JSON, `.yaml`/`.yml` as YAML.
    pub fn read(path: impl AsRef<Path>) -> SpecResult<ConfigDocument> {
        let path = path.as_ref();
        debug!("Reading configuration document from {:?}", path);

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let content = fs::read_to_string(path)?;
        let value: Value = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => return Err(SpecError::UnsupportedFormat(path.to_path_buf())),
        };

        ConfigDocument::from_value(value)
    }
}
