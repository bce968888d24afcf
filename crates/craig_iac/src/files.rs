//! Generated file map.

use std::collections::BTreeMap;

use serde::Serialize;

/// One entry of the output map.
///
/// `Absent` serializes as `null` and means "do not write this file".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GeneratedFile {
    Absent,
    Text(String),
    Module(BTreeMap<String, String>),
}

impl GeneratedFile {
    pub fn from_option(text: Option<String>) -> Self {
        match text {
            Some(text) => GeneratedFile::Text(text),
            None => GeneratedFile::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, GeneratedFile::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            GeneratedFile::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            GeneratedFile::Module(files) => Some(files),
            _ => None,
        }
    }
}

/// Named output files, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileMap {
    files: BTreeMap<String, GeneratedFile>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, file: GeneratedFile) {
        self.files.insert(name.into(), file);
    }

    pub fn get(&self, name: &str) -> Option<&GeneratedFile> {
        self.files.get(name)
    }

    /// Text of a top-level file, `None` when absent or missing.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(GeneratedFile::as_text)
    }

    /// Files of a sub-module.
    pub fn module(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.get(name).and_then(GeneratedFile::as_module)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GeneratedFile)> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of entries that will actually be written.
    pub fn present_count(&self) -> usize {
        self.files.values().filter(|f| !f.is_absent()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_serializes_as_null() {
        let mut map = FileMap::new();
        map.insert("appid.tf", GeneratedFile::Absent);
        map.insert("main.tf", GeneratedFile::Text("x".into()));
        let mut module = BTreeMap::new();
        module.insert("main.tf".to_string(), "y".to_string());
        map.insert("edge_vpc", GeneratedFile::Module(module));

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"appid.tf": null, "edge_vpc": {"main.tf": "y"}, "main.tf": "x"})
        );
        assert_eq!(map.present_count(), 2);
    }
}
