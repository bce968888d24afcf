//! Configuration document model.
//!
//! A [`ConfigDocument`] is the raw, caller-supplied value. The only way to
//! obtain a [`NormalizedDocument`] is through normalization (or the explicit
//! unchecked constructor), so generation code can require the normalized
//! type and never see a partially shaped document.

use serde_json::{Map, Value};

use crate::error::{SpecError, SpecResult};
use crate::family::{Family, Section};

/// Raw configuration document as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    /// Wrap a JSON value. The root must be an object.
    pub fn from_value(value: Value) -> SpecResult<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(SpecError::InvalidDocument(format!(
                "expected an object at the document root, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// Parse a JSON string.
    pub fn from_json_str(content: &str) -> SpecResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub(crate) fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }
}

/// A document that passed validation and carries every defaulted field.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    root: Map<String, Value>,
}

impl NormalizedDocument {
    pub(crate) fn from_checked(document: ConfigDocument) -> Self {
        Self {
            root: document.root,
        }
    }

    /// Wrap a value without running validation.
    ///
    /// Generation over such a document is still total: unresolved references
    /// render as sentinel strings instead of failing.
    pub fn from_value_unchecked(value: Value) -> SpecResult<Self> {
        let document = ConfigDocument::from_value(value)?;
        Ok(Self::from_checked(document))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_document(self) -> ConfigDocument {
        ConfigDocument { root: self.root }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Global options.
    pub fn options(&self) -> Options {
        Options::from_map(self.root.get("_options").and_then(Value::as_object))
    }

    /// All records of a family, in document order.
    pub fn records(&self, family: Family) -> Vec<Record<'_>> {
        self.root
            .get(family.as_str())
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Record::from_value).collect())
            .unwrap_or_default()
    }

    /// First record of a family with the given name.
    pub fn find(&self, family: Family, name: &str) -> Option<Record<'_>> {
        self.records(family)
            .into_iter()
            .find(|record| record.name() == Some(name))
    }

    /// Object storage instances holding a bucket named `bucket`, in document
    /// order. The first one owns the bucket.
    pub fn bucket_owners(&self, bucket: &str) -> Vec<Record<'_>> {
        self.records(Family::ObjectStorage)
            .into_iter()
            .filter(|cos| cos.child("buckets", bucket).is_some())
            .collect()
    }

    /// A singleton section such as `atracker` or `scc`.
    pub fn section(&self, section: Section) -> Option<Record<'_>> {
        self.root.get(section.as_str()).and_then(Record::from_value)
    }

    /// Pretty JSON copy of the document with top-level keys sorted.
    pub fn to_sorted_json(&self) -> String {
        let mut keys: Vec<&String> = self.root.keys().collect();
        keys.sort();

        let mut sorted = Map::new();
        for key in keys {
            if let Some(value) = self.root.get(key) {
                sorted.insert(key.clone(), value.clone());
            }
        }

        // A map of JSON values always serializes.
        serde_json::to_string_pretty(&Value::Object(sorted)).unwrap_or_default()
    }
}

/// Global options from `_options`.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub prefix: String,
    pub region: String,
    pub tags: Vec<String>,
    pub zones: i64,
    pub endpoints: String,
    pub account_id: Option<String>,
}

impl Options {
    fn from_map(map: Option<&Map<String, Value>>) -> Self {
        let record = map.map(|m| Record { value: m });
        let text = |field: &str, default: &str| {
            record
                .and_then(|r| r.str(field))
                .unwrap_or(default)
                .to_string()
        };

        Self {
            prefix: text("prefix", ""),
            region: text("region", ""),
            tags: record
                .map(|r| r.strings("tags").into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            zones: record.and_then(|r| r.int("zones")).unwrap_or(3),
            endpoints: text("endpoints", "private"),
            account_id: record.and_then(|r| r.str("account_id")).map(str::to_string),
        }
    }
}

/// Read-only view of one record.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    value: &'a Map<String, Value>,
}

impl<'a> Record<'a> {
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(|value| Self { value })
    }

    pub fn name(&self) -> Option<&'a str> {
        self.str("name")
    }

    /// Name, or an empty string for records that carry none.
    pub fn name_or_empty(&self) -> &'a str {
        self.name().unwrap_or("")
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.value.get(field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.value.contains_key(field)
    }

    /// True when the field is absent or explicitly `null`.
    pub fn is_null(&self, field: &str) -> bool {
        self.get(field).map_or(true, Value::is_null)
    }

    pub fn str(&self, field: &str) -> Option<&'a str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn bool(&self, field: &str) -> bool {
        self.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Integer field; numeric strings are accepted as well.
    pub fn int(&self, field: &str) -> Option<i64> {
        match self.get(field)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String items of an array field; non-string items are skipped.
    pub fn strings(&self, field: &str) -> Vec<&'a str> {
        self.get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Nested records of an array field.
    pub fn children(&self, field: &str) -> Vec<Record<'a>> {
        self.get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Record::from_value).collect())
            .unwrap_or_default()
    }

    /// First nested record with the given name.
    pub fn child(&self, field: &str, name: &str) -> Option<Record<'a>> {
        self.children(field)
            .into_iter()
            .find(|child| child.name() == Some(name))
    }

    /// A nested object field.
    pub fn object(&self, field: &str) -> Option<Record<'a>> {
        self.get(field).and_then(Record::from_value)
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_must_be_object() {
        let err = ConfigDocument::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("found an array"));
    }

    #[test]
    fn test_record_accessors() {
        let value = json!({
            "name": "workload",
            "workers_per_subnet": "2",
            "subnets": ["a", "b", 3],
            "worker_pools": [{"name": "logging"}, {"name": "edge"}],
            "cos": null
        });
        let record = Record::from_value(&value).unwrap();

        assert_eq!(record.name(), Some("workload"));
        assert_eq!(record.int("workers_per_subnet"), Some(2));
        assert_eq!(record.strings("subnets"), vec!["a", "b"]);
        assert_eq!(record.child("worker_pools", "edge").unwrap().name(), Some("edge"));
        assert!(record.is_null("cos"));
        assert!(record.is_null("kms"));
        assert!(!record.bool("private_endpoint"));
    }

    #[test]
    fn test_sorted_json_orders_top_level_keys() {
        let doc = NormalizedDocument::from_value_unchecked(json!({
            "vpcs": [],
            "_options": {"prefix": "slz"},
            "clusters": []
        }))
        .unwrap();

        let text = doc.to_sorted_json();
        let options = text.find("_options").unwrap();
        let clusters = text.find("clusters").unwrap();
        let vpcs = text.find("vpcs").unwrap();
        assert!(options < clusters && clusters < vpcs);
    }

    #[test]
    fn test_find_uses_first_match() {
        let doc = NormalizedDocument::from_value_unchecked(json!({
            "vpcs": [{"name": "a", "n": 1}, {"name": "a", "n": 2}]
        }))
        .unwrap();

        let found = doc.find(Family::Vpcs, "a").unwrap();
        assert_eq!(found.int("n"), Some(1));
    }

    #[test]
    fn test_bucket_owners_in_document_order() {
        let doc = NormalizedDocument::from_value_unchecked(json!({
            "object_storage": [
                {"name": "logs", "buckets": [{"name": "b"}]},
                {"name": "data", "buckets": [{"name": "c"}]},
                {"name": "backup", "buckets": [{"name": "b"}]}
            ]
        }))
        .unwrap();

        let owners: Vec<_> = doc.bucket_owners("b").iter().filter_map(|cos| cos.name()).collect();
        assert_eq!(owners, vec!["logs", "backup"]);
        assert!(doc.bucket_owners("missing").is_empty());
    }
}
