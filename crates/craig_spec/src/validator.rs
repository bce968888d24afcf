//! Validation and normalization engine.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::defaults::{backfill, merge_missing, section_default, BACKFILL, OPTION_DEFAULTS};
use crate::document::{kind_of, ConfigDocument, NormalizedDocument};
use crate::error::{SpecError, SpecResult};
use crate::family::{Family, Section};
use crate::references::{check_references, check_unique_names};
use crate::required::{check_required, record_label, required_test};
use crate::rules::{normalize_rules, RuleKind};

const ROOT_FAMILY: &str = "document";
const ROOT_LABEL: &str = "`root`";
const ACL_RULE_FIELDS: &[&str] = &["name", "action", "direction", "source", "destination"];

/// Normalizes configuration documents.
pub struct DocumentValidator;

impl DocumentValidator {
    /// Validate a document and bring it to its canonical shape.
    ///
    /// Fails on the first structural or cross-reference problem. Running the
    /// result through `normalize` again yields an identical document.
    pub fn normalize(document: ConfigDocument) -> SpecResult<NormalizedDocument> {
        let mut document = document;
        let root = document.as_map_mut();
        info!("Normalizing configuration document");

        Self::apply_options(root)?;
        Self::apply_families(root)?;
        check_required(root)?;

        let inserted = Self::backfill_families(root);
        debug!("Inserted {} default fields", inserted);

        Self::normalize_network_rules(root)?;

        let normalized = NormalizedDocument::from_checked(document);
        check_unique_names(&normalized)?;
        check_references(&normalized)?;

        info!("Configuration document is valid");
        Ok(normalized)
    }

    fn apply_options(root: &mut Map<String, Value>) -> SpecResult<()> {
        required_test(ROOT_FAMILY, root, "_options", ROOT_LABEL)?;
        let Some(Value::Object(options)) = root.get_mut("_options") else {
            return Err(SpecError::invalid(
                ROOT_FAMILY,
                ROOT_LABEL,
                "_options",
                "expected an object",
            ));
        };

        for field in ["prefix", "region"] {
            required_test("_options", options, field, "`_options`")?;
        }
        backfill(options, OPTION_DEFAULTS);
        Ok(())
    }

    fn apply_families(root: &mut Map<String, Value>) -> SpecResult<()> {
        for family in Family::all() {
            let key = family.as_str();
            if family.is_optional() {
                let entry = root.entry(key.to_string()).or_insert(Value::Null);
                if entry.is_null() {
                    debug!("Defaulting optional family {} to an empty list", key);
                    *entry = Value::Array(Vec::new());
                }
            } else {
                required_test(ROOT_FAMILY, root, key, ROOT_LABEL)?;
            }

            if let Some(value) = root.get(key) {
                if !value.is_array() {
                    return Err(SpecError::invalid(
                        ROOT_FAMILY,
                        ROOT_LABEL,
                        key,
                        format!("expected an array, found {}", kind_of(value)),
                    ));
                }
            }
        }

        for section in Section::all() {
            let key = section.as_str();
            let entry = root.entry(key.to_string()).or_insert(Value::Null);
            match entry {
                Value::Null => {
                    debug!("Synthesizing default {} section", key);
                    *entry = section_default(section);
                }
                Value::Object(existing) => {
                    merge_missing(existing, section_default(section));
                }
                other => {
                    return Err(SpecError::invalid(
                        ROOT_FAMILY,
                        ROOT_LABEL,
                        key,
                        format!("expected an object, found {}", kind_of(other)),
                    ))
                }
            }
        }
        Ok(())
    }

    fn backfill_families(root: &mut Map<String, Value>) -> usize {
        let mut inserted = 0;
        for table in BACKFILL {
            let Some(Value::Array(records)) = root.get_mut(table.family.as_str()) else {
                continue;
            };
            for record in records.iter_mut().filter_map(Value::as_object_mut) {
                inserted += backfill(record, table.fields);
                for (nested, fields) in table.nested {
                    let Some(Value::Array(children)) = record.get_mut(*nested) else {
                        continue;
                    };
                    for child in children.iter_mut().filter_map(Value::as_object_mut) {
                        inserted += backfill(child, fields);
                    }
                }
            }
        }
        inserted
    }

    fn normalize_network_rules(root: &mut Map<String, Value>) -> SpecResult<()> {
        if let Some(Value::Array(vpcs)) = root.get_mut(Family::Vpcs.as_str()) {
            for vpc in vpcs.iter_mut().filter_map(Value::as_object_mut) {
                let vpc_name = name_of(vpc);
                let Some(Value::Array(acls)) = vpc.get_mut("acls") else {
                    continue;
                };
                for acl in acls.iter_mut().filter_map(Value::as_object_mut) {
                    let acl_name = name_of(acl);
                    let Some(Value::Array(rules)) = acl.get_mut("rules") else {
                        continue;
                    };
                    for (index, rule) in rules.iter().enumerate() {
                        if let Some(rule) = rule.as_object() {
                            let label = record_label(Some(acl_name.as_str()), rule, index);
                            for field in ACL_RULE_FIELDS {
                                required_test("vpcs.acls.rules", rule, field, &label)?;
                            }
                        }
                    }
                    normalize_rules(rules, RuleKind::Acl, &acl_name, Some(vpc_name.as_str()))?;
                }
            }
        }

        if let Some(Value::Array(groups)) = root.get_mut(Family::SecurityGroups.as_str()) {
            for group in groups.iter_mut().filter_map(Value::as_object_mut) {
                let group_name = name_of(group);
                let vpc_name = group.get("vpc").and_then(Value::as_str).map(str::to_string);
                if let Some(Value::Array(rules)) = group.get_mut("rules") {
                    normalize_rules(
                        rules,
                        RuleKind::SecurityGroup,
                        &group_name,
                        vpc_name.as_deref(),
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn name_of(record: &Map<String, Value>) -> String {
    record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

/// Normalize a document. See [`DocumentValidator::normalize`].
pub fn normalize(document: ConfigDocument) -> SpecResult<NormalizedDocument> {
    DocumentValidator::normalize(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "_options": {"prefix": "slz", "region": "us-south"},
            "resource_groups": [{"name": "slz-rg"}],
            "key_management": [],
            "object_storage": [],
            "vpcs": [],
            "security_groups": [],
            "virtual_private_endpoints": [],
            "ssh_keys": [],
            "vsi": [],
            "clusters": [],
            "vpn_gateways": [],
            "transit_gateways": []
        })
    }

    fn run(value: Value) -> SpecResult<NormalizedDocument> {
        normalize(ConfigDocument::from_value(value)?)
    }

    #[test]
    fn test_minimal_document_is_defaulted() {
        let doc = run(minimal()).unwrap();
        let root = doc.as_map();

        assert_eq!(root["secrets_manager"], json!([]));
        assert_eq!(root["routing_tables"], json!([]));
        assert_eq!(root["scc"]["enable"], json!(false));
        assert_eq!(root["iam_account_settings"]["enable"], json!(false));
        assert_eq!(root["_options"]["zones"], json!(3));
        assert_eq!(root["resource_groups"][0]["use_prefix"], json!(true));
        assert_eq!(doc.options().endpoints, "private");
    }

    #[test]
    fn test_missing_core_family() {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove("clusters");
        let err = run(value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "document `root`: field `clusters` is missing from input"
        );
    }

    #[test]
    fn test_options_prefix_required() {
        let mut value = minimal();
        value["_options"]["prefix"] = Value::Null;
        let err = run(value).unwrap_err();
        assert_eq!(err.to_string(), "_options `_options`: field `prefix` value is null");
    }

    #[test]
    fn test_family_must_be_array() {
        let mut value = minimal();
        value["vpcs"] = json!({"name": "oops"});
        let err = run(value).unwrap_err();
        assert!(err.to_string().contains("expected an array, found an object"));
    }

    #[test]
    fn test_existing_section_is_merged() {
        let mut value = minimal();
        value["scc"] = json!({"enable": true, "name": "scc"});
        let doc = run(value).unwrap();
        assert_eq!(doc.as_map()["scc"]["enable"], json!(true));
        assert_eq!(doc.as_map()["scc"]["location"], json!("us"));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut value = minimal();
        value["resource_groups"] = json!([{"name": "a"}, {"name": "a"}]);
        let err = run(value).unwrap_err();
        assert_eq!(err.to_string(), "resource_groups: duplicate name `a`");
    }

    #[test]
    fn test_acl_rules_are_normalized() {
        let mut value = minimal();
        value["vpcs"] = json!([{
            "name": "management",
            "resource_group": "slz-rg",
            "acls": [{
                "name": "management-acl",
                "rules": [{
                    "name": "allow-all",
                    "action": "allow",
                    "direction": "inbound",
                    "source": "0.0.0.0/0",
                    "destination": "10.0.0.0/8",
                    "tcp": {"port_min": "443"}
                }]
            }]
        }]);

        let doc = run(value).unwrap();
        let rule = &doc.as_map()["vpcs"][0]["acls"][0]["rules"][0];
        assert_eq!(rule["tcp"]["port_min"], json!(443));
        assert_eq!(rule["acl"], json!("management-acl"));
        assert_eq!(rule["vpc"], json!("management"));
    }

    #[test]
    fn test_acl_rule_without_direction() {
        let mut value = minimal();
        value["vpcs"] = json!([{
            "name": "management",
            "resource_group": "slz-rg",
            "acls": [{"name": "acl", "rules": [{"name": "r", "action": "allow", "source": "a", "destination": "b"}]}]
        }]);
        let err = run(value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "vpcs.acls.rules `acl.r`: field `direction` is missing from input"
        );
    }
}
