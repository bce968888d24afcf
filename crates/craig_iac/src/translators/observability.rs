//! Logging and monitoring instances.

use craig_spec::{NormalizedDocument, Record, Section as DocSection};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name};
use crate::refs::{cos_ref, rg_id_ref};

fn enabled(doc: &NormalizedDocument, section: DocSection) -> Option<Record<'_>> {
    doc.section(section).filter(|record| record.bool("enabled"))
}

fn instance_name(record: Record<'_>, fallback: &str) -> String {
    record.str("name").unwrap_or(fallback).to_string()
}

fn format_instance(
    record: Record<'_>,
    token: &str,
    service: &str,
    default_plan: &str,
    doc: &NormalizedDocument,
) -> Block {
    let name = instance_name(record, token);
    Block::resource(
        "ibm_resource_instance",
        token,
        Body::new()
            .template("name", kebab_name(&[&name]))
            .raw("resource_group_id", rg_id_ref(doc, record.str("resource_group")))
            .str("service", service)
            .str("plan", record.str("plan").unwrap_or(default_plan))
            .raw("location", "var.region")
            .str(
                "service_endpoints",
                record.str("endpoints").unwrap_or("private"),
            )
            .when(record.bool("platform_logs"), |body| {
                body.map("parameters", Body::new().bool("default_receiver", true))
            })
            .tags(),
    )
}

fn format_key(record: Record<'_>, token: &str) -> Block {
    let name = instance_name(record, token);
    Block::resource(
        "ibm_resource_key",
        &address_token(&[token, "key"]),
        Body::new()
            .template("name", kebab_name(&[&name, "key"]))
            .raw(
                "resource_instance_id",
                format!("ibm_resource_instance.{}.id", token),
            )
            .str("role", "Manager")
            .tags(),
    )
}

pub fn format_logdna_cos_policy(logdna: Record<'_>, doc: &NormalizedDocument) -> Option<Block> {
    let cos = logdna.str("cos")?;
    Some(Block::resource(
        "ibm_iam_authorization_policy",
        "logdna_cos_policy",
        Body::new()
            .str("source_service_name", "logdna")
            .raw(
                "source_resource_instance_id",
                "ibm_resource_instance.logdna.guid",
            )
            .str("description", "Allow LogDNA instance to write to COS")
            .str("target_service_name", "cloud-object-storage")
            .raw("target_resource_instance_id", cos_ref(doc, Some(cos), "guid"))
            .strings("roles", ["Writer"]),
    ))
}

pub fn format_logdna(logdna: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let mut blocks = vec![
        format_instance(logdna, "logdna", "logdna", "lite", doc),
        format_key(logdna, "logdna"),
    ];
    blocks.extend(format_logdna_cos_policy(logdna, doc));
    blocks
}

pub fn format_sysdig(sysdig: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    vec![
        format_instance(sysdig, "sysdig", "sysdig-monitor", "graduated-tier", doc),
        format_key(sysdig, "sysdig"),
    ]
}

/// `None` unless logging or monitoring is enabled.
pub fn observability_tf(doc: &NormalizedDocument) -> Option<String> {
    let logging = enabled(doc, DocSection::Logdna)
        .map(|logdna| format_logdna(logdna, doc))
        .unwrap_or_default();
    let monitoring = enabled(doc, DocSection::Sysdig)
        .map(|sysdig| format_sysdig(sysdig, doc))
        .unwrap_or_default();
    render_file(&[
        Section::new("LogDNA", logging),
        Section::new("Sysdig", monitoring),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture(logdna: bool, sysdig: bool) -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-service-rg"}],
            "object_storage": [{"name": "atracker-cos", "buckets": [{"name": "logs"}]}],
            "logdna": {
                "enabled": logdna,
                "name": "logdna",
                "plan": "7-day",
                "endpoints": "private",
                "platform_logs": true,
                "resource_group": "slz-service-rg",
                "cos": "atracker-cos",
                "bucket": "logs"
            },
            "sysdig": {
                "enabled": sysdig,
                "name": "sysdig",
                "plan": "graduated-tier",
                "platform_logs": false,
                "resource_group": "slz-service-rg"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_logdna_with_archive_policy() {
        let text = observability_tf(&fixture(true, false)).unwrap();
        assert!(text.contains("resource \"ibm_resource_instance\" \"logdna\""));
        assert!(text.contains("  parameters        = {\n    default_receiver = true\n  }\n"));
        assert!(text.contains("resource \"ibm_resource_key\" \"logdna_key\""));
        assert!(text.contains("resource \"ibm_iam_authorization_policy\" \"logdna_cos_policy\""));
        assert!(!text.contains("sysdig-monitor"));
    }

    #[test]
    fn test_sysdig_only() {
        let text = observability_tf(&fixture(false, true)).unwrap();
        assert!(text.contains("  service           = \"sysdig-monitor\"\n"));
        assert!(!text.contains("parameters"));
        assert!(!text.contains("logdna"));
    }

    #[test]
    fn test_disabled_is_absent() {
        assert!(observability_tf(&fixture(false, false)).is_none());
    }
}
