//! Cloud database instances.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name};
use crate::refs::{encryption_key_ref, rg_id_ref};

pub fn database_token(name: &str) -> String {
    address_token(&[name, "database"])
}

/// Scaling group; `None` when no allocation is set.
fn format_group(database: Record<'_>) -> Option<Body> {
    let allocation = |field: &str, key: &str| {
        database
            .int(field)
            .map(|value| Body::new().int(key, value))
    };
    let memory = allocation("memory", "allocation_mb");
    let disk = allocation("disk", "allocation_mb");
    let cpu = allocation("cpu", "allocation_count");
    if memory.is_none() && disk.is_none() && cpu.is_none() {
        return None;
    }

    let mut group = Body::new().str("group_id", database.str("group_id").unwrap_or("member"));
    for (kind, body) in [("memory", memory), ("disk", disk), ("cpu", cpu)] {
        if let Some(body) = body {
            group = group.block(kind, body);
        }
    }
    Some(group)
}

pub fn format_database(database: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = database.name_or_empty();
    let key = database.str("encryption_key");

    let mut body = Body::new()
        .template("name", kebab_name(&[name]))
        .str("service", database.str("service").unwrap_or_default())
        .str("plan", database.str("plan").unwrap_or("standard"))
        .raw("location", "var.region")
        .raw("resource_group_id", rg_id_ref(doc, database.str("resource_group")))
        .when(key.is_some(), |body| {
            body.raw(
                "key_protect_key",
                encryption_key_ref(doc, database.str("kms"), key, "crn"),
            )
        })
        .tags();
    if let Some(group) = format_group(database) {
        body = body.block("group", group);
    }
    body = body.block(
        "timeouts",
        Body::new()
            .str("create", "120m")
            .str("update", "120m")
            .str("delete", "15m"),
    );

    Block::resource("ibm_database", &database_token(name), body)
}

pub fn cloud_databases_tf(doc: &NormalizedDocument) -> Option<String> {
    let blocks = doc
        .records(Family::Icd)
        .into_iter()
        .map(|database| format_database(database, doc))
        .collect();
    render_file(&[Section::new("Cloud Databases", blocks)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture(memory: serde_json::Value) -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-service-rg"}],
            "key_management": [{"name": "kms", "keys": [{"name": "slz-key", "key_ring": "ring"}]}],
            "icd": [{
                "name": "pg",
                "service": "databases-for-postgresql",
                "plan": "standard",
                "resource_group": "slz-service-rg",
                "kms": "kms",
                "encryption_key": "slz-key",
                "memory": memory,
                "disk": null,
                "cpu": 3,
                "group_id": "member"
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_database_with_group() {
        let text = cloud_databases_tf(&fixture(json!(4096))).unwrap();
        assert!(text.contains("resource \"ibm_database\" \"pg_database\""));
        assert!(text.contains("  key_protect_key   = ibm_kms_key.kms_slz_key_key.crn\n"));
        assert!(text.contains(
            "  group {\n    group_id = \"member\"\n    memory {\n      allocation_mb = 4096\n    }\n    cpu {\n      allocation_count = 3\n    }\n  }\n"
        ));
        assert!(!text.contains("disk"));
    }

    #[test]
    fn test_database_without_allocations() {
        let doc = fixture(serde_json::Value::Null);
        let text = cloud_databases_tf(&doc).unwrap();
        assert!(text.contains("    allocation_count = 3\n"));

        let empty = NormalizedDocument::from_value_unchecked(json!({"icd": []})).unwrap();
        assert!(cloud_databases_tf(&empty).is_none());
    }
}
