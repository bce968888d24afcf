//! Security and Compliance Center posture management.

use craig_spec::{NormalizedDocument, Record, Section as DocSection};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::kebab_name;
use crate::translators::terraform::Variable;

pub const PASSPHRASE_VARIABLE: &str = "scc_group_passphrase";

/// Enabled section, if any.
pub fn enabled_scc(doc: &NormalizedDocument) -> Option<Record<'_>> {
    doc.section(DocSection::Scc).filter(|scc| scc.bool("enable"))
}

pub fn format_scc(scc: Record<'_>) -> Vec<Block> {
    let name = scc.str("name").filter(|name| !name.is_empty()).unwrap_or("scc");

    let settings = Block::resource(
        "ibm_scc_account_settings",
        "ibm_scc_account_settings_instance",
        Body::new().block(
            "location",
            Body::new().str("location_id", scc.str("location").unwrap_or("us")),
        ),
    );

    let credential = Block::resource(
        "ibm_scc_posture_credential",
        "scc_credentials",
        Body::new()
            .opt_str("description", scc.str("credential_description"))
            .bool("enabled", true)
            .template("name", kebab_name(&[name, "credentials"]))
            .str("type", "ibm_cloud")
            .str("purpose", "discovery_fact_collection_remediation")
            .map(
                "display_fields",
                Body::new().raw("ibm_api_key", "var.ibmcloud_api_key"),
            )
            .map(
                "group",
                Body::new()
                    .str("id", scc.str("id").unwrap_or_default())
                    .raw("passphrase", format!("var.{}", PASSPHRASE_VARIABLE)),
            ),
    );

    let collector = Block::resource(
        "ibm_scc_posture_collector",
        "collector",
        Body::new()
            .opt_str("description", scc.str("collector_description"))
            .bool("is_public", scc.bool("is_public"))
            .str("managed_by", "ibm")
            .template("name", kebab_name(&[name, "collector"])),
    );

    let scope = Block::resource(
        "ibm_scc_posture_scope",
        "scc_scope",
        Body::new()
            .raws(
                "collector_ids",
                ["ibm_scc_posture_collector.collector.id"],
            )
            .raw("credential_id", "ibm_scc_posture_credential.scc_credentials.id")
            .str("credential_type", "ibm")
            .opt_str("description", scc.str("scope_description"))
            .template("name", kebab_name(&[name, "scope"])),
    );

    vec![settings, credential, collector, scope]
}

/// Passphrase variable, present when the section is enabled.
pub fn scc_variables(doc: &NormalizedDocument) -> Vec<Variable> {
    enabled_scc(doc)
        .map(|_| {
            Variable::string(PASSPHRASE_VARIABLE, "Security and Compliance Center group passphrase")
                .sensitive()
        })
        .into_iter()
        .collect()
}

pub fn scc_tf(doc: &NormalizedDocument) -> Option<String> {
    let scc = enabled_scc(doc)?;
    render_file(&[Section::new("Security and Compliance Center", format_scc(scc))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture(enable: bool) -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "scc": {
                "enable": enable,
                "name": "scc",
                "location": "eu",
                "is_public": false,
                "collector_description": "collector",
                "scope_description": null,
                "credential_description": null,
                "id": "group-id",
                "passphrase": null
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_enabled_section() {
        let text = scc_tf(&fixture(true)).unwrap();
        assert!(text.contains("  location {\n    location_id = \"eu\"\n  }\n"));
        assert!(text.contains("  group          = {\n    id         = \"group-id\"\n    passphrase = var.scc_group_passphrase\n  }\n"));
        assert!(text.contains("  collector_ids   = [ibm_scc_posture_collector.collector.id]\n"));
        assert_eq!(scc_variables(&fixture(true)).len(), 1);
    }

    #[test]
    fn test_disabled_is_absent() {
        assert!(scc_tf(&fixture(false)).is_none());
        assert!(scc_variables(&fixture(false)).is_empty());
    }
}
