//! Secrets manager instances.
//!
//! Instances encrypted with a key management instance need an authorization
//! policy. Several instances using the same key management instance share
//! one policy.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{encryption_key_ref, kms_ref, kms_service, rg_id_ref, secrets_manager_token};

pub fn kms_policy_token(kms: &str) -> String {
    address_token(&["secrets_manager_to", kms, "kms_policy"])
}

pub fn format_kms_policy(kms: &str, doc: &NormalizedDocument) -> Block {
    let service = doc
        .find(Family::KeyManagement, kms)
        .map(kms_service)
        .unwrap_or("kms");
    Block::resource(
        "ibm_iam_authorization_policy",
        &kms_policy_token(kms),
        Body::new()
            .str("source_service_name", "secrets-manager")
            .str(
                "description",
                "Allow Secrets Manager instance to read from KMS instance",
            )
            .str("target_service_name", service)
            .raw("target_resource_instance_id", kms_ref(doc, Some(kms), "guid"))
            .strings("roles", ["Reader"]),
    )
}

pub fn format_secrets_manager(manager: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = manager.name_or_empty();
    let kms = manager.str("kms");

    let mut body = Body::new()
        .template("name", kebab_name(&[name]))
        .raw("location", "var.region")
        .str("plan", manager.str("plan").unwrap_or("standard"))
        .str("service", "secrets-manager")
        .raw("resource_group_id", rg_id_ref(doc, manager.str("resource_group")))
        .when(manager.str("encryption_key").is_some(), |body| {
            body.map(
                "parameters",
                Body::new().raw(
                    "kms_key",
                    encryption_key_ref(doc, kms, manager.str("encryption_key"), "crn"),
                ),
            )
        })
        .block(
            "timeouts",
            Body::new().str("create", "1h").str("delete", "1h"),
        )
        .tags();
    if let Some(kms) = kms {
        body = body.lines(
            "depends_on",
            [format!(
                "ibm_iam_authorization_policy.{}",
                kms_policy_token(kms)
            )],
        );
    }

    Block::resource(
        "ibm_resource_instance",
        &secrets_manager_token(name),
        body,
    )
}

pub fn secrets_manager_tf(doc: &NormalizedDocument) -> Option<String> {
    let managers = doc.records(Family::SecretsManager);

    let mut seen: Vec<&str> = Vec::new();
    let mut policies = Vec::new();
    for kms in managers.iter().filter_map(|manager| manager.str("kms")) {
        if !seen.contains(&kms) {
            seen.push(kms);
            policies.push(format_kms_policy(kms, doc));
        }
    }

    let mut sections = vec![Section::new("Secrets Manager Authorizations", policies)];
    for manager in managers {
        sections.push(Section::new(
            format!("{} Secrets Manager", title_case(manager.name_or_empty())),
            vec![format_secrets_manager(manager, doc)],
        ));
    }
    render_file(&sections)
}
