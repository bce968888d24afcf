//! Key management instances, key rings, keys and key policies.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{kms_is_data, kms_ref, kms_service, kms_token, key_ring_token, key_token, rg_id_ref};

/// Instance block plus the optional block storage authorization.
pub fn format_kms_instance(kms: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let name = kms.name_or_empty();
    let token = kms_token(name);
    let service = kms_service(kms);
    let mut blocks = Vec::new();

    if kms_is_data(kms) {
        blocks.push(Block::data(
            "ibm_resource_instance",
            &token,
            Body::new().str("name", name).str("service", service),
        ));
    } else {
        blocks.push(Block::resource(
            "ibm_resource_instance",
            &token,
            Body::new()
                .template("name", kebab_name(&[name]))
                .raw("resource_group_id", rg_id_ref(doc, kms.str("resource_group")))
                .str("service", service)
                .str("plan", "tiered-pricing")
                .raw("location", "var.region")
                .tags(),
        ));
    }

    if kms.bool("authorize_vpc_reader_role") {
        blocks.push(Block::resource(
            "ibm_iam_authorization_policy",
            &address_token(&[name, "server_protect_policy"]),
            Body::new()
                .str("source_service_name", "server-protect")
                .strings("roles", ["Reader"])
                .str(
                    "description",
                    "Allow block storage volumes to be encrypted by Key Management instance.",
                )
                .str("target_service_name", service)
                .raw("target_resource_instance_id", kms_ref(doc, Some(name), "guid")),
        ));
    }

    blocks
}

/// One key ring per distinct ring named by the instance's keys.
pub fn format_key_rings(kms: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let name = kms.name_or_empty();
    let mut seen: Vec<&str> = Vec::new();
    let mut blocks = Vec::new();

    for key in kms.children("keys") {
        let Some(ring) = key.str("key_ring") else {
            continue;
        };
        if seen.contains(&ring) {
            continue;
        }
        seen.push(ring);

        blocks.push(Block::resource(
            "ibm_kms_key_rings",
            &key_ring_token(name, ring),
            Body::new()
                .raw("instance_id", kms_ref(doc, Some(name), "guid"))
                .template("key_ring_id", kebab_name(&[ring]))
                .str("endpoint_type", key.str("endpoint").unwrap_or("public")),
        ));
    }

    blocks
}

/// Key block followed by its policy block when rotation or dual
/// authorization is requested.
pub fn format_key(kms: Record<'_>, key: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let kms_name = kms.name_or_empty();
    let key_name = key.name_or_empty();
    let token = key_token(kms_name, key_name);
    let instance_id = kms_ref(doc, Some(kms_name), "guid");
    let endpoint = key.str("endpoint").unwrap_or("public");

    let mut body = Body::new()
        .raw("instance_id", instance_id.clone())
        .template("key_name", kebab_name(&[key_name]))
        .bool("standard_key", !key.bool("root_key"))
        .bool("force_delete", key.bool("force_delete"))
        .str("endpoint_type", endpoint);
    if let Some(ring) = key.str("key_ring") {
        body = body.raw(
            "key_ring_id",
            format!("ibm_kms_key_rings.{}.key_ring_id", key_ring_token(kms_name, ring)),
        );
    }

    let mut blocks = vec![Block::resource("ibm_kms_key", &token, body)];

    let rotation = key.int("rotation").unwrap_or(0);
    let dual_auth = key.bool("dual_auth_delete");
    if rotation > 0 || dual_auth {
        let policy = Body::new()
            .raw("instance_id", instance_id)
            .str("endpoint_type", endpoint)
            .raw("key_id", format!("ibm_kms_key.{}.key_id", token))
            .when(rotation > 0, |body| {
                body.block("rotation", Body::new().int("interval_month", rotation))
            })
            .when(dual_auth, |body| {
                body.block("dual_auth_delete", Body::new().bool("enabled", true))
            });
        blocks.push(Block::resource(
            "ibm_kms_key_policies",
            &address_token(&[kms_name, key_name, "key_policy"]),
            policy,
        ));
    }

    blocks
}

pub fn format_kms(kms: Record<'_>, doc: &NormalizedDocument) -> Section {
    let mut blocks = format_kms_instance(kms, doc);
    blocks.extend(format_key_rings(kms, doc));
    for key in kms.children("keys") {
        blocks.extend(format_key(kms, key, doc));
    }
    Section::new(
        format!("{} Key Management", title_case(kms.name_or_empty())),
        blocks,
    )
}

pub fn key_management_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::KeyManagement)
        .into_iter()
        .map(|kms| format_kms(kms, doc))
        .collect();
    render_file(&sections)
}
