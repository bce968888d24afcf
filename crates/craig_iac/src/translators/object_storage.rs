//! Object storage instances, buckets and resource keys.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{
    bucket_token, cos_key_token, cos_ref, cos_token, encryption_key_ref, kms_ref, kms_service,
    rg_id_ref,
};

fn random_suffix_token(cos: &str) -> String {
    address_token(&[cos, "random_suffix"])
}

/// Token of the policy letting an instance read from its key management
/// instance.
pub fn cos_kms_policy_token(cos: &str, kms: &str) -> String {
    address_token(&[cos, "cos_to", kms, "kms_policy"])
}

fn with_suffix(cos: Record<'_>, name: String) -> String {
    if cos.bool("use_random_suffix") {
        format!(
            "{}-${{random_string.{}.result}}",
            name,
            random_suffix_token(cos.name_or_empty())
        )
    } else {
        name
    }
}

/// Random suffix, instance block and the instance's key management policy.
pub fn format_cos_instance(cos: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let name = cos.name_or_empty();
    let token = cos_token(name);
    let mut blocks = Vec::new();

    if cos.bool("use_random_suffix") {
        blocks.push(Block::resource(
            "random_string",
            &random_suffix_token(name),
            Body::new()
                .int("length", 8)
                .bool("special", false)
                .bool("upper", false),
        ));
    }

    if cos.bool("use_data") {
        blocks.push(Block::data(
            "ibm_resource_instance",
            &token,
            Body::new()
                .str("name", name)
                .str("service", "cloud-object-storage"),
        ));
    } else {
        blocks.push(Block::resource(
            "ibm_resource_instance",
            &token,
            Body::new()
                .template("name", with_suffix(cos, kebab_name(&[name, "object-storage"])))
                .raw("resource_group_id", rg_id_ref(doc, cos.str("resource_group")))
                .str("service", "cloud-object-storage")
                .str("location", "global")
                .str("plan", cos.str("plan").unwrap_or("standard"))
                .tags(),
        ));
    }

    if let Some(kms) = cos.str("kms") {
        let service = doc
            .find(Family::KeyManagement, kms)
            .map(kms_service)
            .unwrap_or("kms");
        blocks.push(Block::resource(
            "ibm_iam_authorization_policy",
            &cos_kms_policy_token(name, kms),
            Body::new()
                .str("source_service_name", "cloud-object-storage")
                .raw("source_resource_instance_id", cos_ref(doc, Some(name), "guid"))
                .str(
                    "description",
                    "Allow COS instance to read from KMS instance",
                )
                .str("target_service_name", service)
                .raw("target_resource_instance_id", kms_ref(doc, Some(kms), "guid"))
                .strings("roles", ["Reader"]),
        ));
    }

    blocks
}

/// Bucket block. Encrypted buckets wait for the key management policy.
pub fn format_bucket(cos: Record<'_>, bucket: Record<'_>, doc: &NormalizedDocument) -> Block {
    let cos_name = cos.name_or_empty();
    let bucket_name = bucket.name_or_empty();
    let kms = cos.str("kms");

    let mut body = Body::new()
        .template("bucket_name", with_suffix(cos, kebab_name(&[bucket_name])))
        .raw("resource_instance_id", cos_ref(doc, Some(cos_name), "id"))
        .str("storage_class", bucket.str("storage_class").unwrap_or("standard"))
        .str("endpoint_type", bucket.str("endpoint").unwrap_or("public"))
        .bool("force_delete", bucket.bool("force_delete"))
        .raw("region_location", "var.region");

    if let Some(key) = bucket.str("kms_key") {
        body = body.raw(
            "key_protect",
            encryption_key_ref(doc, kms, Some(key), "crn"),
        );
        if let Some(kms) = kms {
            body = body.lines(
                "depends_on",
                [format!(
                    "ibm_iam_authorization_policy.{}",
                    cos_kms_policy_token(cos_name, kms)
                )],
            );
        }
    }

    Block::resource("ibm_cos_bucket", &bucket_token(cos_name, bucket_name), body)
}

/// Resource key, with HMAC credentials when requested.
pub fn format_cos_key(cos: Record<'_>, key: Record<'_>, doc: &NormalizedDocument) -> Block {
    let cos_name = cos.name_or_empty();
    let key_name = key.name_or_empty();

    let body = Body::new()
        .template("name", with_suffix(cos, kebab_name(&[cos_name, "key", key_name])))
        .raw("resource_instance_id", cos_ref(doc, Some(cos_name), "id"))
        .str("role", key.str("role").unwrap_or("Writer"))
        .tags()
        .when(key.bool("enable_hmac"), |body| {
            body.map("parameters", Body::new().bool("HMAC", true))
        });

    Block::resource("ibm_resource_key", &cos_key_token(cos_name, key_name), body)
}

pub fn format_object_storage(cos: Record<'_>, doc: &NormalizedDocument) -> Section {
    let mut blocks = format_cos_instance(cos, doc);
    for bucket in cos.children("buckets") {
        blocks.push(format_bucket(cos, bucket, doc));
    }
    for key in cos.children("keys") {
        blocks.push(format_cos_key(cos, key, doc));
    }
    Section::new(
        format!("{} Object Storage", title_case(cos.name_or_empty())),
        blocks,
    )
}

pub fn object_storage_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::ObjectStorage)
        .into_iter()
        .map(|cos| format_object_storage(cos, doc))
        .collect();
    render_file(&sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(kms_key: &str) -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "rg"}],
            "key_management": [{"name": "kms", "keys": [{"name": "k1", "key_ring": "r1"}]}],
            "object_storage": [{
                "name": "cos",
                "resource_group": "rg",
                "plan": "standard",
                "kms": "kms",
                "use_random_suffix": true,
                "buckets": [{"name": "bucket", "kms_key": kms_key, "storage_class": "standard", "endpoint": "public"}],
                "keys": [{"name": "bind", "role": "Writer", "enable_hmac": true}]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_bucket_points_at_key_crn() {
        let doc = doc("k1");
        let text = object_storage_tf(&doc).unwrap();

        assert!(text.contains("resource \"random_string\" \"cos_random_suffix\""));
        assert!(text.contains("resource \"ibm_iam_authorization_policy\" \"cos_cos_to_kms_kms_policy\""));
        assert!(text.contains("  key_protect          = ibm_kms_key.kms_k1_key.crn\n"));
        assert!(text.contains("  depends_on           = [\n    ibm_iam_authorization_policy.cos_cos_to_kms_kms_policy\n  ]\n"));
        assert!(text.contains(
            "  bucket_name          = \"${var.prefix}-bucket-${random_string.cos_random_suffix.result}\"\n"
        ));
    }

    #[test]
    fn test_unknown_bucket_key_is_sentinel() {
        let doc = doc("missing");
        let text = object_storage_tf(&doc).unwrap();
        assert!(text.contains("key_protect          = ERROR: Unfound ref\n"));
    }

    #[test]
    fn test_hmac_key() {
        let doc = doc("k1");
        let cos = doc.find(Family::ObjectStorage, "cos").unwrap();
        let key = cos.child("keys", "bind").unwrap();
        let text = format_cos_key(cos, key, &doc).render();
        assert!(text.starts_with("resource \"ibm_resource_key\" \"cos_object_storage_key_bind\" {\n"));
        assert!(text.contains("  parameters           = {\n    HMAC = true\n  }\n"));
    }
}
