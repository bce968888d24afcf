//! Reference resolution.
//!
//! Builders look up the named record and return a Terraform reference
//! expression. A record with `use_data` set is referenced through its `data`
//! block. When the target cannot be found the builder returns a sentinel
//! string; generation never fails on a bad reference.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::Expr;
use crate::naming::{address_token, zone_name};

/// Sentinel for unresolved resource group, key management, key and generic
/// references.
pub const UNFOUND_REF: &str = "ERROR: Unfound ref";

/// Sentinel for unresolved lookups of a named kind, e.g. `Error: VPC not found`.
pub fn not_found(kind: &str) -> String {
    format!("Error: {} not found", kind)
}

/// `type.token.attr`, prefixed with `data.` for data lookups.
pub fn tf_ref(resource_type: &str, token: &str, attr: &str, use_data: bool) -> String {
    let reference = format!("{}.{}.{}", resource_type, token, attr);
    if use_data {
        format!("data.{}", reference)
    } else {
        reference
    }
}

// Address tokens shared by translators and reference builders.

pub fn resource_group_token(name: &str) -> String {
    address_token(&[name])
}

pub fn kms_token(kms: &str) -> String {
    address_token(&[kms])
}

pub fn key_ring_token(kms: &str, ring: &str) -> String {
    address_token(&[kms, ring, "ring"])
}

pub fn key_token(kms: &str, key: &str) -> String {
    address_token(&[kms, key, "key"])
}

pub fn cos_token(cos: &str) -> String {
    address_token(&[cos, "object_storage"])
}

pub fn bucket_token(cos: &str, bucket: &str) -> String {
    address_token(&[cos, "object_storage", bucket, "bucket"])
}

pub fn cos_key_token(cos: &str, key: &str) -> String {
    address_token(&[cos, "object_storage", "key", key])
}

pub fn vpc_module_name(vpc: &str) -> String {
    address_token(&[vpc, "vpc"])
}

pub fn ssh_key_token(key: &str) -> String {
    address_token(&[key])
}

pub fn secrets_manager_token(name: &str) -> String {
    address_token(&[name, "secrets_manager"])
}

pub fn image_token(image: &str) -> String {
    address_token(&[image])
}

pub fn cluster_token(vpc: &str, cluster: &str) -> String {
    address_token(&[vpc, "vpc", cluster, "cluster"])
}

/// Resource group `id` for a block in the root module.
pub fn rg_id_ref(doc: &NormalizedDocument, name: Option<&str>) -> String {
    match name.and_then(|name| doc.find(Family::ResourceGroups, name)) {
        Some(rg) => tf_ref(
            "ibm_resource_group",
            &resource_group_token(rg.name_or_empty()),
            "id",
            rg.bool("use_data"),
        ),
        None => UNFOUND_REF.to_string(),
    }
}

/// Resource group `id` passed into a VPC sub-module as a variable.
pub fn rg_var_ref(doc: &NormalizedDocument, name: Option<&str>) -> String {
    match name.and_then(|name| doc.find(Family::ResourceGroups, name)) {
        Some(rg) => format!("var.{}_id", resource_group_token(rg.name_or_empty())),
        None => UNFOUND_REF.to_string(),
    }
}

/// True when a key management record is looked up instead of created.
pub fn kms_is_data(kms: Record<'_>) -> bool {
    kms.bool("use_data") || kms.bool("use_hs_crypto")
}

/// Service name of a key management record.
pub fn kms_service(kms: Record<'_>) -> &'static str {
    if kms.bool("use_hs_crypto") {
        "hs-crypto"
    } else {
        "kms"
    }
}

/// Key management instance attribute, e.g. `guid`.
pub fn kms_ref(doc: &NormalizedDocument, kms: Option<&str>, attr: &str) -> String {
    match kms.and_then(|name| doc.find(Family::KeyManagement, name)) {
        Some(record) => tf_ref(
            "ibm_resource_instance",
            &kms_token(record.name_or_empty()),
            attr,
            kms_is_data(record),
        ),
        None => UNFOUND_REF.to_string(),
    }
}

/// Attribute of a key inside a key management instance.
pub fn encryption_key_ref(
    doc: &NormalizedDocument,
    kms: Option<&str>,
    key: Option<&str>,
    attr: &str,
) -> String {
    let found = kms
        .and_then(|kms| doc.find(Family::KeyManagement, kms))
        .zip(key)
        .and_then(|(record, key)| record.child("keys", key).map(|key| (record, key)));

    match found {
        Some((kms, key)) => tf_ref(
            "ibm_kms_key",
            &key_token(kms.name_or_empty(), key.name_or_empty()),
            attr,
            false,
        ),
        None => UNFOUND_REF.to_string(),
    }
}

/// Object storage instance attribute.
pub fn cos_ref(doc: &NormalizedDocument, cos: Option<&str>, attr: &str) -> String {
    match cos.and_then(|name| doc.find(Family::ObjectStorage, name)) {
        Some(record) => tf_ref(
            "ibm_resource_instance",
            &cos_token(record.name_or_empty()),
            attr,
            record.bool("use_data"),
        ),
        None => not_found("COS"),
    }
}

/// Bucket attribute, looked up inside the named object storage instance.
pub fn bucket_ref(
    doc: &NormalizedDocument,
    cos: Option<&str>,
    bucket: Option<&str>,
    attr: &str,
) -> String {
    let found = cos
        .and_then(|cos| doc.find(Family::ObjectStorage, cos))
        .zip(bucket)
        .and_then(|(record, bucket)| record.child("buckets", bucket).map(|b| (record, b)));

    match found {
        Some((cos, bucket)) => tf_ref(
            "ibm_cos_bucket",
            &bucket_token(cos.name_or_empty(), bucket.name_or_empty()),
            attr,
            false,
        ),
        None => not_found("Bucket"),
    }
}

/// Resource key attribute of an object storage instance.
pub fn cos_key_ref(
    doc: &NormalizedDocument,
    cos: Option<&str>,
    key: Option<&str>,
    attr: &str,
) -> String {
    let found = cos
        .and_then(|cos| doc.find(Family::ObjectStorage, cos))
        .zip(key)
        .and_then(|(record, key)| record.child("keys", key).map(|k| (record, k)));

    match found {
        Some((cos, key)) => tf_ref(
            "ibm_resource_key",
            &cos_key_token(cos.name_or_empty(), key.name_or_empty()),
            attr,
            false,
        ),
        None => UNFOUND_REF.to_string(),
    }
}

/// VPC attribute exposed by its sub-module (`id`, `crn` or `name`).
pub fn vpc_ref(doc: &NormalizedDocument, vpc: Option<&str>, attr: &str) -> String {
    match vpc.and_then(|name| doc.find(Family::Vpcs, name)) {
        Some(record) => format!("module.{}.{}", vpc_module_name(record.name_or_empty()), attr),
        None => not_found("VPC"),
    }
}

/// Subnet attribute exposed by its VPC sub-module (`id` or `crn`).
pub fn subnet_ref(
    doc: &NormalizedDocument,
    vpc: Option<&str>,
    subnet: Option<&str>,
    attr: &str,
) -> String {
    match find_subnet(doc, vpc, subnet) {
        Some((vpc, subnet)) => format!(
            "module.{}.subnet_{}_{}",
            vpc_module_name(vpc.name_or_empty()),
            address_token(&[subnet.name_or_empty()]),
            attr
        ),
        None => not_found("Subnet"),
    }
}

/// Zone of a subnet as a quoted zone expression, or a raw sentinel.
pub fn subnet_zone(doc: &NormalizedDocument, vpc: Option<&str>, subnet: Option<&str>) -> Expr {
    match find_subnet(doc, vpc, subnet).and_then(|(_, subnet)| subnet.int("zone")) {
        Some(zone) => Expr::Template(zone_name(zone)),
        None => Expr::Raw(not_found("Subnet")),
    }
}

fn find_subnet<'a>(
    doc: &'a NormalizedDocument,
    vpc: Option<&str>,
    subnet: Option<&str>,
) -> Option<(Record<'a>, Record<'a>)> {
    let vpc = doc.find(Family::Vpcs, vpc?)?;
    let subnet = vpc.child("subnets", subnet?)?;
    Some((vpc, subnet))
}

/// Security group `id` exposed by the sub-module of the group's VPC.
pub fn security_group_ref(doc: &NormalizedDocument, name: &str) -> String {
    let found = doc
        .find(Family::SecurityGroups, name)
        .and_then(|sg| sg.str("vpc").map(|vpc| (vpc, sg)));
    match found {
        Some((vpc, sg)) => format!(
            "module.{}.{}_id",
            vpc_module_name(vpc),
            address_token(&[sg.name_or_empty()])
        ),
        None => not_found("Security Group"),
    }
}

/// SSH key `id`.
pub fn ssh_key_ref(doc: &NormalizedDocument, name: &str) -> String {
    match doc.find(Family::SshKeys, name) {
        Some(key) => tf_ref(
            "ibm_is_ssh_key",
            &ssh_key_token(key.name_or_empty()),
            "id",
            key.bool("use_data"),
        ),
        None => not_found("SSH Key"),
    }
}

/// Secrets manager instance attribute.
pub fn secrets_manager_ref(doc: &NormalizedDocument, name: Option<&str>, attr: &str) -> String {
    match name.and_then(|name| doc.find(Family::SecretsManager, name)) {
        Some(record) => tf_ref(
            "ibm_resource_instance",
            &secrets_manager_token(record.name_or_empty()),
            attr,
            false,
        ),
        None => not_found("Secrets Manager"),
    }
}

/// Image data source `id`.
pub fn image_ref(image: &str) -> String {
    tf_ref("ibm_is_image", &image_token(image), "id", true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [
                {"name": "slz-service-rg", "use_data": false},
                {"name": "default", "use_data": true}
            ],
            "key_management": [{"name": "kms", "keys": [{"name": "k1"}]}],
            "object_storage": [{"name": "cos", "use_data": true, "buckets": [{"name": "logs"}]}],
            "vpcs": [{"name": "management", "subnets": [{"name": "vsi-zone-1", "zone": 2}]}],
            "security_groups": [{"name": "management-vpe", "vpc": "management"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_resource_group_refs() {
        let doc = doc();
        assert_eq!(
            rg_id_ref(&doc, Some("slz-service-rg")),
            "ibm_resource_group.slz_service_rg.id"
        );
        assert_eq!(rg_id_ref(&doc, Some("default")), "data.ibm_resource_group.default.id");
        assert_eq!(rg_id_ref(&doc, Some("nope")), UNFOUND_REF);
        assert_eq!(rg_id_ref(&doc, None), UNFOUND_REF);
        assert_eq!(rg_var_ref(&doc, Some("slz-service-rg")), "var.slz_service_rg_id");
    }

    #[test]
    fn test_key_refs() {
        let doc = doc();
        assert_eq!(
            encryption_key_ref(&doc, Some("kms"), Some("k1"), "crn"),
            "ibm_kms_key.kms_k1_key.crn"
        );
        assert_eq!(encryption_key_ref(&doc, Some("kms"), Some("k2"), "crn"), UNFOUND_REF);
        assert_eq!(kms_ref(&doc, Some("kms"), "guid"), "ibm_resource_instance.kms.guid");
    }

    #[test]
    fn test_storage_refs() {
        let doc = doc();
        assert_eq!(
            cos_ref(&doc, Some("cos"), "guid"),
            "data.ibm_resource_instance.cos_object_storage.guid"
        );
        assert_eq!(
            bucket_ref(&doc, Some("cos"), Some("logs"), "bucket_name"),
            "ibm_cos_bucket.cos_object_storage_logs_bucket.bucket_name"
        );
        assert_eq!(cos_ref(&doc, Some("missing"), "id"), "Error: COS not found");
        assert_eq!(bucket_ref(&doc, Some("cos"), Some("x"), "id"), "Error: Bucket not found");
    }

    #[test]
    fn test_network_refs() {
        let doc = doc();
        assert_eq!(vpc_ref(&doc, Some("management"), "id"), "module.management_vpc.id");
        assert_eq!(vpc_ref(&doc, Some("edge"), "id"), "Error: VPC not found");
        assert_eq!(
            subnet_ref(&doc, Some("management"), Some("vsi-zone-1"), "id"),
            "module.management_vpc.subnet_vsi_zone_1_id"
        );
        assert_eq!(
            subnet_zone(&doc, Some("management"), Some("vsi-zone-1")),
            Expr::Template("${var.region}-2".into())
        );
        assert_eq!(
            security_group_ref(&doc, "management-vpe"),
            "module.management_vpc.management_vpe_id"
        );
        assert_eq!(security_group_ref(&doc, "other"), "Error: Security Group not found");
        assert_eq!(ssh_key_ref(&doc, "key"), "Error: SSH Key not found");
    }
}
