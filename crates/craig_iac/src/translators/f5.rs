//! F5 BIG-IP virtual editions.
//!
//! Each appliance boots with a cloud-init document rendered from its
//! `template` object. The TMOS admin password is never written to the
//! document; it comes from a sensitive variable.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{escape_template, quote, render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, zone_name};
use crate::refs::{
    encryption_key_ref, rg_id_ref, security_group_ref, ssh_key_ref, subnet_ref, tf_ref, vpc_ref,
};
use crate::translators::terraform::Variable;

pub const PASSWORD_VARIABLE: &str = "f5_tmos_admin_password";

fn image_data_token(image: &str) -> String {
    address_token(&["f5", image])
}

fn instance_token(f5: Record<'_>) -> String {
    address_token(&[f5.str("vpc").unwrap_or_default(), "vpc", f5.name_or_empty(), "f5"])
}

/// One image data source per distinct image.
pub fn format_f5_images(doc: &NormalizedDocument) -> Vec<Block> {
    let mut seen: Vec<&str> = Vec::new();
    let mut blocks = Vec::new();
    for f5 in doc.records(Family::F5Vsi) {
        if let Some(image) = f5.str("image") {
            if !seen.contains(&image) {
                seen.push(image);
                blocks.push(Block::data(
                    "ibm_is_image",
                    &image_data_token(image),
                    Body::new().str("name", image),
                ));
            }
        }
    }
    blocks
}

/// Double-quoted cloud-init scalar. HCL and YAML share the escapes used by
/// `quote`; template sequences are escaped for the heredoc.
fn scalar(value: &str) -> String {
    quote(&escape_template(value))
}

/// Licensing stanza of the cloud-init document.
fn license_lines(template: Option<Record<'_>>) -> Vec<String> {
    let field = |key: &str| template.and_then(|t| t.str(key)).unwrap_or_default();
    match field("license_type") {
        "byol" => vec![
            "  license:".to_string(),
            format!("    basekey: {}", scalar(field("byol_license_basekey"))),
        ],
        "regkeypool" | "utilitypool" => vec![
            "  license:".to_string(),
            format!("    type: {}", scalar(field("license_type"))),
            format!("    host: {}", scalar(field("license_host"))),
            format!("    username: {}", scalar(field("license_username"))),
            format!("    pool: {}", scalar(field("license_pool"))),
        ],
        _ => Vec::new(),
    }
}

/// Cloud-init document for one appliance.
pub fn cloud_init_template(f5: Record<'_>) -> String {
    let template = f5.object("template");
    let field = |key: &str| template.and_then(|t| t.str(key)).unwrap_or_default();

    let mut lines = vec![
        "#cloud-config".to_string(),
        "chpasswd:".to_string(),
        "  expire: false".to_string(),
        "  list: |".to_string(),
        format!("    admin:${{var.{}}}", PASSWORD_VARIABLE),
        "tmos_dhcpv4_tmm:".to_string(),
        "  enabled: true".to_string(),
        "  rd_enabled: false".to_string(),
        "  icontrollx_trusted_sources: false".to_string(),
        "  inject_routes: true".to_string(),
        "  configsync_interface: 1.1".to_string(),
        "  default_route_interface: 1.1".to_string(),
        "  dhcp_timeout: 120".to_string(),
        "  dhcpv4_options:".to_string(),
        "    mgmt:".to_string(),
        format!("      host-name: {}", scalar(field("hostname"))),
        format!("      domain-name: {}", scalar(field("domain"))),
    ];
    lines.extend(license_lines(template));
    lines.extend([
        "  do_enabled: true".to_string(),
        format!("  do_declaration_url: {}", scalar(field("do_declaration_url"))),
        "  as3_enabled: true".to_string(),
        format!("  as3_declaration_url: {}", scalar(field("as3_declaration_url"))),
        "  ts_enabled: true".to_string(),
        format!("  ts_declaration_url: {}", scalar(field("ts_declaration_url"))),
        format!("  phone_home_url: {}", scalar(field("phone_home_url"))),
        "  phone_home_url_verify_tls: false".to_string(),
        "  phone_home_url_metadata:".to_string(),
        format!("    template_source: {}", scalar(field("template_source"))),
        format!("    template_version: {}", scalar(field("template_version"))),
        format!("    zone: \"{}\"", zone_name(f5.int("zone").unwrap_or(1))),
        format!("    vpc: {}", scalar(f5.str("vpc").unwrap_or_default())),
        format!("    app_id: {}", scalar(field("app_id"))),
        format!("  tgactive_url: {}", scalar(field("tgactive_url"))),
        format!("  tgstandby_url: {}", scalar(field("tgstandby_url"))),
        format!("  tgrefresh_url: {}", scalar(field("tgrefresh_url"))),
    ]);
    lines.join("\n")
}

pub fn format_f5_instance(f5: Record<'_>, doc: &NormalizedDocument) -> Block {
    let vpc = f5.str("vpc");
    let security_groups: Vec<String> = f5
        .strings("security_groups")
        .into_iter()
        .map(|sg| security_group_ref(doc, sg))
        .collect();
    let keys: Vec<String> = f5
        .strings("ssh_keys")
        .into_iter()
        .map(|key| ssh_key_ref(doc, key))
        .collect();

    let body = Body::new()
        .template("name", kebab_name(&[f5.name_or_empty()]))
        .raw(
            "image",
            tf_ref(
                "ibm_is_image",
                &image_data_token(f5.str("image").unwrap_or_default()),
                "id",
                true,
            ),
        )
        .str("profile", f5.str("profile").unwrap_or_default())
        .raw("resource_group", rg_id_ref(doc, f5.str("resource_group")))
        .raw("vpc", vpc_ref(doc, vpc, "id"))
        .template("zone", zone_name(f5.int("zone").unwrap_or(1)))
        .tags()
        .block(
            "primary_network_interface",
            Body::new()
                .raw("subnet", subnet_ref(doc, vpc, f5.str("subnet"), "id"))
                .raws("security_groups", security_groups),
        )
        .when(f5.str("encryption_key").is_some(), |body| {
            body.block(
                "boot_volume",
                Body::new().raw(
                    "encryption",
                    encryption_key_ref(doc, f5.str("kms"), f5.str("encryption_key"), "crn"),
                ),
            )
        })
        .raws("keys", keys)
        .heredoc("user_data", "TEMPLATE", cloud_init_template(f5));

    Block::resource("ibm_is_instance", &instance_token(f5), body)
}

/// Admin password variable, present when any appliance is declared.
pub fn f5_variables(doc: &NormalizedDocument) -> Vec<Variable> {
    if doc.records(Family::F5Vsi).is_empty() {
        return Vec::new();
    }
    vec![Variable::string(PASSWORD_VARIABLE, "F5 TMOS admin password").sensitive()]
}

pub fn f5_big_ip_tf(doc: &NormalizedDocument) -> Option<String> {
    let instances = doc
        .records(Family::F5Vsi)
        .into_iter()
        .map(|f5| format_f5_instance(f5, doc))
        .collect();
    render_file(&[
        Section::new("F5 Image Data Sources", format_f5_images(doc)),
        Section::new("F5 Big IP Virtual Servers", instances),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture(license_type: &str) -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-edge-rg"}],
            "vpcs": [{"name": "edge", "subnets": [{"name": "f5-management-zone-1", "zone": 1}]}],
            "security_groups": [{"name": "f5-management-sg", "vpc": "edge"}],
            "ssh_keys": [{"name": "ssh-key"}],
            "f5_vsi": [
                {
                    "name": "f5-zone-1",
                    "vpc": "edge",
                    "subnet": "f5-management-zone-1",
                    "zone": 1,
                    "resource_group": "slz-edge-rg",
                    "image": "f5-bigip-16-1-2-2-0-0-28-all-1slot",
                    "profile": "cx2-4x8",
                    "ssh_keys": ["ssh-key"],
                    "security_groups": ["f5-management-sg"],
                    "kms": null,
                    "encryption_key": null,
                    "template": {
                        "hostname": "f5-ve-01",
                        "domain": "local",
                        "license_type": license_type,
                        "byol_license_basekey": "ABCDE-12345",
                        "license_host": null,
                        "template_version": "20210201",
                        "template_source": "f5devcentral/ibmcloud_schematics_bigip_multinic_declared",
                        "app_id": "null"
                    }
                },
                {
                    "name": "f5-zone-2",
                    "vpc": "edge",
                    "subnet": "f5-management-zone-1",
                    "zone": 2,
                    "resource_group": "slz-edge-rg",
                    "image": "f5-bigip-16-1-2-2-0-0-28-all-1slot",
                    "profile": "cx2-4x8",
                    "ssh_keys": ["ssh-key"],
                    "security_groups": ["f5-management-sg"],
                    "template": {}
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_images_are_shared() {
        let doc = fixture("none");
        let images = format_f5_images(&doc);
        assert_eq!(images.len(), 1);
        assert_eq!(
            images[0].address(),
            "data.ibm_is_image.f5_f5_bigip_16_1_2_2_0_0_28_all_1slot"
        );
    }

    #[test]
    fn test_instance_template() {
        let text = f5_big_ip_tf(&fixture("byol")).unwrap();
        assert!(text.contains("resource \"ibm_is_instance\" \"edge_vpc_f5_zone_1_f5\""));
        assert!(text.contains("  user_data      = <<TEMPLATE\n#cloud-config\n"));
        assert!(text.contains("    admin:${var.f5_tmos_admin_password}\n"));
        assert!(text.contains("      host-name: \"f5-ve-01\"\n"));
        assert!(text.contains("  license:\n    basekey: \"ABCDE-12345\"\n"));
        assert!(text.contains("  tgrefresh_url: \"\"\nTEMPLATE\n"));
        assert!(!text.contains("boot_volume"));
    }

    #[test]
    fn test_password_variable() {
        let doc = fixture("none");
        assert_eq!(f5_variables(&doc).len(), 1);
        assert!(!f5_big_ip_tf(&doc).unwrap().contains("license:"));

        let empty = NormalizedDocument::from_value_unchecked(json!({"f5_vsi": []})).unwrap();
        assert!(f5_variables(&empty).is_empty());
        assert!(f5_big_ip_tf(&empty).is_none());
    }

    #[test]
    fn test_template_values_are_escaped() {
        let doc = NormalizedDocument::from_value_unchecked(json!({
            "f5_vsi": [{
                "name": "f5",
                "vpc": "edge",
                "zone": 1,
                "template": {"hostname": "f5 \"ve\" ${host}", "domain": "%{ x }"}
            }]
        }))
        .unwrap();
        let f5 = doc.find(Family::F5Vsi, "f5").unwrap();
        let text = cloud_init_template(f5);
        assert!(text.contains("      host-name: \"f5 \\\"ve\\\" $${host}\"\n"));
        assert!(text.contains("      domain-name: \"%%{ x }\"\n"));
        assert!(text.contains("    zone: \"${var.region}-1\"\n"));
    }
}
