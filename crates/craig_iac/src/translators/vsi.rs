//! Virtual server deployments.
//!
//! A deployment places `vsi_per_subnet` instances in each of its subnets.
//! Instances are numbered by subnet position and by position inside the
//! subnet, both starting at one.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{escape_template, render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{
    encryption_key_ref, image_ref, image_token, rg_id_ref, security_group_ref, ssh_key_ref,
    subnet_ref, subnet_zone, vpc_ref,
};

/// One instance of a deployment.
#[derive(Debug, Clone)]
pub struct VsiInstance<'a> {
    pub deployment: Record<'a>,
    pub vpc: &'a str,
    pub subnet: &'a str,
    pub subnet_index: usize,
    pub index: usize,
}

impl<'a> VsiInstance<'a> {
    fn numbers(&self) -> (String, String) {
        ((self.subnet_index + 1).to_string(), (self.index + 1).to_string())
    }

    pub fn token(&self) -> String {
        let (subnet, index) = self.numbers();
        address_token(&[
            self.vpc,
            "vpc",
            self.deployment.name_or_empty(),
            "vsi",
            &subnet,
            &index,
        ])
    }

    pub fn display_name(&self, suffix: &[&str]) -> String {
        let (subnet, index) = self.numbers();
        let mut parts = vec![
            self.deployment.name_or_empty(),
            "vsi",
            subnet.as_str(),
            index.as_str(),
        ];
        parts.extend_from_slice(suffix);
        kebab_name(&parts)
    }

    /// Primary IPv4 address of the instance.
    pub fn address_ref(&self) -> String {
        format!(
            "ibm_is_instance.{}.primary_network_interface[0].primary_ip[0].address",
            self.token()
        )
    }
}

/// Every instance of a deployment, subnet by subnet.
pub fn vsi_instances(deployment: Record<'_>) -> Vec<VsiInstance<'_>> {
    let vpc = deployment.str("vpc").unwrap_or_default();
    let count = deployment.int("vsi_per_subnet").unwrap_or(1).max(0) as usize;

    let mut instances = Vec::new();
    for (subnet_index, subnet) in deployment.strings("subnets").into_iter().enumerate() {
        for index in 0..count {
            instances.push(VsiInstance {
                deployment,
                vpc,
                subnet,
                subnet_index,
                index,
            });
        }
    }
    instances
}

/// One data source per distinct image, in first-use order.
pub fn format_image_data(doc: &NormalizedDocument) -> Vec<Block> {
    let mut seen: Vec<&str> = Vec::new();
    let mut blocks = Vec::new();
    for deployment in doc.records(Family::Vsi) {
        if let Some(image) = deployment.str("image") {
            if !seen.contains(&image) {
                seen.push(image);
                blocks.push(Block::data(
                    "ibm_is_image",
                    &image_token(image),
                    Body::new().str("name", image),
                ));
            }
        }
    }
    blocks
}

fn volume_token(instance: &VsiInstance<'_>, volume: &str) -> String {
    address_token(&[&instance.token(), volume])
}

pub fn format_instance(instance: &VsiInstance<'_>, doc: &NormalizedDocument) -> Block {
    let deployment = instance.deployment;
    let kms = deployment.str("kms");
    let security_groups: Vec<String> = deployment
        .strings("security_groups")
        .into_iter()
        .map(|sg| security_group_ref(doc, sg))
        .collect();
    let keys: Vec<String> = deployment
        .strings("ssh_keys")
        .into_iter()
        .map(|key| ssh_key_ref(doc, key))
        .collect();
    let volumes: Vec<String> = deployment
        .children("volumes")
        .into_iter()
        .map(|volume| {
            format!(
                "ibm_is_volume.{}.id",
                volume_token(instance, volume.name_or_empty())
            )
        })
        .collect();

    let mut body = Body::new()
        .template("name", instance.display_name(&[]))
        .raw("image", image_ref(deployment.str("image").unwrap_or_default()))
        .str("profile", deployment.str("profile").unwrap_or_default())
        .raw("resource_group", rg_id_ref(doc, deployment.str("resource_group")))
        .raw("vpc", vpc_ref(doc, Some(instance.vpc), "id"))
        .attr("zone", subnet_zone(doc, Some(instance.vpc), Some(instance.subnet)))
        .tags()
        .block(
            "primary_network_interface",
            Body::new()
                .raw(
                    "subnet",
                    subnet_ref(doc, Some(instance.vpc), Some(instance.subnet), "id"),
                )
                .raws("security_groups", security_groups),
        )
        .when(deployment.str("encryption_key").is_some(), |body| {
            body.block(
                "boot_volume",
                Body::new().raw(
                    "encryption",
                    encryption_key_ref(doc, kms, deployment.str("encryption_key"), "crn"),
                ),
            )
        })
        .raws("keys", keys);
    if !volumes.is_empty() {
        body = body.raws("volumes", volumes);
    }
    if let Some(user_data) = deployment.str("user_data") {
        body = body.heredoc("user_data", "USER_DATA", escape_template(user_data));
    }

    Block::resource("ibm_is_instance", &instance.token(), body)
}

pub fn format_volume(
    instance: &VsiInstance<'_>,
    volume: Record<'_>,
    doc: &NormalizedDocument,
) -> Block {
    let deployment = instance.deployment;
    let volume_name = volume.name_or_empty();
    let body = Body::new()
        .template("name", instance.display_name(&[volume_name]))
        .str("profile", volume.str("profile").unwrap_or("general-purpose"))
        .attr("zone", subnet_zone(doc, Some(instance.vpc), Some(instance.subnet)))
        .raw("resource_group", rg_id_ref(doc, deployment.str("resource_group")))
        .opt_int("capacity", volume.int("capacity"))
        .when(volume.str("encryption_key").is_some(), |body| {
            body.raw(
                "encryption_key",
                encryption_key_ref(
                    doc,
                    deployment.str("kms"),
                    volume.str("encryption_key"),
                    "crn",
                ),
            )
        })
        .tags();
    Block::resource("ibm_is_volume", &volume_token(instance, volume_name), body)
}

pub fn format_floating_ip(instance: &VsiInstance<'_>) -> Block {
    let token = instance.token();
    Block::resource(
        "ibm_is_floating_ip",
        &address_token(&[&token, "fip"]),
        Body::new()
            .template("name", instance.display_name(&["fip"]))
            .raw(
                "target",
                format!(
                    "ibm_is_instance.{}.primary_network_interface[0].id",
                    token
                ),
            )
            .tags(),
    )
}

/// Volumes, instance and floating IP of every instance of a deployment.
pub fn format_deployment(deployment: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let mut blocks = Vec::new();
    for instance in vsi_instances(deployment) {
        for volume in deployment.children("volumes") {
            blocks.push(format_volume(&instance, volume, doc));
        }
        blocks.push(format_instance(&instance, doc));
        if deployment.bool("enable_floating_ip") {
            blocks.push(format_floating_ip(&instance));
        }
    }
    blocks
}

pub fn virtual_servers_tf(doc: &NormalizedDocument) -> Option<String> {
    let deployments = doc.records(Family::Vsi);
    if deployments.is_empty() {
        return None;
    }

    let mut sections = vec![Section::new("Image Data Sources", format_image_data(doc))];
    for deployment in deployments {
        sections.push(Section::new(
            format!(
                "{} {} Deployment",
                title_case(deployment.str("vpc").unwrap_or_default()),
                title_case(deployment.name_or_empty())
            ),
            format_deployment(deployment, doc),
        ));
    }
    render_file(&sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-management-rg"}],
            "key_management": [{"name": "slz-kms", "keys": [{"name": "vsi-volume-key"}]}],
            "vpcs": [{"name": "management", "subnets": [
                {"name": "vsi-zone-1", "zone": 1},
                {"name": "vsi-zone-2", "zone": 2}
            ]}],
            "security_groups": [{"name": "management-vsi-sg", "vpc": "management"}],
            "ssh_keys": [{"name": "slz-ssh-key"}],
            "vsi": [
                {
                    "name": "management-server",
                    "vpc": "management",
                    "subnets": ["vsi-zone-1", "vsi-zone-2"],
                    "security_groups": ["management-vsi-sg"],
                    "ssh_keys": ["slz-ssh-key"],
                    "image": "ibm-ubuntu-22-04-1-minimal-amd64-1",
                    "profile": "cx2-4x8",
                    "vsi_per_subnet": 2,
                    "resource_group": "slz-management-rg",
                    "kms": "slz-kms",
                    "encryption_key": "vsi-volume-key",
                    "user_data": "#cloud-config\npackages:\n  - nginx",
                    "enable_floating_ip": true,
                    "volumes": [{"name": "data", "profile": "10iops-tier", "capacity": 100, "encryption_key": "vsi-volume-key"}]
                },
                {
                    "name": "jump",
                    "vpc": "management",
                    "subnets": ["vsi-zone-1"],
                    "security_groups": [],
                    "ssh_keys": ["missing-key"],
                    "image": "ibm-ubuntu-22-04-1-minimal-amd64-1",
                    "profile": "cx2-2x4",
                    "vsi_per_subnet": 1,
                    "resource_group": "slz-management-rg",
                    "kms": null,
                    "encryption_key": null,
                    "user_data": null,
                    "enable_floating_ip": false,
                    "volumes": []
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_instances_per_subnet() {
        let doc = fixture();
        let deployment = doc.find(Family::Vsi, "management-server").unwrap();
        let tokens: Vec<String> = vsi_instances(deployment).iter().map(VsiInstance::token).collect();
        assert_eq!(
            tokens,
            vec![
                "management_vpc_management_server_vsi_1_1",
                "management_vpc_management_server_vsi_1_2",
                "management_vpc_management_server_vsi_2_1",
                "management_vpc_management_server_vsi_2_2"
            ]
        );
        // four instances, each with a volume and a floating ip
        assert_eq!(format_deployment(deployment, &doc).len(), 12);
    }

    #[test]
    fn test_instance_block() {
        let doc = fixture();
        let deployment = doc.find(Family::Vsi, "management-server").unwrap();
        let instances = vsi_instances(deployment);
        let text = format_instance(&instances[2], &doc).render();

        assert!(text.contains("  name           = \"${var.prefix}-management-server-vsi-2-1\"\n"));
        assert!(text.contains("  image          = data.ibm_is_image.ibm_ubuntu_22_04_1_minimal_amd64_1.id\n"));
        assert!(text.contains("  zone           = \"${var.region}-2\"\n"));
        assert!(text.contains("    security_groups = [module.management_vpc.management_vsi_sg_id]\n"));
        assert!(text.contains("    encryption = ibm_kms_key.slz_kms_vsi_volume_key_key.crn\n"));
        assert!(text.contains("  volumes        = [ibm_is_volume.management_vpc_management_server_vsi_2_1_data.id]\n"));
        assert!(text.ends_with("  user_data      = <<USER_DATA\n#cloud-config\npackages:\n  - nginx\nUSER_DATA\n}\n"));
    }

    #[test]
    fn test_user_data_is_not_interpolated() {
        let doc = NormalizedDocument::from_value_unchecked(json!({
            "vsi": [{
                "name": "web",
                "vpc": "management",
                "subnets": ["vsi-zone-1"],
                "vsi_per_subnet": 1,
                "user_data": "echo ${HOME}\nUSER_DATA\necho done"
            }]
        }))
        .unwrap();
        let deployment = doc.find(Family::Vsi, "web").unwrap();
        let text = format_instance(&vsi_instances(deployment)[0], &doc).render();
        assert!(text.ends_with(
            "<<USER_DATA_\necho $${HOME}\nUSER_DATA\necho done\nUSER_DATA_\n}\n"
        ));
    }

    #[test]
    fn test_missing_key_and_no_encryption() {
        let doc = fixture();
        let deployment = doc.find(Family::Vsi, "jump").unwrap();
        let instance = &vsi_instances(deployment)[0];
        let text = format_instance(instance, &doc).render();
        assert!(text.contains("keys           = [Error: SSH Key not found]"));
        assert!(!text.contains("boot_volume"));
        assert!(!text.contains("user_data"));
    }

    #[test]
    fn test_images_are_deduplicated() {
        let doc = fixture();
        assert_eq!(format_image_data(&doc).len(), 1);
        let text = virtual_servers_tf(&doc).unwrap();
        assert!(text.contains("# Image Data Sources\n"));
        assert!(text.contains("# Management Jump Deployment\n"));
    }
}
