//! Kubernetes and OpenShift clusters.
//!
//! One cluster record expands into the cluster block, a worker pool block
//! per pool and, for each opaque secret, a secret group, an arbitrary
//! secret, a username/password secret and the ingress secret tying both to
//! the cluster.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{
    cluster_token, cos_ref, encryption_key_ref, kms_ref, rg_id_ref, secrets_manager_ref,
    subnet_ref, subnet_zone, vpc_ref,
};
use crate::translators::terraform::Variable;

fn is_openshift(cluster: Record<'_>) -> bool {
    cluster.str("type") == Some("openshift")
}

/// One `zones` block per subnet.
fn zones(doc: &NormalizedDocument, vpc: &str, subnets: &[&str]) -> Vec<Body> {
    subnets
        .iter()
        .map(|subnet| {
            Body::new()
                .attr("name", subnet_zone(doc, Some(vpc), Some(*subnet)))
                .raw("subnet_id", subnet_ref(doc, Some(vpc), Some(*subnet), "id"))
        })
        .collect()
}

pub fn format_cluster(cluster: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = cluster.name_or_empty();
    let vpc = cluster.str("vpc").unwrap_or_default();
    let openshift = is_openshift(cluster);
    let kube_version = cluster
        .str("kube_version")
        .filter(|version| *version != "default");

    let body = Body::new()
        .template("name", kebab_name(&[name, "cluster"]))
        .raw("vpc_id", vpc_ref(doc, Some(vpc), "id"))
        .raw("resource_group_id", rg_id_ref(doc, cluster.str("resource_group")))
        .str("flavor", cluster.str("flavor").unwrap_or_default())
        .int("worker_count", cluster.int("workers_per_subnet").unwrap_or(1))
        .opt_str("kube_version", kube_version)
        .bool("update_all_workers", cluster.bool("update_all_workers"))
        .tags()
        .str("wait_till", "IngressReady")
        .bool("disable_public_service_endpoint", cluster.bool("private_endpoint"))
        .when(openshift, |body| {
            body.raw("cos_instance_crn", cos_ref(doc, cluster.str("cos"), "crn"))
                .opt_str("entitlement", cluster.str("entitlement"))
        })
        .repeated("zones", zones(doc, vpc, &cluster.strings("subnets")))
        .block(
            "timeouts",
            Body::new()
                .str("create", "3h")
                .str("update", "3h")
                .str("delete", "2h"),
        )
        .block(
            "kms_config",
            Body::new()
                .raw(
                    "crk_id",
                    encryption_key_ref(
                        doc,
                        cluster.str("kms"),
                        cluster.str("encryption_key"),
                        "key_id",
                    ),
                )
                .raw("instance_id", kms_ref(doc, cluster.str("kms"), "guid"))
                .bool("private_endpoint", false),
        );

    Block::resource(
        "ibm_container_vpc_cluster",
        &cluster_token(vpc, name),
        body,
    )
}

pub fn format_worker_pool(
    cluster: Record<'_>,
    pool: Record<'_>,
    doc: &NormalizedDocument,
) -> Block {
    let name = cluster.name_or_empty();
    let vpc = cluster.str("vpc").unwrap_or_default();
    let pool_name = pool.name_or_empty();
    let token = cluster_token(vpc, name);
    let resource_group = pool
        .str("resource_group")
        .or_else(|| cluster.str("resource_group"));

    let body = Body::new()
        .template("worker_pool_name", kebab_name(&[name, pool_name]))
        .raw("vpc_id", vpc_ref(doc, Some(vpc), "id"))
        .raw("resource_group_id", rg_id_ref(doc, resource_group))
        .raw("cluster", format!("ibm_container_vpc_cluster.{}.id", token))
        .str("flavor", pool.str("flavor").unwrap_or_default())
        .int("worker_count", pool.int("workers_per_subnet").unwrap_or(1))
        .when(is_openshift(cluster), |body| {
            body.opt_str("entitlement", pool.str("entitlement"))
        })
        .repeated("zones", zones(doc, vpc, &pool.strings("subnets")));

    Block::resource(
        "ibm_container_vpc_worker_pool",
        &address_token(&[&token, pool_name, "pool"]),
        body,
    )
}

/// Variables read by the secrets of one opaque secret.
struct SecretVariables {
    payload: String,
    username: String,
    password: String,
}

fn secret_variables(cluster: &str, secret: &str) -> SecretVariables {
    SecretVariables {
        payload: address_token(&[cluster, secret, "arbitrary_secret_data"]),
        username: address_token(&[cluster, secret, "username"]),
        password: address_token(&[cluster, secret, "password"]),
    }
}

fn secret_body(
    secret: Record<'_>,
    doc: &NormalizedDocument,
    name: &str,
    description: Option<&str>,
    group_token: &str,
) -> Body {
    Body::new()
        .raw(
            "instance_id",
            secrets_manager_ref(doc, secret.str("secrets_manager"), "guid"),
        )
        .raw("region", "var.region")
        .template("name", kebab_name(&[name]))
        .opt_str("description", description)
        .raw(
            "secret_group_id",
            format!("ibm_sm_secret_group.{}.secret_group_id", group_token),
        )
        .strings("labels", secret.strings("labels"))
        .opt_str("expiration_date", secret.str("expiration_date"))
}

/// Secret group, both secrets and the ingress secret of one opaque secret.
pub fn format_opaque_secret(
    cluster: Record<'_>,
    secret: Record<'_>,
    doc: &NormalizedDocument,
) -> Vec<Block> {
    let name = cluster.name_or_empty();
    let vpc = cluster.str("vpc").unwrap_or_default();
    let secret_name = secret.name_or_empty();
    let base = address_token(&[name, secret_name]);
    let variables = secret_variables(name, secret_name);

    let group = address_token(&[&base, "secrets_group"]);
    let arbitrary = address_token(&[&base, "arbitrary_secret"]);
    let user_pass = address_token(&[&base, "user_pass_secret"]);

    let group_block = Block::resource(
        "ibm_sm_secret_group",
        &group,
        Body::new()
            .raw(
                "instance_id",
                secrets_manager_ref(doc, secret.str("secrets_manager"), "guid"),
            )
            .raw("region", "var.region")
            .template(
                "name",
                kebab_name(&[secret.str("secrets_group").unwrap_or_default()]),
            )
            .str("description", format!("Secret group for {}", secret_name)),
    );

    let arbitrary_block = Block::resource(
        "ibm_sm_arbitrary_secret",
        &arbitrary,
        secret_body(
            secret,
            doc,
            secret.str("arbitrary_secret_name").unwrap_or_default(),
            secret.str("arbitrary_secret_description"),
            &group,
        )
        .raw("payload", format!("var.{}", variables.payload)),
    );

    let user_pass_block = Block::resource(
        "ibm_sm_username_password_secret",
        &user_pass,
        secret_body(
            secret,
            doc,
            secret.str("username_password_secret_name").unwrap_or_default(),
            secret.str("username_password_secret_description"),
            &group,
        )
        .raw("username", format!("var.{}", variables.username))
        .raw("password", format!("var.{}", variables.password))
        .block(
            "rotation",
            Body::new()
                .bool("auto_rotate", secret.bool("auto_rotate"))
                .int("interval", secret.int("interval").unwrap_or(1))
                .str("unit", secret.str("unit").unwrap_or("day")),
        ),
    );

    let ingress_block = Block::resource(
        "ibm_container_ingress_secret_opaque",
        &address_token(&[&base, "opaque_secret"]),
        Body::new()
            .raw(
                "cluster",
                format!(
                    "ibm_container_vpc_cluster.{}.name",
                    cluster_token(vpc, name)
                ),
            )
            .template("secret_name", kebab_name(&[secret_name]))
            .str(
                "secret_namespace",
                secret.str("namespace").unwrap_or("default"),
            )
            .bool("persistence", secret.bool("persistence"))
            .repeated(
                "fields",
                vec![
                    Body::new().raw("crn", format!("ibm_sm_arbitrary_secret.{}.crn", arbitrary)),
                    Body::new().raw(
                        "crn",
                        format!("ibm_sm_username_password_secret.{}.crn", user_pass),
                    ),
                ],
            ),
    );

    vec![group_block, arbitrary_block, user_pass_block, ingress_block]
}

/// Sensitive inputs of every opaque secret.
pub fn secret_variables_for(doc: &NormalizedDocument) -> Vec<Variable> {
    let mut out = Vec::new();
    for cluster in doc.records(Family::Clusters) {
        let name = cluster.name_or_empty();
        for secret in cluster.children("opaque_secrets") {
            let secret_name = secret.name_or_empty();
            let variables = secret_variables(name, secret_name);
            out.push(
                Variable::string(
                    variables.payload,
                    format!("Arbitrary secret data for {}", secret_name),
                )
                .sensitive(),
            );
            out.push(
                Variable::string(
                    variables.username,
                    format!("Username for secret {}", secret_name),
                )
                .sensitive(),
            );
            out.push(
                Variable::string(
                    variables.password,
                    format!("Password for secret {}", secret_name),
                )
                .sensitive(),
            );
        }
    }
    out
}

pub fn format_cluster_section(cluster: Record<'_>, doc: &NormalizedDocument) -> Section {
    let mut blocks = vec![format_cluster(cluster, doc)];
    for pool in cluster.children("worker_pools") {
        blocks.push(format_worker_pool(cluster, pool, doc));
    }
    for secret in cluster.children("opaque_secrets") {
        blocks.extend(format_opaque_secret(cluster, secret, doc));
    }
    Section::new(
        format!("{} Cluster", title_case(cluster.name_or_empty())),
        blocks,
    )
}

pub fn clusters_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::Clusters)
        .into_iter()
        .map(|cluster| format_cluster_section(cluster, doc))
        .collect();
    render_file(&sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture(cluster_type: &str) -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-workload-rg"}],
            "key_management": [{"name": "slz-kms", "keys": [{"name": "roks-key"}]}],
            "object_storage": [{"name": "cos"}],
            "secrets_manager": [{"name": "secrets-manager"}],
            "vpcs": [{"name": "workload", "subnets": [
                {"name": "vsi-zone-1", "zone": 1},
                {"name": "vsi-zone-2", "zone": 2}
            ]}],
            "clusters": [{
                "name": "workload",
                "type": cluster_type,
                "kube_version": "default",
                "flavor": "bx2.16x64",
                "vpc": "workload",
                "subnets": ["vsi-zone-1", "vsi-zone-2"],
                "workers_per_subnet": 2,
                "resource_group": "slz-workload-rg",
                "kms": "slz-kms",
                "encryption_key": "roks-key",
                "cos": "cos",
                "entitlement": "cloud_pak",
                "update_all_workers": false,
                "private_endpoint": true,
                "worker_pools": [{
                    "name": "logging-pool",
                    "flavor": "bx2.16x64",
                    "subnets": ["vsi-zone-1"],
                    "workers_per_subnet": 2,
                    "entitlement": null,
                    "resource_group": null
                }],
                "opaque_secrets": [{
                    "name": "ingress",
                    "secrets_manager": "secrets-manager",
                    "secrets_group": "ingress-group",
                    "namespace": "ingress-ns",
                    "persistence": true,
                    "expiration_date": null,
                    "labels": ["ingress"],
                    "arbitrary_secret_name": "arb",
                    "arbitrary_secret_description": null,
                    "username_password_secret_name": "creds",
                    "username_password_secret_description": "login",
                    "auto_rotate": true,
                    "interval": 7,
                    "unit": "day"
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_openshift_only_attributes() {
        let doc = fixture("openshift");
        let cluster = doc.find(Family::Clusters, "workload").unwrap();
        let text = format_cluster(cluster, &doc).render();
        assert!(text.starts_with(
            "resource \"ibm_container_vpc_cluster\" \"workload_vpc_workload_cluster\" {\n"
        ));
        assert!(text.contains("cos_instance_crn                = ibm_resource_instance.cos_object_storage.crn\n"));
        assert!(text.contains("entitlement                     = \"cloud_pak\"\n"));
        assert!(!text.contains("kube_version"));
        assert!(text.contains("    crk_id           = ibm_kms_key.slz_kms_roks_key_key.key_id\n"));

        let doc = fixture("iks");
        let cluster = doc.find(Family::Clusters, "workload").unwrap();
        let text = format_cluster(cluster, &doc).render();
        assert!(!text.contains("cos_instance_crn"));
        assert!(!text.contains("entitlement"));
    }

    #[test]
    fn test_zones_follow_subnets() {
        let doc = fixture("iks");
        let cluster = doc.find(Family::Clusters, "workload").unwrap();
        let text = format_cluster(cluster, &doc).render();
        assert!(text.contains(
            "  zones {\n    name      = \"${var.region}-2\"\n    subnet_id = module.workload_vpc.subnet_vsi_zone_2_id\n  }\n"
        ));
    }

    #[test]
    fn test_cluster_expansion() {
        let doc = fixture("openshift");
        let cluster = doc.find(Family::Clusters, "workload").unwrap();
        let section = format_cluster_section(cluster, &doc);
        // cluster, one pool, four secret blocks
        assert_eq!(section.blocks.len(), 6);
        assert_eq!(
            section.blocks[1].address(),
            "ibm_container_vpc_worker_pool.workload_vpc_workload_cluster_logging_pool_pool"
        );
        let ingress = section.blocks[5].render();
        assert!(ingress.contains("cluster          = ibm_container_vpc_cluster.workload_vpc_workload_cluster.name"));
        assert!(ingress.contains("  fields {\n    crn = ibm_sm_arbitrary_secret.workload_ingress_arbitrary_secret.crn\n  }\n"));
        let user_pass = section.blocks[4].render();
        assert!(user_pass.contains("password        = var.workload_ingress_password"));
        assert!(user_pass.contains("  rotation {\n    auto_rotate = true\n    interval    = 7\n    unit        = \"day\"\n  }\n"));
    }

    #[test]
    fn test_secret_variables() {
        let variables = secret_variables_for(&fixture("iks"));
        let names: Vec<&str> = variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "workload_ingress_arbitrary_secret_data",
                "workload_ingress_username",
                "workload_ingress_password"
            ]
        );
        assert!(variables.iter().all(|v| v.sensitive));
    }
}
