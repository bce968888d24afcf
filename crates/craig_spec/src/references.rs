//! Cross-reference checks.
//!
//! Every field that names a record in another family must resolve. These
//! checks run after defaulting, so optional fields are known to be present
//! (possibly `null`).

use std::collections::{HashMap, HashSet};

use crate::document::{NormalizedDocument, Record};
use crate::error::{SpecError, SpecResult};
use crate::family::{Family, Section};

/// Snake-cased form of a name, as used in Terraform addresses and module
/// directories.
fn address_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c);
        } else if !key.ends_with('_') {
            key.push('_');
        }
    }
    key.trim_matches('_').to_string()
}

/// Check that names are unique within every family, both as written and
/// once snake-cased into addresses.
pub fn check_unique_names(doc: &NormalizedDocument) -> SpecResult<()> {
    for family in Family::all() {
        let mut seen = HashSet::new();
        let mut keys: HashMap<String, &str> = HashMap::new();
        for record in doc.records(family) {
            let Some(name) = record.name() else {
                continue;
            };
            if !seen.insert(name) {
                return Err(SpecError::DuplicateName {
                    family: family.as_str().to_string(),
                    name: name.to_string(),
                });
            }
            if let Some(other) = keys.insert(address_key(name), name) {
                return Err(SpecError::NameCollision {
                    family: family.as_str().to_string(),
                    name: name.to_string(),
                    other: other.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Run every cross-reference check. Stops at the first failure.
pub fn check_references(doc: &NormalizedDocument) -> SpecResult<()> {
    let checks = References { doc };
    checks.key_management()?;
    checks.object_storage()?;
    checks.vpcs()?;
    checks.security_groups()?;
    checks.routing_tables()?;
    checks.virtual_private_endpoints()?;
    checks.ssh_keys()?;
    checks.vsi()?;
    checks.clusters()?;
    checks.vpn_gateways()?;
    checks.transit_gateways()?;
    checks.simple_resource_groups(Family::Appid)?;
    checks.secrets_manager()?;
    checks.simple_resource_groups(Family::EventStreams)?;
    checks.load_balancers()?;
    checks.access_groups()?;
    checks.vpn_servers()?;
    checks.dns()?;
    checks.icd()?;
    checks.f5_vsi()?;
    checks.atracker()?;
    checks.observability()?;
    Ok(())
}

struct References<'a> {
    doc: &'a NormalizedDocument,
}

fn label(name: &str) -> String {
    format!("`{}`", name)
}

fn nested_label(parent: &str, name: &str) -> String {
    format!("`{}.{}`", parent, name)
}

impl<'a> References<'a> {
    fn exists(&self, family: Family, name: &str) -> bool {
        self.doc.find(family, name).is_some()
    }

    /// Resource group field, when set, must name a resource group.
    fn resource_group(&self, family: &str, label: &str, record: Record<'_>) -> SpecResult<()> {
        if let Some(rg) = record.str("resource_group") {
            if !self.exists(Family::ResourceGroups, rg) {
                return Err(SpecError::unknown(
                    family,
                    label,
                    "resource_group",
                    "resource group",
                    rg,
                ));
            }
        }
        Ok(())
    }

    fn kms_instance(&self, family: &str, label: &str, kms: &str) -> SpecResult<Record<'a>> {
        self.doc
            .find(Family::KeyManagement, kms)
            .ok_or_else(|| SpecError::unknown(family, label, "kms", "key management instance", kms))
    }

    /// `kms`, when set, must name a KMS instance; a key field, when set, must
    /// name a key inside it.
    fn encryption_key(
        &self,
        family: &str,
        label: &str,
        field: &str,
        kms: Option<&str>,
        key: Option<&str>,
    ) -> SpecResult<()> {
        let instance = kms
            .map(|kms| self.kms_instance(family, label, kms))
            .transpose()?;
        let Some(key) = key else {
            return Ok(());
        };
        let (Some(kms), Some(instance)) = (kms, instance) else {
            return Err(SpecError::KeyNotFound {
                family: family.to_string(),
                record: label.to_string(),
                field: field.to_string(),
                key: key.to_string(),
                kms: "null".to_string(),
            });
        };
        if instance.child("keys", key).is_none() {
            return Err(SpecError::KeyNotFound {
                family: family.to_string(),
                record: label.to_string(),
                field: field.to_string(),
                key: key.to_string(),
                kms: kms.to_string(),
            });
        }
        Ok(())
    }

    fn vpc(&self, family: &str, label: &str, vpc: Option<&str>) -> SpecResult<Record<'a>> {
        let name = vpc.unwrap_or("null");
        self.doc
            .find(Family::Vpcs, name)
            .ok_or_else(|| SpecError::unknown(family, label, "vpc", "VPC", name))
    }

    fn subnets_in_vpc(
        &self,
        family: &str,
        label: &str,
        vpc: Record<'_>,
        subnets: &[&str],
    ) -> SpecResult<()> {
        for subnet in subnets {
            if vpc.child("subnets", subnet).is_none() {
                return Err(SpecError::NotInVpc {
                    family: family.to_string(),
                    record: label.to_string(),
                    kind: "subnet".to_string(),
                    name: subnet.to_string(),
                    vpc: vpc.name_or_empty().to_string(),
                });
            }
        }
        Ok(())
    }

    fn security_groups_in_vpc(
        &self,
        family: &str,
        label: &str,
        vpc: &str,
        groups: &[&str],
    ) -> SpecResult<()> {
        for group in groups {
            let Some(sg) = self.doc.find(Family::SecurityGroups, group) else {
                return Err(SpecError::unknown(
                    family,
                    label,
                    "security_groups",
                    "security group",
                    group,
                ));
            };
            if sg.str("vpc") != Some(vpc) {
                return Err(SpecError::NotInVpc {
                    family: family.to_string(),
                    record: label.to_string(),
                    kind: "security group".to_string(),
                    name: group.to_string(),
                    vpc: vpc.to_string(),
                });
            }
        }
        Ok(())
    }

    fn ssh_key_refs(&self, family: &str, label: &str, keys: &[&str]) -> SpecResult<()> {
        for key in keys {
            if !self.exists(Family::SshKeys, key) {
                return Err(SpecError::unknown(family, label, "ssh_keys", "SSH key", key));
            }
        }
        Ok(())
    }

    fn cos_bucket(
        &self,
        family: &str,
        label: &str,
        cos: Option<&str>,
        bucket: Option<&str>,
    ) -> SpecResult<()> {
        match (cos, bucket) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(SpecError::invalid(
                family,
                label,
                "bucket",
                "a bucket requires an object storage instance",
            )),
            (Some(cos), bucket) => {
                let instance = self.doc.find(Family::ObjectStorage, cos).ok_or_else(|| {
                    SpecError::unknown(family, label, "cos", "object storage instance", cos)
                })?;
                if let Some(bucket) = bucket {
                    if instance.child("buckets", bucket).is_none() {
                        return Err(SpecError::unknown(
                            family,
                            label,
                            "bucket",
                            &format!("bucket in object storage instance `{}`", cos),
                            bucket,
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    fn simple_resource_groups(&self, family: Family) -> SpecResult<()> {
        for record in self.doc.records(family) {
            self.resource_group(family.as_str(), &label(record.name_or_empty()), record)?;
        }
        Ok(())
    }

    fn key_management(&self) -> SpecResult<()> {
        self.simple_resource_groups(Family::KeyManagement)
    }

    fn object_storage(&self) -> SpecResult<()> {
        let family = Family::ObjectStorage.as_str();
        for cos in self.doc.records(Family::ObjectStorage) {
            let name = cos.name_or_empty();
            self.resource_group(family, &label(name), cos)?;
            if let Some(kms) = cos.str("kms") {
                self.kms_instance(family, &label(name), kms)?;
            }
            for bucket in cos.children("buckets") {
                self.encryption_key(
                    "object_storage.buckets",
                    &nested_label(name, bucket.name_or_empty()),
                    "kms_key",
                    cos.str("kms"),
                    bucket.str("kms_key"),
                )?;
            }
        }
        Ok(())
    }

    fn vpcs(&self) -> SpecResult<()> {
        let family = Family::Vpcs.as_str();
        for vpc in self.doc.records(Family::Vpcs) {
            let name = vpc.name_or_empty();
            self.resource_group(family, &label(name), vpc)?;
            self.cos_bucket(family, &label(name), vpc.str("cos"), vpc.str("bucket"))?;
            if vpc.str("cos").is_some() && vpc.is_null("bucket") {
                return Err(SpecError::null(family, &label(name), "bucket"));
            }

            for subnet in vpc.children("subnets") {
                let subnet_label = nested_label(name, subnet.name_or_empty());
                self.resource_group("vpcs.subnets", &subnet_label, subnet)?;
                if let Some(acl) = subnet.str("network_acl") {
                    if vpc.child("acls", acl).is_none() {
                        return Err(SpecError::NotInVpc {
                            family: "vpcs.subnets".to_string(),
                            record: subnet_label,
                            kind: "network ACL".to_string(),
                            name: acl.to_string(),
                            vpc: name.to_string(),
                        });
                    }
                }
            }
            for acl in vpc.children("acls") {
                self.resource_group("vpcs.acls", &nested_label(name, acl.name_or_empty()), acl)?;
            }
            for (index, gateway) in vpc.children("public_gateways").into_iter().enumerate() {
                self.resource_group(
                    "vpcs.public_gateways",
                    &nested_label(name, &format!("#{}", index)),
                    gateway,
                )?;
            }
        }
        Ok(())
    }

    fn security_groups(&self) -> SpecResult<()> {
        let family = Family::SecurityGroups.as_str();
        for sg in self.doc.records(Family::SecurityGroups) {
            let sg_label = label(sg.name_or_empty());
            self.vpc(family, &sg_label, sg.str("vpc"))?;
            self.resource_group(family, &sg_label, sg)?;
        }
        Ok(())
    }

    fn routing_tables(&self) -> SpecResult<()> {
        let family = Family::RoutingTables.as_str();
        for table in self.doc.records(Family::RoutingTables) {
            self.vpc(family, &label(table.name_or_empty()), table.str("vpc"))?;
        }
        Ok(())
    }

    fn virtual_private_endpoints(&self) -> SpecResult<()> {
        let family = Family::VirtualPrivateEndpoints.as_str();
        for vpe in self.doc.records(Family::VirtualPrivateEndpoints) {
            let vpe_label = label(vpe.name_or_empty());
            let vpc = self.vpc(family, &vpe_label, vpe.str("vpc"))?;
            self.resource_group(family, &vpe_label, vpe)?;
            self.subnets_in_vpc(family, &vpe_label, vpc, &vpe.strings("subnets"))?;
            self.security_groups_in_vpc(
                family,
                &vpe_label,
                vpc.name_or_empty(),
                &vpe.strings("security_groups"),
            )?;
        }
        Ok(())
    }

    fn ssh_keys(&self) -> SpecResult<()> {
        self.simple_resource_groups(Family::SshKeys)
    }

    fn vsi(&self) -> SpecResult<()> {
        let family = Family::Vsi.as_str();
        for vsi in self.doc.records(Family::Vsi) {
            let name = vsi.name_or_empty();
            let vsi_label = label(name);
            let vpc = self.vpc(family, &vsi_label, vsi.str("vpc"))?;
            self.resource_group(family, &vsi_label, vsi)?;
            self.subnets_in_vpc(family, &vsi_label, vpc, &vsi.strings("subnets"))?;
            self.security_groups_in_vpc(
                family,
                &vsi_label,
                vpc.name_or_empty(),
                &vsi.strings("security_groups"),
            )?;
            self.ssh_key_refs(family, &vsi_label, &vsi.strings("ssh_keys"))?;
            self.encryption_key(
                family,
                &vsi_label,
                "encryption_key",
                vsi.str("kms"),
                vsi.str("encryption_key"),
            )?;
            for volume in vsi.children("volumes") {
                self.encryption_key(
                    "vsi.volumes",
                    &nested_label(name, volume.name_or_empty()),
                    "encryption_key",
                    vsi.str("kms"),
                    volume.str("encryption_key"),
                )?;
            }
        }
        Ok(())
    }

    fn clusters(&self) -> SpecResult<()> {
        let family = Family::Clusters.as_str();
        for cluster in self.doc.records(Family::Clusters) {
            let name = cluster.name_or_empty();
            let cluster_label = label(name);
            let vpc = self.vpc(family, &cluster_label, cluster.str("vpc"))?;
            self.resource_group(family, &cluster_label, cluster)?;
            self.subnets_in_vpc(family, &cluster_label, vpc, &cluster.strings("subnets"))?;

            self.encryption_key(
                family,
                &cluster_label,
                "encryption_key",
                cluster.str("kms"),
                cluster.str("encryption_key"),
            )?;

            if cluster.str("type") == Some("openshift") {
                match cluster.str("cos") {
                    None => return Err(SpecError::null(family, &cluster_label, "cos")),
                    Some(cos) => {
                        self.cos_bucket(family, &cluster_label, Some(cos), None)?;
                    }
                }
            }

            for pool in cluster.children("worker_pools") {
                let pool_label = nested_label(name, pool.name_or_empty());
                self.resource_group("clusters.worker_pools", &pool_label, pool)?;
                self.subnets_in_vpc(
                    "clusters.worker_pools",
                    &pool_label,
                    vpc,
                    &pool.strings("subnets"),
                )?;
            }

            for secret in cluster.children("opaque_secrets") {
                if let Some(manager) = secret.str("secrets_manager") {
                    if !self.exists(Family::SecretsManager, manager) {
                        return Err(SpecError::unknown(
                            "clusters.opaque_secrets",
                            &nested_label(name, secret.name_or_empty()),
                            "secrets_manager",
                            "secrets manager",
                            manager,
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn vpn_gateways(&self) -> SpecResult<()> {
        let family = Family::VpnGateways.as_str();
        for gateway in self.doc.records(Family::VpnGateways) {
            let gateway_label = label(gateway.name_or_empty());
            let vpc = self.vpc(family, &gateway_label, gateway.str("vpc"))?;
            self.resource_group(family, &gateway_label, gateway)?;
            let subnet: Vec<&str> = gateway.str("subnet").into_iter().collect();
            self.subnets_in_vpc(family, &gateway_label, vpc, &subnet)?;
        }
        Ok(())
    }

    fn transit_gateways(&self) -> SpecResult<()> {
        let family = Family::TransitGateways.as_str();
        for tgw in self.doc.records(Family::TransitGateways) {
            let name = tgw.name_or_empty();
            self.resource_group(family, &label(name), tgw)?;
            for (index, connection) in tgw.children("connections").into_iter().enumerate() {
                let connection_label = nested_label(name, &format!("#{}", index));
                match (connection.str("vpc"), connection.str("crn")) {
                    (Some(vpc), _) => {
                        self.vpc("transit_gateways.connections", &connection_label, Some(vpc))?;
                    }
                    (None, Some(_)) => {}
                    (None, None) => {
                        return Err(SpecError::invalid(
                            "transit_gateways.connections",
                            &connection_label,
                            "vpc",
                            "a connection needs a vpc or a crn",
                        ))
                    }
                }
            }
        }
        Ok(())
    }

    fn secrets_manager(&self) -> SpecResult<()> {
        let family = Family::SecretsManager.as_str();
        for manager in self.doc.records(Family::SecretsManager) {
            let manager_label = label(manager.name_or_empty());
            self.resource_group(family, &manager_label, manager)?;
            self.encryption_key(
                family,
                &manager_label,
                "encryption_key",
                manager.str("kms"),
                manager.str("encryption_key"),
            )?;
        }
        Ok(())
    }

    fn load_balancers(&self) -> SpecResult<()> {
        let family = Family::LoadBalancers.as_str();
        for lb in self.doc.records(Family::LoadBalancers) {
            let lb_label = label(lb.name_or_empty());
            let vpc = self.vpc(family, &lb_label, lb.str("vpc"))?;
            self.resource_group(family, &lb_label, lb)?;
            self.subnets_in_vpc(family, &lb_label, vpc, &lb.strings("subnets"))?;
            self.security_groups_in_vpc(
                family,
                &lb_label,
                vpc.name_or_empty(),
                &lb.strings("security_groups"),
            )?;
            for target in lb.strings("target_vsi") {
                if !self.exists(Family::Vsi, target) {
                    return Err(SpecError::unknown(
                        family,
                        &lb_label,
                        "target_vsi",
                        "VSI deployment",
                        target,
                    ));
                }
            }
        }
        Ok(())
    }

    fn access_groups(&self) -> SpecResult<()> {
        for group in self.doc.records(Family::AccessGroups) {
            let name = group.name_or_empty();
            for policy in group.children("policies") {
                if let Some(resources) = policy.object("resources") {
                    self.resource_group(
                        "access_groups.policies",
                        &nested_label(name, policy.name_or_empty()),
                        resources,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn vpn_servers(&self) -> SpecResult<()> {
        let family = Family::VpnServers.as_str();
        for server in self.doc.records(Family::VpnServers) {
            let server_label = label(server.name_or_empty());
            let vpc = self.vpc(family, &server_label, server.str("vpc"))?;
            self.resource_group(family, &server_label, server)?;
            self.subnets_in_vpc(family, &server_label, vpc, &server.strings("subnets"))?;
            self.security_groups_in_vpc(
                family,
                &server_label,
                vpc.name_or_empty(),
                &server.strings("security_groups"),
            )?;
        }
        Ok(())
    }

    fn dns(&self) -> SpecResult<()> {
        let family = Family::Dns.as_str();
        for dns in self.doc.records(Family::Dns) {
            let name = dns.name_or_empty();
            self.resource_group(family, &label(name), dns)?;

            for zone in dns.children("zones") {
                let zone_label = nested_label(name, zone.name_or_empty());
                for network in zone.strings("permitted_networks") {
                    self.vpc("dns.zones", &zone_label, Some(network))?;
                }
            }
            for record in dns.children("records") {
                let record_label = nested_label(name, record.name_or_empty());
                if let Some(zone) = record.str("dns_zone") {
                    if dns.child("zones", zone).is_none() {
                        return Err(SpecError::unknown(
                            "dns.records",
                            &record_label,
                            "dns_zone",
                            "DNS zone",
                            zone,
                        ));
                    }
                }
                if let Some(vsi) = record.str("vsi") {
                    if !self.exists(Family::Vsi, vsi) {
                        return Err(SpecError::unknown(
                            "dns.records",
                            &record_label,
                            "vsi",
                            "VSI deployment",
                            vsi,
                        ));
                    }
                }
            }
            for resolver in dns.children("custom_resolvers") {
                let resolver_label = nested_label(name, resolver.name_or_empty());
                let vpc = self.vpc("dns.custom_resolvers", &resolver_label, resolver.str("vpc"))?;
                self.subnets_in_vpc(
                    "dns.custom_resolvers",
                    &resolver_label,
                    vpc,
                    &resolver.strings("subnets"),
                )?;
            }
        }
        Ok(())
    }

    fn icd(&self) -> SpecResult<()> {
        let family = Family::Icd.as_str();
        for database in self.doc.records(Family::Icd) {
            let database_label = label(database.name_or_empty());
            self.resource_group(family, &database_label, database)?;
            self.encryption_key(
                family,
                &database_label,
                "encryption_key",
                database.str("kms"),
                database.str("encryption_key"),
            )?;
        }
        Ok(())
    }

    fn f5_vsi(&self) -> SpecResult<()> {
        let family = Family::F5Vsi.as_str();
        for f5 in self.doc.records(Family::F5Vsi) {
            let f5_label = label(f5.name_or_empty());
            let vpc = self.vpc(family, &f5_label, f5.str("vpc"))?;
            self.resource_group(family, &f5_label, f5)?;
            let subnet: Vec<&str> = f5.str("subnet").into_iter().collect();
            self.subnets_in_vpc(family, &f5_label, vpc, &subnet)?;
            self.security_groups_in_vpc(
                family,
                &f5_label,
                vpc.name_or_empty(),
                &f5.strings("security_groups"),
            )?;
            self.ssh_key_refs(family, &f5_label, &f5.strings("ssh_keys"))?;
            self.encryption_key(
                family,
                &f5_label,
                "encryption_key",
                f5.str("kms"),
                f5.str("encryption_key"),
            )?;
        }
        Ok(())
    }

    fn atracker(&self) -> SpecResult<()> {
        let Some(atracker) = self.doc.section(Section::Atracker) else {
            return Ok(());
        };
        if !atracker.bool("enabled") {
            return Ok(());
        }

        let family = Section::Atracker.as_str();
        let atracker_label = label(atracker.str("name").unwrap_or("atracker"));
        if atracker.is_null("target_name") {
            return Err(SpecError::null(family, &atracker_label, "target_name"));
        }
        let Some(bucket) = atracker.str("bucket") else {
            return Err(SpecError::null(family, &atracker_label, "bucket"));
        };

        let owners = self.doc.bucket_owners(bucket);
        let cos = match owners.as_slice() {
            [] => {
                return Err(SpecError::unknown(
                    family,
                    &atracker_label,
                    "bucket",
                    "bucket",
                    bucket,
                ))
            }
            [cos] => *cos,
            [_, ..] => {
                return Err(SpecError::invalid(
                    family,
                    &atracker_label,
                    "bucket",
                    format!("bucket `{}` is defined in more than one object storage instance", bucket),
                ))
            }
        };

        if let Some(key) = atracker.str("cos_key") {
            if cos.child("keys", key).is_none() {
                return Err(SpecError::unknown(
                    family,
                    &atracker_label,
                    "cos_key",
                    &format!("key in object storage instance `{}`", cos.name_or_empty()),
                    key,
                ));
            }
        }
        Ok(())
    }

    fn observability(&self) -> SpecResult<()> {
        for section in [Section::Logdna, Section::Sysdig] {
            let Some(record) = self.doc.section(section) else {
                continue;
            };
            if !record.bool("enabled") {
                continue;
            }
            let record_label = label(record.str("name").unwrap_or(section.as_str()));
            if record.is_null("resource_group") {
                return Err(SpecError::null(section.as_str(), &record_label, "resource_group"));
            }
            self.resource_group(section.as_str(), &record_label, record)?;
            if section == Section::Logdna {
                self.cos_bucket(
                    section.as_str(),
                    &record_label,
                    record.str("cos"),
                    record.str("bucket"),
                )?;
            }
        }
        Ok(())
    }
}
