//! Required-field checks.

use serde_json::{Map, Value};

use crate::error::{SpecError, SpecResult};
use crate::family::Family;

type Fields = &'static [&'static str];

/// Fields that must be present and non-null on every record of a family.
#[derive(Debug)]
pub struct FamilyRequirements {
    pub family: Family,
    pub fields: Fields,
    pub nested: &'static [(&'static str, Fields)],
}

pub const REQUIRED: &[FamilyRequirements] = &[
    FamilyRequirements {
        family: Family::ResourceGroups,
        fields: &["name"],
        nested: &[],
    },
    FamilyRequirements {
        family: Family::KeyManagement,
        fields: &["name"],
        nested: &[("keys", &["name"])],
    },
    FamilyRequirements {
        family: Family::ObjectStorage,
        fields: &["name", "resource_group"],
        nested: &[("buckets", &["name"]), ("keys", &["name"])],
    },
    FamilyRequirements {
        family: Family::Vpcs,
        fields: &["name", "resource_group"],
        nested: &[
            ("address_prefixes", &["name", "zone", "cidr"]),
            ("subnets", &["name", "zone", "cidr"]),
            ("public_gateways", &["zone"]),
            ("acls", &["name"]),
        ],
    },
    FamilyRequirements {
        family: Family::SecurityGroups,
        fields: &["name", "vpc", "resource_group"],
        nested: &[("rules", &["name", "direction", "source"])],
    },
    FamilyRequirements {
        family: Family::RoutingTables,
        fields: &["name", "vpc"],
        nested: &[("routes", &["name", "zone", "destination"])],
    },
    FamilyRequirements {
        family: Family::VirtualPrivateEndpoints,
        fields: &["name", "vpc", "service", "resource_group"],
        nested: &[],
    },
    FamilyRequirements {
        family: Family::SshKeys,
        fields: &["name"],
        nested: &[],
    },
    FamilyRequirements {
        family: Family::Vsi,
        fields: &[
            "name",
            "vpc",
            "subnets",
            "security_groups",
            "ssh_keys",
            "image",
            "profile",
            "vsi_per_subnet",
            "resource_group",
        ],
        nested: &[("volumes", &["name"])],
    },
    FamilyRequirements {
        family: Family::Clusters,
        fields: &[
            "name",
            "type",
            "kube_version",
            "flavor",
            "vpc",
            "subnets",
            "workers_per_subnet",
            "resource_group",
            "kms",
            "encryption_key",
        ],
        nested: &[
            (
                "worker_pools",
                &["name", "flavor", "subnets", "workers_per_subnet"],
            ),
            (
                "opaque_secrets",
                &[
                    "name",
                    "secrets_manager",
                    "secrets_group",
                    "namespace",
                    "arbitrary_secret_name",
                    "username_password_secret_name",
                ],
            ),
        ],
    },
    FamilyRequirements {
        family: Family::VpnGateways,
        fields: &["name", "vpc", "subnet", "resource_group"],
        nested: &[("connections", &["name", "peer_address"])],
    },
    FamilyRequirements {
        family: Family::TransitGateways,
        fields: &["name", "resource_group"],
        nested: &[],
    },
    FamilyRequirements {
        family: Family::Appid,
        fields: &["name", "resource_group"],
        nested: &[("keys", &["name"])],
    },
    FamilyRequirements {
        family: Family::SecretsManager,
        fields: &["name", "resource_group"],
        nested: &[],
    },
    FamilyRequirements {
        family: Family::EventStreams,
        fields: &["name", "resource_group", "plan"],
        nested: &[],
    },
    FamilyRequirements {
        family: Family::LoadBalancers,
        fields: &[
            "name",
            "vpc",
            "subnets",
            "resource_group",
            "algorithm",
            "protocol",
            "health_delay",
            "health_retries",
            "health_timeout",
            "health_type",
            "port",
            "listener_port",
            "listener_protocol",
        ],
        nested: &[],
    },
    FamilyRequirements {
        family: Family::AccessGroups,
        fields: &["name"],
        nested: &[
            ("policies", &["name"]),
            (
                "dynamic_policies",
                &["name", "identity_provider", "expiration", "conditions"],
            ),
        ],
    },
    FamilyRequirements {
        family: Family::CbrZones,
        fields: &["name"],
        nested: &[
            ("addresses", &["type", "value"]),
            ("exclusions", &["type", "value"]),
        ],
    },
    FamilyRequirements {
        family: Family::CbrRules,
        fields: &["name"],
        nested: &[
            ("contexts", &["name", "value"]),
            ("resource_attributes", &["name", "value"]),
            ("tags", &["name", "value"]),
        ],
    },
    FamilyRequirements {
        family: Family::VpnServers,
        fields: &[
            "name",
            "vpc",
            "subnets",
            "resource_group",
            "certificate_crn",
            "method",
            "client_ip_pool",
            "port",
            "protocol",
        ],
        nested: &[("routes", &["name", "destination"])],
    },
    FamilyRequirements {
        family: Family::Dns,
        fields: &["name", "resource_group"],
        nested: &[
            ("zones", &["name"]),
            ("records", &["name", "dns_zone", "type"]),
            ("custom_resolvers", &["name", "vpc", "subnets"]),
        ],
    },
    FamilyRequirements {
        family: Family::Icd,
        fields: &["name", "service", "resource_group"],
        nested: &[],
    },
    FamilyRequirements {
        family: Family::F5Vsi,
        fields: &[
            "name",
            "vpc",
            "subnet",
            "zone",
            "resource_group",
            "image",
            "profile",
            "ssh_keys",
            "security_groups",
        ],
        nested: &[],
    },
];

/// Check that `field` on `record` is present and not `null`.
///
/// `label` identifies the record in the error message and already includes
/// any parent prefix, e.g. `` `workload.logging-pool` ``.
pub fn required_test(
    family: &str,
    record: &Map<String, Value>,
    field: &str,
    label: &str,
) -> SpecResult<()> {
    match record.get(field) {
        None => Err(SpecError::missing(family, label, field)),
        Some(Value::Null) => Err(SpecError::null(family, label, field)),
        Some(_) => Ok(()),
    }
}

/// Build the label used in error messages for a record.
pub fn record_label(parent: Option<&str>, record: &Map<String, Value>, index: usize) -> String {
    let own = record
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index));
    match parent {
        Some(parent) => format!("`{}.{}`", parent, own),
        None => format!("`{}`", own),
    }
}

/// Run the required-field table over the whole document root.
pub fn check_required(root: &Map<String, Value>) -> SpecResult<()> {
    for requirements in REQUIRED {
        let family = requirements.family.as_str();
        let records = match root.get(family) {
            Some(Value::Array(records)) => records,
            _ => continue,
        };

        for (index, record) in records.iter().enumerate() {
            let record = as_record(family, record, index)?;
            let label = record_label(None, record, index);
            for field in requirements.fields {
                required_test(family, record, field, &label)?;
            }

            let parent = record.get("name").and_then(Value::as_str).unwrap_or("");
            for (nested, fields) in requirements.nested {
                let nested_family = format!("{}.{}", family, nested);
                let children = match record.get(*nested) {
                    Some(Value::Array(children)) => children,
                    _ => continue,
                };
                for (child_index, child) in children.iter().enumerate() {
                    let child = as_record(&nested_family, child, child_index)?;
                    let child_label = record_label(Some(parent), child, child_index);
                    for field in *fields {
                        required_test(&nested_family, child, field, &child_label)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn as_record<'a>(family: &str, value: &'a Value, index: usize) -> SpecResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        SpecError::invalid(
            family,
            &format!("`#{}`", index),
            "record",
            "every record must be an object",
        )
    })
}
