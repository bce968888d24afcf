//! Declarative default tables used during normalization.
//!
//! Every table entry names a field and the value inserted when the field is
//! missing from a record. Fields that are present (even as `null`) are never
//! touched, which keeps normalization a fixed point.

use serde_json::{json, Map, Value};

use crate::family::{Family, Section};

/// Value inserted for a missing field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Null,
    EmptyList,
    EmptyObject,
    Bool(bool),
    Str(&'static str),
    Int(i64),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::EmptyList => Value::Array(Vec::new()),
            DefaultValue::EmptyObject => Value::Object(Map::new()),
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::Int(n) => Value::from(n),
        }
    }
}

use DefaultValue::{Bool, EmptyList, EmptyObject, Int, Null, Str};

type FieldTable = &'static [(&'static str, DefaultValue)];

/// Backfill rules for one shallow family and its nested sub-families.
#[derive(Debug)]
pub struct FamilyDefaults {
    pub family: Family,
    pub fields: FieldTable,
    pub nested: &'static [(&'static str, FieldTable)],
}

pub const OPTION_DEFAULTS: FieldTable = &[
    ("tags", EmptyList),
    ("zones", Int(3)),
    ("endpoints", Str("private")),
    ("account_id", Null),
    ("fs_cloud", Bool(false)),
    ("dynamic_subnets", Bool(true)),
    ("enable_classic", Bool(false)),
];

pub const BACKFILL: &[FamilyDefaults] = &[
    FamilyDefaults {
        family: Family::ResourceGroups,
        fields: &[("use_prefix", Bool(true)), ("use_data", Bool(false))],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::KeyManagement,
        fields: &[
            ("keys", EmptyList),
            ("use_hs_crypto", Bool(false)),
            ("authorize_vpc_reader_role", Bool(false)),
            ("use_data", Bool(false)),
        ],
        nested: &[(
            "keys",
            &[
                ("key_ring", Null),
                ("root_key", Bool(true)),
                ("force_delete", Bool(false)),
                ("endpoint", Str("public")),
                ("rotation", Int(0)),
                ("dual_auth_delete", Bool(false)),
            ],
        )],
    },
    FamilyDefaults {
        family: Family::ObjectStorage,
        fields: &[
            ("buckets", EmptyList),
            ("keys", EmptyList),
            ("plan", Str("standard")),
            ("kms", Null),
            ("use_data", Bool(false)),
            ("use_random_suffix", Bool(false)),
        ],
        nested: &[
            (
                "buckets",
                &[
                    ("storage_class", Str("standard")),
                    ("endpoint", Str("public")),
                    ("force_delete", Bool(false)),
                    ("kms_key", Null),
                ],
            ),
            ("keys", &[("role", Str("Writer")), ("enable_hmac", Bool(false))]),
        ],
    },
    FamilyDefaults {
        family: Family::Vpcs,
        fields: &[
            ("address_prefixes", EmptyList),
            ("subnets", EmptyList),
            ("public_gateways", EmptyList),
            ("acls", EmptyList),
            ("classic_access", Bool(false)),
            ("manual_address_prefix_management", Bool(false)),
            ("default_network_acl_name", Null),
            ("default_security_group_name", Null),
            ("default_routing_table_name", Null),
            ("cos", Null),
            ("bucket", Null),
        ],
        nested: &[
            (
                "subnets",
                &[
                    ("network_acl", Null),
                    ("public_gateway", Bool(false)),
                    ("resource_group", Null),
                    ("has_prefix", Bool(false)),
                ],
            ),
            ("public_gateways", &[("resource_group", Null)]),
            (
                "acls",
                &[
                    ("resource_group", Null),
                    ("add_cluster_rules", Bool(false)),
                    ("rules", EmptyList),
                ],
            ),
        ],
    },
    FamilyDefaults {
        family: Family::SecurityGroups,
        fields: &[("rules", EmptyList)],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::RoutingTables,
        fields: &[
            ("routes", EmptyList),
            ("route_direct_link_ingress", Bool(false)),
            ("route_transit_gateway_ingress", Bool(false)),
            ("route_vpc_zone_ingress", Bool(false)),
            ("internet_ingress", Bool(false)),
        ],
        nested: &[("routes", &[("action", Str("deliver")), ("next_hop", Null)])],
    },
    FamilyDefaults {
        family: Family::VirtualPrivateEndpoints,
        fields: &[("subnets", EmptyList), ("security_groups", EmptyList)],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::SshKeys,
        fields: &[
            ("public_key", Null),
            ("resource_group", Null),
            ("use_data", Bool(false)),
        ],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::Vsi,
        fields: &[
            ("volumes", EmptyList),
            ("kms", Null),
            ("encryption_key", Null),
            ("user_data", Null),
            ("enable_floating_ip", Bool(false)),
        ],
        nested: &[(
            "volumes",
            &[
                ("profile", Str("general-purpose")),
                ("capacity", Null),
                ("encryption_key", Null),
            ],
        )],
    },
    FamilyDefaults {
        family: Family::Clusters,
        fields: &[
            ("worker_pools", EmptyList),
            ("opaque_secrets", EmptyList),
            ("cos", Null),
            ("entitlement", Null),
            ("update_all_workers", Bool(false)),
            ("private_endpoint", Bool(false)),
        ],
        nested: &[
            (
                "worker_pools",
                &[("entitlement", Null), ("resource_group", Null)],
            ),
            (
                "opaque_secrets",
                &[
                    ("persistence", Bool(false)),
                    ("expiration_date", Null),
                    ("labels", EmptyList),
                    ("arbitrary_secret_description", Null),
                    ("username_password_secret_description", Null),
                    ("auto_rotate", Bool(false)),
                    ("interval", Int(1)),
                    ("unit", Str("day")),
                ],
            ),
        ],
    },
    FamilyDefaults {
        family: Family::VpnGateways,
        fields: &[("connections", EmptyList)],
        nested: &[(
            "connections",
            &[("local_cidrs", EmptyList), ("peer_cidrs", EmptyList)],
        )],
    },
    FamilyDefaults {
        family: Family::TransitGateways,
        fields: &[("connections", EmptyList), ("global", Bool(false))],
        nested: &[("connections", &[("vpc", Null), ("crn", Null)])],
    },
    FamilyDefaults {
        family: Family::Appid,
        fields: &[("keys", EmptyList), ("use_data", Bool(false))],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::SecretsManager,
        fields: &[
            ("plan", Str("standard")),
            ("kms", Null),
            ("encryption_key", Null),
        ],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::EventStreams,
        fields: &[
            ("endpoints", Str("private")),
            ("private_ip_allowlist", Null),
            ("throughput", Null),
            ("storage_size", Null),
        ],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::LoadBalancers,
        fields: &[
            ("type", Str("public")),
            ("security_groups", EmptyList),
            ("target_vsi", EmptyList),
            ("proxy_protocol", Null),
            ("session_persistence_type", Null),
            ("session_persistence_app_cookie_name", Null),
            ("connection_limit", Null),
        ],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::AccessGroups,
        fields: &[
            ("description", Null),
            ("policies", EmptyList),
            ("dynamic_policies", EmptyList),
            ("has_invites", Bool(false)),
            ("invites", Null),
        ],
        nested: &[(
            "policies",
            &[("roles", EmptyList), ("resources", EmptyObject)],
        )],
    },
    FamilyDefaults {
        family: Family::CbrZones,
        fields: &[
            ("account_id", Null),
            ("description", Null),
            ("addresses", EmptyList),
            ("exclusions", EmptyList),
        ],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::CbrRules,
        fields: &[
            ("description", Null),
            ("enforcement_mode", Str("enabled")),
            ("api_type_id", Null),
            ("contexts", EmptyList),
            ("resource_attributes", EmptyList),
            ("tags", EmptyList),
        ],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::VpnServers,
        fields: &[
            ("security_groups", EmptyList),
            ("client_ca_crn", Null),
            ("client_dns_server_ips", Null),
            ("client_idle_timeout", Null),
            ("enable_split_tunneling", Bool(false)),
            ("routes", EmptyList),
        ],
        nested: &[("routes", &[("action", Str("deliver"))])],
    },
    FamilyDefaults {
        family: Family::Dns,
        fields: &[
            ("plan", Str("standard-dns")),
            ("zones", EmptyList),
            ("records", EmptyList),
            ("custom_resolvers", EmptyList),
        ],
        nested: &[
            (
                "zones",
                &[
                    ("label", Null),
                    ("description", Null),
                    ("permitted_networks", EmptyList),
                ],
            ),
            (
                "records",
                &[
                    ("rdata", Null),
                    ("vsi", Null),
                    ("ttl", Null),
                    ("preference", Null),
                    ("port", Null),
                    ("protocol", Null),
                    ("priority", Null),
                    ("service", Null),
                    ("weight", Null),
                ],
            ),
            ("custom_resolvers", &[("description", Null)]),
        ],
    },
    FamilyDefaults {
        family: Family::Icd,
        fields: &[
            ("plan", Str("standard")),
            ("kms", Null),
            ("encryption_key", Null),
            ("memory", Null),
            ("disk", Null),
            ("cpu", Null),
            ("group_id", Str("member")),
        ],
        nested: &[],
    },
    FamilyDefaults {
        family: Family::F5Vsi,
        fields: &[
            ("kms", Null),
            ("encryption_key", Null),
            ("template", EmptyObject),
        ],
        nested: &[],
    },
];

/// Canonical shape of a singleton section.
pub fn section_default(section: Section) -> Value {
    match section {
        Section::Atracker => json!({
            "enabled": false,
            "type": "cos",
            "name": null,
            "target_name": null,
            "bucket": null,
            "cos_key": null,
            "add_route": true,
            "locations": ["global"]
        }),
        Section::Scc => json!({
            "enable": false,
            "name": "",
            "location": "us",
            "is_public": false,
            "collector_description": null,
            "scope_description": null,
            "credential_description": null,
            "id": null,
            "passphrase": null
        }),
        Section::IamAccountSettings => json!({
            "enable": false,
            "mfa": null,
            "allowed_ip_addresses": null,
            "include_history": false,
            "if_match": null,
            "max_sessions_per_identity": null,
            "restrict_create_service_id": null,
            "restrict_create_platform_apikey": null,
            "session_expiration_in_seconds": null,
            "session_invalidation_in_seconds": null
        }),
        Section::Logdna => json!({
            "enabled": false,
            "name": "logdna",
            "plan": "lite",
            "endpoints": "private",
            "platform_logs": false,
            "resource_group": null,
            "cos": null,
            "bucket": null
        }),
        Section::Sysdig => json!({
            "enabled": false,
            "name": "sysdig",
            "plan": "graduated-tier",
            "platform_logs": false,
            "resource_group": null
        }),
    }
}

/// Insert every missing field of `table` into `record`. Returns how many
/// fields were added.
pub fn backfill(record: &mut Map<String, Value>, table: FieldTable) -> usize {
    let mut inserted = 0;
    for (field, default) in table {
        if !record.contains_key(*field) {
            record.insert(field.to_string(), default.to_value());
            inserted += 1;
        }
    }
    inserted
}

/// Merge a canonical object into `target`, keeping fields already present.
pub fn merge_missing(target: &mut Map<String, Value>, defaults: Value) -> usize {
    let mut inserted = 0;
    if let Value::Object(defaults) = defaults {
        for (key, value) in defaults {
            if !target.contains_key(&key) {
                target.insert(key, value);
                inserted += 1;
            }
        }
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backfill_only_inserts_missing_fields() {
        let mut record = json!({"name": "slz-kms", "use_data": true})
            .as_object()
            .cloned()
            .unwrap();
        let table = BACKFILL
            .iter()
            .find(|t| t.family == Family::KeyManagement)
            .unwrap();

        let inserted = backfill(&mut record, table.fields);
        assert_eq!(inserted, 3);
        assert_eq!(record["use_data"], json!(true));
        assert_eq!(record["keys"], json!([]));

        assert_eq!(backfill(&mut record, table.fields), 0);
    }

    #[test]
    fn test_every_family_has_one_table() {
        for family in Family::all() {
            let count = BACKFILL.iter().filter(|t| t.family == family).count();
            assert_eq!(count, 1, "{} should have exactly one backfill table", family);
        }
    }

    #[test]
    fn test_merge_missing_keeps_existing() {
        let mut target = json!({"enabled": true}).as_object().cloned().unwrap();
        merge_missing(&mut target, section_default(Section::Atracker));
        assert_eq!(target["enabled"], json!(true));
        assert_eq!(target["add_route"], json!(true));
    }
}
