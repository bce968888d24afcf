//! VPC sub-modules.
//!
//! Each VPC becomes its own module holding the VPC, address prefixes, public
//! gateways, subnets, network ACLs, security groups and routing tables that
//! belong to it. Resource groups are passed in as `<group>_id` variables.

use std::collections::BTreeMap;

use craig_spec::{Family, NormalizedDocument, Record};
use serde_json::Value;

use crate::config::GeneratorConfig;
use crate::hcl::{render_blocks, render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_case, kebab_name, title_case, zone_name};
use crate::refs::{not_found, resource_group_token, rg_id_ref, rg_var_ref, vpc_module_name, UNFOUND_REF};
use crate::translators::terraform::{output_block, variables_tf, versions_tf, Variable};

const VPC: &str = "ibm_is_vpc.vpc.id";

/// Rules appended to ACLs with `add_cluster_rules`:
/// (name, action, direction, source, destination, tcp port range, tcp source port range).
type ClusterRule = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    Option<(i64, i64)>,
    Option<(i64, i64)>,
);

const CLUSTER_RULES: &[ClusterRule] = &[
    ("roks-create-worker-nodes-inbound", "allow", "inbound", "161.26.0.0/16", "10.0.0.0/8", None, None),
    ("roks-create-worker-nodes-outbound", "allow", "outbound", "10.0.0.0/8", "161.26.0.0/16", None, None),
    ("roks-nodes-to-service-inbound", "allow", "inbound", "166.8.0.0/14", "10.0.0.0/8", None, None),
    ("roks-nodes-to-service-outbound", "allow", "outbound", "10.0.0.0/8", "166.8.0.0/14", None, None),
    ("allow-app-incoming-traffic-requests", "allow", "inbound", "10.0.0.0/8", "10.0.0.0/8", None, Some((30000, 32767))),
    ("allow-app-outgoing-traffic-requests", "allow", "outbound", "10.0.0.0/8", "10.0.0.0/8", Some((30000, 32767)), None),
    ("allow-lb-incoming-traffic-requests", "allow", "inbound", "10.0.0.0/8", "10.0.0.0/8", Some((443, 443)), None),
    ("allow-lb-outgoing-traffic-requests", "allow", "outbound", "10.0.0.0/8", "10.0.0.0/8", None, Some((443, 443))),
];

fn subnet_token(vpc: &str, subnet: &str) -> String {
    address_token(&[vpc, subnet])
}

fn prefix_token(vpc: &str, prefix: &str) -> String {
    address_token(&[vpc, prefix, "prefix"])
}

fn gateway_token(vpc: &str, zone: i64) -> String {
    address_token(&[vpc, "gateway", "zone", &zone.to_string()])
}

fn acl_token(vpc: &str, acl: &str) -> String {
    address_token(&[vpc, acl, "acl"])
}

fn sg_token(vpc: &str, sg: &str) -> String {
    address_token(&[vpc, "vpc", sg, "sg"])
}

fn table_token(vpc: &str, table: &str) -> String {
    address_token(&[vpc, "vpc", table, "table"])
}

/// Resource group of a nested record, falling back to the VPC's.
fn nested_rg<'a>(vpc: Record<'a>, record: Record<'a>) -> Option<&'a str> {
    record.str("resource_group").or_else(|| vpc.str("resource_group"))
}

pub fn format_vpc(vpc: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = vpc.name_or_empty();
    let default_name = |field: &str| vpc.str(field).map(|value| kebab_name(&[value]));

    let body = Body::new()
        .template("name", kebab_name(&[name, "vpc"]))
        .raw("resource_group", rg_var_ref(doc, vpc.str("resource_group")))
        .when(vpc.bool("manual_address_prefix_management"), |body| {
            body.str("address_prefix_management", "manual")
        })
        .bool("classic_access", vpc.bool("classic_access"))
        .opt_template(
            "default_network_acl_name",
            default_name("default_network_acl_name").as_deref(),
        )
        .opt_template(
            "default_security_group_name",
            default_name("default_security_group_name").as_deref(),
        )
        .opt_template(
            "default_routing_table_name",
            default_name("default_routing_table_name").as_deref(),
        )
        .tags();

    Block::resource("ibm_is_vpc", "vpc", body)
}

pub fn format_address_prefix(vpc: Record<'_>, prefix: Record<'_>) -> Block {
    let vpc_name = vpc.name_or_empty();
    let prefix_name = prefix.name_or_empty();
    Block::resource(
        "ibm_is_vpc_address_prefix",
        &prefix_token(vpc_name, prefix_name),
        Body::new()
            .template("name", kebab_name(&[vpc_name, prefix_name]))
            .raw("vpc", VPC)
            .template("zone", zone_name(prefix.int("zone").unwrap_or(1)))
            .str("cidr", prefix.str("cidr").unwrap_or_default()),
    )
}

pub fn format_public_gateway(
    vpc: Record<'_>,
    gateway: Record<'_>,
    doc: &NormalizedDocument,
) -> Block {
    let vpc_name = vpc.name_or_empty();
    let zone = gateway.int("zone").unwrap_or(1);
    Block::resource(
        "ibm_is_public_gateway",
        &gateway_token(vpc_name, zone),
        Body::new()
            .template("name", kebab_name(&[vpc_name, "gateway", "zone", &zone.to_string()]))
            .raw("vpc", VPC)
            .raw("resource_group", rg_var_ref(doc, nested_rg(vpc, gateway)))
            .template("zone", zone_name(zone))
            .tags(),
    )
}

pub fn format_subnet(vpc: Record<'_>, subnet: Record<'_>, doc: &NormalizedDocument) -> Block {
    let vpc_name = vpc.name_or_empty();
    let subnet_name = subnet.name_or_empty();
    let zone = subnet.int("zone").unwrap_or(1);

    let mut body = Body::new()
        .raw("vpc", VPC)
        .template("name", kebab_name(&[vpc_name, subnet_name]))
        .template("zone", zone_name(zone))
        .raw("resource_group", rg_var_ref(doc, nested_rg(vpc, subnet)))
        .tags()
        .str("ipv4_cidr_block", subnet.str("cidr").unwrap_or_default());

    if let Some(acl) = subnet.str("network_acl") {
        let reference = match vpc.child("acls", acl) {
            Some(_) => format!("ibm_is_network_acl.{}.id", acl_token(vpc_name, acl)),
            None => UNFOUND_REF.to_string(),
        };
        body = body.raw("network_acl", reference);
    }

    if subnet.bool("public_gateway") {
        let has_gateway = vpc
            .children("public_gateways")
            .iter()
            .any(|gateway| gateway.int("zone") == Some(zone));
        let reference = if has_gateway {
            format!("ibm_is_public_gateway.{}.id", gateway_token(vpc_name, zone))
        } else {
            not_found("Public Gateway")
        };
        body = body.raw("public_gateway", reference);
    }

    let prefixes: Vec<String> = vpc
        .children("address_prefixes")
        .into_iter()
        .filter(|prefix| prefix.int("zone") == Some(zone))
        .map(|prefix| {
            format!(
                "ibm_is_vpc_address_prefix.{}",
                prefix_token(vpc_name, prefix.name_or_empty())
            )
        })
        .collect();
    if !prefixes.is_empty() {
        body = body.lines("depends_on", prefixes);
    }

    Block::resource("ibm_is_subnet", &subnet_token(vpc_name, subnet_name), body)
}

fn port_block(sub: Option<&serde_json::Map<String, Value>>, fields: &[&str]) -> Option<Body> {
    let sub = sub?;
    let mut body = Body::new();
    for field in fields {
        if let Some(value) = sub.get(*field).and_then(Value::as_i64) {
            body = body.int(*field, value);
        }
    }
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

/// Protocol blocks of a normalized rule with at least one field set.
fn protocol_blocks(rule: Record<'_>, port_fields: &[&str]) -> Vec<(&'static str, Body)> {
    let mut blocks = Vec::new();
    for protocol in ["tcp", "udp"] {
        let sub = rule.get(protocol).and_then(Value::as_object);
        if let Some(body) = port_block(sub, port_fields) {
            blocks.push((protocol, body));
        }
    }
    let icmp = rule.get("icmp").and_then(Value::as_object);
    if let Some(body) = port_block(icmp, &["type", "code"]) {
        blocks.push(("icmp", body));
    }
    blocks
}

/// One `rules` block of a network ACL.
pub fn format_acl_rule(rule: Record<'_>) -> Body {
    let mut body = Body::new()
        .str("name", kebab_case(rule.name_or_empty()))
        .str("action", rule.str("action").unwrap_or("allow"))
        .str("direction", rule.str("direction").unwrap_or("inbound"))
        .str("source", rule.str("source").unwrap_or_default())
        .str("destination", rule.str("destination").unwrap_or_default());
    for (protocol, block) in protocol_blocks(
        rule,
        &["port_min", "port_max", "source_port_min", "source_port_max"],
    ) {
        body = body.block(protocol, block);
    }
    body
}

fn cluster_rule(rule: &ClusterRule) -> Body {
    let (name, action, direction, source, destination, ports, source_ports) = *rule;
    let body = Body::new()
        .str("name", name)
        .str("action", action)
        .str("direction", direction)
        .str("source", source)
        .str("destination", destination);

    if ports.is_none() && source_ports.is_none() {
        return body;
    }
    let mut tcp = Body::new();
    if let Some((min, max)) = ports {
        tcp = tcp.int("port_min", min).int("port_max", max);
    }
    if let Some((min, max)) = source_ports {
        tcp = tcp.int("source_port_min", min).int("source_port_max", max);
    }
    body.block("tcp", tcp)
}

pub fn format_acl(vpc: Record<'_>, acl: Record<'_>, doc: &NormalizedDocument) -> Block {
    let vpc_name = vpc.name_or_empty();
    let acl_name = acl.name_or_empty();

    let mut rules: Vec<Body> = acl.children("rules").into_iter().map(format_acl_rule).collect();
    if acl.bool("add_cluster_rules") {
        rules.extend(CLUSTER_RULES.iter().map(cluster_rule));
    }

    Block::resource(
        "ibm_is_network_acl",
        &acl_token(vpc_name, acl_name),
        Body::new()
            .template("name", kebab_name(&[vpc_name, acl_name]))
            .raw("vpc", VPC)
            .raw("resource_group", rg_var_ref(doc, nested_rg(vpc, acl)))
            .tags()
            .repeated("rules", rules),
    )
}

/// Security group and one rule resource per rule.
pub fn format_security_group(sg: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let vpc_name = sg.str("vpc").unwrap_or_default();
    let sg_name = sg.name_or_empty();
    let token = sg_token(vpc_name, sg_name);

    let mut blocks = vec![Block::resource(
        "ibm_is_security_group",
        &token,
        Body::new()
            .template("name", kebab_name(&[sg_name, "sg"]))
            .raw("vpc", VPC)
            .raw("resource_group", rg_var_ref(doc, sg.str("resource_group")))
            .tags(),
    )];

    for rule in sg.children("rules") {
        let mut body = Body::new()
            .raw("group", format!("ibm_is_security_group.{}.id", token))
            .str("remote", rule.str("source").unwrap_or_default())
            .str("direction", rule.str("direction").unwrap_or("inbound"));
        // A security group rule carries a single protocol.
        if let Some((protocol, block)) = protocol_blocks(rule, &["port_min", "port_max"])
            .into_iter()
            .next()
        {
            body = body.block(protocol, block);
        }
        blocks.push(Block::resource(
            "ibm_is_security_group_rule",
            &address_token(&[&token, "rule", rule.name_or_empty()]),
            body,
        ));
    }

    blocks
}

/// Routing table and its routes.
pub fn format_routing_table(table: Record<'_>) -> Vec<Block> {
    let vpc_name = table.str("vpc").unwrap_or_default();
    let table_name = table.name_or_empty();
    let token = table_token(vpc_name, table_name);

    let mut blocks = vec![Block::resource(
        "ibm_is_vpc_routing_table",
        &token,
        Body::new()
            .template("name", kebab_name(&[vpc_name, table_name, "table"]))
            .raw("vpc", VPC)
            .bool("route_direct_link_ingress", table.bool("route_direct_link_ingress"))
            .bool(
                "route_transit_gateway_ingress",
                table.bool("route_transit_gateway_ingress"),
            )
            .bool("route_vpc_zone_ingress", table.bool("route_vpc_zone_ingress"))
            .bool("route_internet_ingress", table.bool("internet_ingress")),
    )];

    for route in table.children("routes") {
        let route_name = route.name_or_empty();
        blocks.push(Block::resource(
            "ibm_is_vpc_routing_table_route",
            &address_token(&[&token, route_name, "route"]),
            Body::new()
                .raw("vpc", VPC)
                .raw(
                    "routing_table",
                    format!("ibm_is_vpc_routing_table.{}.routing_table", token),
                )
                .template("zone", zone_name(route.int("zone").unwrap_or(1)))
                .template("name", kebab_name(&[vpc_name, table_name, route_name, "route"]))
                .str("destination", route.str("destination").unwrap_or_default())
                .str("action", route.str("action").unwrap_or("deliver"))
                .opt_str("next_hop", route.str("next_hop")),
        ));
    }

    blocks
}

fn records_in_vpc<'a>(doc: &'a NormalizedDocument, family: Family, vpc: &str) -> Vec<Record<'a>> {
    doc.records(family)
        .into_iter()
        .filter(|record| record.str("vpc") == Some(vpc))
        .collect()
}

/// Sections of the module's `main.tf`.
pub fn vpc_sections(vpc: Record<'_>, doc: &NormalizedDocument) -> Vec<Section> {
    let name = vpc.name_or_empty();
    let title = title_case(name);

    let mut network = vec![format_vpc(vpc, doc)];
    network.extend(
        vpc.children("address_prefixes")
            .into_iter()
            .map(|prefix| format_address_prefix(vpc, prefix)),
    );

    let gateways = vpc
        .children("public_gateways")
        .into_iter()
        .map(|gateway| format_public_gateway(vpc, gateway, doc))
        .collect();
    let subnets = vpc
        .children("subnets")
        .into_iter()
        .map(|subnet| format_subnet(vpc, subnet, doc))
        .collect();
    let acls = vpc
        .children("acls")
        .into_iter()
        .map(|acl| format_acl(vpc, acl, doc))
        .collect();
    let groups = records_in_vpc(doc, Family::SecurityGroups, name)
        .into_iter()
        .flat_map(|sg| format_security_group(sg, doc))
        .collect();
    let tables = records_in_vpc(doc, Family::RoutingTables, name)
        .into_iter()
        .flat_map(format_routing_table)
        .collect();

    vec![
        Section::new(format!("{} VPC", title), network),
        Section::new(format!("{} Public Gateways", title), gateways),
        Section::new(format!("{} Subnets", title), subnets),
        Section::new(format!("{} Network ACLs", title), acls),
        Section::new(format!("{} Security Groups", title), groups),
        Section::new(format!("{} Routing Tables", title), tables),
    ]
}

/// Resource groups used inside the module, in order of first use.
pub fn module_resource_groups<'a>(vpc: Record<'a>, doc: &'a NormalizedDocument) -> Vec<&'a str> {
    let mut groups: Vec<&str> = Vec::new();
    let mut add = |name: Option<&'a str>| {
        if let Some(name) = name {
            if doc.find(Family::ResourceGroups, name).is_some() && !groups.contains(&name) {
                groups.push(name);
            }
        }
    };

    add(vpc.str("resource_group"));
    for field in ["public_gateways", "subnets", "acls"] {
        for child in vpc.children(field) {
            add(child.str("resource_group"));
        }
    }
    for sg in records_in_vpc(doc, Family::SecurityGroups, vpc.name_or_empty()) {
        add(sg.str("resource_group"));
    }
    groups
}

pub fn module_variables(vpc: Record<'_>, doc: &NormalizedDocument) -> Vec<Variable> {
    let mut variables = vec![
        Variable::string(
            "prefix",
            "A unique identifier for resources. Must begin with a lowercase letter and end with a lowercase letter or number.",
        ),
        Variable::string("region", "Region where VPC will be created."),
        Variable::new("tags", "List of tags", "list(string)"),
    ];
    for group in module_resource_groups(vpc, doc) {
        variables.push(Variable::string(
            format!("{}_id", resource_group_token(group)),
            format!("ID for the resource group {}", group),
        ));
    }
    variables
}

pub fn module_outputs(vpc: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let name = vpc.name_or_empty();
    let mut outputs = vec![
        output_block("name", "Name of VPC", "ibm_is_vpc.vpc.name"),
        output_block("id", "ID of VPC", "ibm_is_vpc.vpc.id"),
        output_block("crn", "CRN of VPC", "ibm_is_vpc.vpc.crn"),
    ];

    for subnet in vpc.children("subnets") {
        let subnet_name = subnet.name_or_empty();
        let token = subnet_token(name, subnet_name);
        let output = address_token(&[subnet_name]);
        outputs.push(output_block(
            &format!("subnet_{}_id", output),
            &format!("ID of subnet {}", subnet_name),
            format!("ibm_is_subnet.{}.id", token),
        ));
        outputs.push(output_block(
            &format!("subnet_{}_crn", output),
            &format!("CRN of subnet {}", subnet_name),
            format!("ibm_is_subnet.{}.crn", token),
        ));
    }

    for sg in records_in_vpc(doc, Family::SecurityGroups, name) {
        let sg_name = sg.name_or_empty();
        outputs.push(output_block(
            &format!("{}_id", address_token(&[sg_name])),
            &format!("ID of security group {}", sg_name),
            format!("ibm_is_security_group.{}.id", sg_token(name, sg_name)),
        ));
    }

    outputs
}

/// The four files of one VPC sub-module.
pub fn vpc_module(
    vpc: Record<'_>,
    doc: &NormalizedDocument,
    config: &GeneratorConfig,
) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    files.insert(
        "main.tf".to_string(),
        render_file(&vpc_sections(vpc, doc)).unwrap_or_default(),
    );
    files.insert(
        "variables.tf".to_string(),
        variables_tf(&module_variables(vpc, doc)),
    );
    files.insert(
        "outputs.tf".to_string(),
        render_blocks(&module_outputs(vpc, doc)),
    );
    files.insert("versions.tf".to_string(), versions_tf(config));
    files
}

/// Module call in the root `main.tf`.
pub fn module_call(vpc: Record<'_>, doc: &NormalizedDocument) -> Block {
    let module = vpc_module_name(vpc.name_or_empty());
    let mut body = Body::new()
        .str("source", format!("./{}", module))
        .raw("region", "var.region")
        .raw("prefix", "var.prefix")
        .raw("tags", "var.tags");
    for group in module_resource_groups(vpc, doc) {
        body = body.raw(
            format!("{}_id", resource_group_token(group)),
            rg_id_ref(doc, Some(group)),
        );
    }
    Block::module(&module, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-management-rg"}, {"name": "slz-edge-rg"}],
            "vpcs": [{
                "name": "management",
                "resource_group": "slz-management-rg",
                "manual_address_prefix_management": true,
                "classic_access": false,
                "default_network_acl_name": null,
                "address_prefixes": [{"name": "management-zone-1", "zone": 1, "cidr": "10.10.10.0/24"}],
                "public_gateways": [{"zone": 1, "resource_group": null}],
                "subnets": [
                    {"name": "vsi-zone-1", "zone": 1, "cidr": "10.10.10.0/29", "network_acl": "management-acl", "public_gateway": true, "resource_group": null},
                    {"name": "vpe-zone-2", "zone": 2, "cidr": "10.20.10.0/29", "network_acl": "missing", "public_gateway": true, "resource_group": "slz-edge-rg"}
                ],
                "acls": [{
                    "name": "management-acl",
                    "resource_group": null,
                    "add_cluster_rules": true,
                    "rules": [{
                        "name": "allow-ibm-inbound",
                        "action": "allow",
                        "direction": "inbound",
                        "source": "161.26.0.0/16",
                        "destination": "10.0.0.0/8",
                        "tcp": {"port_min": 443, "port_max": 443, "source_port_min": null, "source_port_max": null},
                        "udp": {"port_min": null, "port_max": null, "source_port_min": null, "source_port_max": null},
                        "icmp": {"type": null, "code": null}
                    }]
                }]
            }],
            "security_groups": [{
                "name": "management-vpe",
                "vpc": "management",
                "resource_group": "slz-management-rg",
                "rules": [{
                    "name": "allow-ibm-inbound",
                    "direction": "inbound",
                    "source": "161.26.0.0/16",
                    "tcp": {"port_min": null, "port_max": null},
                    "udp": {"port_min": 53, "port_max": 53},
                    "icmp": {"type": null, "code": null}
                }]
            }],
            "routing_tables": [{
                "name": "default",
                "vpc": "management",
                "routes": [{"name": "to-vpn", "zone": 1, "destination": "10.0.0.0/8", "action": "deliver", "next_hop": "10.10.10.4"}]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_subnet_references() {
        let doc = doc();
        let vpc = doc.find(Family::Vpcs, "management").unwrap();
        let first = format_subnet(vpc, vpc.child("subnets", "vsi-zone-1").unwrap(), &doc).render();
        assert!(first.contains("network_acl     = ibm_is_network_acl.management_management_acl_acl.id"));
        assert!(first.contains("public_gateway  = ibm_is_public_gateway.management_gateway_zone_1.id"));
        assert!(first.contains("resource_group  = var.slz_management_rg_id"));
        assert!(first.contains("ibm_is_vpc_address_prefix.management_management_zone_1_prefix"));

        let second = format_subnet(vpc, vpc.child("subnets", "vpe-zone-2").unwrap(), &doc).render();
        assert!(second.contains("network_acl     = ERROR: Unfound ref"));
        assert!(second.contains("public_gateway  = Error: Public Gateway not found"));
        assert!(second.contains("resource_group  = var.slz_edge_rg_id"));
        assert!(!second.contains("depends_on"));
    }

    #[test]
    fn test_acl_rules_and_cluster_rules() {
        let doc = doc();
        let vpc = doc.find(Family::Vpcs, "management").unwrap();
        let acl = format_acl(vpc, vpc.child("acls", "management-acl").unwrap(), &doc).render();

        assert!(acl.contains(
            "  rules {\n    name        = \"allow-ibm-inbound\"\n    action      = \"allow\"\n    direction   = \"inbound\"\n    source      = \"161.26.0.0/16\"\n    destination = \"10.0.0.0/8\"\n    tcp {\n      port_min = 443\n      port_max = 443\n    }\n  }\n"
        ));
        assert!(!acl.contains("udp {"));
        assert_eq!(acl.matches("  rules {").count(), 1 + CLUSTER_RULES.len());
        assert!(acl.contains("source_port_min = 30000"));
    }

    #[test]
    fn test_security_group_rule_uses_first_active_protocol() {
        let doc = doc();
        let sg = doc.find(Family::SecurityGroups, "management-vpe").unwrap();
        let blocks = format_security_group(sg, &doc);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1].render(),
            "resource \"ibm_is_security_group_rule\" \"management_vpc_management_vpe_sg_rule_allow_ibm_inbound\" {\n  group     = ibm_is_security_group.management_vpc_management_vpe_sg.id\n  remote    = \"161.26.0.0/16\"\n  direction = \"inbound\"\n  udp {\n    port_min = 53\n    port_max = 53\n  }\n}\n"
        );
    }

    #[test]
    fn test_module_files() {
        let doc = doc();
        let vpc = doc.find(Family::Vpcs, "management").unwrap();
        let files = vpc_module(vpc, &doc, &GeneratorConfig::default());

        let keys: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["main.tf", "outputs.tf", "variables.tf", "versions.tf"]);

        let main = &files["main.tf"];
        assert!(main.contains("resource \"ibm_is_vpc\" \"vpc\""));
        assert!(main.contains("address_prefix_management = \"manual\""));
        assert!(main.contains("# Management Routing Tables"));
        assert!(main.contains("next_hop      = \"10.10.10.4\""));

        let variables = &files["variables.tf"];
        assert!(variables.contains("variable \"slz_management_rg_id\""));
        assert!(variables.contains("variable \"slz_edge_rg_id\""));

        let outputs = &files["outputs.tf"];
        assert!(outputs.contains("output \"subnet_vsi_zone_1_id\""));
        assert!(outputs.contains("output \"management_vpe_id\""));
    }

    #[test]
    fn test_module_call_passes_resource_groups() {
        let doc = doc();
        let vpc = doc.find(Family::Vpcs, "management").unwrap();
        let text = module_call(vpc, &doc).render();
        assert!(text.starts_with("module \"management_vpc\" {\n"));
        assert!(text.contains("source               = \"./management_vpc\""));
        assert!(text.contains("slz_management_rg_id = ibm_resource_group.slz_management_rg.id"));
        assert!(text.contains("slz_edge_rg_id       = ibm_resource_group.slz_edge_rg.id"));
    }
}
