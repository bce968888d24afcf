//! Site-to-site VPN gateways.
//!
//! Preshared keys are never written into the generated code; each
//! connection reads its key from a sensitive root variable.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{rg_id_ref, subnet_ref};
use crate::translators::terraform::Variable;

fn gateway_token(vpc: &str, gateway: &str) -> String {
    address_token(&[vpc, gateway, "vpn_gw"])
}

/// Name of the variable holding a connection's preshared key.
pub fn preshared_key_variable(gateway: &str, connection: &str) -> String {
    address_token(&[gateway, connection, "preshared_key"])
}

pub fn format_vpn_gateway(gateway: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = gateway.name_or_empty();
    let vpc = gateway.str("vpc").unwrap_or_default();
    Block::resource(
        "ibm_is_vpn_gateway",
        &gateway_token(vpc, name),
        Body::new()
            .template("name", kebab_name(&[vpc, name, "vpn-gw"]))
            .raw(
                "subnet",
                subnet_ref(doc, Some(vpc), gateway.str("subnet"), "id"),
            )
            .raw("resource_group", rg_id_ref(doc, gateway.str("resource_group")))
            .tags()
            .block("timeouts", Body::new().str("delete", "1h")),
    )
}

pub fn format_vpn_connection(gateway: Record<'_>, connection: Record<'_>) -> Block {
    let name = gateway.name_or_empty();
    let vpc = gateway.str("vpc").unwrap_or_default();
    let connection_name = connection.name_or_empty();
    let token = gateway_token(vpc, name);

    Block::resource(
        "ibm_is_vpn_gateway_connection",
        &address_token(&[&token, "connection", connection_name]),
        Body::new()
            .template("name", kebab_name(&[name, connection_name]))
            .raw("vpn_gateway", format!("ibm_is_vpn_gateway.{}.id", token))
            .str("peer_address", connection.str("peer_address").unwrap_or_default())
            .raw(
                "preshared_key",
                format!("var.{}", preshared_key_variable(name, connection_name)),
            )
            .strings("local_cidrs", connection.strings("local_cidrs"))
            .strings("peer_cidrs", connection.strings("peer_cidrs")),
    )
}

/// Sensitive preshared key variables for every connection.
pub fn vpn_variables(doc: &NormalizedDocument) -> Vec<Variable> {
    let mut variables = Vec::new();
    for gateway in doc.records(Family::VpnGateways) {
        let name = gateway.name_or_empty();
        for connection in gateway.children("connections") {
            variables.push(
                Variable::string(
                    preshared_key_variable(name, connection.name_or_empty()),
                    format!(
                        "Preshared key for VPN connection {} on gateway {}",
                        connection.name_or_empty(),
                        name
                    ),
                )
                .sensitive(),
            );
        }
    }
    variables
}

pub fn vpn_gateways_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::VpnGateways)
        .into_iter()
        .map(|gateway| {
            let mut blocks = vec![format_vpn_gateway(gateway, doc)];
            blocks.extend(
                gateway
                    .children("connections")
                    .into_iter()
                    .map(|connection| format_vpn_connection(gateway, connection)),
            );
            Section::new(
                format!("{} VPN Gateway", title_case(gateway.name_or_empty())),
                blocks,
            )
        })
        .collect();
    render_file(&sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-management-rg"}],
            "vpcs": [{"name": "management", "subnets": [{"name": "vpn-zone-1", "zone": 1}]}],
            "vpn_gateways": [{
                "name": "management-gateway",
                "vpc": "management",
                "subnet": "vpn-zone-1",
                "resource_group": "slz-management-rg",
                "connections": [{
                    "name": "onprem",
                    "peer_address": "169.61.10.5",
                    "local_cidrs": ["10.10.10.0/24"],
                    "peer_cidrs": ["192.168.0.0/16"]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_gateway_and_connection() {
        let text = vpn_gateways_tf(&doc()).unwrap();
        assert!(text.contains("resource \"ibm_is_vpn_gateway\" \"management_management_gateway_vpn_gw\""));
        assert!(text.contains("  subnet         = module.management_vpc.subnet_vpn_zone_1_id\n"));
        assert!(text.contains(
            "resource \"ibm_is_vpn_gateway_connection\" \"management_management_gateway_vpn_gw_connection_onprem\""
        ));
        assert!(text.contains("  preshared_key = var.management_gateway_onprem_preshared_key\n"));
        assert!(text.contains("  peer_cidrs    = [\"192.168.0.0/16\"]\n"));
    }

    #[test]
    fn test_preshared_key_variables_are_sensitive() {
        let variables = vpn_variables(&doc());
        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].name, "management_gateway_onprem_preshared_key");
        assert!(variables[0].sensitive);
    }
}
