//! Client-to-site VPN servers and their routes.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{rg_id_ref, security_group_ref, subnet_ref};

fn server_token(vpc: &str, server: &str) -> String {
    address_token(&[vpc, "vpc", server, "vpn_server"])
}

pub fn format_vpn_server(server: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = server.name_or_empty();
    let vpc = server.str("vpc");
    let method = server.str("method").unwrap_or("certificate");

    let authentication = if method == "certificate" {
        Body::new()
            .str("method", method)
            .opt_str("client_ca_crn", server.str("client_ca_crn"))
    } else {
        Body::new().str("method", method).str("identity_provider", "iam")
    };

    let subnets: Vec<String> = server
        .strings("subnets")
        .into_iter()
        .map(|subnet| subnet_ref(doc, vpc, Some(subnet), "id"))
        .collect();
    let security_groups: Vec<String> = server
        .strings("security_groups")
        .into_iter()
        .map(|sg| security_group_ref(doc, sg))
        .collect();

    Block::resource(
        "ibm_is_vpn_server",
        &server_token(vpc.unwrap_or_default(), name),
        Body::new()
            .str("certificate_crn", server.str("certificate_crn").unwrap_or_default())
            .block("client_authentication", authentication)
            .str("client_ip_pool", server.str("client_ip_pool").unwrap_or_default())
            .opt_json("client_dns_server_ips", server.get("client_dns_server_ips"))
            .opt_int("client_idle_timeout", server.int("client_idle_timeout"))
            .bool("enable_split_tunneling", server.bool("enable_split_tunneling"))
            .template("name", kebab_name(&[name, "server"]))
            .int("port", server.int("port").unwrap_or(443))
            .str("protocol", server.str("protocol").unwrap_or("udp"))
            .raw("resource_group", rg_id_ref(doc, server.str("resource_group")))
            .raws("security_groups", security_groups)
            .raws("subnets", subnets),
    )
}

pub fn format_vpn_route(server: Record<'_>, route: Record<'_>) -> Block {
    let name = server.name_or_empty();
    let token = server_token(server.str("vpc").unwrap_or_default(), name);
    let route_name = route.name_or_empty();
    Block::resource(
        "ibm_is_vpn_server_route",
        &address_token(&[&token, "route", route_name]),
        Body::new()
            .template("name", kebab_name(&[name, route_name]))
            .raw("vpn_server", format!("ibm_is_vpn_server.{}.vpn_server", token))
            .str("destination", route.str("destination").unwrap_or_default())
            .str("action", route.str("action").unwrap_or("deliver")),
    )
}

pub fn vpn_servers_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::VpnServers)
        .into_iter()
        .map(|server| {
            let mut blocks = vec![format_vpn_server(server, doc)];
            blocks.extend(
                server
                    .children("routes")
                    .into_iter()
                    .map(|route| format_vpn_route(server, route)),
            );
            Section::new(
                format!("{} VPN Server", title_case(server.name_or_empty())),
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

    fn fixture(method: &str) -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-management-rg"}],
            "vpcs": [{"name": "management", "subnets": [{"name": "vpn-zone-1", "zone": 1}]}],
            "security_groups": [{"name": "management-vpn-sg", "vpc": "management"}],
            "vpn_servers": [{
                "name": "vpn",
                "vpc": "management",
                "subnets": ["vpn-zone-1"],
                "security_groups": ["management-vpn-sg"],
                "resource_group": "slz-management-rg",
                "certificate_crn": "crn:cert",
                "method": method,
                "client_ca_crn": "crn:ca",
                "client_ip_pool": "10.5.0.0/21",
                "client_dns_server_ips": null,
                "client_idle_timeout": 2000,
                "enable_split_tunneling": true,
                "port": 443,
                "protocol": "udp",
                "routes": [{"name": "onprem", "destination": "172.16.0.0/16", "action": "translate"}]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_certificate_server() {
        let text = vpn_servers_tf(&fixture("certificate")).unwrap();
        assert!(text.contains("resource \"ibm_is_vpn_server\" \"management_vpc_vpn_vpn_server\""));
        assert!(text.contains("  client_authentication {\n    method        = \"certificate\"\n    client_ca_crn = \"crn:ca\"\n  }\n"));
        assert!(!text.contains("client_dns_server_ips"));
        assert!(text.contains("subnets                = [module.management_vpc.subnet_vpn_zone_1_id]"));
        assert!(text.contains("resource \"ibm_is_vpn_server_route\" \"management_vpc_vpn_vpn_server_route_onprem\""));
        assert!(text.contains("  action      = \"translate\"\n"));
    }

    #[test]
    fn test_username_server() {
        let text = vpn_servers_tf(&fixture("username")).unwrap();
        assert!(text.contains("    identity_provider = \"iam\"\n"));
        assert!(!text.contains("client_ca_crn"));
    }
}
