//! Virtual private endpoint gateways.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Expr, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{rg_id_ref, security_group_ref, subnet_ref, vpc_ref, UNFOUND_REF};

/// Cloud service CRN targeted by an endpoint gateway.
pub fn service_crn(service: &str) -> Expr {
    match service {
        "cos" => Expr::template(
            "crn:v1:bluemix:public:cloud-object-storage:global:::endpoint:s3.direct.${var.region}.cloud-object-storage.appdomain.cloud",
        ),
        "icr" => Expr::template(
            "crn:v1:bluemix:public:container-registry:${var.region}:::endpoint:vpe.${var.region}.container-registry.cloud.ibm.com",
        ),
        "hpcs" => Expr::template(
            "crn:v1:bluemix:public:hs-crypto:${var.region}:::endpoint:api.private.${var.region}.hs-crypto.cloud.ibm.com",
        ),
        _ => Expr::raw(UNFOUND_REF),
    }
}

fn gateway_token(vpc: &str, vpe: &str) -> String {
    address_token(&[vpc, "vpc", vpe, "vpe_gateway"])
}

fn reserved_ip_token(vpc: &str, vpe: &str, subnet: &str) -> String {
    address_token(&[vpc, "vpc", vpe, "gw", subnet, "ip"])
}

/// Reserved IPs, the gateway, and one gateway IP per subnet.
pub fn format_vpe(vpe: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let name = vpe.name_or_empty();
    let vpc = vpe.str("vpc").unwrap_or_default();
    let gateway = gateway_token(vpc, name);
    let subnets = vpe.strings("subnets");

    let mut blocks: Vec<Block> = subnets
        .iter()
        .map(|subnet| {
            Block::resource(
                "ibm_is_subnet_reserved_ip",
                &reserved_ip_token(vpc, name, subnet),
                Body::new().raw("subnet", subnet_ref(doc, Some(vpc), Some(*subnet), "id")),
            )
        })
        .collect();

    let security_groups: Vec<String> = vpe
        .strings("security_groups")
        .into_iter()
        .map(|sg| security_group_ref(doc, sg))
        .collect();

    blocks.push(Block::resource(
        "ibm_is_virtual_endpoint_gateway",
        &gateway,
        Body::new()
            .template("name", kebab_name(&[vpc, name, "vpe-gw"]))
            .raw("vpc", vpc_ref(doc, Some(vpc), "id"))
            .raw("resource_group", rg_id_ref(doc, vpe.str("resource_group")))
            .tags()
            .raws("security_groups", security_groups)
            .block(
                "target",
                Body::new()
                    .attr("crn", service_crn(vpe.str("service").unwrap_or_default()))
                    .str("resource_type", "provider_cloud_service"),
            ),
    ));

    for subnet in subnets {
        let ip = reserved_ip_token(vpc, name, subnet);
        blocks.push(Block::resource(
            "ibm_is_virtual_endpoint_gateway_ip",
            &address_token(&[vpc, "vpc", name, "gw", subnet, "gateway_ip"]),
            Body::new()
                .raw(
                    "gateway",
                    format!("ibm_is_virtual_endpoint_gateway.{}.id", gateway),
                )
                .raw(
                    "reserved_ip",
                    format!("ibm_is_subnet_reserved_ip.{}.reserved_ip", ip),
                ),
        ));
    }

    blocks
}

pub fn vpe_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::VirtualPrivateEndpoints)
        .into_iter()
        .map(|vpe| {
            Section::new(
                format!("{} Endpoint Gateway", title_case(vpe.name_or_empty())),
                format_vpe(vpe, doc),
            )
        })
        .collect();
    render_file(&sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(service: &str) -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-management-rg"}],
            "vpcs": [{"name": "management", "subnets": [
                {"name": "vpe-zone-1", "zone": 1},
                {"name": "vpe-zone-2", "zone": 2}
            ]}],
            "security_groups": [{"name": "management-vpe-sg", "vpc": "management"}],
            "virtual_private_endpoints": [{
                "name": "cos",
                "vpc": "management",
                "service": service,
                "resource_group": "slz-management-rg",
                "subnets": ["vpe-zone-1", "vpe-zone-2"],
                "security_groups": ["management-vpe-sg"]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_gateway_blocks() {
        let doc = doc("cos");
        let vpe = doc.find(Family::VirtualPrivateEndpoints, "cos").unwrap();
        let blocks = format_vpe(vpe, &doc);

        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0].address(), "ibm_is_subnet_reserved_ip.management_vpc_cos_gw_vpe_zone_1_ip");
        assert_eq!(blocks[2].address(), "ibm_is_virtual_endpoint_gateway.management_vpc_cos_vpe_gateway");

        let gateway = blocks[2].render();
        assert!(gateway.contains("security_groups = [module.management_vpc.management_vpe_sg_id]"));
        assert!(gateway.contains("  target {\n    crn           = \"crn:v1:bluemix:public:cloud-object-storage:global:::endpoint:s3.direct.${var.region}.cloud-object-storage.appdomain.cloud\"\n    resource_type = \"provider_cloud_service\"\n  }\n"));

        let ip = blocks[4].render();
        assert!(ip.contains("reserved_ip = ibm_is_subnet_reserved_ip.management_vpc_cos_gw_vpe_zone_2_ip.reserved_ip"));
    }

    #[test]
    fn test_unknown_service_is_sentinel() {
        let text = vpe_tf(&doc("bogus")).unwrap();
        assert!(text.contains("crn           = ERROR: Unfound ref"));
    }
}
