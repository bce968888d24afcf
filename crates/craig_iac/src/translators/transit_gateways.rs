//! Transit gateways and their connections.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Expr, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{rg_id_ref, vpc_ref};

fn timeouts() -> Body {
    Body::new().str("create", "30m").str("delete", "30m")
}

pub fn format_transit_gateway(tgw: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = tgw.name_or_empty();
    Block::resource(
        "ibm_tg_gateway",
        &address_token(&[name]),
        Body::new()
            .template("name", kebab_name(&[name]))
            .raw("location", "var.region")
            .bool("global", tgw.bool("global"))
            .raw("resource_group", rg_id_ref(doc, tgw.str("resource_group")))
            .tags()
            .block("timeouts", timeouts()),
    )
}

/// Network type of a connection given by CRN, read from the CRN's service
/// name segment.
pub fn crn_network_type(crn: &str) -> &'static str {
    match crn.split(':').nth(4) {
        Some("power-iaas") => "power_virtual_server",
        Some("directlink") => "directlink",
        Some("classic-infrastructure") => "classic",
        _ => "vpc",
    }
}

/// A connection to a VPC of this document or, failing that, to a CRN.
pub fn format_connection(
    tgw: Record<'_>,
    connection: Record<'_>,
    index: usize,
    doc: &NormalizedDocument,
) -> Block {
    let name = tgw.name_or_empty();
    let gateway = format!("ibm_tg_gateway.{}.id", address_token(&[name]));

    let (token, display, network_type, network) = match connection.str("vpc") {
        Some(vpc) => (
            address_token(&[name, "to", vpc, "connection"]),
            kebab_name(&[name, vpc, "hub-connection"]),
            "vpc",
            Expr::raw(vpc_ref(doc, Some(vpc), "crn")),
        ),
        None => {
            let number = (index + 1).to_string();
            let crn = connection.str("crn").unwrap_or_default();
            (
                address_token(&[name, "connection", &number]),
                kebab_name(&[name, "connection", &number]),
                crn_network_type(crn),
                Expr::str(crn),
            )
        }
    };

    Block::resource(
        "ibm_tg_connection",
        &token,
        Body::new()
            .raw("gateway", gateway)
            .str("network_type", network_type)
            .template("name", display)
            .attr("network_id", network)
            .block("timeouts", timeouts()),
    )
}

pub fn transit_gateways_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::TransitGateways)
        .into_iter()
        .map(|tgw| {
            let mut blocks = vec![format_transit_gateway(tgw, doc)];
            for (index, connection) in tgw.children("connections").into_iter().enumerate() {
                blocks.push(format_connection(tgw, connection, index, doc));
            }
            Section::new(
                format!("{} Transit Gateway", title_case(tgw.name_or_empty())),
                blocks,
            )
        })
        .collect();
    render_file(&sections)
}
