//! Context based restriction zones and rules.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Expr, Section};
use crate::naming::{address_token, kebab_name};

const NETWORK_ZONE: &str = "networkZoneId";

fn zone_token(name: &str) -> String {
    address_token(&[name, "cbr_zone"])
}

fn type_value(entry: Record<'_>) -> Body {
    Body::new()
        .str("type", entry.str("type").unwrap_or_default())
        .str("value", entry.str("value").unwrap_or_default())
}

pub fn format_zone(zone: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = zone.name_or_empty();
    let account_id = zone
        .str("account_id")
        .map(str::to_string)
        .or_else(|| doc.options().account_id);

    Block::resource(
        "ibm_cbr_zone",
        &zone_token(name),
        Body::new()
            .template("name", kebab_name(&[name]))
            .opt_str("account_id", account_id.as_deref())
            .opt_str("description", zone.str("description"))
            .repeated(
                "addresses",
                zone.children("addresses").into_iter().map(type_value).collect(),
            )
            .repeated(
                "excluded",
                zone.children("exclusions").into_iter().map(type_value).collect(),
            ),
    )
}

/// Context attribute value; a network zone naming a zone of this document
/// points at that zone's id.
fn context_value(context: Record<'_>, doc: &NormalizedDocument) -> Expr {
    let value = context.str("value").unwrap_or_default();
    let zone = doc.find(Family::CbrZones, value);
    match (context.str("name"), zone) {
        (Some(NETWORK_ZONE), Some(zone)) => Expr::raw(format!(
            "ibm_cbr_zone.{}.id",
            zone_token(zone.name_or_empty())
        )),
        _ => Expr::str(value),
    }
}

pub fn format_rule(rule: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = rule.name_or_empty();

    let contexts = rule
        .children("contexts")
        .into_iter()
        .map(|context| {
            Body::new().block(
                "attributes",
                Body::new()
                    .str("name", context.name_or_empty())
                    .attr("value", context_value(context, doc)),
            )
        })
        .collect();

    let attributes = rule
        .children("resource_attributes")
        .into_iter()
        .map(|attribute| {
            Body::new()
                .str("name", attribute.name_or_empty())
                .str("value", attribute.str("value").unwrap_or_default())
        })
        .collect();
    let tags = rule
        .children("tags")
        .into_iter()
        .map(|tag| {
            Body::new()
                .str("name", tag.name_or_empty())
                .str("operator", tag.str("operator").unwrap_or("stringEquals"))
                .str("value", tag.str("value").unwrap_or_default())
        })
        .collect();

    Block::resource(
        "ibm_cbr_rule",
        &address_token(&[name, "cbr_rule"]),
        Body::new()
            .opt_str("description", rule.str("description"))
            .str(
                "enforcement_mode",
                rule.str("enforcement_mode").unwrap_or("enabled"),
            )
            .repeated("contexts", contexts)
            .block(
                "resources",
                Body::new()
                    .repeated("attributes", attributes)
                    .repeated("tags", tags),
            )
            .when(rule.str("api_type_id").is_some(), |body| {
                body.block(
                    "operations",
                    Body::new().block(
                        "api_types",
                        Body::new().str(
                            "api_type_id",
                            rule.str("api_type_id").unwrap_or_default(),
                        ),
                    ),
                )
            }),
    )
}

pub fn cbr_tf(doc: &NormalizedDocument) -> Option<String> {
    let zones = doc
        .records(Family::CbrZones)
        .into_iter()
        .map(|zone| format_zone(zone, doc))
        .collect();
    let rules = doc
        .records(Family::CbrRules)
        .into_iter()
        .map(|rule| format_rule(rule, doc))
        .collect();
    render_file(&[
        Section::new("CBR Zones", zones),
        Section::new("CBR Rules", rules),
    ])
}
