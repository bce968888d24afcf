//! Private DNS instances, zones, records and custom resolvers.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{not_found, rg_id_ref, subnet_ref, vpc_ref, UNFOUND_REF};
use crate::translators::vsi::vsi_instances;

fn instance_token(dns: &str) -> String {
    address_token(&[dns, "dns_instance"])
}

fn zone_token(dns: &str, zone: &str) -> String {
    address_token(&[dns, "dns_zone", zone])
}

fn instance_guid(dns: &str) -> String {
    format!("ibm_resource_instance.{}.guid", instance_token(dns))
}

pub fn format_dns_instance(dns: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = dns.name_or_empty();
    Block::resource(
        "ibm_resource_instance",
        &instance_token(name),
        Body::new()
            .template("name", kebab_name(&[name, "dns-instance"]))
            .raw("resource_group_id", rg_id_ref(doc, dns.str("resource_group")))
            .str("location", "global")
            .str("service", "dns-svcs")
            .str("plan", dns.str("plan").unwrap_or("standard-dns"))
            .tags(),
    )
}

/// Zone block followed by one permitted network per VPC.
pub fn format_zone(dns: Record<'_>, zone: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let name = dns.name_or_empty();
    let zone_name = zone.name_or_empty();
    let token = zone_token(name, zone_name);

    let mut blocks = vec![Block::resource(
        "ibm_dns_zone",
        &token,
        Body::new()
            .str("name", zone_name)
            .raw("instance_id", instance_guid(name))
            .opt_str("description", zone.str("description"))
            .opt_str("label", zone.str("label")),
    )];

    for vpc in zone.strings("permitted_networks") {
        blocks.push(Block::resource(
            "ibm_dns_permitted_network",
            &address_token(&[&token, "permitted_network", vpc]),
            Body::new()
                .raw("instance_id", instance_guid(name))
                .raw("zone_id", format!("ibm_dns_zone.{}.zone_id", token))
                .raw("vpc_crn", vpc_ref(doc, Some(vpc), "crn"))
                .str("type", "vpc"),
        ));
    }
    blocks
}

/// Record data: the first instance of the named deployment when one is
/// given, otherwise the literal `rdata`.
fn record_data(record: Record<'_>, doc: &NormalizedDocument) -> Option<(bool, String)> {
    match record.str("vsi") {
        Some(vsi) => {
            let address = doc
                .find(Family::Vsi, vsi)
                .and_then(|deployment| vsi_instances(deployment).first().map(|i| i.address_ref()))
                .unwrap_or_else(|| not_found("VSI"));
            Some((true, address))
        }
        None => record.str("rdata").map(|rdata| (false, rdata.to_string())),
    }
}

pub fn format_record(dns: Record<'_>, record: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = dns.name_or_empty();
    let record_name = record.name_or_empty();
    let zone_id = match record.str("dns_zone").and_then(|zone| dns.child("zones", zone)) {
        Some(zone) => format!(
            "ibm_dns_zone.{}.zone_id",
            zone_token(name, zone.name_or_empty())
        ),
        None => UNFOUND_REF.to_string(),
    };

    let mut body = Body::new()
        .raw("instance_id", instance_guid(name))
        .raw("zone_id", zone_id)
        .str("name", record_name)
        .str("type", record.str("type").unwrap_or("A"));
    body = match record_data(record, doc) {
        Some((true, reference)) => body.raw("rdata", reference),
        Some((false, literal)) => body.str("rdata", literal),
        None => body,
    };
    body = body
        .opt_int("ttl", record.int("ttl"))
        .opt_int("preference", record.int("preference"))
        .opt_int("port", record.int("port"))
        .opt_str("protocol", record.str("protocol"))
        .opt_int("priority", record.int("priority"))
        .opt_str("service", record.str("service"))
        .opt_int("weight", record.int("weight"));

    Block::resource(
        "ibm_dns_resource_record",
        &address_token(&[name, "dns_record", record_name]),
        body,
    )
}

pub fn format_resolver(
    dns: Record<'_>,
    resolver: Record<'_>,
    doc: &NormalizedDocument,
) -> Block {
    let name = dns.name_or_empty();
    let resolver_name = resolver.name_or_empty();
    let vpc = resolver.str("vpc");
    let locations = resolver
        .strings("subnets")
        .into_iter()
        .map(|subnet| {
            Body::new()
                .raw("subnet_crn", subnet_ref(doc, vpc, Some(subnet), "crn"))
                .bool("enabled", true)
        })
        .collect();

    Block::resource(
        "ibm_dns_custom_resolver",
        &address_token(&[name, "dns_resolver", resolver_name]),
        Body::new()
            .template("name", kebab_name(&[resolver_name]))
            .raw("instance_id", instance_guid(name))
            .opt_str("description", resolver.str("description"))
            .bool("high_availability", true)
            .bool("enabled", true)
            .repeated("locations", locations),
    )
}

pub fn format_dns_section(dns: Record<'_>, doc: &NormalizedDocument) -> Section {
    let mut blocks = vec![format_dns_instance(dns, doc)];
    for zone in dns.children("zones") {
        blocks.extend(format_zone(dns, zone, doc));
    }
    for record in dns.children("records") {
        blocks.push(format_record(dns, record, doc));
    }
    for resolver in dns.children("custom_resolvers") {
        blocks.push(format_resolver(dns, resolver, doc));
    }
    Section::new(format!("{} DNS Service", title_case(dns.name_or_empty())), blocks)
}

pub fn dns_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::Dns)
        .into_iter()
        .map(|dns| format_dns_section(dns, doc))
        .collect();
    render_file(&sections)
}
