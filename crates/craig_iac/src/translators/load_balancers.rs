//! VPC load balancers.
//!
//! A load balancer yields the balancer, its pool, one pool member for every
//! instance of every targeted deployment, and a listener.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{not_found, rg_id_ref, security_group_ref, subnet_ref};
use crate::translators::vsi::vsi_instances;

fn lb_token(name: &str) -> String {
    address_token(&[name, "load_balancer"])
}

fn pool_token(name: &str) -> String {
    address_token(&[name, "load_balancer_pool"])
}

pub fn format_load_balancer(lb: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = lb.name_or_empty();
    let vpc = lb.str("vpc");
    let subnets: Vec<String> = lb
        .strings("subnets")
        .into_iter()
        .map(|subnet| subnet_ref(doc, vpc, Some(subnet), "id"))
        .collect();
    let security_groups: Vec<String> = lb
        .strings("security_groups")
        .into_iter()
        .map(|sg| security_group_ref(doc, sg))
        .collect();

    Block::resource(
        "ibm_is_lb",
        &lb_token(name),
        Body::new()
            .template("name", kebab_name(&[name, "lb"]))
            .str("type", lb.str("type").unwrap_or("public"))
            .raws("subnets", subnets)
            .raw("resource_group", rg_id_ref(doc, lb.str("resource_group")))
            .raws("security_groups", security_groups)
            .tags(),
    )
}

pub fn format_pool(lb: Record<'_>) -> Block {
    let name = lb.name_or_empty();
    Block::resource(
        "ibm_is_lb_pool",
        &pool_token(name),
        Body::new()
            .raw("lb", format!("ibm_is_lb.{}.id", lb_token(name)))
            .template("name", kebab_name(&[name, "lb", "pool"]))
            .str("algorithm", lb.str("algorithm").unwrap_or("round_robin"))
            .str("protocol", lb.str("protocol").unwrap_or("http"))
            .int("health_delay", lb.int("health_delay").unwrap_or(5))
            .int("health_retries", lb.int("health_retries").unwrap_or(2))
            .int("health_timeout", lb.int("health_timeout").unwrap_or(2))
            .str("health_type", lb.str("health_type").unwrap_or("http"))
            .opt_str("proxy_protocol", lb.str("proxy_protocol"))
            .opt_str("session_persistence_type", lb.str("session_persistence_type"))
            .opt_str(
                "session_persistence_app_cookie_name",
                lb.str("session_persistence_app_cookie_name"),
            ),
    )
}

/// One member per instance of each targeted deployment. An unknown
/// deployment yields a single member with a sentinel address.
pub fn format_members(lb: Record<'_>, doc: &NormalizedDocument) -> Vec<Block> {
    let name = lb.name_or_empty();
    let port = lb.int("port").unwrap_or(80);
    let member = |token: String, address: String| {
        Block::resource(
            "ibm_is_lb_pool_member",
            &token,
            Body::new()
                .int("port", port)
                .raw("lb", format!("ibm_is_lb.{}.id", lb_token(name)))
                .raw(
                    "pool",
                    format!(
                        "element(split(\"/\", ibm_is_lb_pool.{}.id), 1)",
                        pool_token(name)
                    ),
                )
                .raw("target_address", address),
        )
    };

    let mut blocks = Vec::new();
    for target in lb.strings("target_vsi") {
        match doc.find(Family::Vsi, target) {
            Some(deployment) => {
                for instance in vsi_instances(deployment) {
                    blocks.push(member(
                        address_token(&[name, &instance.token(), "pool_member"]),
                        instance.address_ref(),
                    ));
                }
            }
            None => blocks.push(member(
                address_token(&[name, target, "pool_member"]),
                not_found("VSI"),
            )),
        }
    }
    blocks
}

pub fn format_listener(lb: Record<'_>, members: &[Block]) -> Block {
    let name = lb.name_or_empty();
    let mut body = Body::new()
        .raw("lb", format!("ibm_is_lb.{}.id", lb_token(name)))
        .raw("default_pool", format!("ibm_is_lb_pool.{}.id", pool_token(name)))
        .int("port", lb.int("listener_port").unwrap_or(80))
        .str("protocol", lb.str("listener_protocol").unwrap_or("http"))
        .opt_int("connection_limit", lb.int("connection_limit"));
    if !members.is_empty() {
        body = body.lines("depends_on", members.iter().map(Block::address));
    }
    Block::resource("ibm_is_lb_listener", &address_token(&[name, "listener"]), body)
}

pub fn format_load_balancer_section(lb: Record<'_>, doc: &NormalizedDocument) -> Section {
    let members = format_members(lb, doc);
    let listener = format_listener(lb, &members);

    let mut blocks = vec![format_load_balancer(lb, doc), format_pool(lb)];
    blocks.extend(members);
    blocks.push(listener);
    Section::new(
        format!("{} Load Balancer", title_case(lb.name_or_empty())),
        blocks,
    )
}

pub fn load_balancers_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::LoadBalancers)
        .into_iter()
        .map(|lb| format_load_balancer_section(lb, doc))
        .collect();
    render_file(&sections)
}
