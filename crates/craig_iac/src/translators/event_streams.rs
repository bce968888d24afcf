//! Event Streams instances.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name};
use crate::refs::rg_id_ref;

const ENTERPRISE_PLAN: &str = "enterprise-3nodes-2tb";

pub fn format_event_streams(es: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = es.name_or_empty();
    let plan = es.str("plan").unwrap_or("standard");

    let body = Body::new()
        .template("name", kebab_name(&[name]))
        .str("service", "messagehub")
        .str("plan", plan)
        .raw("location", "var.region")
        .raw("resource_group_id", rg_id_ref(doc, es.str("resource_group")))
        .when(plan == ENTERPRISE_PLAN, |body| {
            let allowlist = es
                .str("private_ip_allowlist")
                .map(|list| format!("[{}]", list));
            body.map(
                "parameters",
                Body::new()
                    .str("\"service-endpoints\"", es.str("endpoints").unwrap_or("private"))
                    .opt_str("private_ip_allowlist", allowlist.as_deref())
                    .opt_str("throughput", es.int("throughput").map(|n| n.to_string()).as_deref())
                    .opt_str(
                        "storage_size",
                        es.int("storage_size").map(|n| n.to_string()).as_deref(),
                    ),
            )
        })
        .block(
            "timeouts",
            Body::new()
                .str("create", "3h")
                .str("update", "1h")
                .str("delete", "1h"),
        )
        .tags();

    Block::resource(
        "ibm_resource_instance",
        &address_token(&[name, "es"]),
        body,
    )
}

pub fn event_streams_tf(doc: &NormalizedDocument) -> Option<String> {
    let blocks = doc
        .records(Family::EventStreams)
        .into_iter()
        .map(|es| format_event_streams(es, doc))
        .collect();
    render_file(&[Section::new("Event Streams", blocks)])
}
