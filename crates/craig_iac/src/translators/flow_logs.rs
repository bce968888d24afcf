//! Flow log collectors and the policies letting them write to object storage.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{bucket_ref, cos_ref, rg_id_ref, vpc_ref};

pub fn flow_logs_policy_token(cos: &str) -> String {
    address_token(&[cos, "flow_logs_policy"])
}

/// Authorization for flow log collectors to write into one instance.
pub fn format_flow_logs_policy(cos: &str, doc: &NormalizedDocument) -> Block {
    Block::resource(
        "ibm_iam_authorization_policy",
        &flow_logs_policy_token(cos),
        Body::new()
            .str("source_service_name", "is")
            .str("source_resource_type", "flow-log-collector")
            .str(
                "description",
                "Allow flow logs write access cloud object storage instance",
            )
            .strings("roles", ["Writer"])
            .str("target_service_name", "cloud-object-storage")
            .raw("target_resource_instance_id", cos_ref(doc, Some(cos), "guid")),
    )
}

pub fn format_flow_log(vpc: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = vpc.name_or_empty();
    let cos = vpc.str("cos");

    let mut body = Body::new()
        .template("name", kebab_name(&[name, "vpc-logs"]))
        .raw("target", vpc_ref(doc, Some(name), "id"))
        .bool("active", true)
        .raw(
            "storage_bucket",
            bucket_ref(doc, cos, vpc.str("bucket"), "bucket_name"),
        )
        .raw("resource_group", rg_id_ref(doc, vpc.str("resource_group")))
        .tags();
    if let Some(cos) = cos {
        body = body.lines(
            "depends_on",
            [format!(
                "ibm_iam_authorization_policy.{}",
                flow_logs_policy_token(cos)
            )],
        );
    }

    Block::resource(
        "ibm_is_flow_log",
        &address_token(&[name, "flow_logs"]),
        body,
    )
}

/// VPCs with a collector: those naming an object storage instance.
fn logged_vpcs(doc: &NormalizedDocument) -> Vec<Record<'_>> {
    doc.records(Family::Vpcs)
        .into_iter()
        .filter(|vpc| vpc.str("cos").is_some())
        .collect()
}

pub fn flow_logs_tf(doc: &NormalizedDocument) -> Option<String> {
    let vpcs = logged_vpcs(doc);

    let mut seen: Vec<&str> = Vec::new();
    let mut policies = Vec::new();
    for cos in vpcs.iter().filter_map(|vpc| vpc.str("cos")) {
        if !seen.contains(&cos) {
            seen.push(cos);
            policies.push(format_flow_logs_policy(cos, doc));
        }
    }

    let mut sections = vec![Section::new("Flow Logs Policies", policies)];
    for vpc in vpcs {
        sections.push(Section::new(
            format!("{} Flow Logs", title_case(vpc.name_or_empty())),
            vec![format_flow_log(vpc, doc)],
        ));
    }
    render_file(&sections)
}
