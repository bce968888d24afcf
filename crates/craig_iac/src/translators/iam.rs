//! IAM account settings and access groups.

use craig_spec::{Family, NormalizedDocument, Record, Section as DocSection};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::rg_id_ref;

const ACCOUNT_SETTINGS: &[&str] = &[
    "mfa",
    "allowed_ip_addresses",
    "include_history",
    "if_match",
    "max_sessions_per_identity",
    "restrict_create_service_id",
    "restrict_create_platform_apikey",
    "session_expiration_in_seconds",
    "session_invalidation_in_seconds",
];

/// Account settings block; `None` unless enabled.
pub fn format_account_settings(settings: Record<'_>) -> Option<Block> {
    if !settings.bool("enable") {
        return None;
    }
    let body = ACCOUNT_SETTINGS
        .iter()
        .fold(Body::new(), |body, field| body.opt_json(*field, settings.get(field)));
    Some(Block::resource(
        "ibm_iam_account_settings",
        "iam_account_settings",
        body,
    ))
}

fn group_token(name: &str) -> String {
    address_token(&[name, "access_group"])
}

fn group_id(name: &str) -> String {
    format!("ibm_iam_access_group.{}.id", group_token(name))
}

pub fn format_access_group(group: Record<'_>) -> Block {
    let name = group.name_or_empty();
    Block::resource(
        "ibm_iam_access_group",
        &group_token(name),
        Body::new()
            .template("name", kebab_name(&[name, "ag"]))
            .opt_str("description", group.str("description"))
            .tags(),
    )
}

pub fn format_policy(group: Record<'_>, policy: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = group.name_or_empty();
    let resources = policy.object("resources");
    let field = |key: &str| resources.and_then(|r| r.str(key));

    let resource_body = Body::new()
        .when(field("resource_group").is_some(), |body| {
            body.raw("resource_group_id", rg_id_ref(doc, field("resource_group")))
        })
        .opt_str("resource_type", field("resource_type"))
        .opt_str("resource", field("resource"))
        .opt_str("service", field("service"))
        .opt_str("resource_instance_id", field("resource_instance_id"));

    let mut body = Body::new()
        .raw("access_group_id", group_id(name))
        .strings("roles", policy.strings("roles"));
    if !resource_body.is_empty() {
        body = body.block("resources", resource_body);
    }

    Block::resource(
        "ibm_iam_access_group_policy",
        &address_token(&[name, policy.name_or_empty(), "policy"]),
        body,
    )
}

pub fn format_dynamic_rule(group: Record<'_>, rule: Record<'_>) -> Block {
    let name = group.name_or_empty();
    let rule_name = rule.name_or_empty();
    let conditions = rule.object("conditions");
    let condition = |key: &str| conditions.and_then(|c| c.str(key)).unwrap_or_default();

    Block::resource(
        "ibm_iam_access_group_dynamic_rule",
        &address_token(&[name, rule_name, "dynamic_rule"]),
        Body::new()
            .template("name", kebab_name(&[rule_name, "dynamic-rule"]))
            .raw("access_group_id", group_id(name))
            .int("expiration", rule.int("expiration").unwrap_or(1))
            .str(
                "identity_provider",
                rule.str("identity_provider").unwrap_or_default(),
            )
            .block(
                "conditions",
                Body::new()
                    .str("claim", condition("claim"))
                    .str("operator", condition("operator"))
                    .str("value", condition("value")),
            ),
    )
}

pub fn format_invites(group: Record<'_>) -> Option<Block> {
    if !group.bool("has_invites") {
        return None;
    }
    let name = group.name_or_empty();
    let usernames = group
        .object("invites")
        .map(|invites| invites.strings("usernames"))
        .unwrap_or_default();
    Some(Block::resource(
        "ibm_iam_user_invite",
        &address_token(&[name, "invites"]),
        Body::new()
            .strings("users", usernames)
            .raws("access_groups", [group_id(name)]),
    ))
}

pub fn format_access_group_section(group: Record<'_>, doc: &NormalizedDocument) -> Section {
    let mut blocks = vec![format_access_group(group)];
    for policy in group.children("policies") {
        blocks.push(format_policy(group, policy, doc));
    }
    for rule in group.children("dynamic_policies") {
        blocks.push(format_dynamic_rule(group, rule));
    }
    blocks.extend(format_invites(group));
    Section::new(
        format!("{} Access Group", title_case(group.name_or_empty())),
        blocks,
    )
}

/// `None` when account settings are disabled and there are no groups.
pub fn iam_tf(doc: &NormalizedDocument) -> Option<String> {
    let settings = doc
        .section(DocSection::IamAccountSettings)
        .and_then(format_account_settings);

    let mut sections = vec![Section::new(
        "IAM Account Settings",
        settings.into_iter().collect(),
    )];
    for group in doc.records(Family::AccessGroups) {
        sections.push(format_access_group_section(group, doc));
    }
    render_file(&sections)
}
