//! Network rule normalization.
//!
//! ACL rules and security group rules are rewritten so that the `tcp`,
//! `udp` and `icmp` sub-objects always exist with every field present, and
//! numeric fields hold integers rather than strings.

use serde_json::{Map, Value};

use crate::error::{SpecError, SpecResult};

/// Which kind of rule is being normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Acl,
    SecurityGroup,
}

impl RuleKind {
    fn port_fields(&self) -> &'static [&'static str] {
        match self {
            RuleKind::Acl => &["port_min", "port_max", "source_port_min", "source_port_max"],
            RuleKind::SecurityGroup => &["port_min", "port_max"],
        }
    }

    fn parent_field(&self) -> &'static str {
        match self {
            RuleKind::Acl => "acl",
            RuleKind::SecurityGroup => "sg",
        }
    }

    fn family(&self) -> &'static str {
        match self {
            RuleKind::Acl => "vpcs.acls.rules",
            RuleKind::SecurityGroup => "security_groups.rules",
        }
    }
}

const ICMP_FIELDS: &[&str] = &["type", "code"];

/// Normalize every rule in `rules` in place.
pub fn normalize_rules(
    rules: &mut [Value],
    kind: RuleKind,
    parent: &str,
    vpc: Option<&str>,
) -> SpecResult<()> {
    for rule in rules.iter_mut() {
        if let Value::Object(rule) = rule {
            normalize_rule(rule, kind, parent, vpc)?;
        }
    }
    Ok(())
}

fn normalize_rule(
    rule: &mut Map<String, Value>,
    kind: RuleKind,
    parent: &str,
    vpc: Option<&str>,
) -> SpecResult<()> {
    let label = format!(
        "`{}.{}`",
        parent,
        rule.get("name").and_then(Value::as_str).unwrap_or("")
    );

    for protocol in ["tcp", "udp"] {
        normalize_protocol(rule, protocol, kind.port_fields(), kind.family(), &label)?;
    }
    normalize_protocol(rule, "icmp", ICMP_FIELDS, kind.family(), &label)?;

    rule.insert(
        kind.parent_field().to_string(),
        Value::String(parent.to_string()),
    );
    if let Some(vpc) = vpc {
        rule.insert("vpc".to_string(), Value::String(vpc.to_string()));
    }

    Ok(())
}

fn normalize_protocol(
    rule: &mut Map<String, Value>,
    protocol: &str,
    fields: &[&str],
    family: &str,
    label: &str,
) -> SpecResult<()> {
    let entry = rule
        .entry(protocol.to_string())
        .or_insert_with(|| Value::Object(Map::new()));

    if entry.is_null() {
        *entry = Value::Object(Map::new());
    }

    let Value::Object(sub) = entry else {
        return Err(SpecError::invalid(
            family,
            label,
            protocol,
            "protocol settings must be an object",
        ));
    };

    for field in fields {
        let coerced = match sub.get(*field) {
            None | Some(Value::Null) => Value::Null,
            Some(Value::Number(n)) => Value::Number(n.clone()),
            Some(Value::String(s)) if s.trim().is_empty() => Value::Null,
            Some(Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => {
                    return Err(SpecError::invalid(
                        family,
                        label,
                        &format!("{}.{}", protocol, field),
                        format!("`{}` is not an integer", s),
                    ))
                }
            },
            Some(_) => {
                return Err(SpecError::invalid(
                    family,
                    label,
                    &format!("{}.{}", protocol, field),
                    "expected an integer",
                ))
            }
        };
        sub.insert(field.to_string(), coerced);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_acl_rule_gets_all_protocols() {
        let mut rules = vec![json!({
            "name": "allow-ibm-inbound",
            "action": "allow",
            "tcp": {"port_min": "80", "port_max": 443}
        })];

        normalize_rules(&mut rules, RuleKind::Acl, "management", Some("management")).unwrap();

        let rule = &rules[0];
        assert_eq!(rule["tcp"]["port_min"], json!(80));
        assert_eq!(rule["tcp"]["port_max"], json!(443));
        assert_eq!(rule["tcp"]["source_port_min"], Value::Null);
        assert_eq!(rule["udp"]["source_port_max"], Value::Null);
        assert_eq!(rule["icmp"], json!({"type": null, "code": null}));
        assert_eq!(rule["acl"], json!("management"));
        assert_eq!(rule["vpc"], json!("management"));
    }

    #[test]
    fn test_security_group_rule_shape() {
        let mut rules = vec![json!({"name": "in", "icmp": {"type": "8"}, "udp": null})];
        normalize_rules(&mut rules, RuleKind::SecurityGroup, "vpe-sg", Some("edge")).unwrap();

        assert_eq!(rules[0]["icmp"], json!({"type": 8, "code": null}));
        assert_eq!(rules[0]["udp"], json!({"port_min": null, "port_max": null}));
        assert!(rules[0]["tcp"].get("source_port_min").is_none());
        assert_eq!(rules[0]["sg"], json!("vpe-sg"));
    }

    #[test]
    fn test_non_numeric_port_is_rejected() {
        let mut rules = vec![json!({"name": "bad", "tcp": {"port_min": "http"}})];
        let err = normalize_rules(&mut rules, RuleKind::Acl, "acl", None).unwrap_err();
        assert!(err.to_string().contains("tcp.port_min"));
        assert!(err.to_string().contains("acl.bad"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut rules = vec![json!({"name": "x", "tcp": {"port_min": "22", "port_max": "22"}})];
        normalize_rules(&mut rules, RuleKind::Acl, "acl", Some("vpc")).unwrap();
        let once = rules.clone();
        normalize_rules(&mut rules, RuleKind::Acl, "acl", Some("vpc")).unwrap();
        assert_eq!(once, rules);
    }
}
