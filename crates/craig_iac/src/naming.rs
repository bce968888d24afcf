//! Resource names and address tokens.
//!
//! Every generated resource has two identifiers: the human readable `name`
//! attribute, built from the `prefix` variable and kebab-cased parts, and the
//! address token used to reference the block from other blocks.

use std::sync::OnceLock;

use regex::Regex;

use crate::hcl::escape_template;

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_]+").expect("valid pattern"))
}

fn repeated_dashes() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{2,}").expect("valid pattern"))
}

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid pattern"))
}

/// Lower kebab case: `"My_VPC name"` becomes `"my-vpc-name"`.
pub fn kebab_case(value: &str) -> String {
    let lower = value.to_lowercase();
    let dashed = separators().replace_all(&lower, "-");
    let collapsed = repeated_dashes().replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}

/// Snake case with no leading or trailing underscores.
pub fn snake_case(value: &str) -> String {
    let lower = value.to_lowercase();
    non_alphanumeric()
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// Prefixed resource name: `["my", "vpc"]` renders `${var.prefix}-my-vpc`.
/// The result is a template; parts are escaped.
pub fn kebab_name(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .map(|part| escape_template(&kebab_case(part)))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("${{var.prefix}}-{}", joined)
}

/// Address token for a block built from several parts.
pub fn address_token(parts: &[&str]) -> String {
    snake_case(&parts.join(" "))
}

/// Zone expression for a numeric zone.
pub fn zone_name(zone: i64) -> String {
    format!("${{var.region}}-{}", zone)
}

/// Title used in section banners: `"slz-kms"` becomes `"Slz Kms"`.
pub fn title_case(value: &str) -> String {
    value
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
