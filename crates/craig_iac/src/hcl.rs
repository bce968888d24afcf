//! HCL block printer.
//!
//! Block shape is carried by explicit entry variants rather than key naming
//! conventions. Strings passed as [`Expr::Str`] are quoted by the printer and
//! never interpolated; [`Expr::Template`] keeps `${...}` sequences the
//! generator wrote itself. [`Expr::Raw`] is emitted verbatim and is used for
//! references.

use serde_json::Value;

const INDENT: &str = "  ";
const BANNER_WIDTH: usize = 78;

/// A right-hand side value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    /// Quoted string whose interpolations are live. Document text inside it
    /// must already be passed through [`escape_template`].
    Template(String),
    Raw(String),
    Bool(bool),
    Int(i64),
    Null,
    /// Inline list: `["a", "b"]`.
    List(Vec<Expr>),
    /// List with one item per line.
    Lines(Vec<Expr>),
}

impl Expr {
    pub fn str(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    pub fn template(value: impl Into<String>) -> Self {
        Expr::Template(value.into())
    }

    pub fn raw(value: impl Into<String>) -> Self {
        Expr::Raw(value.into())
    }

    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expr::List(items.into_iter().map(|s| Expr::Str(s.into())).collect())
    }

    pub fn raws<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expr::List(items.into_iter().map(|s| Expr::Raw(s.into())).collect())
    }

    /// Convert a scalar or array JSON value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Expr::Null,
            Value::Bool(b) => Expr::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Expr::Int(i),
                None => Expr::Raw(n.to_string()),
            },
            Value::String(s) => Expr::Str(s.clone()),
            Value::Array(items) => Expr::List(items.iter().map(Expr::from_json).collect()),
            Value::Object(_) => Expr::Raw(value.to_string()),
        }
    }

    fn render(&self, indent: usize) -> String {
        match self {
            Expr::Str(s) => quote(&escape_template(s)),
            Expr::Template(s) => quote(s),
            Expr::Raw(s) => s.clone(),
            Expr::Bool(b) => b.to_string(),
            Expr::Int(n) => n.to_string(),
            Expr::Null => "null".to_string(),
            Expr::List(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(|item| item.render(indent))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Expr::Lines(items) if items.is_empty() => "[]".to_string(),
            Expr::Lines(items) => {
                let inner = INDENT.repeat(indent + 1);
                let lines = items
                    .iter()
                    .map(|item| format!("{}{}", inner, item.render(indent + 1)))
                    .collect::<Vec<_>>()
                    .join(",\n");
                format!("[\n{}\n{}]", lines, INDENT.repeat(indent))
            }
        }
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Bool(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Int(value)
    }
}

/// Escape template sequences so Terraform reads `${` and `%{` literally.
pub fn escape_template(value: &str) -> String {
    value.replace("${", "$${").replace("%{", "%%{")
}

/// Quote and escape a string. Template sequences are left alone.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// `marker`, lengthened until no line of `text` would close the heredoc early.
fn heredoc_marker(marker: &str, text: &str) -> String {
    let mut marker = marker.to_string();
    while text.lines().any(|line| line.trim() == marker) {
        marker.push('_');
    }
    marker
}

/// One entry inside a block body.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Attribute { key: String, value: Expr },
    /// `key = { ... }`
    Map { key: String, body: Body },
    /// `key = <<MARKER` followed by the text verbatim.
    Heredoc {
        key: String,
        marker: String,
        text: String,
    },
    /// `kind { ... }`
    Block { kind: String, body: Body },
    /// One `kind { ... }` per body.
    Repeated { kind: String, bodies: Vec<Body> },
    Comment(String),
    RawLine(String),
}

impl Entry {
    fn aligned_key(&self) -> Option<&str> {
        match self {
            Entry::Attribute { key, .. } | Entry::Map { key, .. } | Entry::Heredoc { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}

/// Ordered entries of a block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    entries: Vec<Entry>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn attr(mut self, key: impl Into<String>, value: Expr) -> Self {
        self.push(Entry::Attribute {
            key: key.into(),
            value,
        });
        self
    }

    pub fn str(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr(key, Expr::Str(value.into()))
    }

    pub fn template(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr(key, Expr::Template(value.into()))
    }

    pub fn raw(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr(key, Expr::Raw(value.into()))
    }

    pub fn bool(self, key: impl Into<String>, value: bool) -> Self {
        self.attr(key, Expr::Bool(value))
    }

    pub fn int(self, key: impl Into<String>, value: i64) -> Self {
        self.attr(key, Expr::Int(value))
    }

    pub fn opt_str(self, key: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.str(key, value),
            None => self,
        }
    }

    pub fn opt_template(self, key: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.template(key, value),
            None => self,
        }
    }

    pub fn opt_int(self, key: impl Into<String>, value: Option<i64>) -> Self {
        match value {
            Some(value) => self.int(key, value),
            None => self,
        }
    }

    /// JSON value, skipped when absent or `null`.
    pub fn opt_json(self, key: impl Into<String>, value: Option<&Value>) -> Self {
        match value {
            Some(value) if !value.is_null() => self.attr(key, Expr::from_json(value)),
            _ => self,
        }
    }

    pub fn strings<I, S>(self, key: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attr(key, Expr::strings(items))
    }

    pub fn raws<I, S>(self, key: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attr(key, Expr::raws(items))
    }

    /// Raw expressions, one per line.
    pub fn lines<I, S>(self, key: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items.into_iter().map(|s| Expr::Raw(s.into())).collect();
        self.attr(key, Expr::Lines(items))
    }

    pub fn tags(self) -> Self {
        self.raw("tags", "var.tags")
    }

    pub fn map(mut self, key: impl Into<String>, body: Body) -> Self {
        self.push(Entry::Map {
            key: key.into(),
            body,
        });
        self
    }

    /// Heredoc text is a template: document text inside it must already be
    /// passed through [`escape_template`].
    pub fn heredoc(
        mut self,
        key: impl Into<String>,
        marker: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.push(Entry::Heredoc {
            key: key.into(),
            marker: marker.into(),
            text: text.into(),
        });
        self
    }

    pub fn block(mut self, kind: impl Into<String>, body: Body) -> Self {
        self.push(Entry::Block {
            kind: kind.into(),
            body,
        });
        self
    }

    pub fn repeated(mut self, kind: impl Into<String>, bodies: Vec<Body>) -> Self {
        if !bodies.is_empty() {
            self.push(Entry::Repeated {
                kind: kind.into(),
                bodies,
            });
        }
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.push(Entry::Comment(text.into()));
        self
    }

    pub fn raw_line(mut self, text: impl Into<String>) -> Self {
        self.push(Entry::RawLine(text.into()));
        self
    }

    /// Apply `f` only when `condition` holds.
    pub fn when(self, condition: bool, f: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            f(self)
        } else {
            self
        }
    }

    pub fn render(&self, indent: usize, out: &mut String) {
        let pad = INDENT.repeat(indent);
        let width = self
            .entries
            .iter()
            .filter_map(Entry::aligned_key)
            .map(|key| key.chars().count())
            .max()
            .unwrap_or(0);

        for entry in &self.entries {
            match entry {
                Entry::Attribute { key, value } => {
                    out.push_str(&format!(
                        "{}{:<width$} = {}\n",
                        pad,
                        key,
                        value.render(indent),
                        width = width
                    ));
                }
                Entry::Map { key, body } if body.is_empty() => {
                    out.push_str(&format!("{}{:<width$} = {{}}\n", pad, key, width = width));
                }
                Entry::Map { key, body } => {
                    out.push_str(&format!("{}{:<width$} = {{\n", pad, key, width = width));
                    body.render(indent + 1, out);
                    out.push_str(&format!("{}}}\n", pad));
                }
                Entry::Heredoc { key, marker, text } => {
                    let marker = heredoc_marker(marker, text);
                    out.push_str(&format!(
                        "{}{:<width$} = <<{}\n",
                        pad,
                        key,
                        marker,
                        width = width
                    ));
                    out.push_str(text);
                    if !text.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&marker);
                    out.push('\n');
                }
                Entry::Block { kind, body } => render_nested(&pad, kind, body, indent, out),
                Entry::Repeated { kind, bodies } => {
                    for body in bodies {
                        render_nested(&pad, kind, body, indent, out);
                    }
                }
                Entry::Comment(text) => out.push_str(&format!("{}# {}\n", pad, text)),
                Entry::RawLine(text) => out.push_str(&format!("{}{}\n", pad, text)),
            }
        }
    }
}

fn render_nested(pad: &str, kind: &str, body: &Body, indent: usize, out: &mut String) {
    out.push_str(&format!("{}{} {{\n", pad, kind));
    body.render(indent + 1, out);
    out.push_str(&format!("{}}}\n", pad));
}

/// Kind of a top-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Resource,
    Data,
    Module,
    Variable,
    Output,
    Provider,
    Terraform,
    Locals,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Resource => "resource",
            BlockKind::Data => "data",
            BlockKind::Module => "module",
            BlockKind::Variable => "variable",
            BlockKind::Output => "output",
            BlockKind::Provider => "provider",
            BlockKind::Terraform => "terraform",
            BlockKind::Locals => "locals",
        }
    }
}

/// A top-level block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub labels: Vec<String>,
    pub body: Body,
}

impl Block {
    pub fn new(kind: BlockKind, labels: Vec<String>, body: Body) -> Self {
        Self { kind, labels, body }
    }

    pub fn resource(resource_type: &str, token: &str, body: Body) -> Self {
        Self::new(
            BlockKind::Resource,
            vec![resource_type.to_string(), token.to_string()],
            body,
        )
    }

    pub fn data(resource_type: &str, token: &str, body: Body) -> Self {
        Self::new(
            BlockKind::Data,
            vec![resource_type.to_string(), token.to_string()],
            body,
        )
    }

    /// Resource or data block depending on `use_data`.
    pub fn resource_or_data(use_data: bool, resource_type: &str, token: &str, body: Body) -> Self {
        if use_data {
            Self::data(resource_type, token, body)
        } else {
            Self::resource(resource_type, token, body)
        }
    }

    pub fn module(name: &str, body: Body) -> Self {
        Self::new(BlockKind::Module, vec![name.to_string()], body)
    }

    pub fn variable(name: &str, body: Body) -> Self {
        Self::new(BlockKind::Variable, vec![name.to_string()], body)
    }

    pub fn output(name: &str, body: Body) -> Self {
        Self::new(BlockKind::Output, vec![name.to_string()], body)
    }

    pub fn provider(name: &str, body: Body) -> Self {
        Self::new(BlockKind::Provider, vec![name.to_string()], body)
    }

    pub fn terraform(body: Body) -> Self {
        Self::new(BlockKind::Terraform, Vec::new(), body)
    }

    pub fn locals(body: Body) -> Self {
        Self::new(BlockKind::Locals, Vec::new(), body)
    }

    /// Reference prefix of this block, e.g. `data.ibm_is_image.ubuntu`.
    pub fn address(&self) -> String {
        match self.kind {
            BlockKind::Data => format!("data.{}", self.labels.join(".")),
            BlockKind::Module => format!("module.{}", self.labels.join(".")),
            BlockKind::Variable => format!("var.{}", self.labels.join(".")),
            _ => self.labels.join("."),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from(self.kind.as_str());
        for label in &self.labels {
            out.push(' ');
            out.push_str(&quote(label));
        }
        out.push_str(" {\n");
        self.body.render(1, &mut out);
        out.push_str("}\n");
        out
    }
}

/// A titled group of blocks inside a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            blocks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn render(&self) -> String {
        let banner = "#".repeat(BANNER_WIDTH);
        let mut out = format!("{}\n# {}\n{}\n\n", banner, self.title, banner);
        for block in &self.blocks {
            out.push_str(&block.render());
            out.push('\n');
        }
        out.push_str(&banner);
        out.push('\n');
        out
    }
}

/// Render non-empty sections separated by a blank line.
pub fn render_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .filter(|section| !section.is_empty())
        .map(Section::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render sections into a file, `None` when every section is empty.
pub fn render_file(sections: &[Section]) -> Option<String> {
    if sections.iter().all(Section::is_empty) {
        None
    } else {
        Some(render_sections(sections))
    }
}

/// Render blocks separated by a blank line, without banners.
pub fn render_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::render)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_are_aligned() {
        let block = Block::resource(
            "ibm_resource_group",
            "slz_management_rg",
            Body::new()
                .template("name", "${var.prefix}-slz-management-rg")
                .tags(),
        );
        assert_eq!(
            block.render(),
            "resource \"ibm_resource_group\" \"slz_management_rg\" {\n  name = \"${var.prefix}-slz-management-rg\"\n  tags = var.tags\n}\n"
        );

        let block = Block::resource(
            "ibm_kms_key",
            "kms_k1_key",
            Body::new()
                .raw("instance_id", "ibm_resource_instance.kms.guid")
                .bool("standard_key", false)
                .int("rotation", 3)
                .attr("label", Expr::Null),
        );
        let text = block.render();
        assert!(text.contains("  instance_id  = ibm_resource_instance.kms.guid\n"));
        assert!(text.contains("  standard_key = false\n"));
        assert!(text.contains("  rotation     = 3\n"));
        assert!(text.contains("  label        = null\n"));
    }

    #[test]
    fn test_nested_and_repeated_blocks() {
        let body = Body::new()
            .str("name", "cluster")
            .repeated(
                "zones",
                vec![
                    Body::new().template("name", "${var.region}-1"),
                    Body::new().template("name", "${var.region}-2"),
                ],
            )
            .block("timeouts", Body::new().str("create", "3h"));
        let text = Block::resource("ibm_container_vpc_cluster", "c", body).render();

        assert_eq!(
            text,
            "resource \"ibm_container_vpc_cluster\" \"c\" {\n  name = \"cluster\"\n  zones {\n    name = \"${var.region}-1\"\n  }\n  zones {\n    name = \"${var.region}-2\"\n  }\n  timeouts {\n    create = \"3h\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_map_and_lists() {
        let body = Body::new()
            .map("parameters", Body::new().bool("HMAC", true))
            .strings("roles", ["Reader"])
            .lines("depends_on", ["ibm_a.b", "ibm_c.d"]);
        let mut out = String::new();
        body.render(1, &mut out);

        assert_eq!(
            out,
            "  parameters = {\n    HMAC = true\n  }\n  roles      = [\"Reader\"]\n  depends_on = [\n    ibm_a.b,\n    ibm_c.d\n  ]\n"
        );
    }

    #[test]
    fn test_heredoc_is_verbatim() {
        let body = Body::new()
            .str("name", "vsi")
            .heredoc("user_data", "USER_DATA", "#cloud-config\n  packages: []");
        let mut out = String::new();
        body.render(1, &mut out);
        assert_eq!(
            out,
            "  name      = \"vsi\"\n  user_data = <<USER_DATA\n#cloud-config\n  packages: []\nUSER_DATA\n"
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a \"b\"\\"), "\"a \\\"b\\\"\\\\\"");
        assert_eq!(quote("${var.prefix}-x"), "\"${var.prefix}-x\"");
    }

    #[test]
    fn test_literal_strings_are_not_interpolated() {
        let body = Body::new()
            .str("description", "cost ${var.price} at %{ if x }")
            .template("name", "${var.prefix}-x");
        let mut out = String::new();
        body.render(1, &mut out);
        assert_eq!(
            out,
            "  description = \"cost $${var.price} at %%{ if x }\"\n  name        = \"${var.prefix}-x\"\n"
        );
        assert_eq!(
            Expr::strings(["${a}"]).render(0),
            "[\"$${a}\"]"
        );
    }

    #[test]
    fn test_heredoc_marker_avoids_content() {
        let body = Body::new().heredoc("user_data", "EOF", "echo start\n  EOF\nEOF_\necho done");
        let mut out = String::new();
        body.render(0, &mut out);
        assert_eq!(
            out,
            "user_data = <<EOF__\necho start\n  EOF\nEOF_\necho done\nEOF__\n"
        );
    }

    #[test]
    fn test_section_banner() {
        let section = Section::new(
            "Resource Groups",
            vec![Block::data("ibm_resource_group", "rg", Body::new().str("name", "rg"))],
        );
        let banner = "#".repeat(78);
        assert_eq!(
            section.render(),
            format!(
                "{b}\n# Resource Groups\n{b}\n\ndata \"ibm_resource_group\" \"rg\" {{\n  name = \"rg\"\n}}\n\n{b}\n",
                b = banner
            )
        );
        assert!(render_file(&[Section::new("Empty", vec![])]).is_none());
    }

    #[test]
    fn test_comments_and_raw_lines() {
        let body = Body::new()
            .comment("managed by craig")
            .raw_line("count = 0")
            .str("name", "x");
        let mut out = String::new();
        body.render(0, &mut out);
        assert_eq!(out, "# managed by craig\ncount = 0\nname = \"x\"\n");
    }

    #[test]
    fn test_block_address() {
        let block = Block::data("ibm_is_image", "ubuntu", Body::new());
        assert_eq!(block.address(), "data.ibm_is_image.ubuntu");
        assert_eq!(Block::module("edge_vpc", Body::new()).address(), "module.edge_vpc");
    }
}
