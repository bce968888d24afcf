//! Provider, version and variable blocks.

use crate::config::GeneratorConfig;
use crate::hcl::{render_blocks, Block, Body, Expr};

/// `terraform { required_providers ... }` block.
pub fn versions_block(config: &GeneratorConfig) -> Block {
    Block::terraform(
        Body::new()
            .block(
                "required_providers",
                Body::new().map(
                    "ibm",
                    Body::new()
                        .str("source", "IBM-Cloud/ibm")
                        .str("version", config.provider_version.as_str()),
                ),
            )
            .str("required_version", config.terraform_version.as_str()),
    )
}

pub fn versions_tf(config: &GeneratorConfig) -> String {
    render_blocks(&[versions_block(config)])
}

pub fn provider_block(config: &GeneratorConfig) -> Block {
    Block::provider(
        "ibm",
        Body::new()
            .raw("ibmcloud_api_key", "var.ibmcloud_api_key")
            .raw("region", "var.region")
            .int("ibmcloud_timeout", config.ibmcloud_timeout),
    )
}

/// Variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub description: String,
    pub type_expr: String,
    pub default: Option<Expr>,
    pub sensitive: bool,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        type_expr: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            type_expr: type_expr.into(),
            default: None,
            sensitive: false,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, "string")
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn to_block(&self) -> Block {
        let mut body = Body::new()
            .str("description", self.description.as_str())
            .raw("type", self.type_expr.as_str());
        if let Some(default) = &self.default {
            body = body.attr("default", default.clone());
        }
        if self.sensitive {
            body = body.bool("sensitive", true);
        }
        Block::variable(&self.name, body)
    }
}

pub fn variables_tf(variables: &[Variable]) -> String {
    let blocks: Vec<Block> = variables.iter().map(Variable::to_block).collect();
    render_blocks(&blocks)
}

/// `output "name" { value = ... }`
pub fn output_block(name: &str, description: &str, value: impl Into<String>) -> Block {
    Block::output(
        name,
        Body::new()
            .str("description", description)
            .raw("value", value),
    )
}
