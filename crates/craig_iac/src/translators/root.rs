//! Root module: provider, module calls, variables and outputs.

use craig_spec::{Family, NormalizedDocument};

use crate::config::GeneratorConfig;
use crate::hcl::{render_blocks, render_file, Block, Expr, Section};
use crate::refs::vpc_module_name;
use crate::translators::clusters::secret_variables_for;
use crate::translators::f5::f5_variables;
use crate::translators::scc::scc_variables;
use crate::translators::terraform::{output_block, provider_block, variables_tf, Variable};
use crate::translators::vpc::module_call;
use crate::translators::vpn_gateways::vpn_variables;

pub fn main_tf(doc: &NormalizedDocument, config: &GeneratorConfig) -> Option<String> {
    let modules: Vec<Block> = doc
        .records(Family::Vpcs)
        .into_iter()
        .map(|vpc| module_call(vpc, doc))
        .collect();
    render_file(&[
        Section::new("IBM Cloud Provider", vec![provider_block(config)]),
        Section::new("VPC Modules", modules),
    ])
}

/// Root variables; defaults come from the document options.
pub fn root_variables(doc: &NormalizedDocument) -> Vec<Variable> {
    let options = doc.options();
    let mut variables = vec![
        Variable::string("ibmcloud_api_key", "The IBM Cloud platform API key").sensitive(),
        Variable::string("prefix", "A unique identifier for resources")
            .with_default(Expr::str(options.prefix)),
        Variable::string("region", "IBM Cloud region where resources will be provisioned")
            .with_default(Expr::str(options.region)),
        Variable::new("tags", "List of tags", "list(string)")
            .with_default(Expr::strings(options.tags)),
    ];
    variables.extend(vpn_variables(doc));
    variables.extend(secret_variables_for(doc));
    variables.extend(scc_variables(doc));
    variables.extend(f5_variables(doc));
    variables
}

pub fn root_variables_tf(doc: &NormalizedDocument) -> String {
    variables_tf(&root_variables(doc))
}

/// VPC id and crn for every VPC; `None` without VPCs.
pub fn outputs_tf(doc: &NormalizedDocument) -> Option<String> {
    let mut blocks = Vec::new();
    for vpc in doc.records(Family::Vpcs) {
        let name = vpc.name_or_empty();
        let module = vpc_module_name(name);
        blocks.push(output_block(
            &format!("{}_id", module),
            &format!("ID of the {} VPC", name),
            format!("module.{}.id", module),
        ));
        blocks.push(output_block(
            &format!("{}_crn", module),
            &format!("CRN of the {} VPC", name),
            format!("module.{}.crn", module),
        ));
    }
    if blocks.is_empty() {
        None
    } else {
        Some(render_blocks(&blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "_options": {"prefix": "slz", "region": "us-south", "tags": ["slz", "landing-zone"]},
            "resource_groups": [{"name": "slz-management-rg"}],
            "vpcs": [{"name": "management", "resource_group": "slz-management-rg", "subnets": []}],
            "vpn_gateways": [{
                "name": "management-gateway",
                "vpc": "management",
                "connections": [{"name": "connection-1"}]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_main_has_provider_and_module() {
        let text = main_tf(&fixture(), &GeneratorConfig::default()).unwrap();
        assert!(text.contains("provider \"ibm\" {\n"));
        assert!(text.contains("module \"management_vpc\" {\n"));
        assert!(text.contains("  source               = \"./management_vpc\"\n"));
    }

    #[test]
    fn test_variables_from_options() {
        let text = root_variables_tf(&fixture());
        assert!(text.contains("  default     = \"slz\"\n"));
        assert!(text.contains("  default     = \"us-south\"\n"));
        assert!(text.contains("  default     = [\"slz\", \"landing-zone\"]\n"));
        assert!(text.contains("variable \"management_gateway_connection_1_preshared_key\""));
    }

    #[test]
    fn test_outputs() {
        let text = outputs_tf(&fixture()).unwrap();
        assert!(text.contains("output \"management_vpc_id\" {\n"));
        assert!(text.contains("  value       = module.management_vpc.crn\n"));

        let empty = NormalizedDocument::from_value_unchecked(json!({"vpcs": []})).unwrap();
        assert!(outputs_tf(&empty).is_none());
    }
}
