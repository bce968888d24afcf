//! Resource groups.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{escape_template, render_file, Block, Body, Section};
use crate::naming::kebab_name;
use crate::refs::resource_group_token;

/// One resource group: a data lookup or a managed resource.
pub fn format_resource_group(group: Record<'_>) -> Block {
    let name = group.name_or_empty();
    let token = resource_group_token(name);

    if group.bool("use_data") {
        return Block::data("ibm_resource_group", &token, Body::new().str("name", name));
    }

    let display = if group.bool("use_prefix") {
        kebab_name(&[name])
    } else {
        escape_template(name)
    };
    Block::resource(
        "ibm_resource_group",
        &token,
        Body::new().template("name", display).tags(),
    )
}

pub fn resource_groups_tf(doc: &NormalizedDocument) -> Option<String> {
    let blocks = doc
        .records(Family::ResourceGroups)
        .into_iter()
        .map(format_resource_group)
        .collect();
    render_file(&[Section::new("Resource Groups", blocks)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefix_and_data() {
        let managed = json!({"name": "slz-management-rg", "use_prefix": true, "use_data": false});
        let bare = json!({"name": "Default", "use_prefix": false, "use_data": false});
        let data = json!({"name": "existing-rg", "use_prefix": true, "use_data": true});

        assert_eq!(
            format_resource_group(Record::from_value(&managed).unwrap()).render(),
            "resource \"ibm_resource_group\" \"slz_management_rg\" {\n  name = \"${var.prefix}-slz-management-rg\"\n  tags = var.tags\n}\n"
        );
        assert!(format_resource_group(Record::from_value(&bare).unwrap())
            .render()
            .contains("name = \"Default\""));
        assert_eq!(
            format_resource_group(Record::from_value(&data).unwrap()).render(),
            "data \"ibm_resource_group\" \"existing_rg\" {\n  name = \"existing-rg\"\n}\n"
        );
    }

    #[test]
    fn test_empty_family_is_absent() {
        let doc = NormalizedDocument::from_value_unchecked(json!({"resource_groups": []})).unwrap();
        assert!(resource_groups_tf(&doc).is_none());
    }
}
