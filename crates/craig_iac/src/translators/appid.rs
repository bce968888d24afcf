//! App ID instances and their keys.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::{address_token, kebab_name, title_case};
use crate::refs::{rg_id_ref, tf_ref};

fn appid_token(name: &str) -> String {
    address_token(&[name, "appid"])
}

pub fn format_appid(appid: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = appid.name_or_empty();
    if appid.bool("use_data") {
        return Block::data(
            "ibm_resource_instance",
            &appid_token(name),
            Body::new().str("name", name).str("service", "appid"),
        );
    }
    Block::resource(
        "ibm_resource_instance",
        &appid_token(name),
        Body::new()
            .template("name", kebab_name(&[name]))
            .str("service", "appid")
            .str("plan", "graduated-tier")
            .raw("location", "var.region")
            .raw("resource_group_id", rg_id_ref(doc, appid.str("resource_group")))
            .tags(),
    )
}

pub fn format_appid_key(appid: Record<'_>, key: Record<'_>) -> Block {
    let name = appid.name_or_empty();
    let key_name = key.name_or_empty();
    Block::resource(
        "ibm_resource_key",
        &address_token(&[name, "key", key_name]),
        Body::new()
            .template("name", kebab_name(&[name, "key", key_name]))
            .raw(
                "resource_instance_id",
                tf_ref(
                    "ibm_resource_instance",
                    &appid_token(name),
                    "id",
                    appid.bool("use_data"),
                ),
            )
            .str("role", "Writer")
            .tags(),
    )
}

pub fn appid_tf(doc: &NormalizedDocument) -> Option<String> {
    let sections: Vec<Section> = doc
        .records(Family::Appid)
        .into_iter()
        .map(|appid| {
            let mut blocks = vec![format_appid(appid, doc)];
            blocks.extend(
                appid
                    .children("keys")
                    .into_iter()
                    .map(|key| format_appid_key(appid, key)),
            );
            Section::new(format!("{} App ID", title_case(appid.name_or_empty())), blocks)
        })
        .collect();
    render_file(&sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_instance_and_keys() {
        let doc = NormalizedDocument::from_value_unchecked(json!({
            "resource_groups": [{"name": "slz-service-rg"}],
            "appid": [
                {"name": "default", "resource_group": "slz-service-rg", "use_data": false, "keys": [{"name": "test"}]},
                {"name": "existing", "resource_group": null, "use_data": true, "keys": [{"name": "reader"}]}
            ]
        }))
        .unwrap();

        let text = appid_tf(&doc).unwrap();
        assert!(text.contains("resource \"ibm_resource_instance\" \"default_appid\""));
        assert!(text.contains("resource \"ibm_resource_key\" \"default_key_test\""));
        assert!(text.contains("resource_instance_id = ibm_resource_instance.default_appid.id"));
        assert!(text.contains("data \"ibm_resource_instance\" \"existing_appid\" {\n  name    = \"existing\"\n  service = \"appid\"\n}\n"));
        assert!(text.contains("resource_instance_id = data.ibm_resource_instance.existing_appid.id"));
    }

    #[test]
    fn test_empty_is_absent() {
        let doc = NormalizedDocument::from_value_unchecked(json!({"appid": []})).unwrap();
        assert!(appid_tf(&doc).is_none());
    }
}
