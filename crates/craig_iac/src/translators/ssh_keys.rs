//! SSH keys.

use craig_spec::{Family, NormalizedDocument, Record};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::kebab_name;
use crate::refs::{rg_id_ref, ssh_key_token};

pub fn format_ssh_key(key: Record<'_>, doc: &NormalizedDocument) -> Block {
    let name = key.name_or_empty();
    let token = ssh_key_token(name);

    if key.bool("use_data") {
        return Block::data("ibm_is_ssh_key", &token, Body::new().str("name", name));
    }

    let body = Body::new()
        .template("name", kebab_name(&[name]))
        .str("public_key", key.str("public_key").unwrap_or_default())
        .when(!key.is_null("resource_group"), |body| {
            body.raw("resource_group", rg_id_ref(doc, key.str("resource_group")))
        })
        .tags();
    Block::resource("ibm_is_ssh_key", &token, body)
}

pub fn ssh_keys_tf(doc: &NormalizedDocument) -> Option<String> {
    let blocks = doc
        .records(Family::SshKeys)
        .into_iter()
        .map(|key| format_ssh_key(key, doc))
        .collect();
    render_file(&[Section::new("Ssh Keys", blocks)])
}
