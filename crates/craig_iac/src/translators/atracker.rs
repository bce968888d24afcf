//! Activity tracker target and route.

use craig_spec::{NormalizedDocument, Record, Section as DocSection};

use crate::hcl::{render_file, Block, Body, Section};
use crate::naming::kebab_name;
use crate::refs::{bucket_ref, cos_key_ref, cos_ref};

const TARGET: &str = "atracker_target";

/// Object storage instance owning the named bucket.
fn bucket_owner<'a>(doc: &'a NormalizedDocument, bucket: Option<&str>) -> Option<&'a str> {
    doc.bucket_owners(bucket?)
        .first()
        .and_then(|cos| cos.name())
}

pub fn format_target(atracker: Record<'_>, doc: &NormalizedDocument) -> Block {
    let bucket = atracker.str("bucket");
    let cos = bucket_owner(doc, bucket);

    Block::resource(
        "ibm_atracker_target",
        TARGET,
        Body::new()
            .template(
                "name",
                kebab_name(&[atracker.str("target_name").unwrap_or("atracker-target")]),
            )
            .str("target_type", "cloud_object_storage")
            .block(
                "cos_endpoint",
                Body::new()
                    .template(
                        "endpoint",
                        "s3.private.${var.region}.cloud-object-storage.appdomain.cloud",
                    )
                    .raw("target_crn", cos_ref(doc, cos, "crn"))
                    .raw("bucket", bucket_ref(doc, cos, bucket, "bucket_name"))
                    .raw(
                        "api_key",
                        cos_key_ref(doc, cos, atracker.str("cos_key"), "credentials.apikey"),
                    ),
            ),
    )
}

pub fn format_route(atracker: Record<'_>) -> Block {
    let name = atracker.str("name").unwrap_or("atracker");
    Block::resource(
        "ibm_atracker_route",
        "atracker_route",
        Body::new()
            .template("name", kebab_name(&[name, "route"]))
            .block(
                "rules",
                Body::new()
                    .raws("target_ids", [format!("ibm_atracker_target.{}.id", TARGET)])
                    .strings("locations", atracker.strings("locations")),
            ),
    )
}

/// `None` unless the tracker is enabled.
pub fn atracker_tf(doc: &NormalizedDocument) -> Option<String> {
    let atracker = doc
        .section(DocSection::Atracker)
        .filter(|atracker| atracker.bool("enabled"))?;

    let mut blocks = vec![format_target(atracker, doc)];
    if atracker.bool("add_route") {
        blocks.push(format_route(atracker));
    }
    render_file(&[Section::new("Atracker", blocks)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture(enabled: bool) -> NormalizedDocument {
        NormalizedDocument::from_value_unchecked(json!({
            "object_storage": [{
                "name": "atracker-cos",
                "buckets": [{"name": "atracker-bucket"}],
                "keys": [{"name": "cos-bind-key"}]
            }],
            "atracker": {
                "enabled": enabled,
                "type": "cos",
                "name": "slz-atracker",
                "target_name": "a-tracker",
                "bucket": "atracker-bucket",
                "cos_key": "cos-bind-key",
                "add_route": true,
                "locations": ["global", "us-south"]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_target_and_route() {
        let text = atracker_tf(&fixture(true)).unwrap();
        assert!(text.contains("    target_crn = ibm_resource_instance.atracker_cos_object_storage.crn\n"));
        assert!(text.contains(
            "    bucket     = ibm_cos_bucket.atracker_cos_object_storage_atracker_bucket_bucket.bucket_name\n"
        ));
        assert!(text.contains(
            "    api_key    = ibm_resource_key.atracker_cos_object_storage_key_cos_bind_key.credentials.apikey\n"
        ));
        assert!(text.contains("    target_ids = [ibm_atracker_target.atracker_target.id]\n"));
        assert!(text.contains("    locations  = [\"global\", \"us-south\"]\n"));
    }

    #[test]
    fn test_disabled_is_absent() {
        assert!(atracker_tf(&fixture(false)).is_none());
    }
}
