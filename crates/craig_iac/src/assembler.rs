//! File and module assembly.
//!
//! Runs every translator over a normalized document and collects the rendered
//! text into a [`FileMap`]. Optional files whose backing data is empty or
//! disabled are kept as [`GeneratedFile::Absent`] so callers can tell "not
//! generated" from "forgotten".

use craig_spec::{Family, NormalizedDocument};
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::files::{FileMap, GeneratedFile};
use crate::refs::vpc_module_name;
use crate::translators::{
    appid, atracker, cbr, clusters, dns, event_streams, f5, flow_logs, iam, icd, key_management,
    load_balancers, object_storage, observability, resource_groups, root, scc, secrets_manager,
    ssh_keys, terraform, transit_gateways, vpc, vpe, vpn_gateways, vpn_servers, vsi,
};

/// Audit copy of the normalized document.
pub const AUDIT_FILE: &str = "craig.json";

type FileTranslator = fn(&NormalizedDocument) -> Option<String>;

/// Top-level files backed by one translator each, in output order.
const FAMILY_FILES: &[(&str, FileTranslator)] = &[
    ("resource_groups.tf", resource_groups::resource_groups_tf),
    ("key_management.tf", key_management::key_management_tf),
    ("object_storage.tf", object_storage::object_storage_tf),
    ("flow_logs.tf", flow_logs::flow_logs_tf),
    ("virtual_private_endpoints.tf", vpe::vpe_tf),
    ("ssh_keys.tf", ssh_keys::ssh_keys_tf),
    ("transit_gateways.tf", transit_gateways::transit_gateways_tf),
    ("vpn_gateways.tf", vpn_gateways::vpn_gateways_tf),
    ("clusters.tf", clusters::clusters_tf),
    ("virtual_servers.tf", vsi::virtual_servers_tf),
    ("atracker.tf", atracker::atracker_tf),
    ("appid.tf", appid::appid_tf),
    ("secrets_manager.tf", secrets_manager::secrets_manager_tf),
    ("event_streams.tf", event_streams::event_streams_tf),
    ("load_balancers.tf", load_balancers::load_balancers_tf),
    ("iam.tf", iam::iam_tf),
    ("scc.tf", scc::scc_tf),
    ("cbr.tf", cbr::cbr_tf),
    ("vpn_servers.tf", vpn_servers::vpn_servers_tf),
    ("dns.tf", dns::dns_tf),
    ("observability.tf", observability::observability_tf),
    ("cloud_databases.tf", icd::cloud_databases_tf),
    ("f5_big_ip.tf", f5::f5_big_ip_tf),
];

/// Generate every file with the default configuration.
pub fn generate(doc: &NormalizedDocument) -> FileMap {
    generate_with_config(doc, &GeneratorConfig::default())
}

/// Generate every file for a normalized document.
pub fn generate_with_config(doc: &NormalizedDocument, config: &GeneratorConfig) -> FileMap {
    info!("Generating Terraform for prefix `{}`", doc.options().prefix);
    let mut files = FileMap::new();

    files.insert(
        "main.tf",
        GeneratedFile::from_option(root::main_tf(doc, config)),
    );
    files.insert(
        "variables.tf",
        GeneratedFile::Text(root::root_variables_tf(doc)),
    );
    files.insert(
        "versions.tf",
        GeneratedFile::Text(terraform::versions_tf(config)),
    );
    files.insert("outputs.tf", GeneratedFile::from_option(root::outputs_tf(doc)));
    files.insert(AUDIT_FILE, GeneratedFile::Text(doc.to_sorted_json()));

    for (name, translate) in FAMILY_FILES {
        let file = GeneratedFile::from_option(translate(doc));
        debug!(
            "{}: {}",
            name,
            if file.is_absent() { "absent" } else { "generated" }
        );
        files.insert(*name, file);
    }

    for record in doc.records(Family::Vpcs) {
        let module = vpc_module_name(record.name_or_empty());
        debug!("Generating sub-module {}", module);
        files.insert(
            module,
            GeneratedFile::Module(vpc::vpc_module(record, doc, config)),
        );
    }

    info!(
        "Generated {} files ({} absent)",
        files.present_count(),
        files.len() - files.present_count()
    );
    files
}
