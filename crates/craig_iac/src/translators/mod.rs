//! Per-family translators.
//!
//! Each translator turns records of one family (or a few related families)
//! into blocks. The `*_tf` function of a translator renders its whole file and
//! returns `None` when there is nothing to emit.

pub mod appid;
pub mod atracker;
pub mod cbr;
pub mod clusters;
pub mod dns;
pub mod event_streams;
pub mod f5;
pub mod flow_logs;
pub mod iam;
pub mod icd;
pub mod key_management;
pub mod load_balancers;
pub mod object_storage;
pub mod observability;
pub mod resource_groups;
pub mod root;
pub mod scc;
pub mod secrets_manager;
pub mod ssh_keys;
pub mod terraform;
pub mod transit_gateways;
pub mod vpc;
pub mod vpe;
pub mod vpn_gateways;
pub mod vpn_servers;
pub mod vsi;
