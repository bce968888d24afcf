//! # craig_spec
//!
//! Configuration document model, validation and normalization for craig.
//!
//! A configuration document describes a cloud network topology: resource
//! groups, key management, object storage, VPCs with their subnets and ACLs,
//! security groups, clusters, virtual servers and a dozen optional service
//! families. This crate turns the raw document into a [`NormalizedDocument`]
//! that code generation can consume without further checks.
//!
//! ## Normalization
//!
//! - **Defaulting**: optional families become `[]`, singleton sections such as
//!   `scc` and `iam_account_settings` get their canonical shape
//! - **Required fields**: missing and `null` fields are reported separately
//! - **Backfill**: every record gains the optional fields it omitted
//! - **Rules**: ACL and security group rules always carry `tcp`, `udp` and
//!   `icmp` with integer ports
//! - **References**: every field naming another record must resolve
//!
//! ## Example
//!
//! ```rust,no_run
//! use craig_spec::{normalize, DocumentReader};
//!
//! let document = DocumentReader::read("craig.json").unwrap();
//! let normalized = normalize(document).unwrap();
//! println!("{}", normalized.options().prefix);
//! ```

pub mod defaults;
pub mod document;
pub mod error;
pub mod family;
pub mod reader;
pub mod references;
pub mod required;
pub mod rules;
pub mod validator;

pub use document::{ConfigDocument, NormalizedDocument, Options, Record};
pub use error::{SpecError, SpecResult};
pub use family::{Family, Section};
pub use reader::DocumentReader;
pub use validator::{normalize, DocumentValidator};
