//! # craig_iac
//!
//! Terraform generation for normalized craig documents.
//!
//! Generation is a pure function of the document: the same input always
//! renders byte-identical text. References to records that cannot be found
//! are rendered as sentinel strings (`ERROR: Unfound ref`,
//! `Error: <Kind> not found`) instead of failing, so the output shows exactly
//! which reference is broken.
//!
//! ## Layers
//!
//! - [`hcl`]: block model and printer
//! - [`naming`] and [`refs`]: resource names, address tokens and references
//! - [`translators`]: one module per family
//! - [`assembler`]: collects every file into a [`FileMap`]
//! - [`writer`]: writes a [`FileMap`] to disk
//!
//! ## Example
//!
//! ```rust,no_run
//! use craig_iac::{generate, ProjectWriter};
//! use craig_spec::{normalize, DocumentReader};
//!
//! let document = DocumentReader::read("craig.json").unwrap();
//! let normalized = normalize(document).unwrap();
//! let files = generate(&normalized);
//! ProjectWriter::new("./terraform").write(&files).unwrap();
//! ```

pub mod assembler;
pub mod config;
pub mod error;
pub mod files;
pub mod hcl;
pub mod naming;
pub mod refs;
pub mod translators;
pub mod writer;

pub use assembler::{generate, generate_with_config, AUDIT_FILE};
pub use config::GeneratorConfig;
pub use error::{IacError, IacResult};
pub use files::{FileMap, GeneratedFile};
pub use refs::{not_found, UNFOUND_REF};
pub use writer::ProjectWriter;
