//! FHIR conformance models
//!
//! This crate provides strongly-typed Rust structures for the parts of the FHIR
//! specification bundles (`profiles-resources.json`, `profiles-types.json`) that the
//! spec extractor reads.
//!
//! # Module Organization
//!
//! - `common`: Bundle, StructureDefinition and ElementDefinition models
//!
//! # Design Philosophy
//!
//! - **Parse once**: raw JSON is turned into typed values at the boundary
//! - **Lazy entries**: bundle entries keep their resource as `serde_json::Value`, so only
//!   the StructureDefinitions that are actually requested need to conform
//! - **Extensible**: `extensions` fields capture everything the extractor does not model
//!
//! # Example
//!
//! ```rust
//! use fhirspec_models::common::{StructureDefinition, StructureDefinitionKind};
//! use serde_json::json;
//!
//! let sd_json = json!({
//!     "resourceType": "StructureDefinition",
//!     "id": "Patient",
//!     "url": "http://hl7.org/fhir/StructureDefinition/Patient",
//!     "fhirVersion": "4.0.1",
//!     "kind": "resource",
//!     "type": "Patient"
//! });
//!
//! let sd: StructureDefinition = serde_json::from_value(sd_json).unwrap();
//! assert_eq!(sd.type_, "Patient");
//! assert_eq!(sd.kind, StructureDefinitionKind::Resource);
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
