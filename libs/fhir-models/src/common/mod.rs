//! FHIR conformance models shared by the resource and type bundles

pub mod bundle;
pub mod element_definition;
pub mod error;
pub mod structure_definition;

// Re-export commonly used types
pub use bundle::*;
pub use element_definition::*;
pub use error::{Error, Result};
pub use structure_definition::*;
