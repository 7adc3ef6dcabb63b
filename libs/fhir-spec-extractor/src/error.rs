//! Error types for spec extraction
//!
//! Every variant carries enough context (element id, type code or type name) to locate the
//! offending entry in the specification bundles.

use fhirspec_models::StructureDefinitionKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Input scope
    #[error("Provided resource set was not a subset of supported resources: {0:?}")]
    UnsupportedResources(Vec<String>),

    #[error("Type definitions not found in the specification bundle: {0:?}")]
    MissingDefinitions(Vec<String>),

    #[error("Requested names contain duplicates after case normalization: {0:?}")]
    DuplicateRequestedNames(Vec<String>),

    // Schema shape
    #[error("Invalid StructureDefinition {name}: {message}")]
    InvalidStructureDefinition { name: String, message: String },

    #[error("Unsupported fhirVersion {found:?} for {name}, expected {expected}")]
    UnsupportedFhirVersion {
        name: String,
        expected: &'static str,
        found: Option<String>,
    },

    #[error("Unexpected kind {found} for {name}, expected {expected}")]
    UnexpectedKind {
        name: String,
        expected: StructureDefinitionKind,
        found: StructureDefinitionKind,
    },

    #[error("Unexpected kind {found} for data type {name}")]
    UnexpectedDataTypeKind {
        name: String,
        found: StructureDefinitionKind,
    },

    #[error("StructureDefinition type {declared} does not match its url name {name}")]
    NameMismatch { name: String, declared: String },

    #[error("StructureDefinition {0} has no snapshot")]
    MissingSnapshot(String),

    #[error("Type definition already exists: {0}")]
    DuplicateDefinition(String),

    #[error("Expected id and path field to be the same: id {id:?}, path {path}")]
    IdPathMismatch { id: Option<String>, path: String },

    #[error("Field name already exists: {field} in {type_name}")]
    DuplicateField { type_name: String, field: String },

    // Cardinality
    #[error("Unexpected min cardinality value {found:?} for {element}")]
    InvalidMinCardinality { element: String, found: Option<i64> },

    #[error("Unexpected max cardinality value {found:?} for {element}")]
    InvalidMaxCardinality {
        element: String,
        found: Option<String>,
    },

    #[error("Unexpected cardinality for type choice field {0}. Did not expect array.")]
    ChoiceFieldArray(String),

    // Type resolution
    #[error("Expected exactly one type for {element}, found {count}")]
    ExpectedSingleType { element: String, count: usize },

    #[error("Type choice field {0} declares no types")]
    EmptyChoiceField(String),

    #[error("Unexpected type extension on {element}: {message}")]
    InvalidTypeExtension { element: String, message: String },

    #[error("Unexpected characters found in type code {code:?} of {element}")]
    InvalidTypeCode { element: String, code: String },

    #[error("Type {key} not found in the type enumeration")]
    UnknownTypeKey { key: String },

    #[error("Unexpected profile {profile:?} for type {code} of {element}")]
    UnexpectedProfile {
        element: String,
        code: String,
        profile: Vec<String>,
    },

    // Closure
    #[error("Type {0} was missing from the list of structure definitions")]
    MissingTypeDefinition(String),

    // Configuration
    #[error("Invalid extractor configuration: {0}")]
    InvalidConfig(String),

    // Output
    #[error("Unsupported output format for {0}, expected a .json, .txt or .textproto file")]
    UnsupportedOutputFormat(String),

    #[error("Model error: {0}")]
    Model(#[from] fhirspec_models::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
