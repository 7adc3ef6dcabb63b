//! Intermediate Representation (IR)
//!
//! The closed configuration produced by the extractor: per-resource field configs and the
//! set of data types they transitively reference. Everything here is plain data with
//! deterministic ordering, so equal inputs produce equal (and equally serialized) values.

pub mod enumeration;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use enumeration::{TypeEnumeration, TypeIdentifier};

/// Whether a type is a primitive leaf or has its own fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Primitive,
    Complex,
}

/// One allowed field of a resource or complex type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub is_array: bool,
    pub type_id: TypeIdentifier,
    pub kind: TypeKind,
}

/// A type choice field such as `occurrence[x]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiTypeFieldConfig {
    /// Field name as declared, including `[x]`
    pub name: String,
    /// Expanded field names in declaration order, e.g. `occurrenceDateTime`
    pub typed_field_names: Vec<String>,
    pub is_required: bool,
}

/// Field configuration of a resource or complex type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexTypeConfig {
    pub allowed_field_names_to_config: BTreeMap<String, FieldConfig>,
    /// Sorted; never contains choice field names
    pub required_fields: Vec<String>,
    pub multi_type_fields: Vec<MultiTypeFieldConfig>,
}

impl ComplexTypeConfig {
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.allowed_field_names_to_config.get(name)
    }

    /// Every type referenced by a field of this config
    pub fn referenced_types(&self) -> BTreeSet<TypeIdentifier> {
        self.allowed_field_names_to_config
            .values()
            .map(|f| f.type_id.clone())
            .collect()
    }
}

/// One entry of the closed data type catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FhirDataType {
    pub fhir_type: TypeIdentifier,
    pub kind: TypeKind,
    /// Present for complex types other than the placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complex_type_config: Option<ComplexTypeConfig>,
}

/// Result of an extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Keyed by the resource type's integer id
    pub resource_type_to_config: BTreeMap<i32, ComplexTypeConfig>,
    /// Sorted by type identifier
    pub fhir_data_type_configs: Vec<FhirDataType>,
}

impl ResourceSpec {
    pub fn resource_config(&self, resource_type: i32) -> Option<&ComplexTypeConfig> {
        self.resource_type_to_config.get(&resource_type)
    }

    pub fn data_type(&self, fhir_type: &TypeIdentifier) -> Option<&FhirDataType> {
        self.fhir_data_type_configs
            .binary_search_by(|d| d.fhir_type.cmp(fhir_type))
            .ok()
            .map(|index| &self.fhir_data_type_configs[index])
    }

    /// Types referenced by any resource or data type config
    pub fn referenced_types(&self) -> BTreeSet<TypeIdentifier> {
        self.resource_type_to_config
            .values()
            .chain(
                self.fhir_data_type_configs
                    .iter()
                    .filter_map(|d| d.complex_type_config.as_ref()),
            )
            .flat_map(|config| config.referenced_types())
            .collect()
    }
}
