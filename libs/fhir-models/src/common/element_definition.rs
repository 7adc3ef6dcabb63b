//! FHIR ElementDefinition model
//!
//! Model for ElementDefinition as used in StructureDefinition snapshots and differentials.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR ElementDefinition - defines an element in a resource or data type structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    /// Unique id for inter-element referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Path of the element in the hierarchy (e.g., "Patient.name")
    pub path: String,

    /// Name for this particular element (in a slice)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_name: Option<String>,

    /// Short label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    /// Minimum cardinality, kept signed so out-of-range values reach validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    /// Maximum cardinality (can be "*")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Base definition information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<ElementDefinitionBase>,

    /// Reference to definition of content if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    /// Data type and profile for this element
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ElementDefinitionType>>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Base definition information for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDefinitionBase {
    /// Path that identifies the base element
    pub path: String,

    /// Min cardinality of the base element
    pub min: i64,

    /// Max cardinality of the base element
    pub max: String,
}

/// Data type for an element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionType {
    /// Data type code
    pub code: String,

    /// Profile (StructureDefinition canonical URLs) that apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<String>>,

    /// Profile (StructureDefinition) for Reference/canonical target types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<Vec<String>>,

    /// Extensions on the type, e.g. `structuredefinition-fhir-type`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

/// A FHIR extension as it appears on element types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Identifies the meaning of the extension
    pub url: String,

    /// Value of the extension when it is a url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_url: Option<String>,

    /// Other value[x] variants
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Snapshot - a set of elements that define the structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub element: Vec<ElementDefinition>,
}

/// Differential - a set of elements that define changes from the base
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Differential {
    pub element: Vec<ElementDefinition>,
}

impl ElementDefinition {
    /// Create an element with the given path, using it as id as well
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: Some(path.clone()),
            path,
            slice_name: None,
            short: None,
            min: None,
            max: None,
            base: None,
            content_reference: None,
            types: None,
            extensions: HashMap::new(),
        }
    }

    /// Set the cardinality
    pub fn with_cardinality(mut self, min: u32, max: impl Into<String>) -> Self {
        self.min = Some(i64::from(min));
        self.max = Some(max.into());
        self
    }

    /// Append a type with the given code
    pub fn with_type(mut self, code: impl Into<String>) -> Self {
        self.types
            .get_or_insert_with(Vec::new)
            .push(ElementDefinitionType::new(code));
        self
    }

    /// The element id, falling back to the path when no id is present
    pub fn id_or_path(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.path)
    }

    /// Declared types, or an empty slice
    pub fn type_list(&self) -> &[ElementDefinitionType] {
        self.types.as_deref().unwrap_or(&[])
    }
}

impl ElementDefinitionType {
    /// Create a type with only a code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            profile: None,
            target_profile: None,
            extension: None,
        }
    }

    /// Extensions on this type, or an empty slice
    pub fn extensions(&self) -> &[Extension] {
        self.extension.as_deref().unwrap_or(&[])
    }
}

impl Extension {
    /// Create an extension carrying a `valueUrl`
    pub fn with_value_url(url: impl Into<String>, value_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            value_url: Some(value_url.into()),
            extensions: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_sentinel_type() {
        let elem: ElementDefinition = serde_json::from_value(json!({
            "id": "Immunization.id",
            "path": "Immunization.id",
            "min": 0,
            "max": "1",
            "base": { "path": "Resource.id", "min": 0, "max": "1" },
            "type": [{
                "extension": [{
                    "url": "http://hl7.org/fhir/StructureDefinition/structuredefinition-fhir-type",
                    "valueUrl": "string"
                }],
                "code": "http://hl7.org/fhirpath/System.String"
            }]
        }))
        .unwrap();

        assert_eq!(elem.base.as_ref().unwrap().path, "Resource.id");
        let fhir_type = &elem.type_list()[0];
        assert_eq!(fhir_type.code, "http://hl7.org/fhirpath/System.String");
        assert_eq!(fhir_type.extensions()[0].value_url.as_deref(), Some("string"));
    }

    #[test]
    fn test_unmodelled_fields_are_kept() {
        let elem: ElementDefinition = serde_json::from_value(json!({
            "id": "Patient.active",
            "path": "Patient.active",
            "isModifier": true,
            "type": [{ "code": "boolean" }]
        }))
        .unwrap();

        assert_eq!(elem.extensions.get("isModifier"), Some(&json!(true)));
        assert_eq!(elem.type_list()[0].code, "boolean");
        assert_eq!(elem.id_or_path(), "Patient.active");
    }
}
