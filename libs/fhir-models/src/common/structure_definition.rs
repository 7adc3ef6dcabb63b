//! FHIR StructureDefinition model
//!
//! Only the parts the extractor relies on are modelled explicitly; everything else is kept
//! in `extensions`.

use super::element_definition::{Differential, Snapshot};
use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR StructureDefinition resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    /// Resource type - always "StructureDefinition"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Name (computer friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// FHIR Version this StructureDefinition targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,

    /// primitive-type | complex-type | resource | logical
    pub kind: StructureDefinitionKind,

    /// Whether the structure is abstract
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,

    /// Type defined or constrained by this structure
    #[serde(rename = "type")]
    pub type_: String,

    /// Definition that this type is constrained/specialized from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,

    /// specialization | constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<TypeDerivationRule>,

    /// Snapshot view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,

    /// Differential view of the structure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential: Option<Differential>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "StructureDefinition".to_string()
}

/// Kind of structure a StructureDefinition defines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureDefinitionKind {
    PrimitiveType,
    ComplexType,
    Resource,
    Logical,
}

impl StructureDefinitionKind {
    /// The code as it appears in JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimitiveType => "primitive-type",
            Self::ComplexType => "complex-type",
            Self::Resource => "resource",
            Self::Logical => "logical",
        }
    }
}

impl std::fmt::Display for StructureDefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a type relates to its base definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDerivationRule {
    Specialization,
    Constraint,
}

impl StructureDefinition {
    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        let sd: Self = serde_json::from_value(value.clone())?;
        if sd.resource_type != "StructureDefinition" {
            return Err(Error::InvalidResource(format!(
                "expected resourceType StructureDefinition, found {}",
                sd.resource_type
            )));
        }
        Ok(sd)
    }

    /// Snapshot elements, or an empty slice when no snapshot is present
    pub fn snapshot_elements(&self) -> &[super::ElementDefinition] {
        self.snapshot
            .as_ref()
            .map(|s| s.element.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_resource_definition() {
        let sd = StructureDefinition::from_value(&json!({
            "resourceType": "StructureDefinition",
            "id": "Immunization",
            "fhirVersion": "4.0.1",
            "kind": "resource",
            "abstract": false,
            "type": "Immunization",
            "baseDefinition": "http://hl7.org/fhir/StructureDefinition/DomainResource",
            "derivation": "specialization",
            "snapshot": {
                "element": [
                    { "id": "Immunization", "path": "Immunization", "min": 0, "max": "*" }
                ]
            }
        }))
        .unwrap();

        assert_eq!(sd.kind, StructureDefinitionKind::Resource);
        assert_eq!(sd.fhir_version.as_deref(), Some("4.0.1"));
        assert_eq!(sd.is_abstract, Some(false));
        assert_eq!(sd.derivation, Some(TypeDerivationRule::Specialization));
        assert_eq!(sd.snapshot_elements().len(), 1);
        assert!(sd.differential.is_none());
    }

    #[test]
    fn test_kind_codes() {
        let kind: StructureDefinitionKind = serde_json::from_value(json!("primitive-type")).unwrap();
        assert_eq!(kind, StructureDefinitionKind::PrimitiveType);
        assert_eq!(StructureDefinitionKind::ComplexType.to_string(), "complex-type");
        assert!(serde_json::from_value::<StructureDefinitionKind>(json!("datatype")).is_err());
    }

    #[test]
    fn test_rejects_other_resource_types() {
        let err = StructureDefinition::from_value(&json!({
            "resourceType": "ValueSet",
            "kind": "resource",
            "type": "ValueSet"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidResource(_)));
    }
}
