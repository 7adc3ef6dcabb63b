//! FHIR Bundle model
//!
//! The FHIR specification ships its definitions as `collection` Bundles. Entries keep
//! their resource as raw JSON so that callers decide which ones to deserialize.

use super::error::{Error, Result};
use super::structure_definition::StructureDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR Bundle resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Resource type - always "Bundle"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Indicates the purpose of this bundle
    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    /// Entry in the bundle - will have a resource or information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<BundleEntry>>,

    /// Additional content beyond core fields (meta, signature, ...)
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Bundle".to_string()
}

/// Type of Bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    Searchset,
    /// The specification bundles are collections
    Collection,
}

/// Entry in the bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// Full URL for the entry, e.g. `http://hl7.org/fhir/StructureDefinition/Patient`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    /// A resource in this bundle, left untyped until requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl Bundle {
    /// Create an empty collection bundle
    pub fn collection() -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            id: None,
            bundle_type: BundleType::Collection,
            entry: None,
            extensions: HashMap::new(),
        }
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        let bundle: Self = serde_json::from_value(value.clone())?;
        bundle.ensure_bundle()
    }

    /// Parse from raw JSON bytes, as read from a specification file
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bundle: Self = serde_json::from_slice(bytes)?;
        bundle.ensure_bundle()
    }

    fn ensure_bundle(self) -> Result<Self> {
        if self.resource_type != "Bundle" {
            return Err(Error::InvalidResource(format!(
                "expected resourceType Bundle, found {}",
                self.resource_type
            )));
        }
        Ok(self)
    }

    /// Get the number of entries in the bundle
    pub fn entry_count(&self) -> usize {
        self.entry.as_ref().map(|e| e.len()).unwrap_or(0)
    }

    /// Get entries as a slice
    pub fn entries(&self) -> &[BundleEntry] {
        self.entry.as_deref().unwrap_or(&[])
    }

    /// Add an entry to the bundle
    pub fn add_entry(&mut self, entry: BundleEntry) {
        self.entry.get_or_insert_with(Vec::new).push(entry);
    }
}

impl BundleEntry {
    /// Build an entry from a full URL and a resource value
    pub fn new(full_url: impl Into<String>, resource: Value) -> Self {
        Self {
            full_url: Some(full_url.into()),
            resource: Some(resource),
            extensions: HashMap::new(),
        }
    }

    /// The trailing segment of `fullUrl` when it starts with `prefix`
    pub fn name_under(&self, prefix: &str) -> Option<&str> {
        self.full_url
            .as_deref()
            .and_then(|url| url.strip_prefix(prefix))
            .filter(|name| !name.is_empty() && !name.contains('/'))
    }

    /// Deserialize the entry's resource as a StructureDefinition
    pub fn structure_definition(&self) -> Result<StructureDefinition> {
        let resource = self.resource.as_ref().ok_or_else(|| {
            Error::MissingField(format!(
                "resource of entry {}",
                self.full_url.as_deref().unwrap_or("<no fullUrl>")
            ))
        })?;
        StructureDefinition::from_value(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_specification_bundle() {
        let json = json!({
            "resourceType": "Bundle",
            "id": "resources",
            "meta": { "lastUpdated": "2019-11-01T09:29:23.356+11:00" },
            "type": "collection",
            "entry": [
                { "fullUrl": "http://hl7.org/fhir/CompartmentDefinition/relatedPerson" },
                {
                    "fullUrl": "http://hl7.org/fhir/StructureDefinition/Patient",
                    "resource": { "resourceType": "StructureDefinition", "id": "Patient" }
                }
            ]
        });

        let bundle = Bundle::from_value(&json).unwrap();
        assert_eq!(bundle.id, Some("resources".to_string()));
        assert_eq!(bundle.bundle_type, BundleType::Collection);
        assert_eq!(bundle.entry_count(), 2);
        assert!(bundle.extensions.contains_key("meta"));
        assert!(bundle.entries()[0].resource.is_none());
    }

    #[test]
    fn test_rejects_non_bundle() {
        let json = json!({ "resourceType": "Patient", "type": "collection" });
        assert!(matches!(
            Bundle::from_value(&json),
            Err(Error::InvalidResource(_))
        ));
    }

    #[test]
    fn test_name_under_prefix() {
        let entry = BundleEntry::new(
            "http://hl7.org/fhir/StructureDefinition/Observation",
            json!({}),
        );
        let prefix = "http://hl7.org/fhir/StructureDefinition/";
        assert_eq!(entry.name_under(prefix), Some("Observation"));
        assert_eq!(entry.name_under("http://hl7.org/fhir/ValueSet/"), None);

        let nested = BundleEntry::new(
            "http://hl7.org/fhir/StructureDefinition/a/b",
            json!({}),
        );
        assert_eq!(nested.name_under(prefix), None);
    }

    #[test]
    fn test_structure_definition_requires_resource() {
        let entry = BundleEntry {
            full_url: Some("http://hl7.org/fhir/StructureDefinition/Patient".to_string()),
            resource: None,
            extensions: HashMap::new(),
        };
        assert!(matches!(
            entry.structure_definition(),
            Err(Error::MissingField(_))
        ));
    }

    #[test]
    fn test_add_entry() {
        let mut bundle = Bundle::collection();
        bundle.add_entry(BundleEntry::new(
            "http://hl7.org/fhir/StructureDefinition/Patient",
            json!({"resourceType": "StructureDefinition"}),
        ));
        assert_eq!(bundle.entry_count(), 1);
    }
}
