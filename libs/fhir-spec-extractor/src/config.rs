//! Extractor configuration
//!
//! The supported resource mapping and the type enumeration are plain values handed to the
//! extractor. Defaults describe FHIR R4 as used by the medical records storage.

use crate::error::{Error, Result};
use crate::ir::TypeEnumeration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The only FHIR version the extractor accepts
pub const SUPPORTED_FHIR_VERSION: &str = "4.0.1";

/// Resource type name to stable positive integer id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, i32>", into = "BTreeMap<String, i32>")]
pub struct SupportedResources {
    ids: BTreeMap<String, i32>,
}

impl SupportedResources {
    pub fn new(ids: BTreeMap<String, i32>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for (name, id) in &ids {
            if *id <= 0 {
                return Err(Error::InvalidConfig(format!(
                    "resource {name} must have a positive id, got {id}"
                )));
            }
            if !seen.insert(*id) {
                return Err(Error::InvalidConfig(format!(
                    "resource id {id} is used more than once"
                )));
            }
        }
        Ok(Self { ids })
    }

    pub fn id_of(&self, resource: &str) -> Option<i32> {
        self.ids.get(resource).copied()
    }

    pub fn contains(&self, resource: &str) -> bool {
        self.ids.contains_key(resource)
    }

    /// All supported resource names, sorted
    pub fn names(&self) -> BTreeSet<String> {
        self.ids.keys().cloned().collect()
    }
}

impl Default for SupportedResources {
    fn default() -> Self {
        let ids = [
            ("Immunization", 1),
            ("AllergyIntolerance", 2),
            ("Observation", 3),
            ("Condition", 4),
            ("Procedure", 5),
            ("Medication", 6),
            ("MedicationRequest", 7),
            ("MedicationStatement", 8),
            ("Patient", 9),
            ("Practitioner", 10),
            ("PractitionerRole", 11),
            ("Encounter", 12),
            ("Location", 13),
            ("Organization", 14),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id))
        .collect();
        Self { ids }
    }
}

impl TryFrom<BTreeMap<String, i32>> for SupportedResources {
    type Error = Error;

    fn try_from(ids: BTreeMap<String, i32>) -> Result<Self> {
        Self::new(ids)
    }
}

impl From<SupportedResources> for BTreeMap<String, i32> {
    fn from(resources: SupportedResources) -> Self {
        resources.ids
    }
}

/// Everything the extractor needs besides the two specification bundles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub supported_resources: SupportedResources,
    pub type_enumeration: TypeEnumeration,
}

impl ExtractorConfig {
    /// Parse a JSON configuration; missing sections fall back to the R4 defaults
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
