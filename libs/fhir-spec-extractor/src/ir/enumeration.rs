//! The closed enumeration of FHIR type identifiers
//!
//! Type codes from the specification (`dateTime`, `CodeableConcept`, ...) are mapped to
//! enumeration keys by upper-snake-casing them behind a fixed prefix
//! (`R4_FHIR_TYPE_DATE_TIME`). The enumeration is configuration: it is built once and
//! handed to the extractor, which fails on any key it does not contain.

use crate::error::{Error, Result};
use heck::ToShoutySnakeCase;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Key prefix of the R4 enumeration
pub const R4_TYPE_PREFIX: &str = "R4_FHIR_TYPE_";

/// Placeholder for nested structures (BackboneElement / Element children)
pub const CHILD_TYPE_PLACEHOLDER: &str = "ChildTypeSkipValidation";

/// Placeholder for generic resources (e.g. `contained`)
pub const RESOURCE_PLACEHOLDER: &str = "Resource";

/// Type names of the built-in R4 enumeration
const R4_TYPE_NAMES: &[&str] = &[
    // Primitive types
    "base64Binary",
    "boolean",
    "canonical",
    "code",
    "date",
    "dateTime",
    "decimal",
    "id",
    "instant",
    "integer",
    "markdown",
    "oid",
    "positiveInt",
    "string",
    "time",
    "unsignedInt",
    "uri",
    "url",
    "uuid",
    "xhtml",
    // General purpose complex types
    "Address",
    "Age",
    "Annotation",
    "Attachment",
    "CodeableConcept",
    "Coding",
    "ContactPoint",
    "Count",
    "Distance",
    "Duration",
    "HumanName",
    "Identifier",
    "Money",
    "Period",
    "Quantity",
    "Range",
    "Ratio",
    "SampledData",
    "Signature",
    "Timing",
    // Metadata types
    "ContactDetail",
    "Contributor",
    "DataRequirement",
    "Expression",
    "ParameterDefinition",
    "RelatedArtifact",
    "TriggerDefinition",
    "UsageContext",
    // Special purpose types
    "Dosage",
    "Element",
    "Extension",
    "MarketingStatus",
    "Meta",
    "Narrative",
    "Population",
    "ProdCharacteristic",
    "ProductShelfLife",
    "Reference",
    "SubstanceAmount",
    // Placeholders
    CHILD_TYPE_PLACEHOLDER,
    RESOURCE_PLACEHOLDER,
];

/// One value of the type enumeration
///
/// Ordered by number, which is the order used for all output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeIdentifier {
    number: u32,
    key: String,
}

impl TypeIdentifier {
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Closed set of type identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnumerationDef", into = "EnumerationDef")]
pub struct TypeEnumeration {
    prefix: String,
    by_key: BTreeMap<String, TypeIdentifier>,
}

/// Serialized form: a prefix and a key to number table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnumerationDef {
    prefix: String,
    values: BTreeMap<String, u32>,
}

impl TryFrom<EnumerationDef> for TypeEnumeration {
    type Error = Error;

    fn try_from(def: EnumerationDef) -> Result<Self> {
        TypeEnumeration::new(def.prefix, def.values)
    }
}

impl From<TypeEnumeration> for EnumerationDef {
    fn from(enumeration: TypeEnumeration) -> Self {
        EnumerationDef {
            values: enumeration
                .by_key
                .values()
                .map(|id| (id.key.clone(), id.number))
                .collect(),
            prefix: enumeration.prefix,
        }
    }
}

impl TypeEnumeration {
    /// Build an enumeration from explicit key/number pairs
    ///
    /// Numbers must be positive and unique, keys must carry the prefix, and both
    /// placeholder keys must be present.
    pub fn new(prefix: impl Into<String>, values: BTreeMap<String, u32>) -> Result<Self> {
        let prefix = prefix.into();
        let mut numbers = BTreeSet::new();
        let mut by_key = BTreeMap::new();

        for (key, number) in values {
            if number == 0 {
                return Err(Error::InvalidConfig(format!(
                    "type {key} uses the reserved number 0"
                )));
            }
            if !key.starts_with(&prefix) {
                return Err(Error::InvalidConfig(format!(
                    "type {key} does not start with prefix {prefix}"
                )));
            }
            if !numbers.insert(number) {
                return Err(Error::InvalidConfig(format!(
                    "type number {number} is used more than once"
                )));
            }
            by_key.insert(key.clone(), TypeIdentifier { number, key });
        }

        let enumeration = Self { prefix, by_key };
        for placeholder in [CHILD_TYPE_PLACEHOLDER, RESOURCE_PLACEHOLDER] {
            let key = enumeration.key_for(placeholder);
            if !enumeration.by_key.contains_key(&key) {
                return Err(Error::InvalidConfig(format!(
                    "placeholder type {key} is missing"
                )));
            }
        }
        Ok(enumeration)
    }

    /// Build an enumeration from type names, numbered from 1 in case-insensitive order
    pub fn from_type_names<I, S>(prefix: impl Into<String>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix = prefix.into();
        let mut values = BTreeMap::new();
        for (index, name) in sorted_type_names(names).iter().enumerate() {
            let key = format!("{}{}", prefix, name.to_shouty_snake_case());
            if values.insert(key.clone(), index as u32 + 1).is_some() {
                return Err(Error::InvalidConfig(format!(
                    "type names map to the same key {key}"
                )));
            }
        }
        Self::new(prefix, values)
    }

    /// The built-in R4 enumeration
    pub fn r4() -> Self {
        let by_key = sorted_type_names(R4_TYPE_NAMES)
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let key = format!("{}{}", R4_TYPE_PREFIX, name.to_shouty_snake_case());
                let id = TypeIdentifier {
                    number: index as u32 + 1,
                    key: key.clone(),
                };
                (key, id)
            })
            .collect();
        Self {
            prefix: R4_TYPE_PREFIX.to_string(),
            by_key,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Enumeration key for a type code, e.g. `dateTime` -> `R4_FHIR_TYPE_DATE_TIME`
    pub fn key_for(&self, type_code: &str) -> String {
        format!("{}{}", self.prefix, type_code.to_shouty_snake_case())
    }

    /// Look up a type code; fails if the derived key is not part of the enumeration
    pub fn resolve(&self, type_code: &str) -> Result<TypeIdentifier> {
        let key = self.key_for(type_code);
        self.by_key
            .get(&key)
            .cloned()
            .ok_or(Error::UnknownTypeKey { key })
    }

    /// The nested-structure placeholder
    pub fn child_type_placeholder(&self) -> Result<TypeIdentifier> {
        self.resolve(CHILD_TYPE_PLACEHOLDER)
    }

    /// The generic resource placeholder
    pub fn resource_placeholder(&self) -> Result<TypeIdentifier> {
        self.resolve(RESOURCE_PLACEHOLDER)
    }

    /// Placeholders have no definition in the type bundle and are never expanded
    pub fn is_placeholder(&self, id: &TypeIdentifier) -> bool {
        id.key == self.key_for(CHILD_TYPE_PLACEHOLDER)
            || id.key == self.key_for(RESOURCE_PLACEHOLDER)
    }

    /// Name under which a type is looked up in the type bundle
    ///
    /// The key without prefix and underscores; the catalog matches it case-insensitively,
    /// so `R4_FHIR_TYPE_DATE_TIME` finds `dateTime`.
    pub fn catalog_name(&self, id: &TypeIdentifier) -> String {
        id.key
            .strip_prefix(&self.prefix)
            .unwrap_or(&id.key)
            .replace('_', "")
    }
}

impl Default for TypeEnumeration {
    fn default() -> Self {
        Self::r4()
    }
}

/// Deduplicated names in case-insensitive order, ties broken by the exact name
pub fn sorted_type_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
    let mut sorted: Vec<String> = unique.into_iter().collect();
    sorted.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    sorted
}
