//! StructureDefinition lookup in specification bundles
//!
//! Bundles are scanned by `fullUrl`. Only entries under the StructureDefinition base url
//! whose trailing segment matches a requested name (case-insensitively) are deserialized and
//! validated; every other entry is ignored.

use crate::config::SUPPORTED_FHIR_VERSION;
use crate::error::{Error, Result};
use fhirspec_models::{Bundle, BundleEntry, StructureDefinition, StructureDefinitionKind};
use std::collections::{BTreeMap, BTreeSet};

/// Base url of every core StructureDefinition
pub const STRUCTURE_DEFINITION_PREFIX: &str = "http://hl7.org/fhir/StructureDefinition/";

/// Look up the StructureDefinitions for `requested_names`
///
/// The result is keyed by each entry's own name (the trailing `fullUrl` segment), which may
/// differ in case from the requested name. When `expected_kind` is given, every match must
/// declare that kind.
pub fn lookup_definitions(
    bundle: &Bundle,
    requested_names: &BTreeSet<String>,
    expected_kind: Option<StructureDefinitionKind>,
) -> Result<BTreeMap<String, StructureDefinition>> {
    let requested = normalize_requested(requested_names)?;
    let mut found: BTreeMap<String, StructureDefinition> = BTreeMap::new();
    let mut matched: BTreeSet<String> = BTreeSet::new();

    for entry in bundle.entries() {
        let Some(name) = entry.name_under(STRUCTURE_DEFINITION_PREFIX) else {
            continue;
        };
        let normalized = name.to_lowercase();
        if !requested.contains_key(&normalized) {
            continue;
        }
        if found.contains_key(name) || !matched.insert(normalized) {
            return Err(Error::DuplicateDefinition(name.to_string()));
        }

        let definition = load_entry(entry, name, expected_kind)?;
        tracing::trace!(name, kind = %definition.kind, "Matched structure definition");
        found.insert(name.to_string(), definition);
    }

    let missing: Vec<String> = requested
        .iter()
        .filter(|(normalized, _)| !matched.contains(*normalized))
        .map(|(_, original)| original.clone())
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingDefinitions(missing));
    }

    Ok(found)
}

/// Lower-cased requested name to the name as requested; duplicates are rejected
fn normalize_requested(requested_names: &BTreeSet<String>) -> Result<BTreeMap<String, String>> {
    let mut normalized = BTreeMap::new();
    let mut duplicates = BTreeSet::new();
    for name in requested_names {
        if let Some(previous) = normalized.insert(name.to_lowercase(), name.clone()) {
            duplicates.insert(previous);
            duplicates.insert(name.clone());
        }
    }
    if duplicates.is_empty() {
        Ok(normalized)
    } else {
        Err(Error::DuplicateRequestedNames(duplicates.into_iter().collect()))
    }
}

fn load_entry(
    entry: &BundleEntry,
    name: &str,
    expected_kind: Option<StructureDefinitionKind>,
) -> Result<StructureDefinition> {
    let definition = entry
        .structure_definition()
        .map_err(|e| Error::InvalidStructureDefinition {
            name: name.to_string(),
            message: e.to_string(),
        })?;

    if definition.fhir_version.as_deref() != Some(SUPPORTED_FHIR_VERSION) {
        return Err(Error::UnsupportedFhirVersion {
            name: name.to_string(),
            expected: SUPPORTED_FHIR_VERSION,
            found: definition.fhir_version,
        });
    }

    if let Some(expected) = expected_kind {
        if definition.kind != expected {
            return Err(Error::UnexpectedKind {
                name: name.to_string(),
                expected,
                found: definition.kind,
            });
        }
    }

    if definition.type_ != name {
        return Err(Error::NameMismatch {
            name: name.to_string(),
            declared: definition.type_,
        });
    }

    if definition.snapshot.is_none() {
        return Err(Error::MissingSnapshot(name.to_string()));
    }

    Ok(definition)
}
