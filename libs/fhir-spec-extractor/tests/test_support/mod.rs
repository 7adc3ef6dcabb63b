//! Shared helpers for the extractor integration tests
#![allow(dead_code)]

use fhirspec_models::{Bundle, BundleEntry};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

pub const SD_PREFIX: &str = "http://hl7.org/fhir/StructureDefinition/";
pub const SYSTEM_STRING: &str = "http://hl7.org/fhirpath/System.String";
pub const FHIR_TYPE_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/structuredefinition-fhir-type";

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fhir-test-cases")
}

pub fn fixture_path(relative: &str) -> PathBuf {
    let path = fixtures_root().join(relative);
    assert!(path.exists(), "fixture missing at {:?}", path);
    path
}

fn load_bundle(relative: &str) -> Bundle {
    let bytes = fs::read(fixture_path(relative)).expect("failed to read fixture");
    Bundle::from_slice(&bytes).expect("failed to deserialize fixture")
}

/// The R4 resources fixture (Immunization, Patient, Observation, Condition)
pub fn resources_bundle() -> Bundle {
    load_bundle("r4/profiles-resources.json")
}

/// The R4 types fixture
pub fn types_bundle() -> Bundle {
    load_bundle("r4/profiles-types.json")
}

pub fn names(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Helper to create a StructureDefinition JSON with a snapshot
pub fn make_sd(type_name: &str, kind: &str, elements: Vec<Value>) -> Value {
    let mut snapshot = vec![json!({ "id": type_name, "path": type_name, "min": 0, "max": "*" })];
    snapshot.extend(elements);
    json!({
        "resourceType": "StructureDefinition",
        "url": format!("{}{}", SD_PREFIX, type_name),
        "name": type_name,
        "status": "active",
        "fhirVersion": "4.0.1",
        "kind": kind,
        "abstract": false,
        "type": type_name,
        "snapshot": {
            "element": snapshot
        }
    })
}

/// Helper to create an element with plain type codes
pub fn element(path: &str, min: u32, max: &str, codes: &[&str]) -> Value {
    let types: Vec<Value> = codes.iter().map(|code| json!({ "code": code })).collect();
    json!({ "id": path, "path": path, "min": min, "max": max, "type": types })
}

/// Helper to create an element typed with the system string sentinel
pub fn system_string_element(path: &str, value_url: &str) -> Value {
    json!({
        "id": path,
        "path": path,
        "min": 0,
        "max": "1",
        "type": [{
            "extension": [{ "url": FHIR_TYPE_EXTENSION, "valueUrl": value_url }],
            "code": SYSTEM_STRING
        }]
    })
}

pub fn bundle_of(definitions: Vec<Value>) -> Bundle {
    let mut bundle = Bundle::collection();
    for definition in definitions {
        let name = definition["url"]
            .as_str()
            .and_then(|url| url.strip_prefix(SD_PREFIX))
            .expect("definition should have a core url")
            .to_string();
        bundle.add_entry(BundleEntry::new(format!("{}{}", SD_PREFIX, name), definition));
    }
    bundle
}

/// Primitive type definitions for the given names
pub fn primitives(names: &[&str]) -> Vec<Value> {
    names
        .iter()
        .map(|name| {
            make_sd(
                name,
                "primitive-type",
                vec![system_string_element(&format!("{}.value", name), name)],
            )
        })
        .collect()
}
