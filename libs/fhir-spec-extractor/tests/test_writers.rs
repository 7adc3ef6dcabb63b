//! Writing extracted specs to disk

mod test_support;

use fhirspec_extractor::writers::{render_for_path, OutputFormat};
use fhirspec_extractor::{extract, extract_to_file, Error, ExtractorConfig, ResourceSpec};
use std::fs;
use test_support::{names, resources_bundle, types_bundle};

fn immunization_spec() -> ResourceSpec {
    extract(
        &resources_bundle(),
        &types_bundle(),
        &names(&["Immunization"]),
        ExtractorConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_json_output_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spec/r4.json");

    let written = extract_to_file(
        &resources_bundle(),
        &types_bundle(),
        &names(&["Immunization"]),
        ExtractorConfig::default(),
        &path,
    )
    .unwrap();
    assert_eq!(written, 14);

    let parsed: ResourceSpec = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, immunization_spec());
}

#[test]
fn test_text_output() {
    let spec = immunization_spec();
    let path = std::path::Path::new("fhirspec.textproto");
    assert_eq!(OutputFormat::from_path(path).unwrap(), OutputFormat::Text);

    let rendered = render_for_path(&spec, path).unwrap();
    assert!(rendered.starts_with("resource_type_to_config {\n  key: 1\n"));
    assert!(rendered.contains("    required_fields: \"patient\"\n"));
    assert!(rendered.contains("  fhir_type: R4_FHIR_TYPE_CHILD_TYPE_SKIP_VALIDATION\n  kind: KIND_COMPLEX_TYPE\n}"));
    assert_eq!(rendered, render_for_path(&immunization_spec(), path).unwrap());
}

#[test]
fn test_unsupported_extension_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spec.yaml");

    let err = extract_to_file(
        &resources_bundle(),
        &types_bundle(),
        &names(&["Immunization"]),
        ExtractorConfig::default(),
        &path,
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOutputFormat(_)));
    assert!(!path.exists());
}
