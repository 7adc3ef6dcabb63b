//! Required type discovery against the R4 fixture bundles

mod test_support;

use fhirspec_extractor::discovery::{discover_required_types, render_type_enums};
use fhirspec_extractor::ir::enumeration::R4_TYPE_PREFIX;
use fhirspec_extractor::{extract, ExtractorConfig, TypeEnumeration};
use std::collections::BTreeSet;
use test_support::{names, resources_bundle, types_bundle};

#[test]
fn test_discovery_matches_closure() {
    let requested = names(&["Immunization", "Observation", "Patient", "Condition"]);
    let discovered =
        discover_required_types(&resources_bundle(), &types_bundle(), &requested).unwrap();

    let spec = extract(
        &resources_bundle(),
        &types_bundle(),
        &requested,
        ExtractorConfig::default(),
    )
    .unwrap();

    let enumeration = TypeEnumeration::r4();
    let discovered_ids: BTreeSet<_> = discovered
        .iter()
        .filter(|name| name.as_str() != "Element")
        .map(|name| enumeration.resolve(name).unwrap())
        .collect();
    let extracted_ids: BTreeSet<_> = spec
        .fhir_data_type_configs
        .iter()
        .map(|d| d.fhir_type.clone())
        .collect();
    assert_eq!(discovered_ids, extracted_ids);
    assert!(discovered.contains("Element"));
}

#[test]
fn test_discovered_enumeration_drives_extraction() {
    let requested = names(&["Immunization"]);
    let discovered =
        discover_required_types(&resources_bundle(), &types_bundle(), &requested).unwrap();

    let enumeration = TypeEnumeration::from_type_names(R4_TYPE_PREFIX, &discovered).unwrap();
    assert_eq!(enumeration.len(), discovered.len());
    assert_eq!(enumeration.resolve("boolean").unwrap().number(), 1);

    let config = ExtractorConfig {
        type_enumeration: enumeration,
        ..ExtractorConfig::default()
    };
    let spec = extract(&resources_bundle(), &types_bundle(), &requested, config).unwrap();
    // Everything but Element is reached
    assert_eq!(spec.fhir_data_type_configs.len(), discovered.len() - 1);
}

#[test]
fn test_rendered_enums() {
    let discovered = discover_required_types(
        &resources_bundle(),
        &types_bundle(),
        &names(&["Immunization"]),
    )
    .unwrap();
    let rendered = render_type_enums(R4_TYPE_PREFIX, &discovered);
    let lines: Vec<_> = rendered.lines().collect();

    assert_eq!(lines.len(), discovered.len());
    assert_eq!(lines[0], "R4_FHIR_TYPE_BOOLEAN = 1;");
    assert_eq!(lines[1], "R4_FHIR_TYPE_CHILD_TYPE_SKIP_VALIDATION = 2;");
    assert!(lines.contains(&"R4_FHIR_TYPE_ELEMENT = 7;"));
}
