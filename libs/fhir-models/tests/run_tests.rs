use std::{fs, path::PathBuf};
use fhirspec_models::common::{
    Bundle, BundleType, StructureDefinition, StructureDefinitionKind, TypeDerivationRule,
};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fhir-test-cases")
}

fn load_bundle(relative: &str) -> Bundle {
    let path = fixtures_root().join(relative);
    assert!(path.exists(), "fixture missing at {:?}", path);

    let bytes = fs::read(&path).expect("failed to read fixture");
    Bundle::from_slice(&bytes).expect("failed to deserialize fixture")
}

fn structure_definition(bundle: &Bundle, name: &str) -> StructureDefinition {
    let url = format!("http://hl7.org/fhir/StructureDefinition/{name}");
    bundle
        .entries()
        .iter()
        .find(|entry| entry.full_url.as_deref() == Some(url.as_str()))
        .expect("entry should be present")
        .structure_definition()
        .expect("entry should be a StructureDefinition")
}

#[test]
fn parse_r4_resources_bundle() {
    let bundle = load_bundle("r4/profiles-resources.json");

    assert_eq!(bundle.resource_type, "Bundle");
    assert_eq!(bundle.bundle_type, BundleType::Collection);
    assert_eq!(bundle.entry_count(), 5);
    assert!(bundle.extensions.contains_key("meta"));

    // Non-StructureDefinition entries stay raw
    let compartment = &bundle.entries()[0];
    assert!(compartment.structure_definition().is_err());
}

#[test]
fn parse_r4_resource_definition() {
    let bundle = load_bundle("r4/profiles-resources.json");
    let sd = structure_definition(&bundle, "Immunization");

    assert_eq!(sd.kind, StructureDefinitionKind::Resource);
    assert_eq!(sd.fhir_version.as_deref(), Some("4.0.1"));
    assert_eq!(sd.derivation, Some(TypeDerivationRule::Specialization));
    assert_eq!(sd.type_, "Immunization");

    let elements = sd.snapshot_elements();
    assert_eq!(elements[0].path, "Immunization");

    let occurrence = elements
        .iter()
        .find(|e| e.path == "Immunization.occurrence[x]")
        .expect("occurrence should be present");
    let codes: Vec<_> = occurrence.type_list().iter().map(|t| t.code.as_str()).collect();
    assert_eq!(codes, vec!["dateTime", "string"]);
    assert_eq!(occurrence.min, Some(1));
    assert_eq!(occurrence.max.as_deref(), Some("1"));

    assert!(sd.extensions.contains_key("status"));
}

#[test]
fn parse_r4_type_definitions() {
    let bundle = load_bundle("r4/profiles-types.json");

    let date_time = structure_definition(&bundle, "dateTime");
    assert_eq!(date_time.kind, StructureDefinitionKind::PrimitiveType);

    let extension = structure_definition(&bundle, "Extension");
    assert_eq!(extension.kind, StructureDefinitionKind::ComplexType);
    let url = extension
        .snapshot_elements()
        .iter()
        .find(|e| e.path == "Extension.url")
        .expect("url should be present");
    let url_type = &url.type_list()[0];
    assert_eq!(url_type.code, "http://hl7.org/fhirpath/System.String");
    assert_eq!(url_type.extensions()[0].value_url.as_deref(), Some("uri"));

    // Profiles keep their own url but declare the constrained type
    let simple_quantity = structure_definition(&bundle, "SimpleQuantity");
    assert_eq!(simple_quantity.type_, "Quantity");
    assert_eq!(
        simple_quantity.derivation,
        Some(TypeDerivationRule::Constraint)
    );
}
