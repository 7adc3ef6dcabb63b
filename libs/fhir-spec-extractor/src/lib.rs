//! FHIR Spec Extractor
//!
//! This library reads the FHIR R4 specification bundles (`profiles-resources.json` and
//! `profiles-types.json`) and produces a closed, deterministic configuration of the allowed
//! fields of a set of resources and of every data type those fields reach.
//!
//! ## Architecture
//!
//! The extractor uses a three-stage pipeline:
//! 1. **Catalog**: Looks up and validates StructureDefinitions in a bundle
//! 2. **Resolver / Closure**: Turns snapshot elements into field configs and expands the
//!    referenced types until the set is closed
//! 3. **Writers**: Render the resulting `ResourceSpec` as JSON or text
//!
//! ## Example
//!
//! ```rust,no_run
//! use fhirspec_extractor::{ExtractorConfig, FhirSpecExtractor};
//! use fhirspec_models::Bundle;
//! use std::collections::BTreeSet;
//!
//! # fn main() -> fhirspec_extractor::Result<()> {
//! let resources = Bundle::from_slice(&std::fs::read("profiles-resources.json")?)?;
//! let types = Bundle::from_slice(&std::fs::read("profiles-types.json")?)?;
//!
//! let names = BTreeSet::from(["Immunization".to_string()]);
//! let extractor = FhirSpecExtractor::new(&resources, &names, ExtractorConfig::default())?;
//! let spec = extractor.generate_resource_spec(&types)?;
//! assert_eq!(spec.resource_type_to_config.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod closure;
pub mod config;
pub mod discovery;
pub mod error;
pub mod ir;
pub mod resolver;
pub mod utils;
pub mod writers;

pub use config::{ExtractorConfig, SupportedResources};
pub use error::{Error, Result};
pub use ir::{
    ComplexTypeConfig, FhirDataType, FieldConfig, MultiTypeFieldConfig, ResourceSpec,
    TypeEnumeration, TypeIdentifier, TypeKind,
};

use closure::{PendingConfig, StructureRole};
use fhirspec_models::{Bundle, StructureDefinitionKind};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Main entry point for extraction
///
/// Construction loads and validates the requested resources; the type closure is computed
/// by [`FhirSpecExtractor::generate_resource_spec`].
#[derive(Debug)]
pub struct FhirSpecExtractor {
    config: ExtractorConfig,
    resource_configs: BTreeMap<i32, PendingConfig>,
}

impl FhirSpecExtractor {
    /// Load the requested resources from the resources bundle
    ///
    /// Fails before reading the bundle when a name is not a supported resource.
    pub fn new(
        resources_bundle: &Bundle,
        resource_names: &BTreeSet<String>,
        config: ExtractorConfig,
    ) -> Result<Self> {
        let unsupported: Vec<String> = resource_names
            .iter()
            .filter(|name| !config.supported_resources.contains(name))
            .cloned()
            .collect();
        if !unsupported.is_empty() {
            return Err(Error::UnsupportedResources(unsupported));
        }

        let definitions = catalog::lookup_definitions(
            resources_bundle,
            resource_names,
            Some(StructureDefinitionKind::Resource),
        )?;

        let mut resource_configs = BTreeMap::new();
        for (name, definition) in &definitions {
            let resource_type = config
                .supported_resources
                .id_of(name)
                .ok_or_else(|| Error::UnsupportedResources(vec![name.clone()]))?;
            let pending = closure::build_type_config(
                &config.type_enumeration,
                name,
                definition.snapshot_elements(),
                StructureRole::Resource,
            )?;
            tracing::debug!(
                resource = %name,
                resource_type,
                fields = pending.fields.len(),
                "Resolved resource fields"
            );
            resource_configs.insert(resource_type, pending);
        }

        Ok(Self {
            config,
            resource_configs,
        })
    }

    /// Compute the type closure against the types bundle and assemble the spec
    pub fn generate_resource_spec(&self, types_bundle: &Bundle) -> Result<ResourceSpec> {
        let roots: BTreeSet<TypeIdentifier> = self
            .resource_configs
            .values()
            .flat_map(PendingConfig::referenced_types)
            .collect();

        let resolved =
            closure::close_over_types(types_bundle, &self.config.type_enumeration, roots)?;
        let (kinds, fhir_data_type_configs) = closure::bind_data_types(resolved)?;

        let mut resource_type_to_config = BTreeMap::new();
        for (resource_type, pending) in &self.resource_configs {
            resource_type_to_config.insert(*resource_type, pending.clone().bind(&kinds)?);
        }

        tracing::info!(
            resources = resource_type_to_config.len(),
            data_types = fhir_data_type_configs.len(),
            "Extracted resource spec"
        );

        Ok(ResourceSpec {
            resource_type_to_config,
            fhir_data_type_configs,
        })
    }
}

/// Convenience helper: extract the spec for `resource_names` in one call
pub fn extract(
    resources_bundle: &Bundle,
    types_bundle: &Bundle,
    resource_names: &BTreeSet<String>,
    config: ExtractorConfig,
) -> Result<ResourceSpec> {
    FhirSpecExtractor::new(resources_bundle, resource_names, config)?
        .generate_resource_spec(types_bundle)
}

/// Convenience helper: extract and write the spec to `output`, format chosen by extension.
///
/// Returns the number of data types written.
pub fn extract_to_file(
    resources_bundle: &Bundle,
    types_bundle: &Bundle,
    resource_names: &BTreeSet<String>,
    config: ExtractorConfig,
    output: &Path,
) -> Result<usize> {
    // Fail on the extension before doing any work
    let writer = writers::OutputFormat::from_path(output)?.writer();
    let spec = extract(resources_bundle, types_bundle, resource_names, config)?;
    utils::write_output(output, &writer.render(&spec)?)?;
    Ok(spec.fhir_data_type_configs.len())
}
