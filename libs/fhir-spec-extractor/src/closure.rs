//! Type configs and the referenced-type closure
//!
//! Resource configs are built first; every type their fields reference seeds a worklist
//! that is expanded pass by pass against the type bundle until no new type appears. Each
//! type is expanded at most once, so reference cycles (Identifier -> Reference ->
//! Identifier) terminate. Field kinds are bound only after the closure is complete.

use crate::catalog::lookup_definitions;
use crate::error::{Error, Result};
use crate::ir::{
    ComplexTypeConfig, FhirDataType, FieldConfig, MultiTypeFieldConfig, TypeEnumeration,
    TypeIdentifier, TypeKind,
};
use crate::resolver::{self, ElementPath, PendingField};
use fhirspec_models::{Bundle, ElementDefinition};
use std::collections::{BTreeMap, BTreeSet};

/// Synthetic discriminator field present on every resource
pub const RESOURCE_TYPE_FIELD: &str = "resourceType";

/// Config of a resource or complex type before kinds are bound
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingConfig {
    pub fields: BTreeMap<String, PendingField>,
    pub required_fields: BTreeSet<String>,
    pub multi_type_fields: Vec<MultiTypeFieldConfig>,
}

impl PendingConfig {
    pub fn referenced_types(&self) -> BTreeSet<TypeIdentifier> {
        self.fields.values().map(|f| f.type_id.clone()).collect()
    }

    fn insert_field(&mut self, type_name: &str, name: String, field: PendingField) -> Result<()> {
        if self.fields.contains_key(&name) {
            return Err(Error::DuplicateField {
                type_name: type_name.to_string(),
                field: name,
            });
        }
        self.fields.insert(name, field);
        Ok(())
    }

    /// Bind each field's kind from the resolved types
    pub fn bind(self, kinds: &BTreeMap<TypeIdentifier, TypeKind>) -> Result<ComplexTypeConfig> {
        let mut allowed_field_names_to_config = BTreeMap::new();
        for (name, field) in self.fields {
            let kind = *kinds
                .get(&field.type_id)
                .ok_or_else(|| Error::MissingTypeDefinition(field.type_id.key().to_string()))?;
            allowed_field_names_to_config.insert(
                name,
                FieldConfig {
                    is_array: field.is_array,
                    type_id: field.type_id,
                    kind,
                },
            );
        }

        Ok(ComplexTypeConfig {
            allowed_field_names_to_config,
            required_fields: self.required_fields.into_iter().collect(),
            multi_type_fields: self.multi_type_fields,
        })
    }
}

/// Whether the structure being configured is a resource or a data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureRole {
    Resource,
    DataType,
}

/// Build the config of one resource or complex type from its snapshot elements
pub fn build_type_config(
    enumeration: &TypeEnumeration,
    type_name: &str,
    elements: &[ElementDefinition],
    role: StructureRole,
) -> Result<PendingConfig> {
    let mut config = PendingConfig::default();

    if role == StructureRole::Resource {
        config.insert_field(
            type_name,
            RESOURCE_TYPE_FIELD.to_string(),
            PendingField {
                is_array: false,
                type_id: enumeration.resolve("string")?,
            },
        )?;
    }

    for element in elements {
        let field_name = match resolver::classify_path(element)? {
            ElementPath::DirectField(field_name) => field_name,
            ElementPath::SelfMarker | ElementPath::DeferredNested => continue,
        };

        let is_resource_id = role == StructureRole::Resource && field_name == "id";
        let built =
            resolver::build_field_configs(enumeration, element, field_name, is_resource_id)?;
        for (name, field) in built.fields {
            config.insert_field(type_name, name, field)?;
        }

        match built.multi_type {
            Some(multi_type) => config.multi_type_fields.push(multi_type),
            None => {
                if resolver::is_required(element)? {
                    config.required_fields.insert(field_name.to_string());
                }
            }
        }
    }

    Ok(config)
}

/// A type reached by the closure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub kind: TypeKind,
    /// Present for complex types other than the placeholders
    pub config: Option<PendingConfig>,
}

/// Expand `roots` against the type bundle until every referenced type is resolved
pub fn close_over_types(
    types_bundle: &Bundle,
    enumeration: &TypeEnumeration,
    roots: BTreeSet<TypeIdentifier>,
) -> Result<BTreeMap<TypeIdentifier, ResolvedType>> {
    let mut resolved: BTreeMap<TypeIdentifier, ResolvedType> = BTreeMap::new();
    let mut frontier = roots;
    let mut pass = 0usize;

    while !frontier.is_empty() {
        pass += 1;
        tracing::debug!(pass, frontier = frontier.len(), "Expanding referenced types");

        // Catalog name (lower-cased) to identifier
        let mut lookups: BTreeMap<String, TypeIdentifier> = BTreeMap::new();
        for id in &frontier {
            if enumeration.is_placeholder(id) {
                resolved.insert(
                    id.clone(),
                    ResolvedType {
                        kind: TypeKind::Complex,
                        config: None,
                    },
                );
            } else {
                lookups.insert(enumeration.catalog_name(id).to_lowercase(), id.clone());
            }
        }

        let definitions = if lookups.is_empty() {
            BTreeMap::new()
        } else {
            let names: BTreeSet<String> = lookups.keys().cloned().collect();
            lookup_definitions(types_bundle, &names, None).map_err(|e| match e {
                Error::MissingDefinitions(missing) => {
                    Error::MissingTypeDefinition(missing.join(", "))
                }
                other => other,
            })?
        };

        let mut next = BTreeSet::new();
        for (name, definition) in definitions {
            let id = lookups
                .get(&name.to_lowercase())
                .cloned()
                .ok_or_else(|| Error::MissingTypeDefinition(name.clone()))?;
            let kind = resolver::classify_kind(&name, definition.kind)?;

            let config = match kind {
                TypeKind::Primitive => None,
                TypeKind::Complex => Some(build_type_config(
                    enumeration,
                    &name,
                    definition.snapshot_elements(),
                    StructureRole::DataType,
                )?),
            };

            if let Some(config) = &config {
                next.extend(
                    config
                        .referenced_types()
                        .into_iter()
                        .filter(|r| !resolved.contains_key(r) && !frontier.contains(r)),
                );
            }

            tracing::trace!(fhir_type = %id, ?kind, "Resolved data type");
            resolved.insert(id, ResolvedType { kind, config });
        }

        frontier = next;
    }

    Ok(resolved)
}

/// Bind kinds and produce the sorted data type catalog
pub fn bind_data_types(
    resolved: BTreeMap<TypeIdentifier, ResolvedType>,
) -> Result<(BTreeMap<TypeIdentifier, TypeKind>, Vec<FhirDataType>)> {
    let kinds: BTreeMap<TypeIdentifier, TypeKind> = resolved
        .iter()
        .map(|(id, resolved)| (id.clone(), resolved.kind))
        .collect();

    // BTreeMap iteration is ordered by identifier
    let mut data_types = Vec::with_capacity(resolved.len());
    for (fhir_type, resolved) in resolved {
        let complex_type_config = resolved
            .config
            .map(|config| config.bind(&kinds))
            .transpose()?;
        data_types.push(FhirDataType {
            fhir_type,
            kind: resolved.kind,
            complex_type_config,
        });
    }

    Ok((kinds, data_types))
}
