//! Required type discovery
//!
//! Computes, from the two specification bundles alone, the type names an enumeration must
//! contain for the requested resources. It walks the same fields the extractor does, but
//! at the level of type names, so it can run before any enumeration exists.

use crate::catalog::lookup_definitions;
use crate::closure::StructureRole;
use crate::error::{Error, Result};
use crate::ir::enumeration::{sorted_type_names, CHILD_TYPE_PLACEHOLDER, RESOURCE_PLACEHOLDER};
use crate::ir::TypeKind;
use crate::resolver::{self, ElementPath, TypeContext};
use fhirspec_models::{Bundle, ElementDefinition, StructureDefinitionKind};
use heck::ToShoutySnakeCase;
use std::collections::BTreeSet;

/// Type names that are always part of the enumeration
///
/// `id` backs every resource id; `Element` is the type of primitive extensions.
pub const ALWAYS_REQUIRED_TYPES: &[&str] = &["id", "Element"];

/// Discover every type name reachable from the requested resources
pub fn discover_required_types(
    resources_bundle: &Bundle,
    types_bundle: &Bundle,
    resource_names: &BTreeSet<String>,
) -> Result<BTreeSet<String>> {
    let mut required: BTreeSet<String> = ALWAYS_REQUIRED_TYPES
        .iter()
        .map(|name| name.to_string())
        .collect();
    // Type of the synthetic resourceType field
    required.insert("string".to_string());

    let resources = lookup_definitions(
        resources_bundle,
        resource_names,
        Some(StructureDefinitionKind::Resource),
    )?;

    let mut frontier = BTreeSet::new();
    for (name, definition) in &resources {
        frontier.extend(field_type_names(
            name,
            definition.snapshot_elements(),
            StructureRole::Resource,
        )?);
    }

    while !frontier.is_empty() {
        tracing::debug!(frontier = frontier.len(), "Discovering referenced types");
        required.extend(frontier.iter().cloned());

        let lookups: BTreeSet<String> = frontier
            .iter()
            .filter(|name| !is_placeholder_name(name))
            .cloned()
            .collect();
        if lookups.is_empty() {
            break;
        }

        let definitions = lookup_definitions(types_bundle, &lookups, None).map_err(|e| match e {
            Error::MissingDefinitions(missing) => Error::MissingTypeDefinition(missing.join(", ")),
            other => other,
        })?;

        let mut next = BTreeSet::new();
        for (name, definition) in &definitions {
            if resolver::classify_kind(name, definition.kind)? == TypeKind::Primitive {
                continue;
            }
            next.extend(
                field_type_names(
                    name,
                    definition.snapshot_elements(),
                    StructureRole::DataType,
                )?
                .into_iter()
                .filter(|t| !required.contains(t)),
            );
        }
        frontier = next;
    }

    Ok(required)
}

/// Render enumeration entries (`R4_FHIR_TYPE_DATE_TIME = 7;`) numbered from 1
pub fn render_type_enums<I, S>(prefix: &str, type_names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (index, name) in sorted_type_names(type_names).iter().enumerate() {
        out.push_str(&format!(
            "{}{} = {};\n",
            prefix,
            name.to_shouty_snake_case(),
            index + 1
        ));
    }
    out
}

fn is_placeholder_name(name: &str) -> bool {
    name == CHILD_TYPE_PLACEHOLDER || name == RESOURCE_PLACEHOLDER
}

/// Type names of the direct fields of one structure
fn field_type_names(
    type_name: &str,
    elements: &[ElementDefinition],
    role: StructureRole,
) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for element in elements {
        let ElementPath::DirectField(field_name) = resolver::classify_path(element)? else {
            continue;
        };
        let context = TypeContext {
            element: element.id_or_path(),
            is_resource_id: role == StructureRole::Resource && field_name == "id",
        };
        for type_ref in element.type_list() {
            names.insert(resolver::resolve_type_name(type_ref, context)?.to_string());
        }
    }
    tracing::trace!(type_name, count = names.len(), "Collected field types");
    Ok(names)
}
