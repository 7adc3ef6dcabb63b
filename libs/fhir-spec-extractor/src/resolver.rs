//! Per-element field resolution
//!
//! Pure functions over one ElementDefinition: where it sits in the structure, its
//! cardinality, and which TypeIdentifier each of its types maps to. Kinds are not decided
//! here; they are bound once the closure knows every referenced type's definition.

use crate::error::{Error, Result};
use crate::ir::enumeration::{CHILD_TYPE_PLACEHOLDER, RESOURCE_PLACEHOLDER};
use crate::ir::{MultiTypeFieldConfig, TypeEnumeration, TypeIdentifier, TypeKind};
use fhirspec_models::{ElementDefinition, ElementDefinitionType, StructureDefinitionKind};

/// Type code used by the specification for system-level strings (ids, urls)
pub const SYSTEM_STRING_CODE: &str = "http://hl7.org/fhirpath/System.String";

/// Extension naming the FHIR type behind a system-level type code
pub const FHIR_TYPE_EXTENSION_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/structuredefinition-fhir-type";

/// The only profile tolerated on a type reference
pub const SIMPLE_QUANTITY_PROFILE: &str = "http://hl7.org/fhir/StructureDefinition/SimpleQuantity";

const CHOICE_SUFFIX: &str = "[x]";

/// Position of an element within its structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementPath<'a> {
    /// The element describing the structure itself, e.g. `Observation`
    SelfMarker,
    /// A field of the structure, e.g. `Observation.status`
    DirectField(&'a str),
    /// A field of an inline nested structure, e.g. `Immunization.reaction.date`
    DeferredNested,
}

/// A resolved field whose kind is not bound yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingField {
    pub is_array: bool,
    pub type_id: TypeIdentifier,
}

/// Fields produced by one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFields {
    /// Field names with their configs, in declaration order
    pub fields: Vec<(String, PendingField)>,
    /// Present for choice elements
    pub multi_type: Option<MultiTypeFieldConfig>,
}

pub fn classify_path(element: &ElementDefinition) -> Result<ElementPath<'_>> {
    if element.id.as_deref() != Some(element.path.as_str()) {
        return Err(Error::IdPathMismatch {
            id: element.id.clone(),
            path: element.path.clone(),
        });
    }

    let mut segments = element.path.split('.');
    segments.next();
    Ok(match (segments.next(), segments.next()) {
        (None, _) => ElementPath::SelfMarker,
        (Some(field), None) => ElementPath::DirectField(field),
        (Some(_), Some(_)) => ElementPath::DeferredNested,
    })
}

pub fn is_choice_field(field_name: &str) -> bool {
    field_name.ends_with(CHOICE_SUFFIX)
}

/// `min` must be 0 (optional) or 1 (required)
pub fn is_required(element: &ElementDefinition) -> Result<bool> {
    match element.min {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        found => Err(Error::InvalidMinCardinality {
            element: element.id_or_path().to_string(),
            found,
        }),
    }
}

/// `max` must be "1" (scalar) or "*" (array)
pub fn is_array(element: &ElementDefinition) -> Result<bool> {
    match element.max.as_deref() {
        Some("1") => Ok(false),
        Some("*") => Ok(true),
        _ => Err(Error::InvalidMaxCardinality {
            element: element.id_or_path().to_string(),
            found: element.max.clone(),
        }),
    }
}

/// Where a type reference appears, for sentinel resolution and error reporting
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    pub element: &'a str,
    /// The `id` field of a resource, which always resolves to the `id` type
    pub is_resource_id: bool,
}

/// Map a type reference to an enumeration identifier
pub fn resolve_type(
    enumeration: &TypeEnumeration,
    type_ref: &ElementDefinitionType,
    context: TypeContext<'_>,
) -> Result<TypeIdentifier> {
    enumeration.resolve(resolve_type_name(type_ref, context)?)
}

/// Map a type reference to the name of the type it denotes
///
/// Validates the profile, resolves the system string sentinel and replaces nested-structure
/// and resource codes by their placeholders. The result is a plain type name such as
/// `dateTime`, `Quantity` or `ChildTypeSkipValidation`.
pub fn resolve_type_name<'a>(
    type_ref: &'a ElementDefinitionType,
    context: TypeContext<'_>,
) -> Result<&'a str> {
    let code = type_ref.code.as_str();

    if let Some(profile) = &type_ref.profile {
        if profile.len() != 1 || profile[0] != SIMPLE_QUANTITY_PROFILE {
            return Err(Error::UnexpectedProfile {
                element: context.element.to_string(),
                code: code.to_string(),
                profile: profile.clone(),
            });
        }
    }

    match code {
        SYSTEM_STRING_CODE => resolve_system_string(type_ref, context),
        "BackboneElement" | "Element" => Ok(CHILD_TYPE_PLACEHOLDER),
        RESOURCE_PLACEHOLDER => Ok(RESOURCE_PLACEHOLDER),
        _ if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) => {
            Err(Error::InvalidTypeCode {
                element: context.element.to_string(),
                code: code.to_string(),
            })
        }
        _ => Ok(code),
    }
}

fn resolve_system_string<'a>(
    type_ref: &'a ElementDefinitionType,
    context: TypeContext<'_>,
) -> Result<&'a str> {
    let invalid = |message: String| Error::InvalidTypeExtension {
        element: context.element.to_string(),
        message,
    };

    let extension = match type_ref.extensions() {
        [extension] => extension,
        other => {
            return Err(invalid(format!(
                "expected exactly one extension, found {}",
                other.len()
            )))
        }
    };
    if extension.url != FHIR_TYPE_EXTENSION_URL {
        return Err(invalid(format!("unexpected extension url {}", extension.url)));
    }

    // Resource ids are constrained beyond a plain string
    if context.is_resource_id {
        return Ok("id");
    }

    match extension.value_url.as_deref() {
        Some(value @ ("string" | "uri")) => Ok(value),
        other => Err(invalid(format!("unexpected valueUrl {:?}", other))),
    }
}

/// Kind of a data type from its StructureDefinition
pub fn classify_kind(type_name: &str, kind: StructureDefinitionKind) -> Result<TypeKind> {
    match kind {
        StructureDefinitionKind::PrimitiveType => Ok(TypeKind::Primitive),
        StructureDefinitionKind::ComplexType => Ok(TypeKind::Complex),
        found => Err(Error::UnexpectedDataTypeKind {
            name: type_name.to_string(),
            found,
        }),
    }
}

/// Variant name of a choice field, e.g. `occurrence[x]` + `dateTime` -> `occurrenceDateTime`
pub fn choice_variant_name(field_name: &str, type_code: &str) -> String {
    let base = field_name.strip_suffix(CHOICE_SUFFIX).unwrap_or(field_name);
    let mut chars = type_code.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", base, first.to_uppercase(), chars.as_str()),
        None => base.to_string(),
    }
}

/// Build the field configs for a direct field element
///
/// Choice fields expand to one scalar field per declared type plus a multi-type config;
/// every other field must declare exactly one type.
pub fn build_field_configs(
    enumeration: &TypeEnumeration,
    element: &ElementDefinition,
    field_name: &str,
    is_resource_id_field: bool,
) -> Result<ElementFields> {
    let element_id = element.id_or_path();
    let context = TypeContext {
        element: element_id,
        is_resource_id: is_resource_id_field,
    };
    let field_is_array = is_array(element)?;

    if is_choice_field(field_name) {
        if field_is_array {
            return Err(Error::ChoiceFieldArray(element_id.to_string()));
        }
        if element.type_list().is_empty() {
            return Err(Error::EmptyChoiceField(element_id.to_string()));
        }

        let mut fields = Vec::with_capacity(element.type_list().len());
        for type_ref in element.type_list() {
            let name = choice_variant_name(field_name, &type_ref.code);
            let type_id = resolve_type(enumeration, type_ref, context)?;
            fields.push((
                name,
                PendingField {
                    is_array: false,
                    type_id,
                },
            ));
        }

        let multi_type = MultiTypeFieldConfig {
            name: field_name.to_string(),
            typed_field_names: fields.iter().map(|(name, _)| name.clone()).collect(),
            is_required: is_required(element)?,
        };
        return Ok(ElementFields {
            fields,
            multi_type: Some(multi_type),
        });
    }

    let type_ref = match element.type_list() {
        [type_ref] => type_ref,
        other => {
            return Err(Error::ExpectedSingleType {
                element: element_id.to_string(),
                count: other.len(),
            })
        }
    };
    let type_id = resolve_type(enumeration, type_ref, context)?;

    Ok(ElementFields {
        fields: vec![(
            field_name.to_string(),
            PendingField {
                is_array: field_is_array,
                type_id,
            },
        )],
        multi_type: None,
    })
}
