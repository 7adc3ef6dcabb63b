//! Indented text writer
//!
//! Produces a protobuf text format style document: one `resource_type_to_config` block per
//! resource id and one `fhir_data_type_configs` block per data type, both in sorted order.

use super::SpecWriter;
use crate::error::Result;
use crate::ir::{ComplexTypeConfig, FhirDataType, ResourceSpec, TypeKind};

/// Text writer
#[derive(Debug, Clone)]
pub struct TextWriter {
    indent: usize,
}

impl Default for TextWriter {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl TextWriter {
    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(self.indent * depth)
    }

    fn line(&self, out: &mut String, depth: usize, text: &str) {
        out.push_str(&self.pad(depth));
        out.push_str(text);
        out.push('\n');
    }

    fn write_config(&self, out: &mut String, depth: usize, config: &ComplexTypeConfig) {
        for (name, field) in &config.allowed_field_names_to_config {
            self.line(out, depth, "allowed_field_names_to_config {");
            self.line(out, depth + 1, &format!("key: {:?}", name));
            self.line(out, depth + 1, "value {");
            self.line(out, depth + 2, &format!("is_array: {}", field.is_array));
            self.line(out, depth + 2, &format!("type_id: {}", field.type_id));
            self.line(out, depth + 2, &format!("kind: {}", kind_name(field.kind)));
            self.line(out, depth + 1, "}");
            self.line(out, depth, "}");
        }

        for name in &config.required_fields {
            self.line(out, depth, &format!("required_fields: {:?}", name));
        }

        for multi_type in &config.multi_type_fields {
            self.line(out, depth, "multi_type_fields {");
            self.line(out, depth + 1, &format!("name: {:?}", multi_type.name));
            for typed in &multi_type.typed_field_names {
                self.line(out, depth + 1, &format!("typed_field_names: {:?}", typed));
            }
            self.line(
                out,
                depth + 1,
                &format!("is_required: {}", multi_type.is_required),
            );
            self.line(out, depth, "}");
        }
    }

    fn write_data_type(&self, out: &mut String, data_type: &FhirDataType) {
        self.line(out, 0, "fhir_data_type_configs {");
        self.line(out, 1, &format!("fhir_type: {}", data_type.fhir_type));
        self.line(out, 1, &format!("kind: {}", kind_name(data_type.kind)));
        if let Some(config) = &data_type.complex_type_config {
            self.line(out, 1, "complex_type_config {");
            self.write_config(out, 2, config);
            self.line(out, 1, "}");
        }
        self.line(out, 0, "}");
    }
}

fn kind_name(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Primitive => "KIND_PRIMITIVE_TYPE",
        TypeKind::Complex => "KIND_COMPLEX_TYPE",
    }
}

impl SpecWriter for TextWriter {
    fn render(&self, spec: &ResourceSpec) -> Result<String> {
        let mut out = String::new();

        for (resource_type, config) in &spec.resource_type_to_config {
            self.line(&mut out, 0, "resource_type_to_config {");
            self.line(&mut out, 1, &format!("key: {}", resource_type));
            self.line(&mut out, 1, "value {");
            self.write_config(&mut out, 2, config);
            self.line(&mut out, 1, "}");
            self.line(&mut out, 0, "}");
        }

        for data_type in &spec.fhir_data_type_configs {
            self.write_data_type(&mut out, data_type);
        }

        Ok(out)
    }
}
