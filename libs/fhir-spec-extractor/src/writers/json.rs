//! JSON writer

use super::SpecWriter;
use crate::error::Result;
use crate::ir::ResourceSpec;

/// Pretty-printed JSON, terminated by a newline
#[derive(Debug, Clone, Default)]
pub struct JsonWriter;

impl SpecWriter for JsonWriter {
    fn render(&self, spec: &ResourceSpec) -> Result<String> {
        let mut json = serde_json::to_string_pretty(spec)?;
        json.push('\n');
        Ok(json)
    }
}
