//! Output writers for extracted specs
//!
//! Each output format has its own module that implements the `SpecWriter` trait. The format
//! is chosen from the output file extension.

pub mod json;
pub mod text;

pub use json::JsonWriter;
pub use text::TextWriter;

use crate::error::{Error, Result};
use crate::ir::ResourceSpec;
use std::path::Path;

/// Trait that all output writers must implement
pub trait SpecWriter {
    /// Render the spec as a complete document
    fn render(&self, spec: &ResourceSpec) -> Result<String>;
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    /// `.json` selects JSON, `.txt` and `.textproto` select text
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("txt") | Some("textproto") => Ok(Self::Text),
            _ => Err(Error::UnsupportedOutputFormat(path.display().to_string())),
        }
    }

    pub fn writer(self) -> Box<dyn SpecWriter> {
        match self {
            Self::Json => Box::new(JsonWriter::default()),
            Self::Text => Box::new(TextWriter::default()),
        }
    }
}

/// Render `spec` in the format selected by `path`
pub fn render_for_path(spec: &ResourceSpec, path: &Path) -> Result<String> {
    OutputFormat::from_path(path)?.writer().render(spec)
}
