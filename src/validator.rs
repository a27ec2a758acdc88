//! Unified Validator
//!
//! Orchestrates the 3 validation layers into a single pipeline. The store
//! runs it before every save; the editor can run it on every change.

use std::path::Path;

use anyhow::{Context, Result};

use crate::errors::ValidationResult;
use crate::schema::Schema;
use crate::template::KnownRefs;
use crate::validators::{validate_structure, validate_styles, validate_template};

pub const DEFAULT_FALLBACK_COLOR: &str = "bg";

/// The unified validator that runs all 3 layers
#[derive(Debug, Clone)]
pub struct Validator {
    fallback_color: String,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_COLOR)
    }
}

impl Validator {
    /// `fallback_color` is the color key sections fall back to
    pub fn new(fallback_color: impl Into<String>) -> Self {
        Self {
            fallback_color: fallback_color.into(),
        }
    }

    pub fn fallback_color(&self) -> &str {
        &self.fallback_color
    }

    /// Validate a schema through all 3 layers
    pub fn validate(&self, schema: &Schema, schema_id: &str) -> ValidationResult {
        let mut result = ValidationResult::new(schema_id);
        result.section_count = schema.sections.len();
        result.component_count = schema.component_count();

        let known = KnownRefs::from_schema(schema);

        // Layer 1: Structure
        for error in validate_structure(schema) {
            result.add_error(error);
        }

        // Layer 2: Template (the publishability gate)
        for error in validate_template(schema, &known) {
            result.add_error(error);
        }

        // Layer 3: Style (mostly warnings)
        for error in validate_styles(schema, &self.fallback_color) {
            result.add_error(error);
        }

        result
    }

    /// Validate a schema file from path; the file stem is the schema id
    pub fn validate_file(&self, path: &Path) -> Result<ValidationResult> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {:?}", path))?;

        let schema = Schema::from_yaml(&yaml)
            .with_context(|| format!("Failed to parse schema YAML from {:?}", path))?;

        let schema_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(self.validate(&schema, &schema_id))
    }
}
