//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

pub type Result<T, E = PromptorError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum PromptorError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PRM-001: Config error: {reason}")]
    ConfigError { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Store errors (PRM-010 to PRM-011)
    // ─────────────────────────────────────────────────────────────

    #[error("PRM-010: No UI found for: {id}")]
    SchemaNotFound { id: String },

    #[error("PRM-011: Invalid schema id '{id}'")]
    InvalidSchemaId { id: String },

    // ─────────────────────────────────────────────────────────────
    // Template errors (PRM-020 to PRM-021)
    // ─────────────────────────────────────────────────────────────

    #[error("PRM-020: Template references unknown refs: {}", .refs.join(", "))]
    UnpublishableTemplate { refs: Vec<String> },

    #[error("PRM-021: Unresolved placeholders: {}", .refs.join(", "))]
    UnresolvedPlaceholders { refs: Vec<String> },

    // ─────────────────────────────────────────────────────────────
    // Form errors (PRM-030)
    // ─────────────────────────────────────────────────────────────

    #[error("PRM-030: Required fields are empty: {}", .refs.join(", "))]
    MissingRequired { refs: Vec<String> },

    // ─────────────────────────────────────────────────────────────
    // Schema authoring errors (PRM-040 to PRM-043)
    // ─────────────────────────────────────────────────────────────

    #[error("PRM-040: Schema has {count} validation error(s), first: {first}")]
    InvalidSchema { count: usize, first: String },

    #[error("PRM-041: Duplicate section key '{key}'")]
    DuplicateSectionKey { key: String },

    #[error("PRM-042: Duplicate fragment key '{key}'")]
    DuplicateFragmentKey { key: String },

    #[error("PRM-043: {what} no longer exists in this draft")]
    StaleHandle { what: String },
}

impl FixSuggestion for PromptorError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            PromptorError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            PromptorError::Json(_) => Some("Form input must be a JSON object of ref → value"),
            PromptorError::Io(_) => Some("Check file path and permissions"),
            PromptorError::ConfigError { .. } => {
                Some("Fix or delete ~/.config/promptor/config.toml")
            }
            PromptorError::SchemaNotFound { .. } => {
                Some("Run `promptor list` to see the available UIs")
            }
            PromptorError::InvalidSchemaId { .. } => {
                Some("Use only letters, digits, '-' and '_' in schema ids")
            }
            PromptorError::UnpublishableTemplate { .. } => {
                Some("Add a component or fragment with that ref, or fix the placeholder")
            }
            PromptorError::UnresolvedPlaceholders { .. } => {
                Some("Provide a value or fragment for each placeholder, or use --unresolved keep")
            }
            PromptorError::MissingRequired { .. } => {
                Some("Fill every required field in the input JSON")
            }
            PromptorError::InvalidSchema { .. } => Some("Run `promptor check <id>` for details"),
            PromptorError::DuplicateSectionKey { .. } => Some("Use unique section keys"),
            PromptorError::DuplicateFragmentKey { .. } => Some("Use unique fragment keys"),
            PromptorError::StaleHandle { .. } => None,
        }
    }
}
