//! Validation error types
//!
//! Structured findings for each validation layer, designed for
//! helpful messages with suggestions. These are values, never raised:
//! the editor shows them live and the store refuses to save on errors.

use thiserror::Error;

/// Validation layer (1-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLayer {
    Structure = 1,
    Template = 2,
    Style = 3,
}

impl std::fmt::Display for ValidationLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationLayer::Structure => write!(f, "Structure"),
            ValidationLayer::Template => write!(f, "Template"),
            ValidationLayer::Style => write!(f, "Style"),
        }
    }
}

/// Severity of validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding with context
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    // Layer 1: Structure
    #[error("Component '{label}' in section '{section}' has an empty ref")]
    EmptyRef {
        layer: ValidationLayer,
        section: String,
        label: String,
    },

    #[error("Duplicate ref '{reference}' (sections '{first_section}' and '{second_section}')")]
    DuplicateRef {
        layer: ValidationLayer,
        reference: String,
        first_section: String,
        second_section: String,
    },

    #[error("Fragment '{reference}' collides with a component ref in section '{section}'")]
    FragmentRefCollision {
        layer: ValidationLayer,
        reference: String,
        section: String,
    },

    #[error("Fragment with an empty key")]
    EmptyFragmentKey { layer: ValidationLayer },

    #[error("Dropdown '{reference}' has no options")]
    DropdownWithoutOptions {
        layer: ValidationLayer,
        reference: String,
        severity: Severity,
    },

    #[error("Dropdown '{reference}' default '{default}' is not one of its options")]
    DefaultNotInOptions {
        layer: ValidationLayer,
        reference: String,
        default: String,
        options: Vec<String>,
        severity: Severity,
    },

    // Layer 2: Template
    #[error("Unresolvable placeholder '{{{{{reference}}}}}'")]
    UnresolvedPlaceholder {
        layer: ValidationLayer,
        reference: String,
        suggestions: Vec<String>,
    },

    #[error("Fragment '{fragment}' contains '{{{{{reference}}}}}', which is inserted verbatim")]
    FragmentPlaceholder {
        layer: ValidationLayer,
        fragment: String,
        reference: String,
        severity: Severity,
    },

    // Layer 3: Style
    #[error("Section '{section}' uses unknown color '{color_key}'")]
    UnknownColorKey {
        layer: ValidationLayer,
        section: String,
        color_key: String,
        fallback: String,
        severity: Severity,
    },

    #[error("Color '{key}' has {slots} slot(s), expected at least background and foreground")]
    MalformedColor {
        layer: ValidationLayer,
        key: String,
        slots: usize,
    },
}

impl ValidationError {
    /// Get the validation layer for this error
    pub fn layer(&self) -> ValidationLayer {
        match self {
            ValidationError::EmptyRef { layer, .. } => *layer,
            ValidationError::DuplicateRef { layer, .. } => *layer,
            ValidationError::FragmentRefCollision { layer, .. } => *layer,
            ValidationError::EmptyFragmentKey { layer } => *layer,
            ValidationError::DropdownWithoutOptions { layer, .. } => *layer,
            ValidationError::DefaultNotInOptions { layer, .. } => *layer,
            ValidationError::UnresolvedPlaceholder { layer, .. } => *layer,
            ValidationError::FragmentPlaceholder { layer, .. } => *layer,
            ValidationError::UnknownColorKey { layer, .. } => *layer,
            ValidationError::MalformedColor { layer, .. } => *layer,
        }
    }

    /// Get severity (error vs warning)
    pub fn severity(&self) -> Severity {
        match self {
            ValidationError::DropdownWithoutOptions { severity, .. } => *severity,
            ValidationError::DefaultNotInOptions { severity, .. } => *severity,
            ValidationError::FragmentPlaceholder { severity, .. } => *severity,
            ValidationError::UnknownColorKey { severity, .. } => *severity,
            _ => Severity::Error,
        }
    }

    /// Get suggestion for fixing this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ValidationError::EmptyRef { .. } => {
                Some("Give the component a label with letters or digits, or set ref explicitly".to_string())
            }
            ValidationError::DuplicateRef { .. } | ValidationError::FragmentRefCollision { .. } => {
                Some("Refs share one namespace across components and fragments; rename one".to_string())
            }
            ValidationError::UnresolvedPlaceholder { suggestions, .. } => {
                if suggestions.is_empty() {
                    None
                } else {
                    Some(format!("Did you mean: {}?", suggestions.join(", ")))
                }
            }
            ValidationError::DefaultNotInOptions { options, .. } => {
                if options.len() <= 5 {
                    Some(format!("Options: {}", options.join(", ")))
                } else {
                    Some(format!(
                        "Options: {} (and {} more)",
                        options[..3].join(", "),
                        options.len() - 3
                    ))
                }
            }
            ValidationError::UnknownColorKey { fallback, .. } => {
                Some(format!("Section will use '{}' instead", fallback))
            }
            _ => None,
        }
    }

    /// Ref name for template findings
    pub fn unresolved_ref(&self) -> Option<&str> {
        match self {
            ValidationError::UnresolvedPlaceholder { reference, .. } => Some(reference),
            _ => None,
        }
    }
}

/// Result of validating a schema
#[derive(Debug)]
pub struct ValidationResult {
    pub schema_id: String,
    pub section_count: usize,
    pub component_count: usize,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new(schema_id: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.into(),
            section_count: 0,
            component_count: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// No unresolvable placeholders (the template half of the save gate)
    pub fn is_publishable(&self) -> bool {
        self.offending_refs().is_empty()
    }

    /// Unresolvable refs in the order they were reported
    pub fn offending_refs(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter_map(ValidationError::unresolved_ref)
            .map(String::from)
            .collect()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        if error.severity() == Severity::Warning {
            self.warnings.push(error);
        } else {
            self.errors.push(error);
        }
    }
}
