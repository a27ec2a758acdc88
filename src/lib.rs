//! Promptor - schema-driven forms that compose prompt text
//!
//! A [`Schema`] describes a form (sections of labelled components) plus a
//! template with `{{ref}}` placeholders. Filling the form yields a
//! [`FormState`]; substituting it (and the schema's fragments) into the
//! template yields the final text.

pub mod config;
pub mod editor;
pub mod error;
pub mod errors;
pub mod export;
pub mod form;
pub mod highlight;
pub mod schema;
pub mod store;
pub mod template;
pub mod validator;
pub mod validators;

pub use config::PromptorConfig;
pub use editor::{ComponentId, SchemaDraft, SectionId};
pub use error::{FixSuggestion, PromptorError};
pub use errors::{Severity, ValidationError, ValidationLayer, ValidationResult};
pub use form::{can_generate, generate, missing_required, FormState};
pub use highlight::{render_ansi, RefPalette};
pub use schema::{
    derive_ref, ColorStyle, Component, ComponentKind, ComponentType, Ref, Schema, Section,
};
pub use store::{publish, ColorScheme, FileStore, MemoryStore, SchemaStore};
pub use template::{
    check_publishable, classify, substitute, substitute_with, KnownRefs, Publishability,
    Resolution, Segment, UnresolvedPolicy,
};
pub use validator::Validator;
