//! Store Module - schema persistence
//!
//! The engine never does I/O itself; a [`SchemaStore`] loads and saves whole
//! schema records by id. [`publish`] is the only write path that enforces the
//! save gate.
//!
//! Key types:
//! - `SchemaStore`: async load/save/list contract
//! - `FileStore`: `<id>.yaml` files in a directory, with a parse cache
//! - `MemoryStore`: in-process store for tests and embedding
//! - `ColorScheme`: named color table an editor can apply to a draft

mod datastore;

use async_trait::async_trait;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PromptorError, Result};
use crate::errors::ValidationResult;
use crate::schema::{ColorStyle, Schema};
use crate::validator::Validator;

pub use datastore::{FileStore, MemoryStore};

/// Schema ids double as file stems
static SCHEMA_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Reject ids that are not a plain `[A-Za-z0-9_-]+` name
pub fn check_schema_id(id: &str) -> Result<()> {
    if SCHEMA_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(PromptorError::InvalidSchemaId { id: id.to_string() })
    }
}

/// A named color table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub colors: IndexMap<String, ColorStyle>,
}

/// Persistence for schema records, addressed by id
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// All schema ids, sorted
    async fn list(&self) -> Result<Vec<String>>;

    /// Fails with `SchemaNotFound` for an unknown id
    async fn load(&self, id: &str) -> Result<Schema>;

    /// Replace the whole record
    async fn save(&self, id: &str, schema: &Schema) -> Result<()>;

    async fn color_schemes(&self) -> Result<Vec<ColorScheme>>;
}

/// Validate, then save only if the template is publishable and the schema
/// has no structural errors. Returns the result so callers can show warnings.
pub async fn publish<S>(
    store: &S,
    validator: &Validator,
    id: &str,
    schema: &Schema,
) -> Result<ValidationResult>
where
    S: SchemaStore + ?Sized,
{
    check_schema_id(id)?;
    let result = validator.validate(schema, id);

    if !result.is_publishable() {
        let refs = result.offending_refs();
        tracing::warn!(id, refs = ?refs, "refusing to publish");
        return Err(PromptorError::UnpublishableTemplate { refs });
    }

    if let Some(first) = result.errors.first() {
        tracing::warn!(id, errors = result.errors.len(), "refusing to publish");
        return Err(PromptorError::InvalidSchema {
            count: result.errors.len(),
            first: first.to_string(),
        });
    }

    store.save(id, schema).await?;
    tracing::debug!(id, warnings = result.warnings.len(), "published");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(template: &str) -> Schema {
        let mut schema = Schema::from_yaml(
            r#"
ui:
  main:
    components:
      - label: Name
        type: textinput
        required: true
"#,
        )
        .unwrap();
        schema.template_text = template.to_string();
        schema
    }

    #[test]
    fn test_schema_ids() {
        assert!(check_schema_id("eval").is_ok());
        assert!(check_schema_id("news-letter_2").is_ok());
        assert!(check_schema_id("").is_err());
        assert!(check_schema_id("../etc").is_err());
        assert!(check_schema_id("a b").is_err());
    }

    #[tokio::test]
    async fn test_publish_saves_publishable() {
        let store = MemoryStore::new();
        let result = publish(&store, &Validator::default(), "eval", &schema("Hi {{name}}"))
            .await
            .unwrap();
        assert!(result.is_valid());
        assert_eq!(store.load("eval").await.unwrap().template_text, "Hi {{name}}");
    }

    #[tokio::test]
    async fn test_publish_refuses_unknown_refs() {
        let store = MemoryStore::new();
        let err = publish(&store, &Validator::default(), "eval", &schema("{{name}} {{x}} {{x}}"))
            .await
            .unwrap_err();
        match err {
            PromptorError::UnpublishableTemplate { refs } => assert_eq!(refs, vec!["x"]),
            other => panic!("unexpected: {other}"),
        }
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_refuses_structure_errors() {
        let store = MemoryStore::new();
        let mut bad = schema("{{name}}");
        bad.fragments.insert("name".to_string(), "clash".to_string());

        let err = publish(&store, &Validator::default(), "eval", &bad)
            .await
            .unwrap_err();
        assert!(matches!(err, PromptorError::InvalidSchema { count: 1, .. }));
    }

    #[tokio::test]
    async fn test_publish_through_trait_object() {
        let store: Box<dyn SchemaStore> = Box::new(MemoryStore::new());
        publish(store.as_ref(), &Validator::default(), "eval", &schema("{{name}}"))
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["eval".to_string()]);
    }
}
