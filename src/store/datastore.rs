//! FileStore and MemoryStore - schema records with DashMap caches
//!
//! `FileStore` keeps one `<id>.yaml` per schema under a directory and caches
//! parsed schemas by id. The cache entry is dropped on save, so the next load
//! re-reads what was written. A load that raced with a save does not cache
//! what it read.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use walkdir::WalkDir;

use super::{check_schema_id, ColorScheme, SchemaStore};
use crate::error::{PromptorError, Result};
use crate::schema::Schema;
use crate::validator::Validator;

/// File holding the color-scheme records, next to the schemas
pub const COLOR_SCHEMES_FILE: &str = "color_schemes.yaml";

/// Directory-backed store
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    cache: DashMap<String, Schema>,
    /// Bumped by every save
    generation: AtomicU64,
    /// Used to warn about schemas that load with errors
    validator: Validator,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: DashMap::new(),
            generation: AtomicU64::new(0),
            validator: Validator::default(),
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.yaml", id))
    }

    /// Number of parsed schemas held in memory
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Cache `schema` unless a save happened since `seen` was read. The check
    /// runs under the entry's shard lock, so a save that bumps the generation
    /// afterwards also removes what was inserted here.
    fn cache_if_current(&self, id: &str, schema: &Schema, seen: u64) -> bool {
        match self.cache.entry(id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                if self.generation.load(Ordering::SeqCst) != seen {
                    return false;
                }
                slot.insert(schema.clone());
                true
            }
        }
    }
}

/// Ids of `<id>.yaml` files directly under `dir`
fn scan_ids(dir: &Path) -> std::io::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some("yaml")
            || path.file_name().and_then(|n| n.to_str()) == Some(COLOR_SCHEMES_FILE)
        {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if check_schema_id(stem).is_ok() {
                ids.push(stem.to_string());
            }
        }
    }
    ids.sort();
    Ok(ids)
}

#[async_trait]
impl SchemaStore for FileStore {
    async fn list(&self) -> Result<Vec<String>> {
        let dir = self.dir.clone();
        let ids = tokio::task::spawn_blocking(move || scan_ids(&dir))
            .await
            .map_err(std::io::Error::other)??;
        Ok(ids)
    }

    async fn load(&self, id: &str) -> Result<Schema> {
        check_schema_id(id)?;

        if let Some(schema) = self.cache.get(id) {
            tracing::debug!(id, "schema cache hit");
            return Ok(schema.clone());
        }

        let seen = self.generation.load(Ordering::SeqCst);
        let path = self.path_for(id);
        let yaml = match tokio::fs::read_to_string(&path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PromptorError::SchemaNotFound { id: id.to_string() })
            }
            Err(e) => return Err(e.into()),
        };
        let schema = Schema::from_yaml(&yaml)?;

        let result = self.validator.validate(&schema, id);
        if !result.is_valid() {
            tracing::warn!(id, errors = result.errors.len(), "schema loaded with validation errors");
        }
        tracing::debug!(id, sections = schema.sections.len(), "schema loaded");

        if !self.cache_if_current(id, &schema, seen) {
            tracing::debug!(id, "schema not cached, store changed during load");
        }
        Ok(schema)
    }

    async fn save(&self, id: &str, schema: &Schema) -> Result<()> {
        check_schema_id(id)?;
        let yaml = schema.to_yaml()?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(id);
        tokio::fs::write(&path, yaml).await?;

        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.remove(id);
        tracing::debug!(id, path = %path.display(), "schema saved");
        Ok(())
    }

    async fn color_schemes(&self) -> Result<Vec<ColorScheme>> {
        let path = self.dir.join(COLOR_SCHEMES_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(yaml) => Ok(serde_yaml::from_str(&yaml)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    schemas: DashMap<String, Schema>,
    schemes: Vec<ColorScheme>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color_schemes(mut self, schemes: Vec<ColorScheme>) -> Self {
        self.schemes = schemes;
        self
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[async_trait]
impl SchemaStore for MemoryStore {
    async fn list(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.schemas.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn load(&self, id: &str) -> Result<Schema> {
        self.schemas
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| PromptorError::SchemaNotFound { id: id.to_string() })
    }

    async fn save(&self, id: &str, schema: &Schema) -> Result<()> {
        check_schema_id(id)?;
        self.schemas.insert(id.to_string(), schema.clone());
        Ok(())
    }

    async fn color_schemes(&self) -> Result<Vec<ColorScheme>> {
        Ok(self.schemes.clone())
    }
}
