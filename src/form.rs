//! FormState and the Form Validator
//!
//! A [`FormState`] is the transient ref → value map of one fill-out session.
//! It starts empty when a schema is opened and is only persisted if the user
//! exports it. [`can_generate`] is the pure gate behind the "generate" action
//! and is cheap enough to recompute on every edit.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PromptorError, Result};
use crate::schema::{Component, Ref, Schema};
use crate::template::{substitute_with, UnresolvedPolicy};

/// Entered values keyed by ref, in entry order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    values: IndexMap<String, Value>,
}

impl FormState {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// State seeded with every dropdown's `default`
    pub fn with_defaults(schema: &Schema) -> Self {
        let mut state = Self::new();
        for (_, component) in schema.components() {
            if let Some(default) = component.default_value() {
                state.set(component.reference.as_str(), default);
            }
        }
        state
    }

    /// Parse a JSON object of ref → value
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty JSON (2-space indent), as exported
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn set(&mut self, reference: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(reference.into(), value.into());
    }

    pub fn get(&self, reference: &str) -> Option<&Value> {
        self.values.get(reference)
    }

    pub fn remove(&mut self, reference: &str) -> Option<Value> {
        self.values.shift_remove(reference)
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.values.contains_key(reference)
    }

    /// Overlay another state; its entries win
    pub fn merge(&mut self, other: FormState) {
        self.values.extend(other.values);
    }

    /// Substitution text for a present key; `None` only if the key is absent
    pub fn text(&self, reference: &str) -> Option<Cow<'_, str>> {
        self.values.get(reference).map(value_text)
    }

    /// Present and neither `null` nor `""`
    pub fn is_filled(&self, reference: &str) -> bool {
        match self.values.get(reference) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Textual form of a value: strings as-is, `null` as `""`, arrays and
/// objects as compact JSON
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Components that block generation, in section order: required ones with
/// no filled value, plus any component whose ref is empty
pub fn missing_required<'s>(schema: &'s Schema, form: &FormState) -> Vec<&'s Ref> {
    schema
        .components()
        .map(|(_, component)| component)
        .filter(|component| blocks_generation(component, form))
        .map(|component| &component.reference)
        .collect()
}

/// Generation is allowed iff every ref is non-empty and every required
/// component has a filled value
pub fn can_generate(schema: &Schema, form: &FormState) -> bool {
    !schema
        .components()
        .any(|(_, component)| blocks_generation(component, form))
}

fn blocks_generation(component: &Component, form: &FormState) -> bool {
    let reference = component.reference.as_str();
    reference.is_empty() || (component.required && !form.is_filled(reference))
}

/// Gate on required fields, then substitute the schema's template
pub fn generate(schema: &Schema, form: &FormState, policy: UnresolvedPolicy) -> Result<String> {
    let missing = missing_required(schema, form);
    if !missing.is_empty() {
        return Err(PromptorError::MissingRequired {
            refs: missing
                .iter()
                .map(|r| if r.is_empty() { "\"\"".to_string() } else { r.to_string() })
                .collect(),
        });
    }

    let text = substitute_with(&schema.template_text, form, &schema.fragments, policy)?;
    tracing::debug!(title = %schema.title, len = text.len(), "generated text");
    Ok(text.into_owned())
}
