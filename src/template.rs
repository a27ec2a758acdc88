//! Placeholder Resolver - single-pass `{{ref}}` scanning
//!
//! This module provides:
//! - [`tokenize`]: lazy literal/placeholder tokens over a template
//! - [`classify`]: the same tokens tagged resolvable/unresolvable against a
//!   [`KnownRefs`] set (live highlighting)
//! - [`check_publishable`]: the save gate, zero unresolvable placeholders
//! - [`substitute`] / [`substitute_with`]: final text from FormState and fragments
//!
//! Syntax is `{{` + one or more non-`}` characters + `}}`. The name between
//! the delimiters is taken verbatim (no trimming). There is no escaping, no
//! nesting and no recursive expansion of substituted text. Every scan is one
//! left-to-right pass without backtracking, so re-running on each keystroke
//! stays linear in the template length.

use std::borrow::Cow;
use std::ops::Range;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{PromptorError, Result};
use crate::form::FormState;
use crate::schema::Schema;

const OPEN: &str = "{{";

/// Token representing a parsed template piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text (span in the original string)
    Literal { text: &'a str, span: Range<usize> },
    /// `{{name}}`; span covers both delimiters
    Placeholder { name: &'a str, span: Range<usize> },
}

impl<'a> Token<'a> {
    pub fn span(&self) -> Range<usize> {
        match self {
            Token::Literal { span, .. } | Token::Placeholder { span, .. } => span.clone(),
        }
    }
}

/// Lazy tokenizer over a template. Restartable: call [`tokenize`] again.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    template: &'a str,
    pos: usize,
    /// Placeholder found while flushing the literal before it
    pending: Option<Token<'a>>,
}

/// Tokenize a template without consulting any ref set
pub fn tokenize(template: &str) -> Tokens<'_> {
    Tokens {
        template,
        pos: 0,
        pending: None,
    }
}

impl<'a> Tokens<'a> {
    /// Find the next `{{name}}` at or after `from`: (start, name range, end)
    fn next_placeholder(&self, from: usize) -> Option<(usize, Range<usize>, usize)> {
        let bytes = self.template.as_bytes();
        let mut search = from;

        loop {
            let open = search + self.template[search..].find(OPEN)?;
            let name_start = open + OPEN.len();
            let close = name_start + self.template[name_start..].find('}')?;

            if close > name_start && bytes.get(close + 1) == Some(&b'}') {
                return Some((open, name_start..close, close + 2));
            }

            // Any `{{` between `open` and `close` would hit the same `}` and
            // fail the same way, so resume just past it.
            search = close + 1;
        }
    }

    fn literal(&self, span: Range<usize>) -> Token<'a> {
        Token::Literal {
            text: &self.template[span.clone()],
            span,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }
        if self.pos >= self.template.len() {
            return None;
        }

        let start = self.pos;
        match self.next_placeholder(start) {
            Some((open, name, end)) => {
                let placeholder = Token::Placeholder {
                    name: &self.template[name],
                    span: open..end,
                };
                self.pos = end;
                if open > start {
                    self.pending = Some(placeholder);
                    Some(self.literal(start..open))
                } else {
                    Some(placeholder)
                }
            }
            None => {
                self.pos = self.template.len();
                Some(self.literal(start..self.template.len()))
            }
        }
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

/// Placeholder names in order of appearance (duplicates kept)
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    tokenize(template).filter_map(|token| match token {
        Token::Placeholder { name, .. } => Some(name),
        Token::Literal { .. } => None,
    })
}

/// Set of refs a template may use: component refs plus fragment keys
///
/// Insertion-ordered so highlight colors stay stable between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownRefs {
    refs: IndexSet<String>,
}

impl KnownRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Component refs (section order) followed by fragment keys. Empty refs
    /// are skipped: they can never match a placeholder.
    pub fn from_schema(schema: &Schema) -> Self {
        let components = schema.component_refs().map(|r| r.as_str());
        let fragments = schema.fragments.keys().map(String::as_str);
        components.chain(fragments).collect()
    }

    pub fn insert(&mut self, reference: impl Into<String>) -> bool {
        let reference = reference.into();
        if reference.is_empty() {
            return false;
        }
        self.refs.insert(reference)
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.refs.contains(reference)
    }

    /// Position in insertion order
    pub fn index_of(&self, reference: &str) -> Option<usize> {
        self.refs.get_index_of(reference)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.refs.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for KnownRefs {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut known = KnownRefs::new();
        for reference in iter {
            known.insert(reference);
        }
        known
    }
}

/// Whether a placeholder's ref is in the known set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolvable,
    Unresolvable,
}

/// Classified template piece for highlighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal {
        text: &'a str,
        span: Range<usize>,
    },
    Placeholder {
        name: &'a str,
        /// `{{name}}` exactly as written
        raw: &'a str,
        span: Range<usize>,
        resolution: Resolution,
    },
}

impl<'a> Segment<'a> {
    /// Source text of this segment; concatenating all of them rebuilds the template
    pub fn source(&self) -> &'a str {
        match self {
            Segment::Literal { text, .. } => text,
            Segment::Placeholder { raw, .. } => raw,
        }
    }

    pub fn is_unresolvable(&self) -> bool {
        matches!(
            self,
            Segment::Placeholder {
                resolution: Resolution::Unresolvable,
                ..
            }
        )
    }
}

/// Lazy classification pass. Holds no state beyond the scan position.
#[derive(Debug, Clone)]
pub struct Classified<'a, 'k> {
    template: &'a str,
    tokens: Tokens<'a>,
    known: &'k KnownRefs,
}

/// Classify every placeholder of `template` against `known`
pub fn classify<'a, 'k>(template: &'a str, known: &'k KnownRefs) -> Classified<'a, 'k> {
    Classified {
        template,
        tokens: tokenize(template),
        known,
    }
}

impl<'a> Iterator for Classified<'a, '_> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = match self.tokens.next()? {
            Token::Literal { text, span } => Segment::Literal { text, span },
            Token::Placeholder { name, span } => Segment::Placeholder {
                name,
                raw: &self.template[span.clone()],
                span,
                resolution: if self.known.contains(name) {
                    Resolution::Resolvable
                } else {
                    Resolution::Unresolvable
                },
            },
        };
        Some(segment)
    }
}

impl std::iter::FusedIterator for Classified<'_, '_> {}

/// Outcome of the save gate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Publishability {
    /// Distinct unresolvable refs, first-seen order
    offending: Vec<String>,
}

impl Publishability {
    pub fn is_publishable(&self) -> bool {
        self.offending.is_empty()
    }

    pub fn offending(&self) -> &[String] {
        &self.offending
    }

    /// Turn the flag into a hard error for callers that persist
    pub fn into_result(self) -> Result<()> {
        if self.offending.is_empty() {
            Ok(())
        } else {
            Err(PromptorError::UnpublishableTemplate {
                refs: self.offending,
            })
        }
    }
}

/// A template is publishable when every placeholder ref is known
pub fn check_publishable(template: &str, known: &KnownRefs) -> Publishability {
    let mut offending: IndexSet<&str> = IndexSet::new();
    for name in placeholders(template) {
        if !known.contains(name) {
            offending.insert(name);
        }
    }
    Publishability {
        offending: offending.into_iter().map(String::from).collect(),
    }
}

/// What substitution does with a placeholder that has neither a form value
/// nor a fragment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Leave `{{ref}}` in the output verbatim
    #[default]
    Keep,
    /// Replace with nothing
    Blank,
    /// Fail with [`PromptorError::UnresolvedPlaceholders`]
    Error,
}

impl FromStr for UnresolvedPolicy {
    type Err = PromptorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(UnresolvedPolicy::Keep),
            "blank" => Ok(UnresolvedPolicy::Blank),
            "error" => Ok(UnresolvedPolicy::Error),
            other => Err(PromptorError::ConfigError {
                reason: format!("unknown unresolved policy '{}' (keep, blank, error)", other),
            }),
        }
    }
}

impl std::fmt::Display for UnresolvedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnresolvedPolicy::Keep => write!(f, "keep"),
            UnresolvedPolicy::Blank => write!(f, "blank"),
            UnresolvedPolicy::Error => write!(f, "error"),
        }
    }
}

/// Substitute with the default policy (unresolved placeholders kept verbatim)
pub fn substitute<'a>(
    template: &'a str,
    form: &FormState,
    fragments: &IndexMap<String, String>,
) -> Cow<'a, str> {
    fill(template, form, fragments, |_, raw, out| out.push_str(raw))
}

/// Replace every `{{ref}}`: FormState entry if the key is present (even when
/// empty), else the fragment body, else per `policy`.
///
/// Returns `Cow::Borrowed` when the template has no placeholders.
pub fn substitute_with<'a>(
    template: &'a str,
    form: &FormState,
    fragments: &IndexMap<String, String>,
    policy: UnresolvedPolicy,
) -> Result<Cow<'a, str>> {
    match policy {
        UnresolvedPolicy::Keep => Ok(substitute(template, form, fragments)),
        UnresolvedPolicy::Blank => Ok(fill(template, form, fragments, |_, _, _| {})),
        UnresolvedPolicy::Error => {
            let mut unresolved: IndexSet<&str> = IndexSet::new();
            let text = fill(template, form, fragments, |name, _, _| {
                unresolved.insert(name);
            });
            if unresolved.is_empty() {
                Ok(text)
            } else {
                Err(PromptorError::UnresolvedPlaceholders {
                    refs: unresolved.into_iter().map(String::from).collect(),
                })
            }
        }
    }
}

/// One substitution pass. `on_unresolved(name, raw, out)` handles
/// placeholders with neither a form value nor a fragment.
fn fill<'a, F>(
    template: &'a str,
    form: &FormState,
    fragments: &IndexMap<String, String>,
    mut on_unresolved: F,
) -> Cow<'a, str>
where
    F: FnMut(&'a str, &'a str, &mut String),
{
    if !template.contains(OPEN) {
        return Cow::Borrowed(template);
    }

    let mut result = String::with_capacity(template.len() + 64);
    let mut replaced = 0usize;

    for token in tokenize(template) {
        match token {
            Token::Literal { text, .. } => result.push_str(text),
            Token::Placeholder { name, span } => {
                replaced += 1;
                if let Some(value) = form.text(name) {
                    result.push_str(&value);
                } else if let Some(body) = fragments.get(name) {
                    result.push_str(body);
                } else {
                    on_unresolved(name, &template[span], &mut result);
                }
            }
        }
    }

    tracing::trace!(placeholders = replaced, len = result.len(), "substituted template");

    if replaced == 0 {
        return Cow::Borrowed(template);
    }
    Cow::Owned(result)
}
