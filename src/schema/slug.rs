//! Ref derivation
//!
//! A component's ref is the placeholder name used in templates. It is derived
//! from the label with a deterministic slug:
//!
//! 1. strip `(...)` and `[...]` groups
//! 2. collapse each run of non-alphanumeric characters into one `_`
//! 3. trim leading/trailing `_`
//! 4. lowercase
//!
//! `"Work Performance (Q3 Review)!"` → `work_performance`

use std::borrow::Borrow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parenthesized or bracketed groups, non-nested
static GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").unwrap());

/// Runs of anything that is not an ASCII letter or digit
static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").unwrap());

/// Derive the ref slug for a label.
///
/// Total over any input: an empty or all-punctuation label yields `""`,
/// which the validators reject as unpublishable.
pub fn derive_ref(label: &str) -> String {
    let stripped = GROUP_RE.replace_all(label, "");
    let joined = SEPARATOR_RE.replace_all(&stripped, "_");
    joined.trim_matches('_').to_ascii_lowercase()
}

/// Placeholder key of a component
///
/// Written only by [`Ref::derive`] (from a label) or [`Ref::explicit`]
/// (system-defined fields and refs pinned in a schema file).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ref(String);

impl Ref {
    /// Derive a ref from a display label
    pub fn derive(label: &str) -> Self {
        Self(derive_ref(label))
    }

    /// Use a ref verbatim
    pub fn explicit(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `{{ref}}` as it appears in a template
    pub fn placeholder(&self) -> String {
        format!("{{{{{}}}}}", self.0)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ref {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Ref {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Ref {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Ref {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_groups_and_punctuation() {
        assert_eq!(derive_ref("Work Performance (Q3 Review)!"), "work_performance");
    }

    #[test]
    fn test_strips_brackets() {
        assert_eq!(derive_ref("Employee Name [required]"), "employee_name");
    }

    #[test]
    fn test_collapses_separator_runs() {
        assert_eq!(derive_ref("Overall/Notes"), "overall_notes");
        assert_eq!(derive_ref("a -- b __ c"), "a_b_c");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert_eq!(derive_ref(""), "");
        assert_eq!(derive_ref("(only a note)"), "");
        assert_eq!(derive_ref("!!!"), "");
    }

    #[test]
    fn test_non_ascii_is_a_separator() {
        assert_eq!(derive_ref("Café Menu"), "caf_menu");
    }

    #[test]
    fn test_unclosed_group_is_kept() {
        assert_eq!(derive_ref("Budget (draft"), "budget_draft");
    }

    #[test]
    fn test_idempotent_on_output() {
        for label in ["Work Performance (Q3 Review)!", "  Lead_Time  ", "X[1](2)Y"] {
            let once = derive_ref(label);
            assert_eq!(derive_ref(&once), once);
        }
    }

    #[test]
    fn test_ref_placeholder() {
        let r = Ref::derive("Employee Name");
        assert_eq!(r.as_str(), "employee_name");
        assert_eq!(r.placeholder(), "{{employee_name}}");
        assert_eq!(r, "employee_name");
    }

    #[test]
    fn test_explicit_ref_is_verbatim() {
        let r = Ref::explicit("employee_pronouns");
        assert_eq!(r.to_string(), "employee_pronouns");
    }
}
