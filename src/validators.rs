//! Validation layer implementations
//!
//! Each layer validates a specific aspect of a schema:
//! - Layer 1: Structure - refs, fragment keys, dropdown payloads
//! - Layer 2: Template - every placeholder resolves (the save gate)
//! - Layer 3: Style - color table and section color keys

use std::collections::HashMap;

use crate::errors::{Severity, ValidationError, ValidationLayer};
use crate::schema::{ComponentKind, Schema};
use crate::template::{check_publishable, placeholders, KnownRefs};

/// Layer 1: Validate refs and component payloads
pub fn validate_structure(schema: &Schema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // ref -> section it was first seen in
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (section, component) in schema.components() {
        let reference = component.reference.as_str();

        if reference.is_empty() {
            errors.push(ValidationError::EmptyRef {
                layer: ValidationLayer::Structure,
                section: section.to_string(),
                label: component.label.clone(),
            });
        } else if let Some(first) = seen.insert(reference, section) {
            errors.push(ValidationError::DuplicateRef {
                layer: ValidationLayer::Structure,
                reference: reference.to_string(),
                first_section: first.to_string(),
                second_section: section.to_string(),
            });
            // keep reporting against the first occurrence
            seen.insert(reference, first);
        }

        if let ComponentKind::Dropdown { options, default } = &component.kind {
            if options.is_empty() {
                errors.push(ValidationError::DropdownWithoutOptions {
                    layer: ValidationLayer::Structure,
                    reference: reference.to_string(),
                    severity: Severity::Warning,
                });
            } else if let Some(default) = default {
                if !options.iter().any(|o| o == default) {
                    errors.push(ValidationError::DefaultNotInOptions {
                        layer: ValidationLayer::Structure,
                        reference: reference.to_string(),
                        default: default.clone(),
                        options: options.clone(),
                        severity: Severity::Warning,
                    });
                }
            }
        }
    }

    for key in schema.fragments.keys() {
        if key.is_empty() {
            errors.push(ValidationError::EmptyFragmentKey {
                layer: ValidationLayer::Structure,
            });
        } else if let Some(section) = seen.get(key.as_str()) {
            errors.push(ValidationError::FragmentRefCollision {
                layer: ValidationLayer::Structure,
                reference: key.clone(),
                section: section.to_string(),
            });
        }
    }

    errors
}

/// Layer 2: Validate template placeholders against the known refs
///
/// Unresolvable placeholders in the template are errors. Placeholders inside
/// fragment bodies are never expanded, so they only warn.
pub fn validate_template(schema: &Schema, known: &KnownRefs) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let publishability = check_publishable(&schema.template_text, known);
    for reference in publishability.offending() {
        errors.push(ValidationError::UnresolvedPlaceholder {
            layer: ValidationLayer::Template,
            reference: reference.clone(),
            suggestions: find_similar(known, reference, 3),
        });
    }

    for (fragment, body) in &schema.fragments {
        let mut reported: Vec<&str> = Vec::new();
        for name in placeholders(body) {
            if reported.contains(&name) {
                continue;
            }
            reported.push(name);
            errors.push(ValidationError::FragmentPlaceholder {
                layer: ValidationLayer::Template,
                fragment: fragment.clone(),
                reference: name.to_string(),
                severity: Severity::Warning,
            });
        }
    }

    errors
}

/// Layer 3: Validate the color table and section color keys
pub fn validate_styles(schema: &Schema, fallback: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (key, style) in &schema.colors {
        if style.len() < 2 {
            errors.push(ValidationError::MalformedColor {
                layer: ValidationLayer::Style,
                key: key.clone(),
                slots: style.len(),
            });
        }
    }

    for (section, body) in &schema.sections {
        // An unset key means "use the fallback" on purpose
        if body.color_key.is_empty() {
            continue;
        }
        if !schema.colors.contains_key(&body.color_key) {
            errors.push(ValidationError::UnknownColorKey {
                layer: ValidationLayer::Style,
                section: section.clone(),
                color_key: body.color_key.clone(),
                fallback: fallback.to_string(),
                severity: Severity::Warning,
            });
        }
    }

    errors
}

/// Find similar known refs (for "did you mean?" suggestions)
pub fn find_similar(known: &KnownRefs, reference: &str, max_results: usize) -> Vec<String> {
    let lower = reference.trim().to_lowercase();
    if lower.is_empty() {
        return Vec::new();
    }
    known
        .iter()
        .filter(|k| {
            let k = k.to_lowercase();
            k.contains(&lower) || lower.contains(&k)
        })
        .take(max_results)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> Schema {
        Schema::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_duplicate_refs_across_sections() {
        let s = schema(
            r#"
ui:
  a:
    components:
      - label: Name
        type: textinput
  b:
    components:
      - label: name
        type: textarea
      - label: NAME!
        type: textarea
"#,
        );
        let errors = validate_structure(&s);
        assert_eq!(errors.len(), 2);
        for error in &errors {
            match error {
                ValidationError::DuplicateRef {
                    reference,
                    first_section,
                    second_section,
                    ..
                } => {
                    assert_eq!(reference, "name");
                    assert_eq!(first_section, "a");
                    assert_eq!(second_section, "b");
                }
                other => panic!("unexpected: {other}"),
            }
        }
    }

    #[test]
    fn test_empty_ref() {
        let s = schema(
            r#"
ui:
  a:
    components:
      - label: "(tbd)"
        type: textinput
"#,
        );
        let errors = validate_structure(&s);
        assert!(matches!(&errors[..], [ValidationError::EmptyRef { label, .. }] if label == "(tbd)"));
    }

    #[test]
    fn test_fragment_collides_with_component() {
        let s = schema(
            r#"
fragments:
  name: "text"
  "": "orphan"
ui:
  a:
    components:
      - label: Name
        type: textinput
"#,
        );
        let errors = validate_structure(&s);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::FragmentRefCollision { reference, .. } if reference == "name")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::EmptyFragmentKey { .. })));
    }

    #[test]
    fn test_dropdown_warnings() {
        let s = schema(
            r#"
ui:
  a:
    components:
      - label: Empty
        type: dropdown
      - label: Pick
        type: dropdown
        options: ["x", "y"]
        default: z
"#,
        );
        let errors = validate_structure(&s);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.severity() == Severity::Warning));
    }

    #[test]
    fn test_unresolved_template_refs() {
        let s = schema(
            r#"
template: "{{name}} {{nam}} {{zzz}} {{nam}}"
ui:
  a:
    components:
      - label: Name
        type: textinput
"#,
        );
        let known = KnownRefs::from_schema(&s);
        let errors = validate_template(&s, &known);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].unresolved_ref(), Some("nam"));
        assert_eq!(errors[0].suggestion(), Some("Did you mean: name?".to_string()));
        assert_eq!(errors[1].unresolved_ref(), Some("zzz"));
    }

    #[test]
    fn test_fragment_placeholders_warn_once() {
        let s = schema(
            r#"
template: "{{intro}}"
fragments:
  intro: "{{x}} and {{x}} and {{y}}"
"#,
        );
        let known = KnownRefs::from_schema(&s);
        let errors = validate_template(&s, &known);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.severity() == Severity::Warning));
    }

    #[test]
    fn test_style_checks() {
        let s = schema(
            r##"
colors:
  c1: ["#000"]
  bg: ["#111", "#eee"]
ui:
  a:
    color: c1
    components: []
  b:
    color: c9
    components: []
  c:
    components: []
"##,
        );
        let errors = validate_styles(&s, "bg");
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], ValidationError::MalformedColor { slots: 1, .. }));
        assert!(matches!(&errors[1], ValidationError::UnknownColorKey { color_key, .. } if color_key == "c9"));
    }

    #[test]
    fn test_find_similar() {
        let known: KnownRefs = ["employee_name", "employee_overall", "title"].into_iter().collect();
        assert_eq!(find_similar(&known, "employee", 3), vec!["employee_name", "employee_overall"]);
        assert_eq!(find_similar(&known, "employee", 1), vec!["employee_name"]);
        assert!(find_similar(&known, "  ", 3).is_empty());
    }
}
