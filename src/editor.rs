//! Schema editor - draft state with stable handles
//!
//! A [`SchemaDraft`] is what an authoring UI mutates between saves. Sections
//! and components live in an arena addressed by [`SectionId`] / [`ComponentId`]
//! so each edit is a keyed update instead of rebuilding the whole schema.
//! Handles are never reused, so a stale handle is an error rather than a
//! silent edit of some other field.
//!
//! [`SchemaDraft::build`] produces the [`Schema`] that gets validated and saved.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::error::{PromptorError, Result};
use crate::schema::{ColorStyle, Component, ComponentKind, ComponentType, Ref, Schema, Section};
use crate::store::ColorScheme;
use crate::template::{check_publishable, KnownRefs, Publishability};

/// Handle to a section in a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(u32);

/// Handle to a component in a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section #{}", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component #{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct SectionNode {
    key: String,
    header: Option<String>,
    fixed: bool,
    color_key: String,
    components: Vec<ComponentId>,
}

/// Editable schema
#[derive(Debug, Clone, Default)]
pub struct SchemaDraft {
    title: String,
    template: String,
    fragments: IndexMap<String, String>,
    colors: IndexMap<String, ColorStyle>,
    /// Insertion-ordered section arena
    sections: IndexMap<SectionId, SectionNode>,
    components: HashMap<ComponentId, Component>,
    /// Owning section of each component
    owners: HashMap<ComponentId, SectionId>,
    next_id: u32,
}

impl SchemaDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Open an existing schema for editing
    pub fn from_schema(schema: &Schema) -> Self {
        let mut draft = Self {
            title: schema.title.clone(),
            template: schema.template_text.clone(),
            fragments: schema.fragments.clone(),
            colors: schema.colors.clone(),
            ..Self::default()
        };

        for (key, section) in &schema.sections {
            let sid = SectionId(draft.alloc());
            let mut ids = Vec::with_capacity(section.components.len());
            for component in &section.components {
                let cid = ComponentId(draft.alloc());
                draft.components.insert(cid, component.clone());
                draft.owners.insert(cid, sid);
                ids.push(cid);
            }
            draft.sections.insert(
                sid,
                SectionNode {
                    key: key.clone(),
                    header: section.header.clone(),
                    fixed: section.fixed,
                    color_key: section.color_key.clone(),
                    components: ids,
                },
            );
        }

        draft
    }

    fn alloc(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn section_mut(&mut self, id: SectionId) -> Result<&mut SectionNode> {
        self.sections
            .get_mut(&id)
            .ok_or_else(|| PromptorError::StaleHandle {
                what: id.to_string(),
            })
    }

    fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component> {
        self.components
            .get_mut(&id)
            .ok_or_else(|| PromptorError::StaleHandle {
                what: id.to_string(),
            })
    }

    // ─────────────────────────────────────────────────────────────
    // Schema-level fields
    // ─────────────────────────────────────────────────────────────

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = template.into();
    }

    /// Insert `{{ref}}` at byte `offset` (clamped to the nearest char boundary
    /// at or before it). Returns the caret offset just after the insertion.
    pub fn insert_placeholder(&mut self, offset: usize, reference: &str) -> usize {
        let mut at = offset.min(self.template.len());
        while !self.template.is_char_boundary(at) {
            at -= 1;
        }
        let token = format!("{{{{{}}}}}", reference);
        self.template.insert_str(at, &token);
        at + token.len()
    }

    /// Replace the color table with a scheme's colors
    pub fn apply_color_scheme(&mut self, scheme: &ColorScheme) {
        self.colors = scheme.colors.clone();
    }

    pub fn colors(&self) -> &IndexMap<String, ColorStyle> {
        &self.colors
    }

    // ─────────────────────────────────────────────────────────────
    // Sections
    // ─────────────────────────────────────────────────────────────

    /// Append a section. It starts with the first color key and one empty,
    /// required text input.
    pub fn add_section(&mut self, key: impl Into<String>) -> Result<SectionId> {
        let key = key.into();
        if self.sections.values().any(|s| s.key == key) {
            return Err(PromptorError::DuplicateSectionKey { key });
        }

        let sid = SectionId(self.alloc());
        let color_key = self.colors.keys().next().cloned().unwrap_or_default();
        self.sections.insert(
            sid,
            SectionNode {
                key,
                header: None,
                fixed: false,
                color_key,
                components: Vec::new(),
            },
        );
        self.add_component(sid)?;
        Ok(sid)
    }

    /// Remove a section and all its components
    pub fn remove_section(&mut self, id: SectionId) -> Result<()> {
        let node = self
            .sections
            .shift_remove(&id)
            .ok_or_else(|| PromptorError::StaleHandle {
                what: id.to_string(),
            })?;
        for cid in node.components {
            self.components.remove(&cid);
            self.owners.remove(&cid);
        }
        Ok(())
    }

    pub fn section_ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections.keys().copied()
    }

    pub fn section_key(&self, id: SectionId) -> Option<&str> {
        self.sections.get(&id).map(|s| s.key.as_str())
    }

    pub fn set_header(&mut self, id: SectionId, header: Option<String>) -> Result<()> {
        self.section_mut(id)?.header = header.filter(|h| !h.is_empty());
        Ok(())
    }

    pub fn set_fixed(&mut self, id: SectionId, fixed: bool) -> Result<()> {
        self.section_mut(id)?.fixed = fixed;
        Ok(())
    }

    pub fn set_color(&mut self, id: SectionId, color_key: impl Into<String>) -> Result<()> {
        self.section_mut(id)?.color_key = color_key.into();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Components
    // ─────────────────────────────────────────────────────────────

    /// Append an empty required text input to a section
    pub fn add_component(&mut self, section: SectionId) -> Result<ComponentId> {
        if !self.sections.contains_key(&section) {
            return Err(PromptorError::StaleHandle {
                what: section.to_string(),
            });
        }
        let cid = ComponentId(self.alloc());
        let component = Component::new("", ComponentKind::TextInput).required(true);
        self.components.insert(cid, component);
        self.owners.insert(cid, section);
        self.section_mut(section)?.components.push(cid);
        Ok(cid)
    }

    pub fn remove_component(&mut self, id: ComponentId) -> Result<()> {
        self.components
            .remove(&id)
            .ok_or_else(|| PromptorError::StaleHandle {
                what: id.to_string(),
            })?;
        if let Some(sid) = self.owners.remove(&id) {
            if let Some(node) = self.sections.get_mut(&sid) {
                node.components.retain(|c| *c != id);
            }
        }
        Ok(())
    }

    pub fn component_ids(&self, section: SectionId) -> Option<&[ComponentId]> {
        self.sections.get(&section).map(|s| s.components.as_slice())
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Set the label and re-derive the ref from it
    pub fn set_label(&mut self, id: ComponentId, label: impl Into<String>) -> Result<()> {
        let component = self.component_mut(id)?;
        component.label = label.into();
        component.reference = Ref::derive(&component.label);
        Ok(())
    }

    /// Pin a ref that does not follow the label
    pub fn set_ref(&mut self, id: ComponentId, reference: Ref) -> Result<()> {
        self.component_mut(id)?.reference = reference;
        Ok(())
    }

    /// Change the widget kind. Leaving `Dropdown` drops options and default;
    /// setting the same kind keeps them.
    pub fn set_kind(&mut self, id: ComponentId, ty: ComponentType) -> Result<()> {
        let component = self.component_mut(id)?;
        if component.component_type() != ty {
            component.kind = ComponentKind::empty(ty);
        }
        Ok(())
    }

    pub fn set_required(&mut self, id: ComponentId, required: bool) -> Result<()> {
        self.component_mut(id)?.required = required;
        Ok(())
    }

    /// Replace dropdown options; no-op for other kinds
    pub fn set_options(&mut self, id: ComponentId, new_options: Vec<String>) -> Result<()> {
        if let ComponentKind::Dropdown { options, .. } = &mut self.component_mut(id)?.kind {
            *options = new_options;
        }
        Ok(())
    }

    /// Set the dropdown initial value; no-op for other kinds
    pub fn set_default(&mut self, id: ComponentId, value: Option<String>) -> Result<()> {
        if let ComponentKind::Dropdown { default, .. } = &mut self.component_mut(id)?.kind {
            *default = value;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Fragments
    // ─────────────────────────────────────────────────────────────

    pub fn add_fragment(&mut self, key: impl Into<String>, text: impl Into<String>) -> Result<()> {
        let key = key.into();
        if self.fragments.contains_key(&key) {
            return Err(PromptorError::DuplicateFragmentKey { key });
        }
        self.fragments.insert(key, text.into());
        Ok(())
    }

    pub fn remove_fragment(&mut self, key: &str) -> Option<String> {
        self.fragments.shift_remove(key)
    }

    /// Rename in place, keeping the fragment's position
    pub fn rename_fragment(&mut self, from: &str, to: impl Into<String>) -> Result<()> {
        let to = to.into();
        if from == to {
            return Ok(());
        }
        if self.fragments.contains_key(&to) {
            return Err(PromptorError::DuplicateFragmentKey { key: to });
        }
        let idx = self
            .fragments
            .get_index_of(from)
            .ok_or_else(|| PromptorError::StaleHandle {
                what: format!("fragment '{}'", from),
            })?;
        let (_, text) = self
            .fragments
            .shift_remove_index(idx)
            .ok_or_else(|| PromptorError::StaleHandle {
                what: format!("fragment '{}'", from),
            })?;
        self.fragments.shift_insert(idx, to, text);
        Ok(())
    }

    pub fn set_fragment_text(&mut self, key: &str, text: impl Into<String>) -> Result<()> {
        let body = self
            .fragments
            .get_mut(key)
            .ok_or_else(|| PromptorError::StaleHandle {
                what: format!("fragment '{}'", key),
            })?;
        *body = text.into();
        Ok(())
    }

    pub fn fragments(&self) -> &IndexMap<String, String> {
        &self.fragments
    }

    // ─────────────────────────────────────────────────────────────
    // Derived views
    // ─────────────────────────────────────────────────────────────

    /// Component refs in section order, then fragment keys
    pub fn known_refs(&self) -> KnownRefs {
        let components = self.sections.values().flat_map(|node| {
            node.components
                .iter()
                .filter_map(|cid| self.components.get(cid))
                .map(|c| c.reference.as_str())
        });
        components
            .chain(self.fragments.keys().map(String::as_str))
            .collect()
    }

    /// Save gate for the current template
    pub fn publishability(&self) -> Publishability {
        check_publishable(&self.template, &self.known_refs())
    }

    /// Materialize the draft in display order
    pub fn build(&self) -> Schema {
        let sections = self
            .sections
            .values()
            .map(|node| {
                let components = node
                    .components
                    .iter()
                    .filter_map(|cid| self.components.get(cid).cloned())
                    .collect();
                (
                    node.key.clone(),
                    Section {
                        header: node.header.clone(),
                        fixed: node.fixed,
                        color_key: node.color_key.clone(),
                        components,
                    },
                )
            })
            .collect();

        Schema {
            title: self.title.clone(),
            template_text: self.template.clone(),
            fragments: self.fragments.clone(),
            colors: self.colors.clone(),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_colors() -> SchemaDraft {
        let scheme = ColorScheme {
            id: "warm".to_string(),
            title: "Warm".to_string(),
            colors: [
                ("c1".to_string(), ColorStyle::new(["#6f1d1b", "#ffe6a7"])),
                ("bg".to_string(), ColorStyle::new(["#432818", "#d8d8d8"])),
            ]
            .into_iter()
            .collect(),
        };
        let mut draft = SchemaDraft::new("Eval");
        draft.apply_color_scheme(&scheme);
        draft
    }

    #[test]
    fn test_add_section_seeds_component_and_color() {
        let mut draft = draft_with_colors();
        let sid = draft.add_section("topbar").unwrap();

        let ids = draft.component_ids(sid).unwrap();
        assert_eq!(ids.len(), 1);
        let component = draft.component(ids[0]).unwrap();
        assert!(component.required);
        assert_eq!(component.component_type(), ComponentType::TextInput);

        let schema = draft.build();
        assert_eq!(schema.sections["topbar"].color_key, "c1");
    }

    #[test]
    fn test_duplicate_section_key() {
        let mut draft = SchemaDraft::new("x");
        draft.add_section("main").unwrap();
        assert!(matches!(
            draft.add_section("main"),
            Err(PromptorError::DuplicateSectionKey { .. })
        ));
    }

    #[test]
    fn test_label_derives_ref() {
        let mut draft = SchemaDraft::new("x");
        let sid = draft.add_section("main").unwrap();
        let cid = draft.component_ids(sid).unwrap()[0];

        draft.set_label(cid, "Work Performance (Q3 Review)!").unwrap();
        assert_eq!(draft.component(cid).unwrap().reference, "work_performance");

        draft.set_ref(cid, Ref::explicit("perf")).unwrap();
        assert_eq!(draft.component(cid).unwrap().reference, "perf");
    }

    #[test]
    fn test_kind_change_clears_dropdown_payload() {
        let mut draft = SchemaDraft::new("x");
        let sid = draft.add_section("main").unwrap();
        let cid = draft.component_ids(sid).unwrap()[0];

        draft.set_kind(cid, ComponentType::Dropdown).unwrap();
        draft.set_options(cid, vec!["a".into(), "b".into()]).unwrap();
        draft.set_default(cid, Some("a".into())).unwrap();

        // same kind keeps the payload
        draft.set_kind(cid, ComponentType::Dropdown).unwrap();
        assert_eq!(draft.component(cid).unwrap().options().len(), 2);

        draft.set_kind(cid, ComponentType::TextArea).unwrap();
        let component = draft.component(cid).unwrap();
        assert!(component.options().is_empty());
        assert_eq!(component.default_value(), None);

        // back to dropdown starts empty
        draft.set_kind(cid, ComponentType::Dropdown).unwrap();
        assert!(draft.component(cid).unwrap().options().is_empty());
    }

    #[test]
    fn test_options_ignored_on_text_kinds() {
        let mut draft = SchemaDraft::new("x");
        let sid = draft.add_section("main").unwrap();
        let cid = draft.component_ids(sid).unwrap()[0];
        draft.set_options(cid, vec!["a".into()]).unwrap();
        assert!(draft.component(cid).unwrap().options().is_empty());
    }

    #[test]
    fn test_stale_handles() {
        let mut draft = SchemaDraft::new("x");
        let sid = draft.add_section("main").unwrap();
        let cid = draft.component_ids(sid).unwrap()[0];

        draft.remove_component(cid).unwrap();
        assert!(matches!(
            draft.set_label(cid, "again"),
            Err(PromptorError::StaleHandle { .. })
        ));

        let other = draft.add_component(sid).unwrap();
        assert_ne!(other, cid);

        draft.remove_section(sid).unwrap();
        assert!(draft.component(other).is_none());
        assert!(matches!(
            draft.add_component(sid),
            Err(PromptorError::StaleHandle { .. })
        ));
    }

    #[test]
    fn test_build_preserves_order() {
        let mut draft = SchemaDraft::new("x");
        let a = draft.add_section("a").unwrap();
        let b = draft.add_section("b").unwrap();
        let c = draft.add_section("c").unwrap();
        draft.remove_section(b).unwrap();

        let second = draft.add_component(a).unwrap();
        draft.set_label(second, "Second").unwrap();
        let first = draft.component_ids(a).unwrap()[0];
        draft.set_label(first, "First").unwrap();
        draft.set_header(c, Some("Tail".into())).unwrap();

        let schema = draft.build();
        let keys: Vec<&str> = schema.sections.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "c"]);
        let refs: Vec<&str> = schema.component_refs().map(Ref::as_str).collect();
        assert_eq!(refs, vec!["first", "second", ""]);
        assert_eq!(schema.sections["c"].header.as_deref(), Some("Tail"));
    }

    #[test]
    fn test_insert_placeholder() {
        let mut draft = SchemaDraft::new("x");
        draft.set_template("Hello !");
        let caret = draft.insert_placeholder(6, "name");
        assert_eq!(draft.template(), "Hello {{name}}!");
        assert_eq!(caret, 14);

        // past the end appends
        draft.insert_placeholder(1000, "tail");
        assert!(draft.template().ends_with("{{tail}}"));
    }

    #[test]
    fn test_insert_placeholder_clamps_to_char_boundary() {
        let mut draft = SchemaDraft::new("x");
        draft.set_template("é");
        draft.insert_placeholder(1, "a");
        assert_eq!(draft.template(), "{{a}}é");
    }

    #[test]
    fn test_fragments() {
        let mut draft = SchemaDraft::new("x");
        draft.add_fragment("one", "1").unwrap();
        draft.add_fragment("two", "2").unwrap();
        assert!(draft.add_fragment("one", "again").is_err());

        draft.rename_fragment("one", "first").unwrap();
        let keys: Vec<&str> = draft.fragments().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["first", "two"]);
        assert!(matches!(
            draft.rename_fragment("first", "two"),
            Err(PromptorError::DuplicateFragmentKey { .. })
        ));

        draft.set_fragment_text("two", "deux").unwrap();
        assert_eq!(draft.fragments()["two"], "deux");
        assert_eq!(draft.remove_fragment("first").as_deref(), Some("1"));
    }

    #[test]
    fn test_publishability_tracks_edits() {
        let mut draft = SchemaDraft::new("x");
        let sid = draft.add_section("main").unwrap();
        let cid = draft.component_ids(sid).unwrap()[0];
        draft.set_template("{{name}} {{intro}}");

        let gate = draft.publishability();
        assert_eq!(gate.offending(), &["name".to_string(), "intro".to_string()]);

        draft.set_label(cid, "Name").unwrap();
        draft.add_fragment("intro", "Hi").unwrap();
        assert!(draft.publishability().is_publishable());
    }

    #[test]
    fn test_roundtrip_through_schema() {
        let schema = Schema::from_yaml(
            r#"
title: T
template: "{{a}}"
ui:
  s:
    header: H
    fixed: true
    components:
      - label: A
        type: textinput
        required: true
"#,
        )
        .unwrap();
        assert_eq!(SchemaDraft::from_schema(&schema).build(), schema);
    }
}
