//! Schema Model - form definitions ("UIs")
//!
//! A [`Schema`] is authored and persisted as a unit:
//! - `sections`: ordered map of section key → [`Section`]
//! - `fragments`: reusable text blocks keyed by ref
//! - `colors`: opaque style tuples referenced by section `color` keys
//! - `template_text`: the `{{ref}}`-bearing template
//!
//! YAML layout mirrors the on-disk UI definitions:
//!
//! ```yaml
//! title: Newsletter
//! template: "Title: {{article_title}}"
//! colors:
//!   c1: ["#6f1d1b", "#ffe6a7"]
//! ui:
//!   topbar:
//!     header: false
//!     fixed: true
//!     color: c1
//!     components:
//!       - label: Article Title
//!         type: textinput
//!         required: true
//! ```

mod slug;

pub use slug::{derive_ref, Ref};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field widget kind (tag only, no payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    #[serde(rename = "textinput")]
    TextInput,
    #[serde(rename = "textarea")]
    TextArea,
    #[serde(rename = "dropdown")]
    Dropdown,
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentType::TextInput => write!(f, "textinput"),
            ComponentType::TextArea => write!(f, "textarea"),
            ComponentType::Dropdown => write!(f, "dropdown"),
        }
    }
}

/// Field widget kind with its kind-specific data
///
/// Options and the initial value only exist on dropdowns, so switching a
/// component away from `Dropdown` drops both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    TextInput,
    TextArea,
    Dropdown {
        options: Vec<String>,
        default: Option<String>,
    },
}

impl ComponentKind {
    /// Empty payload for a given type
    pub fn empty(ty: ComponentType) -> Self {
        match ty {
            ComponentType::TextInput => ComponentKind::TextInput,
            ComponentType::TextArea => ComponentKind::TextArea,
            ComponentType::Dropdown => ComponentKind::Dropdown {
                options: Vec::new(),
                default: None,
            },
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentKind::TextInput => ComponentType::TextInput,
            ComponentKind::TextArea => ComponentType::TextArea,
            ComponentKind::Dropdown { .. } => ComponentType::Dropdown,
        }
    }
}

/// One form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ComponentRaw", into = "ComponentRaw")]
pub struct Component {
    /// Display text (may be empty)
    pub label: String,
    /// Placeholder key
    pub reference: Ref,
    pub required: bool,
    pub kind: ComponentKind,
}

impl Component {
    /// New component whose ref is derived from `label`
    pub fn new(label: impl Into<String>, kind: ComponentKind) -> Self {
        let label = label.into();
        Self {
            reference: Ref::derive(&label),
            label,
            required: false,
            kind,
        }
    }

    /// Pin the ref instead of deriving it
    pub fn with_ref(mut self, reference: Ref) -> Self {
        self.reference = reference;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn component_type(&self) -> ComponentType {
        self.kind.component_type()
    }

    /// Dropdown options (empty for other kinds)
    pub fn options(&self) -> &[String] {
        match &self.kind {
            ComponentKind::Dropdown { options, .. } => options,
            _ => &[],
        }
    }

    /// Dropdown initial value
    pub fn default_value(&self) -> Option<&str> {
        match &self.kind {
            ComponentKind::Dropdown { default, .. } => default.as_deref(),
            _ => None,
        }
    }
}

/// Component as written in YAML (flat, `ref` optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ComponentRaw {
    #[serde(default)]
    label: String,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(rename = "type")]
    ty: ComponentType,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
}

impl From<ComponentRaw> for Component {
    fn from(raw: ComponentRaw) -> Self {
        let reference = match raw.reference {
            Some(explicit) => Ref::explicit(explicit),
            None => Ref::derive(&raw.label),
        };
        let kind = match raw.ty {
            ComponentType::TextInput => ComponentKind::TextInput,
            ComponentType::TextArea => ComponentKind::TextArea,
            ComponentType::Dropdown => ComponentKind::Dropdown {
                options: raw.options.unwrap_or_default(),
                default: raw.default,
            },
        };
        Component {
            label: raw.label,
            reference,
            required: raw.required,
            kind,
        }
    }
}

impl From<Component> for ComponentRaw {
    fn from(component: Component) -> Self {
        let ty = component.component_type();
        let (options, default) = match component.kind {
            ComponentKind::Dropdown { options, default } => (Some(options), default),
            _ => (None, None),
        };
        ComponentRaw {
            label: component.label,
            reference: Some(component.reference.as_str().to_string()),
            ty,
            required: component.required,
            options,
            default,
        }
    }
}

/// Group of components rendered together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Display title; `None` renders without a heading (`header: false`)
    #[serde(default, with = "header_format")]
    pub header: Option<String>,
    /// Pinned (e.g. a sticky top bar) vs flowing with the document
    #[serde(default)]
    pub fixed: bool,
    /// Key into [`Schema::colors`], not a color itself
    #[serde(default, rename = "color")]
    pub color_key: String,
    #[serde(default)]
    pub components: Vec<Component>,
}

/// `header: false | "Title"`
mod header_format {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HeaderRaw {
        Flag(bool),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<HeaderRaw>::deserialize(deserializer)?;
        Ok(match raw {
            Some(HeaderRaw::Text(text)) if !text.is_empty() => Some(text),
            _ => None,
        })
    }

    pub fn serialize<S>(header: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match header {
            Some(text) => text.serialize(serializer),
            None => false.serialize(serializer),
        }
    }
}

/// Ordered style tuple: background, foreground, then optional input slots
///
/// Opaque to the engine; only the slot count is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorStyle(pub Vec<String>);

impl ColorStyle {
    pub fn new<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(slots.into_iter().map(Into::into).collect())
    }

    pub fn background(&self) -> Option<&str> {
        self.slot(0)
    }

    pub fn foreground(&self) -> Option<&str> {
        self.slot(1)
    }

    pub fn input_background(&self) -> Option<&str> {
        self.slot(2)
    }

    pub fn input_foreground(&self) -> Option<&str> {
        self.slot(3)
    }

    pub fn slot(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A complete UI definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "template")]
    pub template_text: String,
    /// Fragment key → body. Shares the ref namespace with components.
    #[serde(default)]
    pub fragments: IndexMap<String, String>,
    #[serde(default)]
    pub colors: IndexMap<String, ColorStyle>,
    #[serde(default, rename = "ui", alias = "sections")]
    pub sections: IndexMap<String, Section>,
}

impl Schema {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML (whole record, replace-on-save)
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// All components in section order, paired with their section key
    pub fn components(&self) -> impl Iterator<Item = (&str, &Component)> {
        self.sections.iter().flat_map(|(key, section)| {
            section
                .components
                .iter()
                .map(move |component| (key.as_str(), component))
        })
    }

    /// Component refs in section order (may contain duplicates or empties
    /// if the schema is malformed)
    pub fn component_refs(&self) -> impl Iterator<Item = &Ref> {
        self.components().map(|(_, component)| &component.reference)
    }

    /// Find a component by ref
    pub fn component(&self, reference: &str) -> Option<&Component> {
        self.components()
            .map(|(_, component)| component)
            .find(|component| component.reference == reference)
    }

    /// Required components in section order
    pub fn required_components(&self) -> impl Iterator<Item = &Component> {
        self.components()
            .map(|(_, component)| component)
            .filter(|component| component.required)
    }

    /// Resolve a section's style, falling back to `fallback_key`
    pub fn style_for(&self, section: &Section, fallback_key: &str) -> Option<&ColorStyle> {
        self.colors
            .get(&section.color_key)
            .or_else(|| self.colors.get(fallback_key))
    }

    pub fn component_count(&self) -> usize {
        self.sections.values().map(|s| s.components.len()).sum()
    }
}
