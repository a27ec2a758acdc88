//! Ref colors for template highlighting
//!
//! Known refs get a color from a fixed palette, cycled in ref order, so the
//! same ref keeps the same color wherever it shows up (chips, template
//! text). Red is reserved for unresolvable placeholders and never appears
//! in the cycle.

use std::collections::HashMap;

use colored::{Color, ColoredString, Colorize};

use crate::template::{classify, KnownRefs, Segment};

/// Cycle for known refs (no red)
pub const PALETTE: [Color; 10] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::BrightCyan,
    Color::BrightGreen,
    Color::BrightYellow,
    Color::BrightBlue,
    Color::BrightMagenta,
];

/// Color of a placeholder whose ref is unknown
pub const UNRESOLVABLE: Color = Color::Red;

#[derive(Debug, Clone, Default)]
pub struct RefPalette {
    colors: HashMap<String, Color>,
}

impl RefPalette {
    pub fn new(known: &KnownRefs) -> Self {
        let colors = known
            .iter()
            .enumerate()
            .map(|(i, r)| (r.to_string(), PALETTE[i % PALETTE.len()]))
            .collect();
        Self { colors }
    }

    /// Palette color for a known ref, [`UNRESOLVABLE`] otherwise
    pub fn color_for(&self, reference: &str) -> Color {
        self.colors.get(reference).copied().unwrap_or(UNRESOLVABLE)
    }

    pub fn is_known(&self, reference: &str) -> bool {
        self.colors.contains_key(reference)
    }

    /// `reference` painted in its color
    pub fn paint(&self, reference: &str) -> ColoredString {
        reference.color(self.color_for(reference))
    }
}

/// Render `template` for a terminal: literals untouched, resolvable
/// placeholders in their ref color, unresolvable ones bold red
pub fn render_ansi(template: &str, known: &KnownRefs, palette: &RefPalette) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    for segment in classify(template, known) {
        match &segment {
            Segment::Literal { text, .. } => out.push_str(text),
            Segment::Placeholder { name, raw, .. } => {
                let painted = if segment.is_unresolvable() {
                    raw.color(UNRESOLVABLE).bold()
                } else {
                    raw.color(palette.color_for(name))
                };
                out.push_str(&painted.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_cycle_in_ref_order() {
        let refs: Vec<String> = (0..12).map(|i| format!("r{i}")).collect();
        let known: KnownRefs = refs.iter().cloned().collect();
        let palette = RefPalette::new(&known);

        assert_eq!(palette.color_for("r0"), PALETTE[0]);
        assert_eq!(palette.color_for("r3"), PALETTE[3]);
        assert_eq!(palette.color_for("r10"), PALETTE[0]);
        assert_eq!(palette.color_for("r11"), PALETTE[1]);
    }

    #[test]
    fn test_unknown_is_red() {
        let known: KnownRefs = ["name"].into_iter().collect();
        let palette = RefPalette::new(&known);
        assert!(palette.is_known("name"));
        assert!(!palette.is_known("nope"));
        assert_eq!(palette.color_for("nope"), UNRESOLVABLE);
    }

    #[test]
    fn test_palette_has_no_red() {
        assert!(!PALETTE.contains(&Color::Red));
        assert!(!PALETTE.contains(&Color::BrightRed));
    }

    #[test]
    fn test_render_keeps_text_without_color() {
        colored::control::set_override(false);
        let known: KnownRefs = ["name"].into_iter().collect();
        let palette = RefPalette::new(&known);
        let template = "Hi {{name}}, {{unknown}} {{";
        assert_eq!(render_ansi(template, &known, &palette), template);
        colored::control::unset_override();
    }
}
