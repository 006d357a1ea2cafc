//! Layout-variant registry.
//!
//! A template id resolves to a [`LayoutVariant`]: typography, spacing, header alignment
//! and the section-heading rule. Variants never change which sections appear or in what
//! order. Adding a template means adding a [`REGISTRY`] entry; unknown ids resolve to
//! [`DEFAULT_VARIANT`].

use serde::Serialize;

use crate::models::TemplateDescriptor;
use crate::render::metrics::FontFamily;

/// Page content never grows wider than this, whatever the viewport.
pub const PAGE_MAX_WIDTH_PX: u16 = 800;

/// CSS px per typographic point.
const PX_PER_PT: f32 = 4.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSpacing {
    Tight,
    Snug,
    Normal,
    Relaxed,
}

impl LineSpacing {
    pub fn factor(self) -> f32 {
        match self {
            LineSpacing::Tight => 1.25,
            LineSpacing::Snug => 1.375,
            LineSpacing::Normal => 1.5,
            LineSpacing::Relaxed => 1.625,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderAlignment {
    Left,
    Center,
}

/// How section headings are set off from their content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionRule {
    /// Small caps with a thin dark underline.
    Hairline,
    /// Larger heading over a light full-width rule.
    Prominent,
    /// Small heading on a shaded band.
    Banded,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutVariant {
    pub key: &'static str,
    pub font: FontFamily,
    pub font_size_pt: u8,
    pub line_spacing: LineSpacing,
    pub padding_px: u16,
    pub header_alignment: HeaderAlignment,
    pub section_rule: SectionRule,
}

impl LayoutVariant {
    /// Usable text width in em at this variant's font size.
    pub fn text_width_em(&self) -> f32 {
        let usable_px = f32::from(PAGE_MAX_WIDTH_PX - 2 * self.padding_px);
        usable_px / (f32::from(self.font_size_pt) * PX_PER_PT)
    }

    /// Approximate characters per line, used by the plain-text writer.
    pub fn columns(&self) -> usize {
        (self.text_width_em() / self.font.metrics().average_width()).floor() as usize
    }
}

/// One selectable template known to the engine.
#[derive(Debug, Clone, Copy)]
pub struct RegisteredTemplate {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub layout: LayoutVariant,
}

impl RegisteredTemplate {
    pub fn descriptor(&self) -> TemplateDescriptor {
        TemplateDescriptor {
            id: self.id.to_string(),
            display_name: self.display_name.to_string(),
            description: self.description.to_string(),
            category: self.category.to_string(),
            preview_url: None,
        }
    }
}

pub static DEFAULT_VARIANT: LayoutVariant = LayoutVariant {
    key: "default",
    font: FontFamily::Sans,
    font_size_pt: 11,
    line_spacing: LineSpacing::Relaxed,
    padding_px: 48,
    header_alignment: HeaderAlignment::Left,
    section_rule: SectionRule::Hairline,
};

pub static REGISTRY: [RegisteredTemplate; 4] = [
    RegisteredTemplate {
        id: "minimal-pro",
        display_name: "Minimal Pro",
        description: "Classic serif layout with a centered header.",
        category: "professional",
        layout: LayoutVariant {
            key: "minimal-pro",
            font: FontFamily::Serif,
            font_size_pt: 11,
            line_spacing: LineSpacing::Relaxed,
            padding_px: 48,
            header_alignment: HeaderAlignment::Center,
            section_rule: SectionRule::Hairline,
        },
    },
    RegisteredTemplate {
        id: "modern-ats",
        display_name: "Modern ATS",
        description: "Compact sans-serif layout tuned for applicant tracking systems.",
        category: "professional",
        layout: LayoutVariant {
            key: "modern-ats",
            font: FontFamily::Sans,
            font_size_pt: 10,
            line_spacing: LineSpacing::Tight,
            padding_px: 40,
            header_alignment: HeaderAlignment::Left,
            section_rule: SectionRule::Prominent,
        },
    },
    RegisteredTemplate {
        id: "tech-focused",
        display_name: "Tech Focused",
        description: "Dense monospace layout for engineering roles.",
        category: "technical",
        layout: LayoutVariant {
            key: "tech-focused",
            font: FontFamily::Mono,
            font_size_pt: 9,
            line_spacing: LineSpacing::Snug,
            padding_px: 32,
            header_alignment: HeaderAlignment::Left,
            section_rule: SectionRule::Banded,
        },
    },
    RegisteredTemplate {
        id: "fresher-grad",
        display_name: "Fresher Grad",
        description: "Generous spacing for entry-level resumes.",
        category: "entry-level",
        layout: LayoutVariant {
            key: "fresher-grad",
            font: FontFamily::Sans,
            font_size_pt: 11,
            line_spacing: LineSpacing::Normal,
            padding_px: 48,
            header_alignment: HeaderAlignment::Center,
            section_rule: SectionRule::Hairline,
        },
    },
];

/// Looks up a registered template by id.
pub fn lookup(template_id: &str) -> Option<&'static RegisteredTemplate> {
    REGISTRY.iter().find(|t| t.id == template_id)
}

/// Resolves any id to a layout. Never fails.
pub fn resolve_variant(template_id: &str) -> &'static LayoutVariant {
    lookup(template_id)
        .map(|t| &t.layout)
        .unwrap_or(&DEFAULT_VARIANT)
}

pub fn is_known_template(template_id: &str) -> bool {
    lookup(template_id).is_some()
}

/// Descriptors for every registered template, in registry order.
pub fn builtin_templates() -> Vec<TemplateDescriptor> {
    REGISTRY.iter().map(RegisteredTemplate::descriptor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids_resolve_to_their_variant() {
        for template in &REGISTRY {
            assert_eq!(resolve_variant(template.id).key, template.id);
        }
    }

    #[test]
    fn test_unknown_id_resolves_to_default() {
        assert_eq!(resolve_variant("leadership-edge").key, "default");
        assert_eq!(resolve_variant("").key, "default");
        assert!(!is_known_template("leadership-edge"));
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let mut ids: Vec<&str> = REGISTRY.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), REGISTRY.len());
    }

    #[test]
    fn test_text_width_reflects_padding_and_font_size() {
        // (800 - 96) px / (11pt * 4/3) = 48em
        let minimal = resolve_variant("minimal-pro");
        assert!((minimal.text_width_em() - 48.0).abs() < 1e-3);
        let tech = resolve_variant("tech-focused");
        assert!(tech.text_width_em() > minimal.text_width_em());
    }

    #[test]
    fn test_columns_for_mono_variant() {
        // 736px / 12px = 61.33em; 61.33 / 0.6 = 102 columns
        assert_eq!(resolve_variant("tech-focused").columns(), 102);
    }

    #[test]
    fn test_builtin_descriptors_follow_registry_order() {
        let ids: Vec<String> = builtin_templates().into_iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec!["minimal-pro", "modern-ats", "tech-focused", "fresher-grad"]
        );
    }
}
