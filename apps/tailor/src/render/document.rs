//! The laid-out document produced by the rendering engine.
//!
//! A `Document` is plain data: every text block already carries its wrapped lines for the
//! resolved layout, so writers only decide how to draw them.

use serde::Serialize;

use crate::render::variants::{HeaderAlignment, LayoutVariant, SectionRule};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// The id the caller asked for, even when it fell back to the default layout.
    pub template_id: String,
    /// False when `template_id` was not registered and the default layout was used.
    pub known_template: bool,
    pub layout: LayoutVariant,
    pub text_width_em: f32,
    pub header: Header,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.section(kind).is_some()
    }

    /// Estimated total height in text lines, header included.
    pub fn estimated_lines(&self) -> u32 {
        self.header.estimated_lines
            + self
                .sections
                .iter()
                .map(|s| u32::from(s.estimated_lines))
                .sum::<u32>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub full_name: String,
    /// Email first, then phone and network handle when present.
    pub contact: Vec<String>,
    pub alignment: HeaderAlignment,
    pub estimated_lines: u32,
}

/// Sections in their fixed render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Experience,
    Skills,
    Education,
    Projects,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Summary => "Professional Summary",
            SectionKind::Experience => "Work Experience",
            SectionKind::Skills => "Expertise & Skills",
            SectionKind::Education => "Education",
            SectionKind::Projects => "Key Projects",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: &'static str,
    pub rule: SectionRule,
    pub body: SectionBody,
    pub estimated_lines: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionBody {
    Paragraph { lines: Vec<String> },
    Experience { entries: Vec<ExperienceBlock> },
    Skills { items: Vec<String>, lines: Vec<String> },
    Education { entries: Vec<EducationBlock> },
    Projects { entries: Vec<ProjectBlock> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceBlock {
    pub organization: String,
    pub title: String,
    pub period: String,
    pub bullets: Vec<Bullet>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bullet {
    pub text: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationBlock {
    pub institution: String,
    pub credential: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectBlock {
    pub name: String,
    pub description: Vec<String>,
}
