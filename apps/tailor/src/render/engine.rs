//! The rendering engine: `ContentModel` + template id → laid-out `Document`.
//!
//! `render` is a pure function. It reads only its arguments and the static registry, so
//! any number of renders may run at once on any threads. Section order and inclusion are
//! the same for every variant:
//! header, summary, experience, skills, education, projects. A section whose data is
//! absent or empty is left out entirely.

use crate::models::{ContentModel, EducationEntry, ExperienceEntry, ProjectEntry};
use crate::render::document::{
    Bullet, Document, EducationBlock, ExperienceBlock, Header, ProjectBlock, Section,
    SectionBody, SectionKind,
};
use crate::render::metrics::FontMetrics;
use crate::render::variants::{lookup, LayoutVariant, DEFAULT_VARIANT};

/// Bullets are indented by this much relative to the text block.
const BULLET_INDENT_EM: f32 = 1.25;
/// Separator between packed skills on one line.
const SKILL_SEPARATOR: &str = "   ";
/// A heading takes its own line plus the rule or band under it.
const HEADING_LINES: usize = 2;
/// Name, contact line, and the header rule.
const HEADER_LINES: u32 = 3;

/// Renders `content` under the layout registered for `template_id`, or under the default
/// layout when the id is unknown.
pub fn render(content: &ContentModel, template_id: &str) -> Document {
    let (layout, known_template) = match lookup(template_id) {
        Some(template) => (&template.layout, true),
        None => (&DEFAULT_VARIANT, false),
    };
    let ctx = LayoutContext::new(layout);

    let mut sections = Vec::with_capacity(5);
    if let Some(summary) = content.summary() {
        sections.push(ctx.summary(summary));
    }
    if !content.experience.is_empty() {
        sections.push(ctx.experience(&content.experience));
    }
    if !content.skills.is_empty() {
        sections.push(ctx.skills(&content.skills));
    }
    if !content.education.is_empty() {
        sections.push(ctx.education(&content.education));
    }
    if !content.projects().is_empty() {
        sections.push(ctx.projects(content.projects()));
    }

    Document {
        template_id: template_id.to_string(),
        known_template,
        layout: *layout,
        text_width_em: ctx.width_em,
        header: ctx.header(content),
        sections,
    }
}

struct LayoutContext {
    layout: &'static LayoutVariant,
    metrics: &'static FontMetrics,
    width_em: f32,
}

impl LayoutContext {
    fn new(layout: &'static LayoutVariant) -> Self {
        Self {
            layout,
            metrics: layout.font.metrics(),
            width_em: layout.text_width_em(),
        }
    }

    fn header(&self, content: &ContentModel) -> Header {
        let contact_info = &content.contact_info;
        let contact = std::iter::once(contact_info.email.trim())
            .chain(contact_info.phone.as_deref().map(str::trim))
            .chain(contact_info.network_handle.as_deref().map(str::trim))
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();

        Header {
            full_name: content.full_name.trim().to_string(),
            contact,
            alignment: self.layout.header_alignment,
            estimated_lines: HEADER_LINES,
        }
    }

    fn section(&self, kind: SectionKind, body: SectionBody, body_lines: usize) -> Section {
        Section {
            kind,
            title: kind.title(),
            rule: self.layout.section_rule,
            body,
            estimated_lines: saturate(HEADING_LINES + body_lines),
        }
    }

    fn summary(&self, summary: &str) -> Section {
        let lines = self.metrics.wrap(summary, self.width_em);
        let count = lines.len();
        self.section(SectionKind::Summary, SectionBody::Paragraph { lines }, count)
    }

    fn experience(&self, entries: &[ExperienceEntry]) -> Section {
        let bullet_width = self.width_em - BULLET_INDENT_EM;
        let mut count = 0;
        let entries: Vec<ExperienceBlock> = entries
            .iter()
            .map(|entry| {
                let bullets: Vec<Bullet> = entry
                    .bullet_points
                    .iter()
                    .map(|point| Bullet {
                        text: point.clone(),
                        lines: self.metrics.wrap(point, bullet_width),
                    })
                    .collect();
                // organization/period line, title line, one blank line after the entry
                count += 3 + bullets.iter().map(|b| b.lines.len().max(1)).sum::<usize>();
                ExperienceBlock {
                    organization: entry.organization.clone(),
                    title: entry.title.clone(),
                    period: entry.period.clone(),
                    bullets,
                }
            })
            .collect();
        self.section(
            SectionKind::Experience,
            SectionBody::Experience { entries },
            count,
        )
    }

    fn skills(&self, skills: &[String]) -> Section {
        let tokens: Vec<String> = skills.iter().map(|s| format!("• {s}")).collect();
        let lines = self.metrics.pack(&tokens, SKILL_SEPARATOR, self.width_em);
        let count = lines.len();
        self.section(
            SectionKind::Skills,
            SectionBody::Skills {
                items: skills.to_vec(),
                lines,
            },
            count,
        )
    }

    fn education(&self, entries: &[EducationEntry]) -> Section {
        let entries: Vec<EducationBlock> = entries
            .iter()
            .map(|entry| EducationBlock {
                institution: entry.institution.clone(),
                credential: entry.credential.clone(),
                year: entry.year.clone(),
            })
            .collect();
        let count = entries.len() * 2;
        self.section(
            SectionKind::Education,
            SectionBody::Education { entries },
            count,
        )
    }

    fn projects(&self, projects: &[ProjectEntry]) -> Section {
        let entries: Vec<ProjectBlock> = projects
            .iter()
            .map(|project| ProjectBlock {
                name: project.name.clone(),
                description: self.metrics.wrap(&project.description, self.width_em),
            })
            .collect();
        let count = entries.iter().map(|p| 1 + p.description.len()).sum();
        self.section(
            SectionKind::Projects,
            SectionBody::Projects { entries },
            count,
        )
    }
}

fn saturate(lines: usize) -> u16 {
    u16::try_from(lines).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInfo, ProjectEntry};
    use crate::render::gallery::sample_content;
    use crate::render::variants::{HeaderAlignment, REGISTRY};

    fn make_minimal() -> ContentModel {
        ContentModel {
            full_name: "Dana Reyes".to_string(),
            contact_info: ContactInfo {
                email: "dana@example.com".to_string(),
                phone: None,
                network_handle: None,
            },
            summary: None,
            experience: vec![],
            skills: vec![],
            education: vec![],
            projects: None,
        }
    }

    fn kinds(document: &Document) -> Vec<SectionKind> {
        document.sections.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_minimal_content_renders_header_only() {
        let document = render(&make_minimal(), "minimal-pro");
        assert!(document.sections.is_empty());
        assert_eq!(document.header.full_name, "Dana Reyes");
        assert_eq!(document.header.contact, vec!["dana@example.com"]);
    }

    #[test]
    fn test_sections_follow_fixed_order() {
        let mut content = sample_content();
        content.projects = Some(vec![ProjectEntry {
            name: "Ledger".to_string(),
            description: "Event-sourced accounting core".to_string(),
        }]);
        for template in &REGISTRY {
            let document = render(&content, template.id);
            assert_eq!(
                kinds(&document),
                vec![
                    SectionKind::Summary,
                    SectionKind::Experience,
                    SectionKind::Skills,
                    SectionKind::Education,
                    SectionKind::Projects,
                ]
            );
        }
    }

    #[test]
    fn test_empty_projects_section_is_omitted() {
        let mut content = sample_content();
        content.projects = Some(vec![]);
        let first = render(&content, "modern-ats");
        let second = render(&content, "modern-ats");
        assert!(!first.has_section(SectionKind::Projects));
        assert_eq!(first, second);
    }

    #[test]
    fn test_blank_summary_is_omitted() {
        let mut content = sample_content();
        content.summary = Some("  \n ".to_string());
        let document = render(&content, "minimal-pro");
        assert!(!document.has_section(SectionKind::Summary));
    }

    #[test]
    fn test_render_is_deterministic_for_every_known_template() {
        let content = sample_content();
        for template in &REGISTRY {
            let first = render(&content, template.id);
            let second = render(&content, template.id);
            assert_eq!(first.to_string(), second.to_string());
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
            assert!(first.known_template);
        }
    }

    #[test]
    fn test_unknown_template_falls_back_to_default_layout() {
        let document = render(&sample_content(), "leadership-edge");
        assert!(!document.known_template);
        assert_eq!(document.template_id, "leadership-edge");
        assert_eq!(document.layout, DEFAULT_VARIANT);
        assert_eq!(document.sections.len(), 4);
    }

    #[test]
    fn test_bullets_keep_source_order_without_truncation() {
        let content = sample_content();
        let document = render(&content, "tech-focused");
        let Some(SectionBody::Experience { entries }) =
            document.section(SectionKind::Experience).map(|s| &s.body)
        else {
            panic!("experience section missing");
        };
        let texts: Vec<&str> = entries[0].bullets.iter().map(|b| b.text.as_str()).collect();
        let expected: Vec<&str> = content.experience[0]
            .bullet_points
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_long_bullet_wraps_but_keeps_all_words() {
        let mut content = make_minimal();
        let point = "Designed and shipped a multi-region event ingestion pipeline handling \
                     two billion events per day with exactly-once delivery semantics and \
                     automated failover between three cloud providers"
            .to_string();
        content.experience = vec![ExperienceEntry {
            organization: "Acme".to_string(),
            title: "Staff Engineer".to_string(),
            period: "2021 - Present".to_string(),
            bullet_points: vec![point.clone()],
        }];
        let document = render(&content, "minimal-pro");
        let Some(SectionBody::Experience { entries }) =
            document.section(SectionKind::Experience).map(|s| &s.body)
        else {
            panic!("experience section missing");
        };
        let bullet = &entries[0].bullets[0];
        assert!(bullet.lines.len() > 1);
        let words: Vec<&str> = point.split_whitespace().collect();
        assert_eq!(bullet.lines.join(" "), words.join(" "));
    }

    #[test]
    fn test_header_alignment_follows_variant() {
        let content = sample_content();
        assert_eq!(
            render(&content, "fresher-grad").header.alignment,
            HeaderAlignment::Center
        );
        assert_eq!(
            render(&content, "modern-ats").header.alignment,
            HeaderAlignment::Left
        );
    }

    #[test]
    fn test_variants_differ_only_in_presentation() {
        let content = sample_content();
        let serif = render(&content, "minimal-pro");
        let mono = render(&content, "tech-focused");
        assert_ne!(serif.layout, mono.layout);
        assert_eq!(kinds(&serif), kinds(&mono));
        assert_eq!(serif.header.contact, mono.header.contact);
    }

    #[test]
    fn test_estimated_lines_counts_every_section() {
        let document = render(&sample_content(), "modern-ats");
        let section_total: u32 = document
            .sections
            .iter()
            .map(|s| u32::from(s.estimated_lines))
            .sum();
        assert_eq!(document.estimated_lines(), HEADER_LINES + section_total);
        assert!(document.sections.iter().all(|s| s.estimated_lines >= 3));
    }
}
