//! Plain-text writer for a laid-out `Document`.
//!
//! Output is fully determined by the document, so two renders of the same content under
//! the same template print byte-identical text.

use std::fmt;

use crate::render::document::{Document, Section, SectionBody};
use crate::render::variants::{HeaderAlignment, SectionRule};

const CONTACT_SEPARATOR: &str = " • ";
const BULLET_PREFIX: &str = "  • ";
const BULLET_CONTINUATION: &str = "    ";

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.layout.columns();
        let align = |text: &str| match self.header.alignment {
            HeaderAlignment::Left => text.to_string(),
            HeaderAlignment::Center => center(text, columns),
        };

        writeln!(f, "{}", align(&self.header.full_name.to_uppercase()))?;
        if !self.header.contact.is_empty() {
            writeln!(f, "{}", align(&self.header.contact.join(CONTACT_SEPARATOR)))?;
        }
        writeln!(f, "{}", "=".repeat(columns))?;

        for section in &self.sections {
            writeln!(f)?;
            write_heading(f, section, columns)?;
            write_body(f, &section.body, columns)?;
        }
        Ok(())
    }
}

fn write_heading(f: &mut fmt::Formatter<'_>, section: &Section, columns: usize) -> fmt::Result {
    let title = section.title.to_uppercase();
    match section.rule {
        SectionRule::Hairline => {
            writeln!(f, "{title}")?;
            writeln!(f, "{}", "-".repeat(title.chars().count()))
        }
        SectionRule::Prominent => {
            writeln!(f, "{title}")?;
            writeln!(f, "{}", "=".repeat(columns))
        }
        SectionRule::Banded => {
            let band = format!("[ {title} ]");
            let fill = columns.saturating_sub(band.chars().count());
            writeln!(f, "{band}{}", "-".repeat(fill))?;
            writeln!(f)
        }
    }
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &SectionBody, columns: usize) -> fmt::Result {
    match body {
        SectionBody::Paragraph { lines } => {
            for line in lines {
                writeln!(f, "{line}")?;
            }
        }
        SectionBody::Experience { entries } => {
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "{}", spread(&entry.organization, &entry.period, columns))?;
                if !entry.title.is_empty() {
                    writeln!(f, "{}", entry.title)?;
                }
                for bullet in &entry.bullets {
                    for (j, line) in bullet.lines.iter().enumerate() {
                        let prefix = if j == 0 { BULLET_PREFIX } else { BULLET_CONTINUATION };
                        writeln!(f, "{prefix}{line}")?;
                    }
                }
            }
        }
        SectionBody::Skills { lines, .. } => {
            for line in lines {
                writeln!(f, "{line}")?;
            }
        }
        SectionBody::Education { entries } => {
            for entry in entries {
                writeln!(f, "{}", spread(&entry.credential, &entry.year, columns))?;
                writeln!(f, "{}", entry.institution)?;
            }
        }
        SectionBody::Projects { entries } => {
            for entry in entries {
                writeln!(f, "{}", entry.name)?;
                for line in &entry.description {
                    writeln!(f, "{BULLET_CONTINUATION}{line}")?;
                }
            }
        }
    }
    Ok(())
}

fn center(text: &str, columns: usize) -> String {
    let width = text.chars().count();
    let pad = columns.saturating_sub(width) / 2;
    format!("{}{text}", " ".repeat(pad))
}

/// `left` flush left and `right` flush right, with at least two spaces between.
fn spread(left: &str, right: &str, columns: usize) -> String {
    if right.is_empty() {
        return left.to_string();
    }
    let used = left.chars().count() + right.chars().count();
    let gap = columns.saturating_sub(used).max(2);
    format!("{left}{}{right}", " ".repeat(gap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::engine::render;
    use crate::render::gallery::sample_content;

    #[test]
    fn test_center_pads_left_only() {
        assert_eq!(center("abc", 9), "   abc");
        assert_eq!(center("too long", 4), "too long");
    }

    #[test]
    fn test_spread_right_aligns_period() {
        let line = spread("Acme", "2020", 12);
        assert_eq!(line, "Acme    2020");
        assert_eq!(spread("Acme", "", 12), "Acme");
        assert_eq!(spread("Acme Corp", "2020", 4), "Acme Corp  2020");
    }

    #[test]
    fn test_text_output_contains_every_section_title() {
        let text = render(&sample_content(), "modern-ats").to_string();
        assert!(text.starts_with("ALEX STERLING\n"));
        for title in ["PROFESSIONAL SUMMARY", "WORK EXPERIENCE", "EXPERTISE & SKILLS", "EDUCATION"] {
            assert!(text.contains(title), "missing {title}");
        }
        assert!(!text.contains("KEY PROJECTS"));
    }

    #[test]
    fn test_centered_header_is_indented() {
        let text = render(&sample_content(), "minimal-pro").to_string();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with(' '));
        assert_eq!(first.trim(), "ALEX STERLING");
    }

    #[test]
    fn test_banded_headings_for_tech_variant() {
        let text = render(&sample_content(), "tech-focused").to_string();
        assert!(text.contains("[ WORK EXPERIENCE ]"));
    }

    #[test]
    fn test_every_bullet_is_printed() {
        let content = sample_content();
        let text = render(&content, "fresher-grad").to_string();
        let bullet_lines = text.lines().filter(|l| l.starts_with(BULLET_PREFIX)).count();
        let expected: usize = content.experience.iter().map(|e| e.bullet_points.len()).sum();
        assert_eq!(bullet_lines, expected);
    }
}
