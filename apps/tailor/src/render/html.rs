//! Standalone HTML writer. Styling comes from the document's layout variant; the
//! structure is identical for every template.

use std::fmt::Write;

use crate::render::document::{Document, Section, SectionBody, SectionKind};
use crate::render::variants::{HeaderAlignment, SectionRule, PAGE_MAX_WIDTH_PX};

pub fn to_html(document: &Document) -> String {
    let layout = &document.layout;
    let mut out = String::with_capacity(4096);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape(&document.header.full_name));
    let _ = writeln!(
        out,
        "<style>body{{margin:0 auto;max-width:{}px;padding:{}px;font-family:{};font-size:{}pt;line-height:{};}}\
         h2{{text-transform:uppercase;font-size:1em;margin:1.2em 0 0.4em;{}}}\
         .row{{display:flex;justify-content:space-between;}}ul{{margin:0.2em 0 0.6em;}}</style>",
        PAGE_MAX_WIDTH_PX,
        layout.padding_px,
        layout.font.css_stack(),
        layout.font_size_pt,
        layout.line_spacing.factor(),
        heading_css(layout.section_rule),
    );
    out.push_str("</head>\n<body>\n");

    let align = match document.header.alignment {
        HeaderAlignment::Left => "left",
        HeaderAlignment::Center => "center",
    };
    let _ = writeln!(out, "<header style=\"text-align:{align}\">");
    let _ = writeln!(out, "<h1>{}</h1>", escape(&document.header.full_name));
    if !document.header.contact.is_empty() {
        let contact: Vec<String> = document.header.contact.iter().map(|c| escape(c)).collect();
        let _ = writeln!(out, "<p class=\"contact\">{}</p>", contact.join(" &bull; "));
    }
    out.push_str("</header>\n");

    for section in &document.sections {
        write_section(&mut out, section);
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn heading_css(rule: SectionRule) -> &'static str {
    match rule {
        SectionRule::Hairline => "border-bottom:1px solid #ccc;",
        SectionRule::Prominent => "border-bottom:2px solid #222;",
        SectionRule::Banded => "background:#eee;padding:0.2em 0.5em;",
    }
}

fn write_section(out: &mut String, section: &Section) {
    let _ = writeln!(out, "<section class=\"{}\">", kind_class(section));
    let _ = writeln!(out, "<h2>{}</h2>", escape(section.title));
    match &section.body {
        SectionBody::Paragraph { lines } => {
            let _ = writeln!(out, "<p>{}</p>", escape(&lines.join(" ")));
        }
        SectionBody::Experience { entries } => {
            for entry in entries {
                let _ = writeln!(
                    out,
                    "<div class=\"row\"><strong>{}</strong><span>{}</span></div>",
                    escape(&entry.organization),
                    escape(&entry.period)
                );
                if !entry.title.is_empty() {
                    let _ = writeln!(out, "<div><em>{}</em></div>", escape(&entry.title));
                }
                if !entry.bullets.is_empty() {
                    out.push_str("<ul>\n");
                    for bullet in &entry.bullets {
                        let _ = writeln!(out, "<li>{}</li>", escape(&bullet.text));
                    }
                    out.push_str("</ul>\n");
                }
            }
        }
        SectionBody::Skills { items, .. } => {
            out.push_str("<ul class=\"skills\">\n");
            for item in items {
                let _ = writeln!(out, "<li>{}</li>", escape(item));
            }
            out.push_str("</ul>\n");
        }
        SectionBody::Education { entries } => {
            for entry in entries {
                let _ = writeln!(
                    out,
                    "<div class=\"row\"><strong>{}</strong><span>{}</span></div>\n<div>{}</div>",
                    escape(&entry.credential),
                    escape(&entry.year),
                    escape(&entry.institution)
                );
            }
        }
        SectionBody::Projects { entries } => {
            for entry in entries {
                let _ = writeln!(
                    out,
                    "<div><strong>{}</strong></div>\n<p>{}</p>",
                    escape(&entry.name),
                    escape(&entry.description.join(" "))
                );
            }
        }
    }
    out.push_str("</section>\n");
}

fn kind_class(section: &Section) -> &'static str {
    match section.kind {
        SectionKind::Summary => "summary",
        SectionKind::Experience => "experience",
        SectionKind::Skills => "skills",
        SectionKind::Education => "education",
        SectionKind::Projects => "projects",
    }
}

/// Minimal HTML text escaping.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::engine::render;
    use crate::render::gallery::sample_content;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape("R&D <lead> \"x\""), "R&amp;D &lt;lead&gt; &quot;x&quot;");
    }

    #[test]
    fn test_html_uses_variant_font_and_alignment() {
        let html = to_html(&render(&sample_content(), "tech-focused"));
        assert!(html.contains("Courier"));
        assert!(html.contains("text-align:left"));
        assert!(html.contains("Expertise &amp; Skills"));
    }

    #[test]
    fn test_html_escapes_user_content() {
        let mut content = sample_content();
        content.full_name = "<script>alert(1)</script>".to_string();
        let html = to_html(&render(&content, "minimal-pro"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("text-align:center"));
    }

    #[test]
    fn test_html_is_deterministic() {
        let content = sample_content();
        assert_eq!(
            to_html(&render(&content, "fresher-grad")),
            to_html(&render(&content, "fresher-grad"))
        );
    }
}
