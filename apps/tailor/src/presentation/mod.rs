//! Result Presentation: a completed job rendered through the template engine plus a
//! read-only score and feedback summary.

use std::fmt;

use serde::Serialize;

use crate::pipeline::{GenerationOutcome, NormalizedContent};
use crate::render::{render, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsWork,
}

impl ScoreBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            _ => ScoreBand::NeedsWork,
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent! Ready for applications.",
            ScoreBand::Good => "Good, but needs refinement.",
            ScoreBand::NeedsWork => "Needs significant improvement.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBadge {
    pub score: u8,
    pub band: ScoreBand,
    pub verdict: &'static str,
}

impl ScoreBadge {
    pub fn new(score: u8) -> Self {
        let band = ScoreBand::for_score(score);
        Self {
            score,
            band,
            verdict: band.verdict(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentView {
    Rendered { document: Document },
    /// Generated JSON that did not fit the resume shape, pretty-printed.
    Unstructured { text: String, reason: String },
    Raw { text: String, reason: String },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub template_id: String,
    pub content: ContentView,
    pub score: Option<ScoreBadge>,
    pub match_percentage: Option<u8>,
    pub missing_keywords: Vec<String>,
    pub analysis: Vec<String>,
    pub improvement_tips: Vec<String>,
}

/// Builds the view for a completed run. `fallback_template` is used when the job
/// carries no template id.
pub fn present(outcome: &GenerationOutcome, fallback_template: &str) -> ResultView {
    let template_id = outcome
        .job
        .template_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(fallback_template);
    present_as(outcome, template_id)
}

/// Builds the view under an explicitly chosen template, ignoring the job's own.
pub fn present_as(outcome: &GenerationOutcome, template_id: &str) -> ResultView {
    let template_id = template_id.to_string();
    let content = match &outcome.content {
        NormalizedContent::Document(model) => ContentView::Rendered {
            document: render(model, &template_id),
        },
        NormalizedContent::Unstructured { value, reason } => ContentView::Unstructured {
            text: serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            reason: reason.clone(),
        },
        NormalizedContent::Raw { text, reason } => ContentView::Raw {
            text: text.clone(),
            reason: reason.clone(),
        },
        NormalizedContent::Missing => ContentView::Missing,
    };

    let feedback = outcome.job.ats_feedback.clone().unwrap_or_default();
    ResultView {
        template_id,
        content,
        score: outcome.score.map(ScoreBadge::new),
        match_percentage: feedback.match_percentage.map(|p| p.clamp(0, 100) as u8),
        missing_keywords: feedback.missing_keywords,
        analysis: feedback.feedback,
        improvement_tips: feedback.improvement_tips,
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.score {
            Some(badge) => writeln!(f, "ATS score: {}/100  {}", badge.score, badge.verdict)?,
            None => writeln!(f, "ATS score: not available")?,
        }
        if let Some(percentage) = self.match_percentage {
            writeln!(f, "Keyword match: {percentage}%")?;
        }
        if !self.missing_keywords.is_empty() {
            writeln!(f, "Missing keywords: {}", self.missing_keywords.join(", "))?;
        }
        write_list(f, "Analysis", &self.analysis)?;
        write_list(f, "Improvement tips", &self.improvement_tips)?;
        writeln!(f)?;

        match &self.content {
            ContentView::Rendered { document } => write!(f, "{document}"),
            ContentView::Unstructured { text, reason } | ContentView::Raw { text, reason } => {
                writeln!(f, "Generated content could not be laid out ({reason}):")?;
                writeln!(f, "{text}")
            }
            ContentView::Missing => writeln!(f, "No generated content was returned."),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, title: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "{title}:")?;
    for item in items {
        writeln!(f, "  - {item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AtsFeedback, GenerationJob, JobId, JobStatus};
    use crate::render::{sample_content, SectionKind};
    use chrono::Utc;
    use serde_json::json;

    fn make_outcome(
        content: NormalizedContent,
        template_id: Option<&str>,
        score: Option<u8>,
    ) -> GenerationOutcome {
        GenerationOutcome {
            job: GenerationJob {
                id: JobId(9),
                status: JobStatus::Completed,
                generated_content: None,
                ats_score: score.map(i64::from),
                ats_feedback: Some(AtsFeedback {
                    score: None,
                    match_percentage: Some(74),
                    missing_keywords: vec!["Go".to_string(), "Kafka".to_string()],
                    feedback: vec!["Strong systems background".to_string()],
                    improvement_tips: vec!["Quantify impact".to_string()],
                }),
                template_id: template_id.map(str::to_string),
                created_at: Utc::now(),
            },
            content,
            score,
        }
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::for_score(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(80), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(79), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(60), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(59), ScoreBand::NeedsWork);
        assert_eq!(ScoreBadge::new(82).verdict, "Excellent! Ready for applications.");
    }

    #[test]
    fn test_present_renders_with_job_template() {
        let outcome = make_outcome(
            NormalizedContent::Document(sample_content()),
            Some("tech-focused"),
            Some(82),
        );
        let view = present(&outcome, "minimal-pro");
        assert_eq!(view.template_id, "tech-focused");
        let ContentView::Rendered { document } = &view.content else {
            panic!("expected rendered content");
        };
        assert!(document.known_template);
        assert!(document.has_section(SectionKind::Experience));
        assert_eq!(view.score.as_ref().unwrap().band, ScoreBand::Excellent);
        assert_eq!(view.match_percentage, Some(74));
        assert_eq!(view.missing_keywords, vec!["Go", "Kafka"]);
    }

    #[test]
    fn test_present_falls_back_to_configured_template() {
        let outcome = make_outcome(NormalizedContent::Document(sample_content()), None, Some(55));
        let view = present(&outcome, "fresher-grad");
        assert_eq!(view.template_id, "fresher-grad");
        assert_eq!(view.score.unwrap().band, ScoreBand::NeedsWork);
    }

    #[test]
    fn test_present_as_overrides_job_template() {
        let outcome = make_outcome(
            NormalizedContent::Document(sample_content()),
            Some("tech-focused"),
            Some(90),
        );
        let view = present_as(&outcome, "unknown-layout");
        assert_eq!(view.template_id, "unknown-layout");
        let ContentView::Rendered { document } = &view.content else {
            panic!("expected rendered content");
        };
        assert!(!document.known_template);
    }

    #[test]
    fn test_present_does_not_mutate_outcome() {
        let outcome = make_outcome(NormalizedContent::Document(sample_content()), None, Some(61));
        let before = outcome.clone();
        let _ = present(&outcome, "modern-ats");
        assert_eq!(outcome, before);
    }

    #[test]
    fn test_degraded_content_is_shown_verbatim() {
        let outcome = make_outcome(
            NormalizedContent::Unstructured {
                value: json!({"headline": "Engineer"}),
                reason: "required field `full_name` is missing or blank".to_string(),
            },
            Some("modern-ats"),
            None,
        );
        let text = present(&outcome, "minimal-pro").to_string();
        assert!(text.contains("ATS score: not available"));
        assert!(text.contains("\"headline\": \"Engineer\""));
        assert!(text.contains("full_name"));
    }

    #[test]
    fn test_display_lists_feedback() {
        let outcome = make_outcome(
            NormalizedContent::Document(sample_content()),
            Some("modern-ats"),
            Some(68),
        );
        let text = present(&outcome, "minimal-pro").to_string();
        assert!(text.starts_with("ATS score: 68/100  Good, but needs refinement.\n"));
        assert!(text.contains("Missing keywords: Go, Kafka"));
        assert!(text.contains("  - Quantify impact"));
        assert!(text.contains("ALEX STERLING"));
    }
}
