//! Gallery previews: the same sample resume rendered under every template.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinError;

use crate::models::{ContactInfo, ContentModel, EducationEntry, ExperienceEntry, TemplateDescriptor};
use crate::render::document::Document;
use crate::render::engine::render;

#[derive(Debug, Clone, Serialize)]
pub struct GalleryPreview {
    pub template_id: String,
    pub display_name: String,
    pub document: Document,
}

/// Placeholder resume shown when browsing templates.
pub fn sample_content() -> ContentModel {
    ContentModel {
        full_name: "Alex Sterling".to_string(),
        contact_info: ContactInfo {
            email: "alex.sterling@example.com".to_string(),
            phone: Some("+1 (555) 123-4567".to_string()),
            network_handle: Some("linkedin.com/in/alexsterling".to_string()),
        },
        summary: Some(
            "Dedicated Professional with 10+ years of experience in delivering high-impact \
             solutions. Proven track record of optimizing workflows and leading \
             cross-functional teams to success."
                .to_string(),
        ),
        experience: vec![ExperienceEntry {
            organization: "Tech Giant Inc.".to_string(),
            title: "Senior Solutions Architect".to_string(),
            period: "2019 - Present".to_string(),
            bullet_points: vec![
                "Led team of 15 engineers to develop core platform features.".to_string(),
                "Reduced infrastructure costs by 30% through strategic migration.".to_string(),
                "Implemented CI/CD pipelines increasing deployment frequency by 200%.".to_string(),
            ],
        }],
        skills: vec![
            "Strategic Planning".to_string(),
            "Team Leadership".to_string(),
            "Cloud Computing".to_string(),
            "Stakeholder Management".to_string(),
        ],
        education: vec![EducationEntry {
            institution: "Global University".to_string(),
            credential: "B.S. in Computer Science".to_string(),
            year: "2015".to_string(),
        }],
        projects: None,
    }
}

/// Renders `content` under each template concurrently on the blocking pool.
/// Results come back in the order of `templates`.
pub async fn render_gallery(
    content: Arc<ContentModel>,
    templates: &[TemplateDescriptor],
) -> Result<Vec<GalleryPreview>, JoinError> {
    let handles: Vec<_> = templates
        .iter()
        .map(|descriptor| {
            let content = Arc::clone(&content);
            let template_id = descriptor.id.clone();
            let display_name = descriptor.display_name.clone();
            tokio::task::spawn_blocking(move || GalleryPreview {
                document: render(&content, &template_id),
                template_id,
                display_name,
            })
        })
        .collect();

    let mut previews = Vec::with_capacity(handles.len());
    for handle in handles {
        previews.push(handle.await?);
    }
    Ok(previews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::variants::builtin_templates;

    #[test]
    fn test_sample_content_is_valid() {
        assert!(sample_content().validate().is_ok());
    }

    #[tokio::test]
    async fn test_gallery_keeps_template_order() {
        let mut templates = builtin_templates();
        templates.push(TemplateDescriptor {
            id: "custom".to_string(),
            display_name: "Custom".to_string(),
            description: String::new(),
            category: "other".to_string(),
            preview_url: None,
        });
        let previews = render_gallery(Arc::new(sample_content()), &templates)
            .await
            .unwrap();

        let ids: Vec<&str> = previews.iter().map(|p| p.template_id.as_str()).collect();
        let expected: Vec<&str> = templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, expected);
        assert!(!previews[4].document.known_template);
    }

    #[tokio::test]
    async fn test_concurrent_renders_match_sequential() {
        let content = Arc::new(sample_content());
        let templates = builtin_templates();
        let previews = render_gallery(Arc::clone(&content), &templates).await.unwrap();
        for preview in previews {
            assert_eq!(preview.document, render(&content, &preview.template_id));
        }
    }
}
