//! Template rendering: registry of layout variants, the pure `render` function, and
//! text/HTML writers for the resulting `Document`.

pub mod document;
pub mod engine;
pub mod gallery;
pub mod html;
pub mod metrics;
pub mod text;
pub mod variants;

pub use document::{Document, Section, SectionBody, SectionKind};
pub use engine::render;
pub use gallery::{render_gallery, sample_content, GalleryPreview};
pub use html::to_html;
pub use variants::{
    builtin_templates, is_known_template, resolve_variant, LayoutVariant, DEFAULT_VARIANT,
    REGISTRY,
};
