//! Page Renderer: turns a committed `DocumentLayout` into fixed-size A4 pages.
//!
//! No measuring happens here. Page one of a sidebar template gets the sidebar region
//! next to a narrower content column; every other page is one full-width column.
//! Every page carries the same padding the packer assumed.

pub mod html;

use serde::Serialize;

use crate::layout::blocks::ContentBlock;
use crate::layout::engine::{DocumentLayout, PageKind, PageLayout};
use crate::layout::theme::{ColorScheme, ColorSchemeId, TemplateId, TemplateSpec};
use crate::render::html::{block_html, escape_html, stylesheet};

/// Smallest scale a preview is shrunk to, however narrow the viewport.
pub const MIN_PREVIEW_SCALE: f32 = 0.2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    pub index: usize,
    pub kind: PageKind,
    pub width_px: f32,
    pub height_px: f32,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub template: TemplateId,
    pub color_scheme: ColorSchemeId,
    pub css: String,
    pub pages: Vec<RenderedPage>,
}

pub fn render_document(
    layout: &DocumentLayout,
    template: &TemplateSpec,
    scheme: &ColorScheme,
) -> RenderedDocument {
    let pages = layout
        .pages
        .iter()
        .map(|page| RenderedPage {
            index: page.index,
            kind: page.kind,
            width_px: template.geometry.width_px,
            height_px: template.geometry.height_px,
            html: page_html(page, layout, template),
        })
        .collect();

    RenderedDocument {
        template: template.id,
        color_scheme: scheme.id,
        css: stylesheet(template, scheme),
        pages,
    }
}

fn page_html(page: &PageLayout, layout: &DocumentLayout, template: &TemplateSpec) -> String {
    let kind = match page.kind {
        PageKind::First => "page-first",
        PageKind::Overflow => "page-overflow",
    };
    let oversized = if page.is_oversized() {
        " page-oversized"
    } else {
        ""
    };
    let mut out = format!(
        r#"<section class="page {}{}" data-page="{}"><div class="page-body">"#,
        kind, oversized, page.index
    );

    // The sidebar region is kept on page one even when it has no blocks, so the
    // content column stays at the width it was measured at.
    if page.kind == PageKind::First && template.sidebar_width_px().is_some() {
        out.push_str(r#"<aside class="sidebar">"#);
        push_blocks(&mut out, layout.plan.sidebar.iter());
        out.push_str("</aside>");
    }

    out.push_str(r#"<div class="column">"#);
    push_blocks(
        &mut out,
        page.blocks.iter().filter_map(|&i| layout.plan.flow.get(i)),
    );
    out.push_str("</div></div></section>");
    out
}

fn push_blocks<'a>(out: &mut String, blocks: impl Iterator<Item = &'a ContentBlock>) {
    for block in blocks {
        out.push_str(&block_html(block));
    }
}

/// A standalone printable document: one A4 sheet per page, breaks between pages.
pub fn render_print_html(document: &RenderedDocument, title: &str) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    out.push_str("<style>\n@page{size:A4;margin:0;}\nbody{margin:0;}\n");
    out.push_str(".page{break-after:page;page-break-after:always;}\n");
    out.push_str(".page:last-child{break-after:auto;page-break-after:auto;}\n");
    out.push_str(&document.css);
    out.push_str("</style>\n</head>\n<body>\n");
    for page in &document.pages {
        out.push_str(&page.html);
        out.push('\n');
    }
    out.push_str("</body>\n</html>\n");
    out
}

/// Factor that fits a page of `page_width_px` into `viewport_px` minus a gutter on
/// each side. Never enlarges.
pub fn preview_scale(viewport_px: f32, page_width_px: f32, gutter_px: f32) -> f32 {
    if !viewport_px.is_finite() || page_width_px <= 0.0 {
        return 1.0;
    }
    let available = viewport_px - 2.0 * gutter_px.max(0.0);
    (available / page_width_px).clamp(MIN_PREVIEW_SCALE, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::layout::engine::{CycleOutcome, LayoutEngine, LayoutRequest, Trigger};
    use crate::layout::measure::MetricsSurface;
    use crate::layout::theme::{color_scheme, template};
    use crate::models::resume::{Education, Experience, PersonalInfo, ResumeRecord, SkillCategory};

    fn record() -> ResumeRecord {
        ResumeRecord {
            personal_info: PersonalInfo {
                full_name: "Jordan <Lee>".to_string(),
                ..Default::default()
            },
            experience: (0..30)
                .map(|i| Experience {
                    company: format!("Company {i}"),
                    position: "Engineer".to_string(),
                    description: "- Built services\n- Ran on-call\n- Wrote docs".to_string(),
                    ..Default::default()
                })
                .collect(),
            education: vec![Education {
                institution: "State University".to_string(),
                ..Default::default()
            }],
            skills: vec![SkillCategory {
                category: "Languages".to_string(),
                skills: vec!["Rust".to_string(), "Go".to_string()],
            }],
            ..Default::default()
        }
    }

    async fn layout_for(id: TemplateId, record: ResumeRecord) -> (DocumentLayout, TemplateSpec) {
        let spec = template(id);
        let engine = LayoutEngine::with_surface(Arc::new(MetricsSurface::new(spec.typography)));
        let outcome = engine
            .recompute(
                LayoutRequest {
                    record,
                    template: spec.clone(),
                    color_scheme: ColorSchemeId::Navy,
                },
                Trigger::Initial,
            )
            .await;
        match outcome {
            CycleOutcome::Committed(layout) => (layout, spec),
            other => panic!("expected Committed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pages_are_a4() {
        let (layout, spec) = layout_for(TemplateId::Usa, record()).await;
        let doc = render_document(&layout, &spec, &color_scheme(ColorSchemeId::Navy));
        assert_eq!(doc.pages.len(), layout.pages.len());
        assert!(doc
            .pages
            .iter()
            .all(|p| p.width_px == 794.0 && p.height_px == 1123.0));
    }

    #[tokio::test]
    async fn test_sidebar_only_on_first_page() {
        let (layout, spec) = layout_for(TemplateId::India, record()).await;
        assert!(layout.pages.len() > 1);
        let doc = render_document(&layout, &spec, &color_scheme(ColorSchemeId::Slate));

        assert!(doc.pages[0].html.contains(r#"<aside class="sidebar">"#));
        assert!(doc.pages[0].html.contains("block-education"));
        for page in &doc.pages[1..] {
            assert!(!page.html.contains("sidebar"));
            assert!(!page.html.contains("block-education"));
        }
    }

    #[tokio::test]
    async fn test_every_flow_block_rendered_once_in_order() {
        let (layout, spec) = layout_for(TemplateId::Classic, record()).await;
        let doc = render_document(&layout, &spec, &color_scheme(ColorSchemeId::Crimson));
        let all: String = doc.pages.iter().map(|p| p.html.as_str()).collect();
        let mut cursor = 0;
        for block in &layout.plan.flow {
            let marker = format!(r#"data-block="{}""#, block.index);
            let found = all[cursor..].find(&marker).expect("block missing or out of order");
            cursor += found + marker.len();
        }
        assert!(all.contains("Jordan &lt;Lee&gt;"));
    }

    #[tokio::test]
    async fn test_print_html_has_page_rules() {
        let (layout, spec) = layout_for(TemplateId::Usa, record()).await;
        let doc = render_document(&layout, &spec, &color_scheme(ColorSchemeId::Navy));
        let html = render_print_html(&doc, "Jordan & Co");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("@page{size:A4;margin:0;}"));
        assert!(html.contains("<title>Jordan &amp; Co</title>"));
        assert_eq!(html.matches("<section class=\"page").count(), doc.pages.len());
    }

    #[tokio::test]
    async fn test_long_experience_section_keeps_every_entry() {
        let record = ResumeRecord {
            personal_info: PersonalInfo {
                full_name: "Jordan Lee".to_string(),
                ..Default::default()
            },
            experience: (0..14)
                .map(|i| Experience {
                    company: format!("Company {i}"),
                    location: "Pune".to_string(),
                    position: "Engineer".to_string(),
                    description: "- Built services\n- Ran on-call\n- Wrote docs\n- Mentored".to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        let (layout, spec) = layout_for(TemplateId::Usa, record).await;
        assert!(layout.pages.len() > 1);
        assert!(layout.pages.iter().all(|p| !p.is_oversized()));

        let doc = render_document(&layout, &spec, &color_scheme(ColorSchemeId::Navy));
        let all: String = doc.pages.iter().map(|p| p.html.as_str()).collect();
        for i in 0..14 {
            let meta = format!(">Company {i}  ·  Pune</p>");
            assert_eq!(all.matches(&meta).count(), 1, "entry {i}");
        }
    }

    #[tokio::test]
    async fn test_oversized_entry_page_grows_instead_of_clipping() {
        let description: String = (0..120).map(|i| format!("- Shipped release {i}\n")).collect();
        let record = ResumeRecord {
            experience: vec![Experience {
                company: "Acme".to_string(),
                description,
                ..Default::default()
            }],
            ..Default::default()
        };
        let (layout, spec) = layout_for(TemplateId::Usa, record).await;
        assert!(layout.pages[0].is_oversized());

        let doc = render_document(&layout, &spec, &color_scheme(ColorSchemeId::Navy));
        assert!(doc.pages[0].html.contains("page-oversized"));
        assert!(doc.pages[0].html.contains("Shipped release 119"));
        assert!(doc.css.contains("overflow:visible"));
    }

    #[test]
    fn test_preview_scale() {
        assert_eq!(preview_scale(2000.0, 794.0, 32.0), 1.0);
        assert!((preview_scale(461.0, 794.0, 32.0) - 0.5).abs() < 1e-3);
        assert_eq!(preview_scale(10.0, 794.0, 32.0), MIN_PREVIEW_SCALE);
        assert_eq!(preview_scale(f32::NAN, 794.0, 32.0), 1.0);
    }
}
