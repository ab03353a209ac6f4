//! HTML fragments: escaping, run/block markup and the stylesheet derived from a
//! template's typography and the injected color scheme.

use crate::layout::blocks::{ContentBlock, RunStyle, TextRun};
use crate::layout::theme::{ColorScheme, ColumnLayout, TemplateSpec};

const RUN_STYLES: [RunStyle; 8] = [
    RunStyle::Name,
    RunStyle::Headline,
    RunStyle::Contact,
    RunStyle::SectionTitle,
    RunStyle::EntryTitle,
    RunStyle::Meta,
    RunStyle::Body,
    RunStyle::Bullet,
];

/// Escapes text for element content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn run_html(run: &TextRun) -> String {
    format!(
        r#"<p class="run {}">{}</p>"#,
        run.style.css_class(),
        escape_html(&run.text)
    )
}

pub fn block_html(block: &ContentBlock) -> String {
    let mut out = format!(
        r#"<div class="block block-{}" data-block="{}">"#,
        block.section.slug(),
        block.index
    );
    for run in &block.runs {
        out.push_str(&run_html(run));
    }
    out.push_str("</div>");
    out
}

/// Stylesheet shared by every page of a document.
///
/// Box sizes mirror what the measurement surface assumes: the page padding, the column
/// widths, the per-run gap, the per-block gap and the bullet indent. Any drift between
/// the two shows up as clipped or half-empty pages.
pub fn stylesheet(template: &TemplateSpec, scheme: &ColorScheme) -> String {
    let g = &template.geometry;
    let t = &template.typography;
    let mut css = String::new();

    css.push_str(&format!(
        ".page{{box-sizing:border-box;width:{w}px;height:{h}px;padding:{py}px {px}px;\
         overflow:hidden;background:{bg};color:{fg};font-family:{font};}}\n",
        w = g.width_px,
        h = g.height_px,
        py = g.padding_y_px,
        px = g.padding_x_px,
        bg = scheme.page_background,
        fg = scheme.text,
        font = t.font.css_stack(),
    ));
    css.push_str(".page-body{display:flex;align-items:flex-start;height:100%;}\n");
    // A lone block taller than the page grows its page instead of being clipped.
    css.push_str(&format!(
        ".page-oversized{{height:auto;min-height:{}px;overflow:visible;}}\n",
        g.height_px
    ));
    css.push_str(".page-oversized .page-body{height:auto;align-items:stretch;}\n");
    css.push_str(&format!(
        ".column{{flex:0 0 auto;width:{}px;}}\n",
        template.full_column_width_px()
    ));
    css.push_str(&format!(
        ".page-first .column{{width:{}px;}}\n",
        template.first_column_width_px()
    ));
    if let ColumnLayout::Sidebar {
        width_px,
        padding_px,
        ..
    } = &template.columns
    {
        css.push_str(&format!(
            ".sidebar{{box-sizing:border-box;flex:0 0 auto;width:{width_px}px;height:100%;\
             padding:0 {padding_px}px;background:{bg};color:{fg};}}\n",
            bg = scheme.sidebar_background,
            fg = scheme.sidebar_text,
        ));
        css.push_str(".sidebar .run-section-title,.sidebar .run-meta{color:inherit;}\n");
    }
    css.push_str(&format!(
        ".block{{margin:0 0 {}px 0;}}\n",
        t.block_gap_px
    ));
    css.push_str(&format!(
        ".run{{margin:0 0 {}px 0;line-height:{};overflow-wrap:anywhere;}}\n",
        t.run_gap_px, t.line_height
    ));

    for style in RUN_STYLES {
        let weight = if style.is_bold() { 700 } else { 400 };
        let color = match style {
            RunStyle::Name | RunStyle::SectionTitle => scheme.primary,
            RunStyle::Headline => scheme.accent,
            RunStyle::Contact | RunStyle::Meta => scheme.muted,
            _ => "inherit",
        };
        css.push_str(&format!(
            ".{}{{font-size:{}px;font-weight:{};color:{};}}\n",
            style.css_class(),
            t.size_px(style),
            weight,
            color
        ));
    }
    css.push_str(&format!(
        ".run-bullet{{position:relative;padding-left:{}px;}}\n",
        t.bullet_indent_px
    ));
    css.push_str(".run-bullet::before{content:\"\\2022\";position:absolute;left:0;}\n");
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::blocks::SectionKind;
    use crate::layout::theme::{color_scheme, template, ColorSchemeId, TemplateId};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"R&D" & 'ops'</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot; &amp; &#39;ops&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_block_html_escapes_runs() {
        let block = ContentBlock {
            index: 3,
            section: SectionKind::Projects,
            runs: vec![TextRun {
                style: RunStyle::EntryTitle,
                text: "<script>".to_string(),
            }],
        };
        let html = block_html(&block);
        assert!(html.starts_with(r#"<div class="block block-projects" data-block="3">"#));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_stylesheet_uses_scheme_and_geometry() {
        let india = template(TemplateId::India);
        let scheme = color_scheme(ColorSchemeId::Emerald);
        let css = stylesheet(&india, &scheme);
        assert!(css.contains("width:794px;height:1123px;padding:40px 40px"));
        assert!(css.contains(scheme.sidebar_background));
        assert!(css.contains(".page-first .column{width:474px;}"));
    }

    #[test]
    fn test_oversized_pages_are_not_clipped() {
        let css = stylesheet(&template(TemplateId::Usa), &color_scheme(ColorSchemeId::Navy));
        assert!(css.contains(".page-oversized{height:auto;min-height:1123px;overflow:visible;}"));
    }

    #[test]
    fn test_single_column_stylesheet_has_no_sidebar() {
        let css = stylesheet(&template(TemplateId::Usa), &color_scheme(ColorSchemeId::Navy));
        assert!(!css.contains(".sidebar{"));
    }
}
