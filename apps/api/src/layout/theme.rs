//! Template descriptors and color schemes.
//!
//! Every résumé style is a `TemplateSpec` value consumed by the one renderer and the
//! one measurement surface; nothing downstream branches on a template name. Colors
//! live in a single `ColorScheme` passed down alongside the template.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::layout::blocks::{RunStyle, SectionKind};
use crate::layout::font_metrics::FontFamily;

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

/// A4 at 96 CSS pixels per inch.
pub const A4_WIDTH_PX: f32 = 794.0;
pub const A4_HEIGHT_PX: f32 = 1123.0;

/// Physical page box shared by the packer and the renderer.
///
/// The renderer applies `padding_y_px` to the top and bottom of every column on every
/// page, so the usable heights below are exactly what the printed page offers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width_px: f32,
    pub height_px: f32,
    pub padding_x_px: f32,
    pub padding_y_px: f32,
    /// Extra vertical space held back on page one (banner strips and similar).
    pub first_page_reserved_px: f32,
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width_px: A4_WIDTH_PX,
            height_px: A4_HEIGHT_PX,
            padding_x_px: 40.0,
            padding_y_px: 40.0,
            first_page_reserved_px: 0.0,
        }
    }

    /// Usable content height of every page after the first.
    pub fn page_limit_px(&self) -> f32 {
        self.height_px - 2.0 * self.padding_y_px
    }

    pub fn first_page_limit_px(&self) -> f32 {
        self.page_limit_px() - self.first_page_reserved_px
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnLayout {
    SingleColumn,
    /// Page one carries a fixed-width sidebar on the left; later pages are full width.
    Sidebar {
        width_px: f32,
        /// Inner horizontal padding of the sidebar region.
        padding_px: f32,
        sections: Vec<SectionKind>,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Typography
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font: FontFamily,
    pub name_px: f32,
    pub headline_px: f32,
    pub contact_px: f32,
    pub section_title_px: f32,
    pub entry_title_px: f32,
    pub meta_px: f32,
    pub body_px: f32,
    /// Line box height as a multiple of the font size.
    pub line_height: f32,
    /// Space after each run.
    pub run_gap_px: f32,
    /// Space after each block (between sections).
    pub block_gap_px: f32,
    pub bullet_indent_px: f32,
}

impl Typography {
    pub fn size_px(&self, style: RunStyle) -> f32 {
        match style {
            RunStyle::Name => self.name_px,
            RunStyle::Headline => self.headline_px,
            RunStyle::Contact => self.contact_px,
            RunStyle::SectionTitle => self.section_title_px,
            RunStyle::EntryTitle => self.entry_title_px,
            RunStyle::Meta => self.meta_px,
            RunStyle::Body | RunStyle::Bullet => self.body_px,
        }
    }

    pub fn line_box_px(&self, style: RunStyle) -> f32 {
        self.size_px(style) * self.line_height
    }

    pub fn indent_px(&self, style: RunStyle) -> f32 {
        if style == RunStyle::Bullet {
            self.bullet_indent_px
        } else {
            0.0
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Templates
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    /// Two-column layout: education and skills in a sidebar on page one.
    India,
    /// Single-column layout, sans-serif.
    Usa,
    /// Single-column layout, serif.
    Classic,
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "india" => Ok(TemplateId::India),
            "usa" => Ok(TemplateId::Usa),
            "classic" => Ok(TemplateId::Classic),
            other => Err(format!("unknown template '{other}'")),
        }
    }
}

/// Declarative description of one résumé style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    pub id: TemplateId,
    pub name: String,
    pub geometry: PageGeometry,
    pub columns: ColumnLayout,
    pub typography: Typography,
}

impl TemplateSpec {
    /// Width of the flowing content column on every page after the first.
    pub fn full_column_width_px(&self) -> f32 {
        self.geometry.width_px - 2.0 * self.geometry.padding_x_px
    }

    /// Width of the flowing content column on page one (narrower when a sidebar is present).
    pub fn first_column_width_px(&self) -> f32 {
        match &self.columns {
            ColumnLayout::SingleColumn => self.full_column_width_px(),
            ColumnLayout::Sidebar { width_px, .. } => self.full_column_width_px() - width_px,
        }
    }

    pub fn sidebar_width_px(&self) -> Option<f32> {
        match &self.columns {
            ColumnLayout::SingleColumn => None,
            ColumnLayout::Sidebar { width_px, .. } => Some(*width_px),
        }
    }

    pub fn is_sidebar_section(&self, kind: SectionKind) -> bool {
        match &self.columns {
            ColumnLayout::SingleColumn => false,
            ColumnLayout::Sidebar { sections, .. } => sections.contains(&kind),
        }
    }
}

fn sans_typography(font: FontFamily) -> Typography {
    Typography {
        font,
        name_px: 28.0,
        headline_px: 15.0,
        contact_px: 11.0,
        section_title_px: 14.0,
        entry_title_px: 12.5,
        meta_px: 11.0,
        body_px: 11.5,
        line_height: 1.4,
        run_gap_px: 4.0,
        block_gap_px: 16.0,
        bullet_indent_px: 14.0,
    }
}

/// Returns the descriptor for a template id.
pub fn template(id: TemplateId) -> TemplateSpec {
    match id {
        TemplateId::India => TemplateSpec {
            id,
            name: "India".to_string(),
            geometry: PageGeometry::a4(),
            columns: ColumnLayout::Sidebar {
                width_px: 240.0,
                padding_px: 20.0,
                sections: vec![SectionKind::Education, SectionKind::Skills],
            },
            typography: sans_typography(FontFamily::Roboto),
        },
        TemplateId::Usa => TemplateSpec {
            id,
            name: "USA".to_string(),
            geometry: PageGeometry::a4(),
            columns: ColumnLayout::SingleColumn,
            typography: sans_typography(FontFamily::Inter),
        },
        TemplateId::Classic => TemplateSpec {
            id,
            name: "Classic".to_string(),
            geometry: PageGeometry {
                padding_x_px: 56.0,
                padding_y_px: 48.0,
                ..PageGeometry::a4()
            },
            columns: ColumnLayout::SingleColumn,
            typography: Typography {
                line_height: 1.35,
                block_gap_px: 14.0,
                ..sans_typography(FontFamily::Georgia)
            },
        },
    }
}

pub fn catalog() -> Vec<TemplateSpec> {
    [TemplateId::India, TemplateId::Usa, TemplateId::Classic]
        .into_iter()
        .map(template)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Color schemes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSchemeId {
    Navy,
    Emerald,
    Crimson,
    Slate,
}

impl FromStr for ColorSchemeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "navy" => Ok(ColorSchemeId::Navy),
            "emerald" => Ok(ColorSchemeId::Emerald),
            "crimson" => Ok(ColorSchemeId::Crimson),
            "slate" => Ok(ColorSchemeId::Slate),
            other => Err(format!("unknown color scheme '{other}'")),
        }
    }
}

/// The palette injected into the renderer. Values are CSS colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    pub id: ColorSchemeId,
    pub primary: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub page_background: &'static str,
    pub sidebar_background: &'static str,
    pub sidebar_text: &'static str,
}

pub fn color_scheme(id: ColorSchemeId) -> ColorScheme {
    match id {
        ColorSchemeId::Navy => ColorScheme {
            id,
            primary: "#1e3a5f",
            accent: "#3b82f6",
            text: "#1f2937",
            muted: "#6b7280",
            page_background: "#ffffff",
            sidebar_background: "#1e3a5f",
            sidebar_text: "#f8fafc",
        },
        ColorSchemeId::Emerald => ColorScheme {
            id,
            primary: "#065f46",
            accent: "#10b981",
            text: "#1f2937",
            muted: "#6b7280",
            page_background: "#ffffff",
            sidebar_background: "#064e3b",
            sidebar_text: "#ecfdf5",
        },
        ColorSchemeId::Crimson => ColorScheme {
            id,
            primary: "#7f1d1d",
            accent: "#dc2626",
            text: "#1f2937",
            muted: "#6b7280",
            page_background: "#ffffff",
            sidebar_background: "#7f1d1d",
            sidebar_text: "#fef2f2",
        },
        ColorSchemeId::Slate => ColorScheme {
            id,
            primary: "#334155",
            accent: "#64748b",
            text: "#0f172a",
            muted: "#64748b",
            page_background: "#ffffff",
            sidebar_background: "#e2e8f0",
            sidebar_text: "#0f172a",
        },
    }
}

pub fn color_schemes() -> Vec<ColorScheme> {
    [
        ColorSchemeId::Navy,
        ColorSchemeId::Emerald,
        ColorSchemeId::Crimson,
        ColorSchemeId::Slate,
    ]
    .into_iter()
    .map(color_scheme)
    .collect()
}
