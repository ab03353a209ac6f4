use axum::{extract::State, response::Html, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::AppError;
use crate::layout::engine::{CycleOutcome, DocumentLayout, LayoutEngine, LayoutRequest, Trigger};
use crate::layout::measure::MetricsSurface;
use crate::layout::theme::{
    catalog, color_scheme, color_schemes, template, ColorScheme, ColorSchemeId, TemplateId,
    TemplateSpec,
};
use crate::models::resume::ResumeRecord;
use crate::render::{render_document, render_print_html, RenderedDocument};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBody {
    #[serde(default)]
    pub record: ResumeRecord,
    pub template: Option<String>,
    pub color_scheme: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesResponse {
    pub templates: Vec<TemplateSpec>,
    pub color_schemes: Vec<ColorScheme>,
}

pub fn resolve_template(name: Option<&str>, default: TemplateId) -> Result<TemplateId, AppError> {
    match name {
        None => Ok(default),
        Some(n) => n.parse().map_err(AppError::Validation),
    }
}

pub fn resolve_color_scheme(
    name: Option<&str>,
    default: ColorSchemeId,
) -> Result<ColorSchemeId, AppError> {
    match name {
        None => Ok(default),
        Some(n) => n.parse().map_err(AppError::Validation),
    }
}

/// Runs a single cycle on a throwaway engine.
async fn layout_once(
    state: &AppState,
    body: LayoutBody,
) -> Result<(DocumentLayout, TemplateSpec, ColorScheme), AppError> {
    let template_id = resolve_template(body.template.as_deref(), state.config.default_template)?;
    let scheme_id =
        resolve_color_scheme(body.color_scheme.as_deref(), state.config.default_color_scheme)?;
    let spec = template(template_id);

    let engine = LayoutEngine::with_surface(Arc::new(MetricsSurface::new(spec.typography)));
    let request = LayoutRequest {
        record: body.record,
        template: spec.clone(),
        color_scheme: scheme_id,
    };
    match engine.recompute(request, Trigger::Initial).await {
        CycleOutcome::Committed(layout) => Ok((layout, spec, color_scheme(scheme_id))),
        other => Err(AppError::Internal(anyhow::anyhow!(
            "layout cycle did not commit: {other:?}"
        ))),
    }
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<TemplatesResponse> {
    Json(TemplatesResponse {
        templates: catalog(),
        color_schemes: color_schemes(),
    })
}

/// POST /api/v1/layout
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(body): Json<LayoutBody>,
) -> Result<Json<DocumentLayout>, AppError> {
    let (layout, _, _) = layout_once(&state, body).await?;
    Ok(Json(layout))
}

/// POST /api/v1/render
pub async fn handle_render(
    State(state): State<AppState>,
    Json(body): Json<LayoutBody>,
) -> Result<Json<RenderedDocument>, AppError> {
    let (layout, spec, scheme) = layout_once(&state, body).await?;
    Ok(Json(render_document(&layout, &spec, &scheme)))
}

/// POST /api/v1/render/html
pub async fn handle_render_html(
    State(state): State<AppState>,
    Json(body): Json<LayoutBody>,
) -> Result<Html<String>, AppError> {
    let title = match body.record.personal_info.full_name.trim() {
        "" => "Resume".to_string(),
        name => format!("{name} - Resume"),
    };
    let (layout, spec, scheme) = layout_once(&state, body).await?;
    let document = render_document(&layout, &spec, &scheme);
    Ok(Html(render_print_html(&document, &title)))
}
