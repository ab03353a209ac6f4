use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::handlers::{resolve_color_scheme, resolve_template};
use crate::layout::theme::ColorSchemeId;
use crate::models::resume::ResumeRecord;
use crate::preview::session::{PreviewSession, PreviewView, SessionUpdate};
use crate::state::AppState;

const DEFAULT_VIEWPORT_PX: f32 = 1280.0;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreviewRequest {
    #[serde(default)]
    pub record: ResumeRecord,
    pub template: Option<String>,
    pub color_scheme: Option<String>,
    pub viewport_width: Option<f32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSchemeChange {
    pub color_scheme: String,
}

#[derive(Deserialize)]
pub struct ViewportChange {
    pub width: f32,
}

fn validate_viewport(width: f32) -> Result<f32, AppError> {
    if width.is_finite() && width > 0.0 {
        Ok(width)
    } else {
        Err(AppError::Validation(format!(
            "viewport width must be a positive number, got {width}"
        )))
    }
}

/// POST /api/v1/previews
pub async fn handle_create_preview(
    State(state): State<AppState>,
    Json(req): Json<CreatePreviewRequest>,
) -> Result<(StatusCode, Json<PreviewView>), AppError> {
    let template_id = resolve_template(req.template.as_deref(), state.config.default_template)?;
    let scheme_id =
        resolve_color_scheme(req.color_scheme.as_deref(), state.config.default_color_scheme)?;
    let viewport = validate_viewport(req.viewport_width.unwrap_or(DEFAULT_VIEWPORT_PX))?;

    let session = state
        .sessions
        .insert(PreviewSession::new(template_id, scheme_id, viewport, req.record))
        .await?;
    let view = session.view(state.config.preview_gutter_px).await;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/previews/:id
pub async fn handle_get_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PreviewView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.view(state.config.preview_gutter_px).await))
}

/// PUT /api/v1/previews/:id/record
pub async fn handle_update_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(record): Json<ResumeRecord>,
) -> Result<Json<PreviewView>, AppError> {
    apply(&state, id, SessionUpdate::Record(record)).await
}

/// PUT /api/v1/previews/:id/color-scheme
pub async fn handle_update_color_scheme(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ColorSchemeChange>,
) -> Result<Json<PreviewView>, AppError> {
    let scheme_id = req
        .color_scheme
        .parse::<ColorSchemeId>()
        .map_err(AppError::Validation)?;
    apply(&state, id, SessionUpdate::ColorScheme(scheme_id)).await
}

/// PUT /api/v1/previews/:id/viewport
pub async fn handle_update_viewport(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ViewportChange>,
) -> Result<Json<PreviewView>, AppError> {
    let width = validate_viewport(req.width)?;
    apply(&state, id, SessionUpdate::Viewport(width)).await
}

/// DELETE /api/v1/previews/:id
pub async fn handle_delete_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn apply(
    state: &AppState,
    id: Uuid,
    update: SessionUpdate,
) -> Result<Json<PreviewView>, AppError> {
    let session = state.sessions.get(id).await?;
    session.apply(update).await;
    Ok(Json(session.view(state.config.preview_gutter_px).await))
}
