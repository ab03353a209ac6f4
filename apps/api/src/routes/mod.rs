pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::layout::handlers as layout;
use crate::preview::handlers as preview;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Templates & one-shot layout
        .route("/api/v1/templates", get(layout::handle_list_templates))
        .route("/api/v1/layout", post(layout::handle_layout))
        .route("/api/v1/render", post(layout::handle_render))
        .route("/api/v1/render/html", post(layout::handle_render_html))
        // Preview sessions
        .route("/api/v1/previews", post(preview::handle_create_preview))
        .route(
            "/api/v1/previews/:id",
            get(preview::handle_get_preview).delete(preview::handle_delete_preview),
        )
        .route(
            "/api/v1/previews/:id/record",
            put(preview::handle_update_record),
        )
        .route(
            "/api/v1/previews/:id/color-scheme",
            put(preview::handle_update_color_scheme),
        )
        .route(
            "/api/v1/previews/:id/viewport",
            put(preview::handle_update_viewport),
        )
        .with_state(state)
}
