//! Preview sessions: a live document whose layout is recomputed on every change.
//!
//! A session owns its own `LayoutEngine`, so overlapping updates to one session are
//! ordered by that engine's cycle sequence. Inputs are snapshotted under a short write
//! lock and the lock is released before the cycle runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::engine::{
    CycleOutcome, CyclePhase, DocumentLayout, LayoutEngine, LayoutRequest, Trigger,
};
use crate::layout::measure::MetricsSurface;
use crate::layout::theme::{color_scheme, template, ColorSchemeId, TemplateId};
use crate::models::resume::ResumeRecord;
use crate::render::{preview_scale, render_document, RenderedDocument};

/// A change pushed into a session.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Record(ResumeRecord),
    ColorScheme(ColorSchemeId),
    Viewport(f32),
}

impl SessionUpdate {
    fn trigger(&self) -> Trigger {
        match self {
            SessionUpdate::Record(_) => Trigger::ContentChanged,
            SessionUpdate::ColorScheme(_) => Trigger::ColorSchemeChanged,
            SessionUpdate::Viewport(_) => Trigger::ViewportResized,
        }
    }
}

#[derive(Debug, Clone)]
struct SessionInputs {
    record: ResumeRecord,
    color_scheme: ColorSchemeId,
    viewport_px: f32,
    updated_at: DateTime<Utc>,
}

pub struct PreviewSession {
    pub id: Uuid,
    pub template: TemplateId,
    pub created_at: DateTime<Utc>,
    engine: LayoutEngine,
    inputs: RwLock<SessionInputs>,
    /// Unix millis of the last lookup; drives idle expiry.
    last_touched: AtomicI64,
}

/// Everything a client needs to draw the preview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewView {
    pub id: Uuid,
    pub template: TemplateId,
    pub color_scheme: ColorSchemeId,
    pub viewport_px: f32,
    pub scale: f32,
    pub phase: CyclePhase,
    pub last_trigger: Option<Trigger>,
    pub latest_cycle: u64,
    pub layout: Option<DocumentLayout>,
    pub rendered: Option<RenderedDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PreviewSession {
    pub fn new(
        template_id: TemplateId,
        color_scheme: ColorSchemeId,
        viewport_px: f32,
        record: ResumeRecord,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            template: template_id,
            created_at: now,
            engine: LayoutEngine::new(),
            inputs: RwLock::new(SessionInputs {
                record,
                color_scheme,
                viewport_px,
                updated_at: now,
            }),
            last_touched: AtomicI64::new(now.timestamp_millis()),
        }
    }

    fn touch(&self) {
        self.last_touched
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        Duration::milliseconds(now.timestamp_millis() - self.last_touched.load(Ordering::Relaxed))
    }

    /// Gives the engine a surface sized for this session's template.
    pub async fn mount(&self) {
        let typography = template(self.template).typography;
        self.engine
            .attach(Arc::new(MetricsSurface::new(typography)))
            .await;
    }

    /// Drops the surface; later cycles are skipped.
    pub async fn unmount(&self) {
        self.engine.detach().await;
    }

    /// Runs a cycle over the current inputs.
    pub async fn refresh(&self, trigger: Trigger) -> CycleOutcome {
        let request = {
            let inputs = self.inputs.read().await;
            LayoutRequest {
                record: inputs.record.clone(),
                template: template(self.template),
                color_scheme: inputs.color_scheme,
            }
        };
        self.engine.recompute(request, trigger).await
    }

    /// Applies one change and recomputes.
    pub async fn apply(&self, update: SessionUpdate) -> CycleOutcome {
        let trigger = update.trigger();
        {
            let mut inputs = self.inputs.write().await;
            match update {
                SessionUpdate::Record(record) => inputs.record = record,
                SessionUpdate::ColorScheme(id) => inputs.color_scheme = id,
                SessionUpdate::Viewport(px) => inputs.viewport_px = px,
            }
            inputs.updated_at = Utc::now();
        }
        let outcome = self.refresh(trigger).await;
        debug!(session = %self.id, ?trigger, outcome = outcome_label(&outcome), "Preview updated");
        outcome
    }

    pub async fn view(&self, gutter_px: f32) -> PreviewView {
        let inputs = self.inputs.read().await.clone();
        let state = self.engine.snapshot().await;
        let spec = template(self.template);
        // Colors always come from the current inputs, not from whichever cycle last committed.
        let scheme = color_scheme(inputs.color_scheme);
        let rendered = state
            .latest
            .as_ref()
            .map(|layout| render_document(layout, &spec, &scheme));

        PreviewView {
            id: self.id,
            template: self.template,
            color_scheme: inputs.color_scheme,
            viewport_px: inputs.viewport_px,
            scale: preview_scale(inputs.viewport_px, spec.geometry.width_px, gutter_px),
            phase: state.phase,
            last_trigger: state.last_trigger,
            latest_cycle: self.engine.latest_cycle(),
            layout: state.latest,
            rendered,
            created_at: self.created_at,
            updated_at: inputs.updated_at,
        }
    }
}

fn outcome_label(outcome: &CycleOutcome) -> &'static str {
    match outcome {
        CycleOutcome::Committed(_) => "committed",
        CycleOutcome::Skipped { .. } => "skipped",
        CycleOutcome::Superseded { .. } => "superseded",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

/// In-memory session map with a fixed capacity. Sessions untouched for longer than
/// `idle_ttl` are swept before each insert.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<PreviewSession>>>,
    capacity: usize,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(capacity: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
            idle_ttl,
        }
    }

    /// Registers `session` and runs its initial cycle.
    pub async fn insert(&self, session: PreviewSession) -> Result<Arc<PreviewSession>, AppError> {
        let session = Arc::new(session);
        let expired = {
            let mut sessions = self.sessions.write().await;
            let expired = sweep_idle(&mut sessions, self.idle_ttl);
            if sessions.len() >= self.capacity {
                return Err(AppError::TooManySessions(self.capacity));
            }
            sessions.insert(session.id, session.clone());
            expired
        };
        for stale in &expired {
            stale.unmount().await;
        }
        if !expired.is_empty() {
            info!(expired = expired.len(), "Expired idle preview sessions");
        }
        session.mount().await;
        session.refresh(Trigger::Initial).await;
        info!(session = %session.id, template = ?session.template, "Preview session created");
        Ok(session)
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<PreviewSession>, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .inspect(|session| session.touch())
            .ok_or_else(|| AppError::NotFound(format!("Preview session {id} not found")))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                // A handler may still hold this session; its updates become no-ops.
                session.unmount().await;
                info!(session = %id, "Preview session closed");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Preview session {id} not found"))),
        }
    }
}

/// Removes sessions idle for longer than `ttl` and returns them.
fn sweep_idle(
    sessions: &mut HashMap<Uuid, Arc<PreviewSession>>,
    ttl: Duration,
) -> Vec<Arc<PreviewSession>> {
    let now = Utc::now();
    let ids: Vec<Uuid> = sessions
        .iter()
        .filter(|(_, s)| s.idle_for(now) > ttl)
        .map(|(id, _)| *id)
        .collect();
    ids.iter().filter_map(|id| sessions.remove(id)).collect()
}
