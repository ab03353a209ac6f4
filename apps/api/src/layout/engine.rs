//! Layout Engine: drives one recomputation cycle from record to page partition.
//!
//! # Cycle
//! `Idle → MeasuringFirstPage → PackedFirstPage → MeasuringRemainder → PackedAllPages → Idle`
//!
//! - The flow is measured at the first-page column width and page one is filled.
//! - Whatever did not fit is measured again at the full column width (skipped when the
//!   widths are equal) and packed into overflow pages.
//! - Measurement runs on the blocking pool; each `await` is a point where a newer cycle
//!   may have started. Every cycle carries a sequence number and only the newest one
//!   may commit, so a slow stale pass can never overwrite a fresher layout.
//!
//! Nothing here returns an error. A missing surface skips the cycle; a failed
//! measurement commits a single page holding every block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::layout::blocks::{build_blocks, BlockPlan, ContentBlock};
use crate::layout::measure::{MeasureError, MeasureSurface, MeasuredBlock};
use crate::layout::packer::{fit_first_page, pack_pages, page_height};
use crate::layout::theme::{ColorSchemeId, TemplateId, TemplateSpec};
use crate::models::resume::ResumeRecord;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Idle,
    MeasuringFirstPage,
    PackedFirstPage,
    MeasuringRemainder,
    PackedAllPages,
}

/// What caused a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Initial,
    ContentChanged,
    ColorSchemeChanged,
    ViewportResized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Page one; carries the sidebar in two-column templates.
    First,
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub index: usize,
    pub kind: PageKind,
    /// Flow block indices on this page, in order.
    pub blocks: Vec<usize>,
    pub used_height_px: f32,
    pub limit_px: f32,
    pub column_width_px: f32,
}

impl PageLayout {
    /// True for a lone block taller than the page.
    pub fn is_oversized(&self) -> bool {
        self.used_height_px > self.limit_px
    }
}

/// The committed result of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLayout {
    pub cycle: u64,
    pub trigger: Trigger,
    pub template: TemplateId,
    pub color_scheme: ColorSchemeId,
    pub plan: BlockPlan,
    /// Heights of the flow blocks, each at the width of the page it landed on.
    pub measurements: Vec<MeasuredBlock>,
    pub pages: Vec<PageLayout>,
    /// True when measurement failed and every block was put on one page.
    pub fallback: bool,
    pub computed_at: DateTime<Utc>,
}

/// Inputs of one cycle, snapshotted when the cycle starts.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub record: ResumeRecord,
    pub template: TemplateSpec,
    pub color_scheme: ColorSchemeId,
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Committed(DocumentLayout),
    /// No surface attached; nothing changed. The next trigger retries.
    Skipped { cycle: u64 },
    /// A newer cycle started while this one was measuring; its result was dropped.
    Superseded { cycle: u64, latest: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub phase: CyclePhase,
    pub latest: Option<DocumentLayout>,
    pub last_trigger: Option<Trigger>,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct LayoutEngine {
    surface: RwLock<Option<Arc<dyn MeasureSurface>>>,
    sequence: AtomicU64,
    state: RwLock<EngineState>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    /// An engine with no measurement surface; cycles are skipped until one is attached.
    pub fn new() -> Self {
        Self {
            surface: RwLock::new(None),
            sequence: AtomicU64::new(0),
            state: RwLock::new(EngineState::default()),
        }
    }

    pub fn with_surface(surface: Arc<dyn MeasureSurface>) -> Self {
        Self {
            surface: RwLock::new(Some(surface)),
            ..Self::new()
        }
    }

    pub async fn attach(&self, surface: Arc<dyn MeasureSurface>) {
        *self.surface.write().await = Some(surface);
    }

    pub async fn detach(&self) {
        *self.surface.write().await = None;
    }

    pub async fn snapshot(&self) -> EngineState {
        self.state.read().await.clone()
    }

    /// Sequence number of the most recently started cycle.
    pub fn latest_cycle(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn is_latest(&self, cycle: u64) -> bool {
        self.latest_cycle() == cycle
    }

    /// Runs one full cycle for `request`.
    pub async fn recompute(&self, request: LayoutRequest, trigger: Trigger) -> CycleOutcome {
        let cycle = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(surface) = self.surface.read().await.clone() else {
            debug!(cycle, ?trigger, "No measurement surface attached; skipping layout cycle");
            self.enter_phase(cycle, CyclePhase::Idle).await;
            return CycleOutcome::Skipped { cycle };
        };

        let template = &request.template;
        let plan = build_blocks(&request.record, template);
        let first_width = template.first_column_width_px();
        let full_width = template.full_column_width_px();

        // Pass 1: everything at the page-one column width.
        self.enter_phase(cycle, CyclePhase::MeasuringFirstPage).await;
        let first_pass = measure_off_thread(surface.clone(), plan.flow.clone(), first_width).await;
        if !self.is_latest(cycle) {
            return self.superseded(cycle);
        }
        let first_measured = match first_pass {
            Ok(m) => m,
            Err(e) => {
                warn!(cycle, error = %e, "First-page measurement failed; using single-page fallback");
                let layout = fallback_layout(cycle, trigger, &request, plan);
                return self.commit(cycle, trigger, layout).await;
            }
        };

        let first_heights: Vec<f32> = first_measured.iter().map(|m| m.height_px).collect();
        let first_limit = template.geometry.first_page_limit_px();
        let fit = fit_first_page(&first_heights, first_limit);
        let first_blocks: Vec<usize> = (0..fit).collect();
        let mut pages = vec![PageLayout {
            index: 0,
            kind: PageKind::First,
            used_height_px: page_height(&first_heights, &first_blocks),
            blocks: first_blocks,
            limit_px: first_limit,
            column_width_px: first_width,
        }];
        let mut measurements: Vec<MeasuredBlock> = first_measured[..fit].to_vec();
        self.enter_phase(cycle, CyclePhase::PackedFirstPage).await;

        // Pass 2: the remainder at full width.
        if fit < plan.flow.len() {
            self.enter_phase(cycle, CyclePhase::MeasuringRemainder).await;
            let remainder_pass = if first_width == full_width {
                Ok(first_measured[fit..].to_vec())
            } else {
                let remainder: Vec<ContentBlock> = plan.flow[fit..].to_vec();
                measure_off_thread(surface, remainder, full_width).await
            };
            if !self.is_latest(cycle) {
                return self.superseded(cycle);
            }
            let remainder_measured = match remainder_pass {
                Ok(m) => m,
                Err(e) => {
                    warn!(cycle, error = %e, "Remainder measurement failed; using single-page fallback");
                    let layout = fallback_layout(cycle, trigger, &request, plan);
                    return self.commit(cycle, trigger, layout).await;
                }
            };

            let heights: Vec<f32> = remainder_measured.iter().map(|m| m.height_px).collect();
            let limit = template.geometry.page_limit_px();
            for (i, page) in pack_pages(&heights, limit).into_iter().enumerate() {
                pages.push(PageLayout {
                    index: i + 1,
                    kind: PageKind::Overflow,
                    used_height_px: page_height(&heights, &page),
                    blocks: page.into_iter().map(|j| j + fit).collect(),
                    limit_px: limit,
                    column_width_px: full_width,
                });
            }
            measurements.extend(remainder_measured);
        }
        self.enter_phase(cycle, CyclePhase::PackedAllPages).await;

        let oversized = pages.iter().filter(|p| p.is_oversized()).count();
        if oversized > 0 {
            warn!(cycle, oversized, "Blocks taller than a page were placed on their own pages");
        }
        info!(
            cycle,
            ?trigger,
            template = ?template.id,
            blocks = plan.flow.len(),
            sidebar_blocks = plan.sidebar.len(),
            pages = pages.len(),
            "Layout cycle packed"
        );

        let layout = DocumentLayout {
            cycle,
            trigger,
            template: template.id,
            color_scheme: request.color_scheme,
            plan,
            measurements,
            pages,
            fallback: false,
            computed_at: Utc::now(),
        };
        self.commit(cycle, trigger, layout).await
    }

    async fn enter_phase(&self, cycle: u64, phase: CyclePhase) {
        let mut state = self.state.write().await;
        if self.is_latest(cycle) {
            state.phase = phase;
        }
    }

    fn superseded(&self, cycle: u64) -> CycleOutcome {
        let latest = self.latest_cycle();
        debug!(cycle, latest, "Layout cycle superseded; discarding result");
        CycleOutcome::Superseded { cycle, latest }
    }

    async fn commit(&self, cycle: u64, trigger: Trigger, layout: DocumentLayout) -> CycleOutcome {
        let mut state = self.state.write().await;
        // Checked under the write lock so two commits cannot interleave.
        if !self.is_latest(cycle) {
            drop(state);
            return self.superseded(cycle);
        }
        state.phase = CyclePhase::Idle;
        state.latest = Some(layout.clone());
        state.last_trigger = Some(trigger);
        CycleOutcome::Committed(layout)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Runs a measurement pass on the blocking pool.
async fn measure_off_thread(
    surface: Arc<dyn MeasureSurface>,
    blocks: Vec<ContentBlock>,
    width_px: f32,
) -> Result<Vec<MeasuredBlock>, MeasureError> {
    tokio::task::spawn_blocking(move || surface.measure(&blocks, width_px))
        .await
        .map_err(|e| MeasureError::Aborted(e.to_string()))?
}

/// Every flow block on page one, unmeasured.
fn fallback_layout(
    cycle: u64,
    trigger: Trigger,
    request: &LayoutRequest,
    plan: BlockPlan,
) -> DocumentLayout {
    let template = &request.template;
    DocumentLayout {
        cycle,
        trigger,
        template: template.id,
        color_scheme: request.color_scheme,
        pages: vec![PageLayout {
            index: 0,
            kind: PageKind::First,
            blocks: (0..plan.flow.len()).collect(),
            used_height_px: 0.0,
            limit_px: template.geometry.first_page_limit_px(),
            column_width_px: template.first_column_width_px(),
        }],
        plan,
        measurements: Vec::new(),
        fallback: true,
        computed_at: Utc::now(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::{mpsc as std_mpsc, Mutex};
    use std::time::Duration;

    use tokio::sync::mpsc;

    use crate::layout::blocks::SectionKind;
    use crate::layout::measure::MetricsSurface;
    use crate::layout::theme::template;
    use crate::models::resume::{
        Education, Experience, PersonalInfo, Project, Reference, SkillCategory,
    };

    /// Reports a fixed height per block, one table for page-one width and one for full width.
    struct TableSurface {
        first_width: f32,
        first: Vec<f32>,
        full: Vec<f32>,
        calls: AtomicUsize,
    }

    impl TableSurface {
        fn new(template: &TemplateSpec, first: Vec<f32>, full: Vec<f32>) -> Arc<Self> {
            Arc::new(Self {
                first_width: template.first_column_width_px(),
                first,
                full,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl MeasureSurface for TableSurface {
        fn measure(
            &self,
            blocks: &[ContentBlock],
            width_px: f32,
        ) -> Result<Vec<MeasuredBlock>, MeasureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let table = if width_px == self.first_width {
                &self.first
            } else {
                &self.full
            };
            Ok(blocks
                .iter()
                .map(|b| MeasuredBlock {
                    index: b.index,
                    height_px: table[b.index],
                    width_px,
                })
                .collect())
        }
    }

    struct BrokenSurface;

    impl MeasureSurface for BrokenSurface {
        fn measure(&self, _: &[ContentBlock], width_px: f32) -> Result<Vec<MeasuredBlock>, MeasureError> {
            Err(MeasureError::ZeroSized { width_px })
        }
    }

    /// Sleeps through its first pass only.
    struct SlowOnceSurface {
        slept: AtomicBool,
    }

    impl MeasureSurface for SlowOnceSurface {
        fn measure(
            &self,
            blocks: &[ContentBlock],
            width_px: f32,
        ) -> Result<Vec<MeasuredBlock>, MeasureError> {
            if !self.slept.swap(true, Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(300));
            }
            Ok(blocks
                .iter()
                .map(|b| MeasuredBlock {
                    index: b.index,
                    height_px: 100.0,
                    width_px,
                })
                .collect())
        }
    }

    fn every_section_record() -> ResumeRecord {
        ResumeRecord {
            personal_info: PersonalInfo {
                full_name: "Asha Rao".to_string(),
                summary: "Infrastructure engineer.".to_string(),
                ..Default::default()
            },
            experience: vec![Experience {
                company: "Acme".to_string(),
                ..Default::default()
            }],
            education: vec![Education {
                institution: "IIT".to_string(),
                ..Default::default()
            }],
            skills: vec![SkillCategory {
                category: "Languages".to_string(),
                skills: vec!["Rust".to_string()],
            }],
            projects: vec![Project {
                name: "Folio".to_string(),
                ..Default::default()
            }],
            references: vec![Reference {
                name: "R. Iyer".to_string(),
                ..Default::default()
            }],
        }
    }

    fn request(id: TemplateId, record: ResumeRecord) -> LayoutRequest {
        LayoutRequest {
            record,
            template: template(id),
            color_scheme: ColorSchemeId::Navy,
        }
    }

    fn committed(outcome: CycleOutcome) -> DocumentLayout {
        match outcome {
            CycleOutcome::Committed(layout) => layout,
            other => panic!("expected Committed, got {other:?}"),
        }
    }

    fn page_blocks(layout: &DocumentLayout) -> Vec<Vec<usize>> {
        layout.pages.iter().map(|p| p.blocks.clone()).collect()
    }

    #[tokio::test]
    async fn test_cycle_skipped_without_surface() {
        let engine = LayoutEngine::new();
        let outcome = engine
            .recompute(request(TemplateId::Usa, every_section_record()), Trigger::Initial)
            .await;
        assert!(matches!(outcome, CycleOutcome::Skipped { cycle: 1 }));
        let state = engine.snapshot().await;
        assert!(state.latest.is_none());
        assert_eq!(state.phase, CyclePhase::Idle);
    }

    #[tokio::test]
    async fn test_single_column_uses_one_measurement_pass() {
        let usa = template(TemplateId::Usa);
        let surface = TableSurface::new(&usa, vec![300.0; 7], vec![999.0; 7]);
        let engine = LayoutEngine::with_surface(surface.clone());

        let layout = committed(
            engine
                .recompute(request(TemplateId::Usa, every_section_record()), Trigger::Initial)
                .await,
        );

        assert_eq!(surface.calls.load(Ordering::SeqCst), 1);
        assert_eq!(page_blocks(&layout), vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
        assert_eq!(layout.pages[0].kind, PageKind::First);
        assert_eq!(layout.pages[1].kind, PageKind::Overflow);
        assert!(!layout.fallback);
    }

    #[tokio::test]
    async fn test_sidebar_template_remeasures_remainder_at_full_width() {
        let india = template(TemplateId::India);
        // India flow: header, summary, experience, projects, references.
        let surface = TableSurface::new(&india, vec![400.0; 5], vec![200.0; 5]);
        let engine = LayoutEngine::with_surface(surface.clone());

        let layout = committed(
            engine
                .recompute(request(TemplateId::India, every_section_record()), Trigger::Initial)
                .await,
        );

        assert_eq!(surface.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            layout.plan.sidebar.iter().map(|b| b.section).collect::<Vec<_>>(),
            vec![SectionKind::Education, SectionKind::Skills]
        );
        assert_eq!(page_blocks(&layout), vec![vec![0, 1], vec![2, 3, 4]]);
        assert_eq!(layout.pages[0].column_width_px, india.first_column_width_px());
        assert_eq!(layout.pages[1].column_width_px, india.full_column_width_px());
        assert_eq!(layout.measurements.len(), 5);
        assert_eq!(layout.measurements[2].height_px, 200.0);
    }

    #[tokio::test]
    async fn test_empty_record_commits_one_empty_page() {
        let usa = template(TemplateId::Usa);
        let engine = LayoutEngine::with_surface(Arc::new(MetricsSurface::new(usa.typography)));
        let layout = committed(
            engine
                .recompute(request(TemplateId::Usa, ResumeRecord::default()), Trigger::Initial)
                .await,
        );
        assert_eq!(page_blocks(&layout), vec![Vec::<usize>::new()]);
    }

    #[tokio::test]
    async fn test_measurement_failure_commits_single_page_fallback() {
        let engine = LayoutEngine::with_surface(Arc::new(BrokenSurface));
        let layout = committed(
            engine
                .recompute(request(TemplateId::Usa, every_section_record()), Trigger::ContentChanged)
                .await,
        );
        assert!(layout.fallback);
        assert_eq!(page_blocks(&layout), vec![(0..7).collect::<Vec<_>>()]);
    }

    #[tokio::test]
    async fn test_commit_updates_state() {
        let usa = template(TemplateId::Usa);
        let engine = LayoutEngine::with_surface(Arc::new(MetricsSurface::new(usa.typography)));
        engine
            .recompute(request(TemplateId::Usa, every_section_record()), Trigger::ColorSchemeChanged)
            .await;
        let state = engine.snapshot().await;
        assert_eq!(state.phase, CyclePhase::Idle);
        assert_eq!(state.last_trigger, Some(Trigger::ColorSchemeChanged));
        assert_eq!(state.latest.map(|l| l.cycle), Some(1));
    }

    #[tokio::test]
    async fn test_detach_then_attach_resumes_cycles() {
        let usa = template(TemplateId::Usa);
        let engine = LayoutEngine::with_surface(Arc::new(MetricsSurface::new(usa.typography)));
        engine.detach().await;
        let skipped = engine
            .recompute(request(TemplateId::Usa, every_section_record()), Trigger::ContentChanged)
            .await;
        assert!(matches!(skipped, CycleOutcome::Skipped { .. }));

        engine.attach(Arc::new(MetricsSurface::new(usa.typography))).await;
        let layout = committed(
            engine
                .recompute(request(TemplateId::Usa, every_section_record()), Trigger::ContentChanged)
                .await,
        );
        assert_eq!(layout.cycle, 2);
    }

    /// Reports each pass's width, then blocks until released.
    struct GatedSurface {
        entered: mpsc::UnboundedSender<f32>,
        release: Mutex<std_mpsc::Receiver<()>>,
    }

    impl MeasureSurface for GatedSurface {
        fn measure(
            &self,
            blocks: &[ContentBlock],
            width_px: f32,
        ) -> Result<Vec<MeasuredBlock>, MeasureError> {
            let _ = self.entered.send(width_px);
            let released = self
                .release
                .lock()
                .map_err(|e| MeasureError::Aborted(e.to_string()))?
                .recv();
            released.map_err(|e| MeasureError::Aborted(e.to_string()))?;
            Ok(blocks
                .iter()
                .map(|b| MeasuredBlock {
                    index: b.index,
                    height_px: 600.0,
                    width_px,
                })
                .collect())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_phases_advance_through_both_passes() {
        let india = template(TemplateId::India);
        let (entered_tx, mut entered_rx) = mpsc::unbounded_channel();
        let (release_tx, release_rx) = std_mpsc::channel();
        let engine = Arc::new(LayoutEngine::with_surface(Arc::new(GatedSurface {
            entered: entered_tx,
            release: Mutex::new(release_rx),
        })));
        assert_eq!(engine.snapshot().await.phase, CyclePhase::Idle);

        let running = engine.clone();
        let cycle = tokio::spawn(async move {
            running
                .recompute(request(TemplateId::India, every_section_record()), Trigger::Initial)
                .await
        });

        let width = entered_rx.recv().await.unwrap();
        assert_eq!(width, india.first_column_width_px());
        assert_eq!(engine.snapshot().await.phase, CyclePhase::MeasuringFirstPage);
        release_tx.send(()).unwrap();

        // 600px blocks: only the header fits page one, so a remainder pass follows.
        let width = entered_rx.recv().await.unwrap();
        assert_eq!(width, india.full_column_width_px());
        assert_eq!(engine.snapshot().await.phase, CyclePhase::MeasuringRemainder);
        release_tx.send(()).unwrap();

        let layout = committed(cycle.await.unwrap());
        assert_eq!(layout.pages[0].blocks, vec![0]);
        assert_eq!(engine.snapshot().await.phase, CyclePhase::Idle);

        // An older cycle number cannot move the phase.
        engine.enter_phase(0, CyclePhase::MeasuringRemainder).await;
        assert_eq!(engine.snapshot().await.phase, CyclePhase::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stale_cycle_is_discarded() {
        let engine = Arc::new(LayoutEngine::with_surface(Arc::new(SlowOnceSurface {
            slept: AtomicBool::new(false),
        })));

        let slow_engine = engine.clone();
        let slow = tokio::spawn(async move {
            slow_engine
                .recompute(request(TemplateId::Usa, every_section_record()), Trigger::Initial)
                .await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let fresh = engine
            .recompute(request(TemplateId::Usa, ResumeRecord::default()), Trigger::ContentChanged)
            .await;
        let fresh = committed(fresh);
        assert_eq!(fresh.cycle, 2);

        match slow.await.unwrap() {
            CycleOutcome::Superseded { cycle, latest } => {
                assert_eq!(cycle, 1);
                assert_eq!(latest, 2);
            }
            other => panic!("expected Superseded, got {other:?}"),
        }
        let state = engine.snapshot().await;
        assert_eq!(state.latest.map(|l| l.cycle), Some(2));
    }
}
