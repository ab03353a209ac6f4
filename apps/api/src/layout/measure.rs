//! Measurement Surface: computes the rendered height of each block at a column width.
//!
//! The surface stands in for an off-screen render target: it lays blocks out exactly
//! as the renderer will (same typography, same indents, same gaps) without producing
//! any output. Heights are only valid for the width they were measured at.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::blocks::ContentBlock;
use crate::layout::font_metrics::get_metrics;
use crate::layout::theme::Typography;

/// Bold runs render roughly this much wider than the regular-weight table predicts.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasureError {
    #[error("measurement column has no usable width ({width_px}px)")]
    ZeroSized { width_px: f32 },

    #[error("measurement pass aborted: {0}")]
    Aborted(String),
}

/// A block's height at one column width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuredBlock {
    pub index: usize,
    pub height_px: f32,
    pub width_px: f32,
}

/// Anything that can report block heights for a column width.
///
/// Implementations must be pure with respect to their inputs: measuring the same
/// blocks at the same width twice yields the same heights.
pub trait MeasureSurface: Send + Sync {
    fn measure(
        &self,
        blocks: &[ContentBlock],
        width_px: f32,
    ) -> Result<Vec<MeasuredBlock>, MeasureError>;
}

/// Metric-table surface used in production.
#[derive(Debug, Clone, Copy)]
pub struct MetricsSurface {
    typography: Typography,
}

impl MetricsSurface {
    pub fn new(typography: Typography) -> Self {
        Self { typography }
    }

    /// Height of a single block at `width_px`.
    pub fn block_height(&self, block: &ContentBlock, width_px: f32) -> f32 {
        let metrics = get_metrics(self.typography.font);
        let runs_height: f32 = block
            .runs
            .iter()
            .map(|run| {
                let size = self.typography.size_px(run.style);
                let available = (width_px - self.typography.indent_px(run.style)).max(1.0);
                // Scale the column rather than every glyph for bold text.
                let available = if run.style.is_bold() {
                    available / BOLD_WIDTH_FACTOR
                } else {
                    available
                };
                let lines = metrics.wrap_px(&run.text, size, available).len();
                lines as f32 * self.typography.line_box_px(run.style)
            })
            .sum();
        // The last run's gap collapses into the block gap, as CSS margins do.
        let gaps = block.runs.len().saturating_sub(1) as f32 * self.typography.run_gap_px;
        runs_height + gaps + self.typography.block_gap_px
    }
}

impl MeasureSurface for MetricsSurface {
    fn measure(
        &self,
        blocks: &[ContentBlock],
        width_px: f32,
    ) -> Result<Vec<MeasuredBlock>, MeasureError> {
        if !width_px.is_finite() || width_px <= 0.0 {
            return Err(MeasureError::ZeroSized { width_px });
        }
        Ok(blocks
            .iter()
            .map(|block| MeasuredBlock {
                index: block.index,
                height_px: self.block_height(block, width_px),
                width_px,
            })
            .collect())
    }
}
