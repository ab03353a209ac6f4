//! Greedy Page Packer: partitions measured block heights into pages.
//!
//! Blocks are never split. A block that does not fit on a page that already holds
//! something starts the next page; a block taller than a whole page gets a page to
//! itself. Landing exactly on the limit counts as fitting.

/// Packs `heights` (in block order) into pages of at most `limit_px`.
///
/// Returns block indices per page. Always returns at least one page; an empty input
/// yields a single empty page.
pub fn pack_pages(heights: &[f32], limit_px: f32) -> Vec<Vec<usize>> {
    let mut pages = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut used = 0.0_f32;

    for (i, &height) in heights.iter().enumerate() {
        if !current.is_empty() && used + height > limit_px {
            pages.push(std::mem::take(&mut current));
            used = 0.0;
        }
        current.push(i);
        used += height;
    }
    pages.push(current);

    pages
}

/// Number of leading blocks that go on the first page under `limit_px`.
///
/// Same rule as `pack_pages`: at least one block when any exist.
pub fn fit_first_page(heights: &[f32], limit_px: f32) -> usize {
    let mut used = 0.0_f32;
    for (i, &height) in heights.iter().enumerate() {
        if i > 0 && used + height > limit_px {
            return i;
        }
        used += height;
    }
    heights.len()
}

/// Sum of the heights on one page.
pub fn page_height(heights: &[f32], page: &[usize]) -> f32 {
    page.iter().map(|&i| heights[i]).sum()
}
