//! Adaptive supersampling scan.
//!
//! Pixels are refined as a deterministic quad tree over corner samples at
//! quarter-pixel resolution. Samples shared between neighboring pixels,
//! and between the bottom edge of one scanline and the top edge of the
//! next, are shot once and reused through a per-row cache. Because of the
//! row-to-row carry the scan is sequential by construction.

use glint_core::Color;

use crate::target::RenderTarget;
use crate::tracer::{Frame, RayTracer};

/// Per-channel deviation from the corner mean above which a quad splits.
const ADAPT_THRESHOLD: f32 = 0.06;

/// Quad-tree depth. Corners are cached down to level 2 (quarter-pixel
/// spacing); level 3 stops subdividing and shoots directly.
const MAX_SUBDIVISION_LEVEL: u32 = 3;

/// Sample cache for the scanline in flight: 5 sub-pixel rows spanning the
/// pixel row's top and bottom edges, by 4 sub-pixel columns per pixel plus
/// the closing edge.
///
/// All cached sample coordinates are quarter-pixel aligned, so the cell
/// index is exact and a sample is never re-shot at the same coordinate.
struct RowCache {
    cols: usize,
    /// Pixel-space y of cache row 0.
    row_base: f32,
    cells: Vec<Option<Color>>,
}

impl RowCache {
    fn new(width: u32) -> Self {
        let cols = (4 * width + 1) as usize;
        Self {
            cols,
            row_base: 0.0,
            cells: vec![None; cols * 5],
        }
    }

    /// Begin pixel row `row`, carrying the previous row's bottom edge over
    /// as the new top edge.
    fn advance(&mut self, row: u32) {
        self.row_base = row as f32;
        if row == 0 {
            self.cells.fill(None);
        } else {
            let cols = self.cols;
            self.cells.copy_within(4 * cols.., 0);
            self.cells[cols..].fill(None);
        }
    }

    fn slot(&mut self, x: f32, y: f32) -> &mut Option<Color> {
        let col = (x * 4.0).round() as usize;
        let row = ((y - self.row_base) * 4.0).round() as usize;
        debug_assert!(col < self.cols && row < 5, "sample ({x}, {y}) off cache");
        &mut self.cells[row * self.cols + col]
    }
}

/// Resolve a corner sample, shooting only on a cache miss.
fn corner(tracer: &RayTracer, frame: &Frame, cache: &mut RowCache, x: f32, y: f32) -> Color {
    let slot = cache.slot(x, y);
    match *slot {
        Some(color) => color,
        None => {
            let color = tracer.shoot(frame, x, y);
            *slot = Some(color);
            color
        }
    }
}

/// Resolve the color of the quad with top-left corner (x, y) and the given
/// edge length, splitting it while its corner samples disagree.
fn subdivide(
    tracer: &RayTracer,
    frame: &Frame,
    cache: &mut RowCache,
    x: f32,
    y: f32,
    step: f32,
    level: u32,
) -> Color {
    if level >= MAX_SUBDIVISION_LEVEL {
        // Floor: one uncached ray through the quad center. Going deeper
        // would put corners off the quarter-pixel grid of the cache.
        return tracer.shoot(frame, x + 0.5 * step, y + 0.5 * step);
    }

    let top_left = corner(tracer, frame, cache, x, y);
    let top_right = corner(tracer, frame, cache, x + step, y);
    let bottom_left = corner(tracer, frame, cache, x, y + step);
    let bottom_right = corner(tracer, frame, cache, x + step, y + step);

    let mean = (top_left + top_right + bottom_left + bottom_right) * 0.25;
    let spread = (mean - top_left)
        .abs()
        .max((mean - top_right).abs())
        .max((mean - bottom_left).abs())
        .max((mean - bottom_right).abs())
        .max_element();
    if spread < ADAPT_THRESHOLD {
        return mean;
    }

    let half = step * 0.5;
    (subdivide(tracer, frame, cache, x, y, half, level + 1)
        + subdivide(tracer, frame, cache, x + half, y, half, level + 1)
        + subdivide(tracer, frame, cache, x, y + half, half, level + 1)
        + subdivide(tracer, frame, cache, x + half, y + half, half, level + 1))
        * 0.25
}

pub(crate) fn adaptive_scan(tracer: &RayTracer, frame: &Frame, target: &mut dyn RenderTarget) {
    let mut cache = RowCache::new(frame.width);
    let mut row = vec![Color::ZERO; frame.width as usize];

    for j in 0..frame.height {
        log::debug!("scanning line {} of {}", j + 1, frame.height);
        cache.advance(j);
        for i in 0..frame.width {
            row[i as usize] = subdivide(tracer, frame, &mut cache, i as f32, j as f32, 1.0, 0);
        }
        target.write_row(j, &row);
    }
}
