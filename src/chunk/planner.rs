//! Band planner: splits destination rows into per-thread bands and samples
//! rectangle boundaries for footprint estimation.

use crate::error::PlanError;
use crate::geometry::{DPoint, DRect};

/// A contiguous range of destination rows processed by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowBand {
    /// First row of the band.
    pub row_start: usize,
    /// One past the last row of the band.
    pub row_end: usize,
}

impl RowBand {
    pub fn rows(&self) -> usize {
        self.row_end - self.row_start
    }
}

/// Number of work items each thread should take.
///
/// Uses at most `max_threads` threads and never gives a thread fewer than
/// `overhead_limit` items unless a single thread takes everything. Items are
/// split as evenly as possible; the first bands take the remainder.
pub fn optimal_thread_loads(count: usize, overhead_limit: usize, max_threads: usize) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    let threads = (count / overhead_limit.max(1)).clamp(1, max_threads.max(1));
    let base = count / threads;
    let extra = count % threads;
    (0..threads)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Row bands covering `rows` destination rows.
///
/// `overhead_limit` is expressed in pixels, so narrow images get fewer,
/// taller bands.
pub fn plan_row_bands(
    rows: usize,
    cols: usize,
    overhead_limit: usize,
    max_threads: usize,
) -> Result<Vec<RowBand>, PlanError> {
    if max_threads == 0 {
        return Err(PlanError::General("thread count must be > 0".into()));
    }
    let min_rows = overhead_limit.div_ceil(cols.max(1)).max(1);
    let mut bands = Vec::new();
    let mut row_start = 0;
    for load in optimal_thread_loads(rows, min_rows, max_threads) {
        bands.push(RowBand {
            row_start,
            row_end: row_start + load,
        });
        row_start += load;
    }
    Ok(bands)
}

/// Points sampled along the boundary of `rect`, `pts_per_edge` per edge
/// including both corners. Corners appear once.
pub fn rect_boundary_points(rect: &DRect, pts_per_edge: usize) -> Vec<DPoint> {
    let pts = pts_per_edge.max(2);
    let mut points = Vec::with_capacity(pts * 4);

    let (x0, y0, x1, y1) = (rect.x0, rect.y0, rect.x1, rect.y1);
    let step_x = (x1 - x0) / (pts - 1) as f64;
    let step_y = (y1 - y0) / (pts - 1) as f64;

    // Top and bottom edges
    for i in 0..pts {
        let x = if i == pts - 1 { x1 } else { x0 + step_x * i as f64 };
        points.push(DPoint::new(x, y0));
        points.push(DPoint::new(x, y1));
    }
    // Left and right edges without corners
    for i in 1..pts - 1 {
        let y = y0 + step_y * i as f64;
        points.push(DPoint::new(x0, y));
        points.push(DPoint::new(x1, y));
    }

    points
}
