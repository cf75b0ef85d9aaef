// THEORY:
// `IntensitySearch` answers one question per frame: which grid cell is brightest?
// It runs in two strictly separated stages.
//
// 1.  **Scoring**: every cell of the grid gets the sum of its pixels' luminance.
//     Cells are independent, read-only, disjoint pixel ranges, so this stage may
//     be split across workers (see `parallel_pipeline`). Scores land in a proper
//     row-major 2-D buffer; two different cells never share a slot.
// 2.  **Selection**: one sequential pass, outer loop over columns `i`, inner loop
//     over rows `j`, keeping a running maximum with a strict `<`. The first
//     maximum encountered wins ties, so a uniformly lit frame always resolves to
//     cell `(0, 0)`. This stage is never parallelized.
//
// Every pixel is re-read every frame. Nothing but the cell size survives between
// frames.

use crate::core_modules::chunk::chunk::cell_luminance_sum;
use crate::core_modules::frame::Frame;
use crate::core_modules::grid_partitioner::{GridGeometry, gcd};
use crate::core_modules::pixel::pixel::Luminance;
use crate::error::Result;
use std::ops::Range;

/// Running-maximum sentinel, below any possible luminance sum.
const MAX_SENTINEL: Luminance = -1.0;

/// Luminance sums for every cell of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGrid {
    geometry: GridGeometry,
    /// Row-major: `scores[j * columns + i]`.
    scores: Vec<Luminance>,
}

impl ScoreGrid {
    pub fn zeroed(geometry: GridGeometry) -> Self {
        Self {
            scores: vec![0.0; geometry.cell_count()],
            geometry,
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn get(&self, i: u32, j: u32) -> Option<Luminance> {
        self.index(i, j).map(|idx| self.scores[idx])
    }

    pub fn set(&mut self, i: u32, j: u32, score: Luminance) {
        if let Some(idx) = self.index(i, j) {
            self.scores[idx] = score;
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn index(&self, i: u32, j: u32) -> Option<usize> {
        if i >= self.geometry.columns || j >= self.geometry.rows {
            return None;
        }
        Some(j as usize * self.geometry.columns as usize + i as usize)
    }
}

/// The winning cell of a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Grid indices `(i, j)`: column, row.
    pub cell: (u32, u32),
    /// Top-left pixel of the winning cell, `(i * g, j * g)`.
    pub point: (u32, u32),
    pub score: Luminance,
    pub cell_size: u32,
}

impl SearchHit {
    /// Center pixel of the winning cell.
    pub fn center(&self) -> (u32, u32) {
        let half = self.cell_size / 2;
        (self.point.0 + half, self.point.1 + half)
    }
}

/// Scores the cells in columns `columns` of `grid`, column by column, top to bottom.
pub fn score_columns(frame: &Frame, grid: &GridGeometry, columns: Range<u32>) -> Vec<Luminance> {
    let mut scores = Vec::with_capacity(columns.len() * grid.rows as usize);
    for i in columns {
        for j in 0..grid.rows {
            scores.push(cell_luminance_sum(frame, grid.cell_bounds(i, j)));
        }
    }
    scores
}

/// Scores every cell of `frame` under cell side `cell_size`.
pub fn score(frame: &Frame, cell_size: u32) -> Result<ScoreGrid> {
    let grid = GridGeometry::new(frame.width(), frame.height(), cell_size)?;
    let mut scores = ScoreGrid::zeroed(grid);
    if grid.is_empty() {
        return Ok(scores);
    }

    for (offset, value) in score_columns(frame, &grid, 0..grid.columns).into_iter().enumerate() {
        let offset = offset as u32;
        scores.set(offset / grid.rows, offset % grid.rows, value);
    }
    Ok(scores)
}

/// Picks the brightest cell; the first one in column-then-row order wins ties.
/// Returns `None` for an empty grid.
pub fn select_max(scores: &ScoreGrid) -> Option<SearchHit> {
    let grid = *scores.geometry();
    let mut max_sum = MAX_SENTINEL;
    let mut winner = None;

    for i in 0..grid.columns {
        for j in 0..grid.rows {
            let Some(candidate) = scores.get(i, j) else {
                continue;
            };
            if max_sum < candidate {
                max_sum = candidate;
                winner = Some((i, j));
            }
        }
    }

    winner.map(|(i, j)| SearchHit {
        cell: (i, j),
        point: grid.to_pixel(i, j),
        score: max_sum,
        cell_size: grid.cell_size,
    })
}

/// Finds the brightest `cell_size x cell_size` cell of `frame`.
///
/// `Ok(None)` when the cell does not fit the frame on some axis.
pub fn find_max(frame: &Frame, cell_size: u32) -> Result<Option<SearchHit>> {
    let scores = score(frame, cell_size)?;
    let hit = select_max(&scores);
    report(hit.as_ref());
    Ok(hit)
}

/// Base-case search with `g = gcd(width, height)`.
pub fn find_max_default(frame: &Frame) -> Result<Option<SearchHit>> {
    find_max(frame, gcd(frame.width(), frame.height()))
}

pub(crate) fn report(hit: Option<&SearchHit>) {
    match hit {
        Some(hit) => log::info!("Greatest: {}, {}", hit.cell.0, hit.cell.1),
        None => log::info!("Greatest: none"),
    }
}
