// THEORY:
// Scoring is the expensive half of a search: every pixel of the frame is read on
// every frame. Cells are independent, read-only, disjoint pixel ranges, so the
// scoring pass fans out cleanly:
//
//   snapshot frame into Arc -> split grid columns into bands -> score each band
//   on a blocking worker -> join all bands -> ONE sequential max reduction
//
// The reduction is the exact `select_max` used by the synchronous path, so the
// tie-break (first cell in column-then-row order) is identical no matter how
// many workers ran or in what order they finished.

use crate::core_modules::frame::Frame;
use crate::core_modules::grid_partitioner::{CellSizeState, GridGeometry};
use crate::core_modules::intensity_search::{self, ScoreGrid, SearchHit, score_columns};
use crate::core_modules::overlay::{OverlaySink, SquareOverlay};
use crate::error::{BrightSpotError, Result};
use crate::pipeline::{PipelineConfig, Report};
use futures::future::try_join_all;
use std::ops::Range;
use std::sync::Arc;

/// Scores grid cells across a pool of blocking tokio workers.
#[derive(Debug, Clone, Copy)]
pub struct ParallelIntensitySearch {
    workers: usize,
}

impl Default for ParallelIntensitySearch {
    fn default() -> Self {
        Self::with_workers(num_cpus::get())
    }
}

impl ParallelIntensitySearch {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Scores every cell of the snapshot, one band of columns per worker.
    pub async fn score(&self, frame: Arc<Frame>, cell_size: u32) -> Result<ScoreGrid> {
        let grid = GridGeometry::new(frame.width(), frame.height(), cell_size)?;
        let mut scores = ScoreGrid::zeroed(grid);
        if grid.is_empty() {
            return Ok(scores);
        }

        let tasks = column_bands(grid.columns, self.workers).into_iter().map(|band| {
            let frame = Arc::clone(&frame);
            tokio::task::spawn_blocking(move || {
                let start = band.start;
                (start, score_columns(&frame, &grid, band))
            })
        });

        let bands = try_join_all(tasks)
            .await
            .map_err(|e| BrightSpotError::WorkerFailed(e.to_string()))?;

        for (start, band_scores) in bands {
            for (offset, value) in band_scores.into_iter().enumerate() {
                let offset = offset as u32;
                scores.set(start + offset / grid.rows, offset % grid.rows, value);
            }
        }

        Ok(scores)
    }

    /// Parallel scoring followed by the shared sequential reduction.
    pub async fn find_max(&self, frame: Arc<Frame>, cell_size: u32) -> Result<Option<SearchHit>> {
        let scores = self.score(frame, cell_size).await?;
        let hit = intensity_search::select_max(&scores);
        intensity_search::report(hit.as_ref());
        Ok(hit)
    }
}

/// Splits `0..columns` into at most `workers` contiguous, near-equal bands.
fn column_bands(columns: u32, workers: usize) -> Vec<Range<u32>> {
    let workers = (workers as u32).clamp(1, columns.max(1));
    let base = columns / workers;
    let extra = columns % workers;

    let mut bands = Vec::with_capacity(workers as usize);
    let mut start = 0;
    for w in 0..workers {
        let len = base + u32::from(w < extra);
        if len > 0 {
            bands.push(start..start + len);
        }
        start += len;
    }
    bands
}

/// Async counterpart of `BrightSpotPipeline` that scores on worker threads.
pub struct ParallelPipeline<S: OverlaySink = SquareOverlay> {
    config: PipelineConfig,
    cell_size_state: CellSizeState,
    search: ParallelIntensitySearch,
    overlay: S,
}

impl ParallelPipeline<SquareOverlay> {
    pub fn new(config: PipelineConfig) -> Self {
        let overlay = SquareOverlay::new(config.overlay_color);
        Self::with_parts(config, ParallelIntensitySearch::default(), overlay)
    }
}

impl<S: OverlaySink> ParallelPipeline<S> {
    pub fn with_parts(config: PipelineConfig, search: ParallelIntensitySearch, overlay: S) -> Self {
        log::debug!("parallel pipeline scoring on {} workers", search.workers());
        Self {
            config,
            cell_size_state: CellSizeState::Uninitialized,
            search,
            overlay,
        }
    }

    /// Scores a snapshot of `frame`, then draws on the frame once every worker is done.
    pub async fn process_frame(&mut self, frame: Frame) -> Result<(Frame, Report)> {
        let cell_size = self
            .cell_size_state
            .resolve(frame.width(), frame.height(), self.config.policy)?;

        let snapshot = Arc::new(frame);
        let hit = self.search.find_max(Arc::clone(&snapshot), cell_size).await?;
        let mut frame = Arc::try_unwrap(snapshot).unwrap_or_else(|shared| (*shared).clone());

        let report = match hit {
            Some(hit) => {
                let (x, y) = hit.center();
                self.overlay.render(
                    &mut frame,
                    x as i64,
                    y as i64,
                    self.config.box_width,
                    self.config.box_height,
                );
                Report::RegionFound(hit)
            }
            None => {
                log::warn!("no region found: cell size {} exceeds frame", cell_size);
                Report::NoRegionFound
            }
        };

        Ok((frame, report))
    }

    pub fn cell_size(&self) -> Option<u32> {
        self.cell_size_state.cell_size()
    }
}
