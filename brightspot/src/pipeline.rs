// THEORY:
// The `pipeline` module is the top-level API for the engine. It wires the grid
// partitioner, the intensity search and the overlay into one per-frame call and
// owns the only state that outlives a frame: the cell-size state machine.
//
// Per frame:
//   frame arrives -> cell size derived or reused -> every cell scored ->
//   brightest cell selected -> box drawn around its center.
//
// Scoring takes `&Frame`, drawing takes `&mut Frame`, and `process_frame` runs
// them in that order. The borrow checker therefore guarantees a search never
// sees its own annotation.
//
// `run_session` drives a `FrameSource` until it runs dry, the caller asks to stop
// (only ever between frames), or a fatal error occurs.

use crate::core_modules::frame::Frame;
use crate::core_modules::grid_partitioner::{CellSizePolicy, CellSizeState};
use crate::core_modules::intensity_search;
use crate::core_modules::overlay::{DEFAULT_OVERLAY_COLOR, OverlaySink, SquareOverlay};
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::utils::image_helper::image_helper;
use crate::error::Result;
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

// Re-export key data structures for the public API.
pub use crate::core_modules::intensity_search::SearchHit;
pub use crate::error::BrightSpotError;

pub const DEFAULT_BOX_WIDTH: u32 = 50;
pub const DEFAULT_BOX_HEIGHT: u32 = 50;

/// Configuration for the BrightSpotPipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How the cell side is derived from the first frame's geometry.
    pub policy: CellSizePolicy,
    /// Width of the box drawn around the brightest cell, in pixels.
    pub box_width: u32,
    /// Height of the box drawn around the brightest cell, in pixels.
    pub box_height: u32,
    pub overlay_color: Pixel,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            policy: CellSizePolicy::default(),
            box_width: DEFAULT_BOX_WIDTH,
            box_height: DEFAULT_BOX_HEIGHT,
            overlay_color: DEFAULT_OVERLAY_COLOR,
        }
    }
}

/// The output of the pipeline for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// The cell is larger than the frame on some axis; nothing was scored.
    NoRegionFound,
    RegionFound(SearchHit),
}

impl Report {
    pub fn hit(&self) -> Option<&SearchHit> {
        match self {
            Report::NoRegionFound => None,
            Report::RegionFound(hit) => Some(hit),
        }
    }
}

/// Supplies frames to a session. `Ok(None)` marks the end of the stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Plays a list of still images as a video.
///
/// A file that cannot be opened or decoded yields a recoverable
/// `FrameUnreadable` error, so a session skips it and moves on.
pub struct ImageSequenceSource {
    paths: VecDeque<PathBuf>,
    last_path: Option<PathBuf>,
}

impl ImageSequenceSource {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            last_path: None,
        }
    }

    /// The file behind the most recent `next_frame` call, read or not.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };
        log::debug!("loading frame from {}", path.display());
        let frame = match image_helper::load(&path) {
            Ok(frame) => Ok(Some(frame)),
            Err(BrightSpotError::Image(source)) => Err(BrightSpotError::FrameUnreadable {
                path: path.clone(),
                source,
            }),
            Err(err) => Err(err),
        };
        self.last_path = Some(path);
        frame
    }
}

/// Totals for one `run_session` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames_processed: u64,
    pub regions_found: u64,
    pub frames_skipped: u64,
}

/// The main, top-level struct for the engine.
pub struct BrightSpotPipeline<S: OverlaySink = SquareOverlay> {
    config: PipelineConfig,
    cell_size_state: CellSizeState,
    overlay: S,
    last_report: Option<Report>,
}

impl BrightSpotPipeline<SquareOverlay> {
    pub fn new(config: PipelineConfig) -> Self {
        let overlay = SquareOverlay::new(config.overlay_color);
        Self::with_overlay(config, overlay)
    }
}

impl<S: OverlaySink> BrightSpotPipeline<S> {
    pub fn with_overlay(config: PipelineConfig, overlay: S) -> Self {
        Self {
            config,
            cell_size_state: CellSizeState::Uninitialized,
            overlay,
            last_report: None,
        }
    }

    /// Scores the frame and reports the brightest cell without touching the pixels.
    pub fn generate_report(&mut self, frame: &Frame) -> Result<Report> {
        let cell_size = self
            .cell_size_state
            .resolve(frame.width(), frame.height(), self.config.policy)?;

        let report = match intensity_search::find_max(frame, cell_size)? {
            Some(hit) => Report::RegionFound(hit),
            None => {
                log::warn!(
                    "no region found: cell size {} exceeds {}x{} frame",
                    cell_size,
                    frame.width(),
                    frame.height()
                );
                Report::NoRegionFound
            }
        };

        self.last_report = Some(report.clone());
        Ok(report)
    }

    /// Draws the configured box around the winning cell's center.
    pub fn annotate(&mut self, frame: &mut Frame, report: &Report) {
        if let Some(hit) = report.hit() {
            let (x, y) = hit.center();
            self.overlay.render(
                frame,
                x as i64,
                y as i64,
                self.config.box_width,
                self.config.box_height,
            );
        }
    }

    /// Scores, then annotates, one frame.
    pub fn process_frame(&mut self, frame: &mut Frame) -> Result<Report> {
        let report = self.generate_report(frame)?;
        self.annotate(frame, &report);
        Ok(report)
    }

    /// Pulls frames from `source` until it ends, `on_frame` breaks, or a fatal error.
    ///
    /// Frames the source fails to deliver with a recoverable error are skipped.
    pub fn run_session<Src, F>(&mut self, source: &mut Src, mut on_frame: F) -> Result<SessionSummary>
    where
        Src: FrameSource + ?Sized,
        F: FnMut(&Frame, &Report) -> ControlFlow<()>,
    {
        let mut summary = SessionSummary::default();

        loop {
            let mut frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(err) if !err.is_fatal() => {
                    log::warn!("skipping frame: {}", err);
                    summary.frames_skipped += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let report = self.process_frame(&mut frame)?;
            summary.frames_processed += 1;
            if matches!(report, Report::RegionFound(_)) {
                summary.regions_found += 1;
            }

            if on_frame(&frame, &report).is_break() {
                log::info!("session stopped after {} frames", summary.frames_processed);
                break;
            }
        }

        Ok(summary)
    }

    pub fn cell_size(&self) -> Option<u32> {
        self.cell_size_state.cell_size()
    }

    pub fn get_last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }
}
