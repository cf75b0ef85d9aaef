// THEORY:
// Every failure the engine can report lives in one typed enum. The split that
// matters to callers is fatal vs. per-frame: a degenerate cell size ends the
// session, a malformed or unreadable frame only costs that frame, and "no region
// found" is not an error at all and travels as a `Report` variant instead.

/// Errors produced by the brightspot engine.
#[derive(thiserror::Error, Debug)]
pub enum BrightSpotError {
    /// The derived (or supplied) cell size is below one pixel.
    #[error("degenerate cell size {cell_size} for a {width}x{height} frame")]
    DegenerateCellSize {
        width: u32,
        height: u32,
        cell_size: u32,
    },
    /// The refined policy was configured with a zero divisor.
    #[error("cell size refinement divisor must be at least 1")]
    ZeroRefinementDivisor,
    /// A pixel buffer does not hold exactly `width * height * 3` bytes.
    #[error("frame buffer for {width}x{height} needs {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    /// One still frame could not be opened or decoded.
    #[error("could not read frame {}: {source}", .path.display())]
    FrameUnreadable {
        path: std::path::PathBuf,
        source: image::ImageError,
    },
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A parallel scoring task panicked or was cancelled.
    #[error("scoring worker failed: {0}")]
    WorkerFailed(String),
}

impl BrightSpotError {
    /// True for errors that must terminate the processing loop.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            BrightSpotError::BufferSizeMismatch { .. } | BrightSpotError::FrameUnreadable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BrightSpotError>;
