// THEORY:
// The `GridPartitioner` decides how coarse the search is. It carves a frame into
// square cells whose side is derived from the frame's own aspect ratio: the gcd
// of width and height is the largest square that tiles both axes exactly, so the
// default grid never leaves a remainder strip, whatever the camera resolution.
//
// Key architectural principles:
// 1.  **Policy, not Constant**: How the side is picked is a `CellSizePolicy`.
//     `Gcd` is the base case, `Refined` divides the gcd for a finer (more
//     precise, more expensive) grid, and `Fixed` is an explicit override.
// 2.  **Stable Across a Session**: A live feed keeps its geometry, and callers
//     want the same grid every frame. `CellSizeState` is an explicit two-state
//     machine (`Uninitialized -> Ready`) that derives the side on the first frame
//     and again only when the frame dimensions change.
// 3.  **Fail Loudly**: A side below one pixel means the frame geometry is broken.
//     That is a typed, fatal error; we never paper over it with a default.

use crate::core_modules::chunk::chunk::CellBounds;
use crate::error::{BrightSpotError, Result};

/// How much the refined policy subdivides the gcd by default.
pub const DEFAULT_REFINEMENT_DIVISOR: u32 = 4;

/// Greatest common divisor by Euclid's algorithm. `gcd(a, 0) == a`.
pub fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        return a;
    }
    gcd(b, a % b)
}

/// How the cell side is derived from the frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSizePolicy {
    /// `g = gcd(width, height)`.
    Gcd,
    /// `g = gcd(width, height) / divisor`.
    Refined { divisor: u32 },
    /// A caller-chosen side, independent of the frame.
    Fixed(u32),
}

impl Default for CellSizePolicy {
    fn default() -> Self {
        CellSizePolicy::Refined {
            divisor: DEFAULT_REFINEMENT_DIVISOR,
        }
    }
}

impl CellSizePolicy {
    /// Derives the cell side for a `width x height` frame.
    ///
    /// A frame with no pixels on either axis has no grid at all, whatever the policy.
    pub fn cell_size(&self, width: u32, height: u32) -> Result<u32> {
        if width == 0 || height == 0 {
            return Err(BrightSpotError::DegenerateCellSize {
                width,
                height,
                cell_size: 0,
            });
        }

        let cell_size = match *self {
            CellSizePolicy::Gcd => gcd(width, height),
            CellSizePolicy::Refined { divisor } => {
                if divisor == 0 {
                    return Err(BrightSpotError::ZeroRefinementDivisor);
                }
                gcd(width, height) / divisor
            }
            CellSizePolicy::Fixed(side) => side,
        };

        if cell_size < 1 {
            return Err(BrightSpotError::DegenerateCellSize {
                width,
                height,
                cell_size,
            });
        }
        Ok(cell_size)
    }
}

/// The grid laid over one frame geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub frame_width: u32,
    pub frame_height: u32,
    pub cell_size: u32,
    /// Number of cells along x (`frame_width / cell_size`).
    pub columns: u32,
    /// Number of cells along y (`frame_height / cell_size`).
    pub rows: u32,
}

impl GridGeometry {
    /// Lays a grid of `cell_size` cells over the frame. Partial trailing strips are dropped.
    pub fn new(frame_width: u32, frame_height: u32, cell_size: u32) -> Result<Self> {
        if cell_size < 1 {
            return Err(BrightSpotError::DegenerateCellSize {
                width: frame_width,
                height: frame_height,
                cell_size,
            });
        }
        Ok(Self {
            frame_width,
            frame_height,
            cell_size,
            columns: frame_width / cell_size,
            rows: frame_height / cell_size,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// True when the cell is larger than the frame on at least one axis.
    pub fn is_empty(&self) -> bool {
        self.columns == 0 || self.rows == 0
    }

    /// Pixel bounds of cell `(i, j)`, column `i`, row `j`.
    pub fn cell_bounds(&self, i: u32, j: u32) -> CellBounds {
        let (x, y) = self.to_pixel(i, j);
        CellBounds::square(x, y, self.cell_size)
    }

    /// Top-left pixel of cell `(i, j)`.
    pub fn to_pixel(&self, i: u32, j: u32) -> (u32, u32) {
        (i * self.cell_size, j * self.cell_size)
    }
}

/// The cell side carried from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellSizeState {
    #[default]
    Uninitialized,
    Ready {
        width: u32,
        height: u32,
        cell_size: u32,
    },
}

impl CellSizeState {
    /// Returns the cell side for this frame geometry, deriving it on the first
    /// frame or when the dimensions differ from the cached ones.
    ///
    /// A failed derivation leaves the state untouched.
    pub fn resolve(&mut self, width: u32, height: u32, policy: CellSizePolicy) -> Result<u32> {
        if let CellSizeState::Ready {
            width: cached_width,
            height: cached_height,
            cell_size,
        } = *self
        {
            if cached_width == width && cached_height == height {
                return Ok(cell_size);
            }
            log::debug!(
                "frame geometry changed from {}x{} to {}x{}, re-deriving cell size",
                cached_width,
                cached_height,
                width,
                height
            );
        }

        let cell_size = policy.cell_size(width, height)?;
        log::debug!("cell size {} for {}x{} frames ({:?})", cell_size, width, height, policy);
        *self = CellSizeState::Ready {
            width,
            height,
            cell_size,
        };
        Ok(cell_size)
    }

    pub fn cell_size(&self) -> Option<u32> {
        match self {
            CellSizeState::Uninitialized => None,
            CellSizeState::Ready { cell_size, .. } => Some(*cell_size),
        }
    }

    pub fn reset(&mut self) {
        *self = CellSizeState::Uninitialized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_base_cases() {
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(gcd(12, 12), 12);
        assert_eq!(gcd(1, 1), 1);
    }

    #[test]
    fn gcd_is_symmetric() {
        for a in 1..60u32 {
            for b in 1..60u32 {
                assert_eq!(gcd(a, b), gcd(b, a), "gcd({a}, {b})");
            }
        }
    }

    #[test]
    fn gcd_of_common_resolutions() {
        assert_eq!(gcd(640, 480), 160);
        assert_eq!(gcd(1920, 1080), 120);
        assert_eq!(gcd(1280, 720), 80);
        assert_eq!(gcd(641, 480), 1);
    }

    #[test]
    fn gcd_grid_tiles_the_frame_exactly() {
        let g = CellSizePolicy::Gcd.cell_size(1920, 1080).unwrap();
        let grid = GridGeometry::new(1920, 1080, g).unwrap();
        assert_eq!((grid.columns, grid.rows), (16, 9));
        assert_eq!(grid.columns * g, 1920);
        assert_eq!(grid.rows * g, 1080);
    }

    #[test]
    fn refined_policy_divides_the_gcd() {
        let policy = CellSizePolicy::default();
        assert_eq!(policy.cell_size(640, 480).unwrap(), 40);
        assert_eq!(CellSizePolicy::Refined { divisor: 1 }.cell_size(640, 480).unwrap(), 160);
    }

    #[test]
    fn zero_sized_frames_are_fatal() {
        let err = CellSizePolicy::Gcd.cell_size(0, 0).unwrap_err();
        assert!(matches!(
            err,
            BrightSpotError::DegenerateCellSize { cell_size: 0, .. }
        ));
    }

    #[test]
    fn frames_with_one_zero_dimension_are_fatal() {
        for policy in [
            CellSizePolicy::Gcd,
            CellSizePolicy::default(),
            CellSizePolicy::Fixed(1),
        ] {
            for (width, height) in [(0, 7), (7, 0), (0, 640)] {
                let err = policy.cell_size(width, height).unwrap_err();
                assert!(
                    matches!(
                        err,
                        BrightSpotError::DegenerateCellSize { cell_size: 0, .. }
                    ),
                    "{policy:?} {width}x{height}: {err:?}"
                );
            }
        }
    }

    #[test]
    fn refinement_below_one_pixel_is_fatal() {
        let err = CellSizePolicy::default().cell_size(641, 480).unwrap_err();
        assert!(matches!(
            err,
            BrightSpotError::DegenerateCellSize { width: 641, height: 480, cell_size: 0 }
        ));
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let err = CellSizePolicy::Refined { divisor: 0 }.cell_size(640, 480).unwrap_err();
        assert!(matches!(err, BrightSpotError::ZeroRefinementDivisor));
    }

    #[test]
    fn oversized_cells_give_an_empty_grid() {
        let grid = GridGeometry::new(8, 8, 9).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.cell_count(), 0);
        assert!(GridGeometry::new(8, 8, 0).is_err());
    }

    #[test]
    fn trailing_strips_are_excluded() {
        let grid = GridGeometry::new(10, 7, 3).unwrap();
        assert_eq!((grid.columns, grid.rows), (3, 2));
        assert_eq!(grid.cell_bounds(2, 1), CellBounds::square(6, 3, 3));
        assert_eq!(grid.to_pixel(2, 1), (6, 3));
    }

    #[test]
    fn state_derives_once_per_geometry() {
        let mut state = CellSizeState::default();
        assert_eq!(state.cell_size(), None);

        assert_eq!(state.resolve(640, 480, CellSizePolicy::Gcd).unwrap(), 160);
        // Same geometry: the cached size wins even if the policy would now differ.
        assert_eq!(state.resolve(640, 480, CellSizePolicy::Fixed(3)).unwrap(), 160);

        assert_eq!(state.resolve(1280, 720, CellSizePolicy::Gcd).unwrap(), 80);
        assert_eq!(
            state,
            CellSizeState::Ready { width: 1280, height: 720, cell_size: 80 }
        );

        state.reset();
        assert_eq!(state, CellSizeState::Uninitialized);
    }

    #[test]
    fn failed_derivation_keeps_previous_state() {
        let mut state = CellSizeState::default();
        state.resolve(640, 480, CellSizePolicy::Gcd).unwrap();
        assert!(state.resolve(0, 0, CellSizePolicy::Gcd).is_err());
        assert!(state.resolve(0, 480, CellSizePolicy::Gcd).is_err());
        assert_eq!(state.cell_size(), Some(160));
    }
}
