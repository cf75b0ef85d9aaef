// THEORY:
// The `chunk` module is the bridge between single pixels and the grid. A cell of
// the grid is just a rectangle of pixel coordinates (`CellBounds`); the only
// thing we ever need to know about it is how bright it is in total.
//
// Key architectural principles:
// 1.  **Spatial Pooling**: Summing luminance over a g x g block turns hundreds of
//     thousands of pixel reads into a few hundred comparable numbers.
// 2.  **Borrowed, Read-Only**: `cell_luminance_sum` is a free function over a
//     borrowed `Frame`. It never copies pixels and never mutates them, so it can
//     run against a frame that is about to be annotated, or against a shared
//     snapshot from several worker threads at once.
// 3.  **Clipping, not Panicking**: Bounds are clipped to the frame before any
//     read, so a cell hanging off the edge contributes only the pixels it covers.

pub mod chunk {
    use crate::core_modules::frame::Frame;
    use crate::core_modules::pixel::pixel::{CHANNELS, Luminance, luminance};

    /// Half-open pixel rectangle `[x0, x1) x [y0, y1)` covered by one grid cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellBounds {
        pub x0: u32,
        pub y0: u32,
        pub x1: u32,
        pub y1: u32,
    }

    impl CellBounds {
        /// Bounds of the square cell whose top-left corner is `(x, y)`.
        pub fn square(x: u32, y: u32, size: u32) -> Self {
            Self {
                x0: x,
                y0: y,
                x1: x.saturating_add(size),
                y1: y.saturating_add(size),
            }
        }

        pub fn width(&self) -> u32 {
            self.x1.saturating_sub(self.x0)
        }

        pub fn height(&self) -> u32 {
            self.y1.saturating_sub(self.y0)
        }

        pub fn contains(&self, x: u32, y: u32) -> bool {
            x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
        }

        /// The part of these bounds that lies inside a `width x height` frame.
        pub fn clipped(&self, width: u32, height: u32) -> Self {
            Self {
                x0: self.x0.min(width),
                y0: self.y0.min(height),
                x1: self.x1.min(width),
                y1: self.y1.min(height),
            }
        }
    }

    /// Sum of per-pixel luminance over every pixel in `bounds`.
    pub fn cell_luminance_sum(frame: &Frame, bounds: CellBounds) -> Luminance {
        let bounds = bounds.clipped(frame.width(), frame.height());
        let start = bounds.x0 as usize * CHANNELS;
        let end = bounds.x1 as usize * CHANNELS;
        let mut sum = 0.0;

        for y in bounds.y0..bounds.y1 {
            let row = &frame.row(y)[start..end];
            for px in row.chunks_exact(CHANNELS) {
                sum += luminance(px[0], px[1], px[2]);
            }
        }

        sum
    }
}

#[cfg(test)]
mod tests {
    use super::chunk::*;
    use crate::core_modules::frame::Frame;
    use crate::core_modules::pixel::pixel::Pixel;

    #[test]
    fn sums_every_pixel_in_the_cell() {
        let frame = Frame::filled(8, 8, Pixel::new(100, 200, 50));
        let sum = cell_luminance_sum(&frame, CellBounds::square(4, 4, 4));
        assert!((sum - 16.0 * 144.0).abs() < 1e-6, "got {sum}");
    }

    #[test]
    fn only_pixels_inside_bounds_count() {
        let mut frame = Frame::filled(8, 8, Pixel::default());
        frame.set_pixel(5, 5, Pixel::new(255, 255, 255));
        assert!((cell_luminance_sum(&frame, CellBounds::square(4, 4, 4)) - 255.0).abs() < 1e-9);
        assert_eq!(cell_luminance_sum(&frame, CellBounds::square(0, 0, 4)), 0.0);
        assert_eq!(cell_luminance_sum(&frame, CellBounds::square(0, 4, 4)), 0.0);
    }

    #[test]
    fn bounds_hanging_off_the_frame_are_clipped() {
        let frame = Frame::filled(4, 4, Pixel::new(0, 100, 0));
        let sum = cell_luminance_sum(&frame, CellBounds::square(2, 2, 10));
        assert!((sum - 4.0 * 59.0).abs() < 1e-9, "got {sum}");
        assert_eq!(cell_luminance_sum(&frame, CellBounds::square(9, 9, 3)), 0.0);
    }

    #[test]
    fn bounds_geometry() {
        let b = CellBounds::square(4, 8, 4);
        assert_eq!((b.width(), b.height()), (4, 4));
        assert!(b.contains(4, 8));
        assert!(b.contains(7, 11));
        assert!(!b.contains(8, 8));
        assert!(!b.contains(4, 12));
    }
}
