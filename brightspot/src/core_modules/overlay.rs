// THEORY:
// The overlay is the only code that writes to a frame. It draws a hollow box,
// one pixel wide, around a center point. Each of the four edges is checked on
// its own: an edge that would leave the frame is skipped while the others are
// still drawn, so a region near the border shows up as an open box.

use crate::core_modules::frame::Frame;
use crate::core_modules::pixel::pixel::Pixel;

/// Default box colour, green in both BGR and RGB frames.
pub const DEFAULT_OVERLAY_COLOR: Pixel = Pixel::new(0x00, 0xff, 0x00);

/// Anything that can mark a box on a frame in place.
pub trait OverlaySink {
    fn render(&mut self, frame: &mut Frame, center_x: i64, center_y: i64, box_width: u32, box_height: u32);
}

/// Draws the outline of an axis-aligned box.
#[derive(Debug, Clone, Copy)]
pub struct SquareOverlay {
    pub color: Pixel,
}

impl Default for SquareOverlay {
    fn default() -> Self {
        Self {
            color: DEFAULT_OVERLAY_COLOR,
        }
    }
}

impl SquareOverlay {
    pub fn new(color: Pixel) -> Self {
        Self { color }
    }

    fn vertical(&self, frame: &mut Frame, x: i64, y0: i64, y1: i64) {
        if !(frame.contains(x, y0) && frame.contains(x, y1 - 1)) {
            return;
        }
        for y in y0..y1 {
            frame.set_pixel(x as u32, y as u32, self.color);
        }
    }

    fn horizontal(&self, frame: &mut Frame, y: i64, x0: i64, x1: i64) {
        if !(frame.contains(x0, y) && frame.contains(x1 - 1, y)) {
            return;
        }
        for x in x0..x1 {
            frame.set_pixel(x as u32, y as u32, self.color);
        }
    }
}

impl OverlaySink for SquareOverlay {
    fn render(&mut self, frame: &mut Frame, x: i64, y: i64, box_width: u32, box_height: u32) {
        let half_width = (box_width / 2) as i64;
        let half_height = (box_height / 2) as i64;
        if half_width == 0 || half_height == 0 {
            return;
        }

        let (left, right) = (x - half_width, x + half_width);
        let (top, bottom) = (y - half_height, y + half_height);

        self.vertical(frame, left, top, bottom);
        self.vertical(frame, right, top, bottom);
        self.horizontal(frame, top, left, right);
        self.horizontal(frame, bottom, left, right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted(frame: &Frame) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if frame.pixel(x, y) == Some(DEFAULT_OVERLAY_COLOR) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn draws_all_four_edges_inside_the_frame() {
        let mut frame = Frame::filled(20, 20, Pixel::default());
        SquareOverlay::default().render(&mut frame, 10, 10, 6, 4);

        for y in 8..12 {
            assert_eq!(frame.pixel(7, y), Some(DEFAULT_OVERLAY_COLOR));
            assert_eq!(frame.pixel(13, y), Some(DEFAULT_OVERLAY_COLOR));
        }
        for x in 7..13 {
            assert_eq!(frame.pixel(x, 8), Some(DEFAULT_OVERLAY_COLOR));
            assert_eq!(frame.pixel(x, 12), Some(DEFAULT_OVERLAY_COLOR));
        }
        // Interior stays untouched.
        assert_eq!(frame.pixel(10, 10), Some(Pixel::default()));
    }

    #[test]
    fn edges_leaving_the_frame_are_skipped_independently() {
        let mut frame = Frame::filled(20, 20, Pixel::default());
        // The left edge and both horizontal edges cross x < 0; the right edge fits.
        SquareOverlay::default().render(&mut frame, 3, 10, 10, 10);

        let marks = painted(&frame);
        assert_eq!(marks.len(), 10);
        assert!(marks.iter().all(|&(x, y)| x == 8 && (5..15).contains(&y)));
    }

    #[test]
    fn box_entirely_off_frame_draws_nothing() {
        let mut frame = Frame::filled(8, 8, Pixel::default());
        SquareOverlay::default().render(&mut frame, 100, 100, 10, 10);
        assert!(painted(&frame).is_empty());
    }

    #[test]
    fn custom_colour_is_used() {
        let red = Pixel::new(0, 0, 255);
        let mut frame = Frame::filled(10, 10, Pixel::default());
        SquareOverlay::new(red).render(&mut frame, 5, 5, 4, 4);
        assert_eq!(frame.pixel(3, 4), Some(red));
    }
}
