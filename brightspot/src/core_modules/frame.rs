// THEORY:
// A `Frame` is the raw pixel buffer handed over by whatever captures video. It
// owns a tightly packed, row-major, three-channel byte buffer and knows its own
// geometry. The scoring pass only ever borrows it immutably; the overlay pass
// borrows it mutably afterwards. Keeping those two borrows apart is what stops a
// search from scoring pixels the renderer has already painted over.

use crate::core_modules::pixel::pixel::{CHANNELS, Channel, Pixel};
use crate::error::{BrightSpotError, Result};

/// An owned three-channel frame buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps an existing buffer, checking that it holds exactly `width * height` pixels.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(BrightSpotError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// A frame where every pixel has the same value.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&[pixel.c0, pixel.c1, pixel.c2]);
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of one full pixel row.
    pub fn row(&self, y: u32) -> &[Channel] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        Some(Pixel::new(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ))
    }

    /// Writes a pixel; writes outside the frame are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset(x, y);
        self.data[offset..offset + CHANNELS].copy_from_slice(&[pixel.c0, pixel.c1, pixel.c2]);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride() + x as usize * CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_short_buffers() {
        let err = Frame::from_raw(4, 4, vec![0u8; 47]).unwrap_err();
        match err {
            BrightSpotError::BufferSizeMismatch { expected, actual, .. } => {
                assert_eq!(expected, 48);
                assert_eq!(actual, 47);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pixels_are_row_major() {
        let mut frame = Frame::filled(3, 2, Pixel::default());
        frame.set_pixel(2, 1, Pixel::new(7, 8, 9));
        assert_eq!(frame.pixel(2, 1), Some(Pixel::new(7, 8, 9)));
        assert_eq!(&frame.as_bytes()[15..18], &[7, 8, 9]);
        assert_eq!(frame.row(1)[6..9], [7, 8, 9]);
    }

    #[test]
    fn out_of_bounds_access_is_harmless() {
        let mut frame = Frame::filled(2, 2, Pixel::new(1, 1, 1));
        frame.set_pixel(5, 0, Pixel::new(9, 9, 9));
        assert_eq!(frame.pixel(2, 0), None);
        assert!(frame.as_bytes().iter().all(|&b| b == 1));
        assert!(!frame.contains(-1, 0));
        assert!(frame.contains(1, 1));
    }

    #[test]
    fn empty_frames_are_valid_buffers() {
        let frame = Frame::from_raw(0, 0, Vec::new()).unwrap();
        assert_eq!(frame.size(), (0, 0));
    }
}
