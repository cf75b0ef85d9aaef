// THEORY (single-pixel brightness):
// The `Pixel` is the smallest unit the search looks at: three 8-bit channels and
// nothing else. It is a "dumb" data container whose one heuristic is its own
// luminance, a fixed weighted sum of the channels. No neighbors, no history.
//
// Channel order is deliberately abstract. OpenCV hands us BGR, the `image` crate
// hands us RGB; the weights are bound to channel *positions*, not colour names:
//
//     first  channel x 0.11
//     second channel x 0.59
//     third  channel x 0.30
//
// With a BGR source this reads as blue 0.11, green 0.59, red 0.30, which is the
// familiar "green dominates perceived brightness" weighting. The three weights
// sum to 1.0, so a pixel's luminance stays in 0.0..=255.0.

pub mod pixel {
    pub type Channel = u8;
    pub type Luminance = f64;

    /// Number of interleaved channels in every frame handled by the engine.
    pub const CHANNELS: usize = 3;

    pub const FIRST_CHANNEL_WEIGHT: Luminance = 0.11;
    pub const SECOND_CHANNEL_WEIGHT: Luminance = 0.59;
    pub const THIRD_CHANNEL_WEIGHT: Luminance = 0.30;

    /// A "dumb" data container representing a single three-channel pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        pub c0: Channel,
        pub c1: Channel,
        pub c2: Channel,
    }

    impl Pixel {
        pub const fn new(c0: Channel, c1: Channel, c2: Channel) -> Self {
            Self { c0, c1, c2 }
        }

        /// Weighted brightness of this pixel.
        pub fn luminance(&self) -> Luminance {
            luminance(self.c0, self.c1, self.c2)
        }
    }

    /// Luminance of raw channel values, in the hot path without building a `Pixel`.
    #[inline]
    pub fn luminance(c0: Channel, c1: Channel, c2: Channel) -> Luminance {
        FIRST_CHANNEL_WEIGHT * c0 as Luminance
            + SECOND_CHANNEL_WEIGHT * c1 as Luminance
            + THIRD_CHANNEL_WEIGHT * c2 as Luminance
    }

    impl From<[Channel; CHANNELS]> for Pixel {
        fn from(bytes: [Channel; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2])
        }
    }

    impl From<Pixel> for [Channel; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.c0, pixel.c1, pixel.c2]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn luminance_matches_weighted_sum() {
        let lum = Pixel::new(100, 200, 50).luminance();
        assert!((lum - 144.0).abs() < 1e-9, "got {lum}");
    }

    #[test]
    fn weights_are_bound_to_channel_position() {
        assert!((luminance(255, 0, 0) - 28.05).abs() < 1e-9);
        assert!((luminance(0, 255, 0) - 150.45).abs() < 1e-9);
        assert!((luminance(0, 0, 255) - 76.5).abs() < 1e-9);
    }

    #[test]
    fn white_and_black_bound_the_range() {
        assert_eq!(Pixel::default().luminance(), 0.0);
        assert!((Pixel::new(255, 255, 255).luminance() - 255.0).abs() < 1e-9);
    }

    #[test]
    fn raising_any_channel_raises_luminance() {
        let base = Pixel::new(10, 20, 30);
        for bumped in [Pixel::new(11, 20, 30), Pixel::new(10, 21, 30), Pixel::new(10, 20, 31)] {
            assert!(bumped.luminance() > base.luminance());
        }
    }

    #[test]
    fn converts_to_and_from_byte_triples() {
        let pixel = Pixel::from([1, 2, 3]);
        assert_eq!(pixel, Pixel::new(1, 2, 3));
        let bytes: [u8; CHANNELS] = pixel.into();
        assert_eq!(bytes, [1, 2, 3]);
    }
}
