pub mod image_helper {
    use crate::core_modules::frame::Frame;
    use crate::error::Result;
    use image::{ImageEncoder, RgbImage};
    use std::path::Path;

    /// Writes a frame to disk as an RGB8 PNG.
    pub fn save(path: impl AsRef<Path>, frame: &Frame) -> Result<()> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            frame.as_bytes(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgb8,
        )?;

        Ok(())
    }

    /// Decodes any format the `image` crate understands into an RGB frame.
    pub fn load(path: impl AsRef<Path>) -> Result<Frame> {
        let image = image::open(path)?.into_rgb8();
        from_rgb_image(image)
    }

    pub fn from_rgb_image(image: RgbImage) -> Result<Frame> {
        let (width, height) = image.dimensions();
        Frame::from_raw(width, height, image.into_raw())
    }
}
