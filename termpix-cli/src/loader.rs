// ABOUTME: Image file decoding that keeps the source channel depth
// ABOUTME: 16-bit and float images reach the SDK unconverted so it applies its own narrowing

use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, ImageBuffer, ImageReader, Rgba, Rgba32FImage, RgbaImage};
use std::io::Write;
use std::path::Path;
use termpix_sdk::{Dimensions, TerminalImagePrinter, TerminalSize};

pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Decoded image at its native channel depth
#[derive(Debug, Clone)]
pub enum SourceImage {
    Standard(RgbaImage),
    Deep(Rgba16Image),
    Float(Rgba32FImage),
}

impl SourceImage {
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba16(_) => SourceImage::Deep(img.into_rgba16()),
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                SourceImage::Float(img.into_rgba32f())
            }
            other => SourceImage::Standard(other.into_rgba8()),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = match self {
            SourceImage::Standard(img) => img.dimensions(),
            SourceImage::Deep(img) => img.dimensions(),
            SourceImage::Float(img) => img.dimensions(),
        };
        Dimensions::new(width, height)
    }

    pub fn depth_name(&self) -> &'static str {
        match self {
            SourceImage::Standard(_) => "8-bit",
            SourceImage::Deep(_) => "16-bit",
            SourceImage::Float(_) => "32-bit float",
        }
    }

    /// Hand the image to the printer at its native depth
    pub fn print<T, W>(
        &self,
        printer: &TerminalImagePrinter<T>,
        sink: &mut W,
    ) -> termpix_sdk::Result<()>
    where
        T: TerminalSize,
        W: Write + ?Sized,
    {
        match self {
            SourceImage::Standard(img) => printer.print(img, sink),
            SourceImage::Deep(img) => printer.print(img, sink),
            SourceImage::Float(img) => printer.print(img, sink),
        }
    }

    /// Hand the image to the printer with bounds already queried
    pub fn print_within<T, W>(
        &self,
        printer: &TerminalImagePrinter<T>,
        bounds: Dimensions,
        sink: &mut W,
    ) -> termpix_sdk::Result<()>
    where
        T: TerminalSize,
        W: Write + ?Sized,
    {
        match self {
            SourceImage::Standard(img) => printer.print_within(img, bounds, sink),
            SourceImage::Deep(img) => printer.print_within(img, bounds, sink),
            SourceImage::Float(img) => printer.print_within(img, bounds, sink),
        }
    }
}

/// Decode an image file, sniffing the format from its contents
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<SourceImage> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image: {}", path.display()))?;

    let format = reader.format();
    let img = reader
        .decode()
        .map_err(|e| anyhow!("Failed to decode image {}: {}", path.display(), e))?;

    let source = SourceImage::from_dynamic(img);
    log::debug!(
        "Loaded {} ({:?}, {}, {})",
        path.display(),
        format,
        source.dimensions(),
        source.depth_name()
    );
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, Rgb};
    use tempfile::TempDir;

    #[test]
    fn test_depth_classification() {
        let rgb8 = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(2, 2, Rgb([1, 2, 3])));
        assert!(matches!(
            SourceImage::from_dynamic(rgb8),
            SourceImage::Standard(_)
        ));

        let luma16 = DynamicImage::ImageLuma16(ImageBuffer::from_pixel(2, 2, Luma([4000u16])));
        let source = SourceImage::from_dynamic(luma16);
        assert!(matches!(source, SourceImage::Deep(_)));
        assert_eq!(source.depth_name(), "16-bit");

        let float = DynamicImage::ImageRgba32F(ImageBuffer::from_pixel(1, 3, Rgba([0.5f32; 4])));
        let source = SourceImage::from_dynamic(float);
        assert!(matches!(source, SourceImage::Float(_)));
        assert_eq!(source.dimensions(), Dimensions::new(1, 3));
    }

    #[test]
    fn test_load_png_without_extension() {
        let dir = TempDir::new().expect("Should create temp dir");
        let path = dir.path().join("picture");

        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        img.save_with_format(&path, ImageFormat::Png)
            .expect("Should write png");

        let source = load_image(&path).expect("Should load image");
        assert_eq!(source.dimensions(), Dimensions::new(3, 2));
        match source {
            SourceImage::Standard(loaded) => assert_eq!(loaded, img),
            other => panic!("Expected 8-bit image, got {}", other.depth_name()),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_image("/nonexistent/termpix.png").unwrap_err();
        assert!(err.to_string().contains("Failed to open image"));
    }

    #[test]
    fn test_load_garbage_file() {
        let dir = TempDir::new().expect("Should create temp dir");
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to decode image"));
    }
}
