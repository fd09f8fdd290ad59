// ABOUTME: Nearest-neighbor image scaling to fit within pixel bounds
// ABOUTME: Preserves aspect ratio and never enlarges unless explicitly configured

use crate::constants::protocol::MAX_IMAGE_BYTES;
use crate::error::{Result, TermpixError};
use crate::terminal::Dimensions;
use image::{GenericImageView, ImageBuffer, Pixel};

/// Owned image buffer holding the same pixel type as its source
pub type ScaledImage<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;

#[derive(Debug, Clone, Default)]
pub struct ScalingConfig {
    /// Enlarge images smaller than the bounds. Off by default: small images
    /// are shown at native resolution.
    pub allow_upscale: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ImageScaler {
    config: ScalingConfig,
}

impl ImageScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScalingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScalingConfig {
        &self.config
    }

    /// Shrink factor applied to both axes when fitting `source` into `bounds`
    pub fn scale_factor(&self, source: Dimensions, bounds: Dimensions) -> Result<f64> {
        if bounds.is_empty() {
            return Err(TermpixError::InvalidTarget {
                width: bounds.width,
                height: bounds.height,
            });
        }
        if source.is_empty() {
            return Err(TermpixError::EmptyImage);
        }

        let width_factor = source.width as f64 / bounds.width as f64;
        let height_factor = source.height as f64 / bounds.height as f64;
        let factor = width_factor.max(height_factor);

        if self.config.allow_upscale {
            Ok(factor)
        } else {
            Ok(factor.max(1.0))
        }
    }

    /// Output size for a source scaled by `factor`, at least 1x1
    pub fn target_dimensions(source: Dimensions, factor: f64) -> Dimensions {
        let width = ((source.width as f64 / factor).floor() as u32).max(1);
        let height = ((source.height as f64 / factor).floor() as u32).max(1);
        Dimensions::new(width, height)
    }

    /// Output size for `source` in `bounds`, rejected before any allocation
    /// when its RGBA plane would exceed `MAX_IMAGE_BYTES`
    pub fn checked_target(&self, source: Dimensions, bounds: Dimensions) -> Result<Dimensions> {
        let factor = self.scale_factor(source, bounds)?;
        let target = self.checked_target(source, bounds)?;

        match target.checked_rgba_len() {
            Some(len) if len <= MAX_IMAGE_BYTES => Ok(target),
            _ => Err(TermpixError::TargetTooLarge {
                width: target.width,
                height: target.height,
            }),
        }
    }

    /// Scale `image` to fit within `bounds` using nearest-neighbor sampling.
    ///
    /// Destination pixel (x, y) is taken from source pixel
    /// `(floor(x * factor), floor(y * factor))`. The source is never modified.
    pub fn scale<I>(&self, image: &I, bounds: Dimensions) -> Result<ScaledImage<I::Pixel>>
    where
        I: GenericImageView,
    {
        let (width, height) = image.dimensions();
        let source = Dimensions::new(width, height);
        let factor = self.scale_factor(source, bounds)?;
        let target = Self::target_dimensions(source, factor);

        log::debug!(
            "Scaling image from {} to {} (bounds {}, factor {:.3})",
            source,
            target,
            bounds,
            factor
        );

        let max_x = width - 1;
        let max_y = height - 1;

        Ok(ImageBuffer::from_fn(target.width, target.height, |x, y| {
            let src_x = ((x as f64 * factor).floor() as u32).min(max_x);
            let src_y = ((y as f64 * factor).floor() as u32).min(max_y);
            image.get_pixel(src_x, src_y)
        }))
    }
}
