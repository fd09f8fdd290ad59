// ABOUTME: Serializes images into the flat row-major RGBA byte plane kitty expects
// ABOUTME: Narrows 16-bit and float channels to 8 bits with a fixed truncation rule

use crate::terminal::Dimensions;
use image::{GenericImageView, Pixel, Primitive};

/// Subpixel types that can be narrowed to one byte.
///
/// Narrowing truncates: `u16` keeps its high byte, `f32` is clamped to
/// `[0.0, 1.0]`, scaled by 255 and truncated. No gamma or premultiplication
/// changes are applied.
pub trait Channel: Primitive {
    fn to_u8(self) -> u8;
}

impl Channel for u8 {
    fn to_u8(self) -> u8 {
        self
    }
}

impl Channel for u16 {
    fn to_u8(self) -> u8 {
        (self >> 8) as u8
    }
}

impl Channel for f32 {
    fn to_u8(self) -> u8 {
        // NaN casts to 0
        (self.clamp(0.0, 1.0) * 255.0) as u8
    }
}

/// RGBA bytes of a whole image, `width * height * 4` long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelPayload {
    dimensions: Dimensions,
    bytes: Vec<u8>,
}

impl PixelPayload {
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn rgba_bytes<P>(pixel: P) -> [u8; 4]
where
    P: Pixel,
    P::Subpixel: Channel,
{
    let [r, g, b, a] = pixel.to_rgba().0;
    [r.to_u8(), g.to_u8(), b.to_u8(), a.to_u8()]
}

/// Walk the image top-to-bottom, left-to-right and hand out its RGBA bytes in
/// blocks of at most `block_len` bytes (rounded down to whole pixels, minimum
/// one pixel).
pub fn extract_blocks<I, F, E>(image: &I, block_len: usize, mut sink: F) -> Result<(), E>
where
    I: GenericImageView,
    <I::Pixel as Pixel>::Subpixel: Channel,
    F: FnMut(&[u8]) -> Result<(), E>,
{
    let block_len = (block_len / 4).max(1) * 4;
    let mut block = Vec::with_capacity(block_len);
    let (width, height) = image.dimensions();

    for y in 0..height {
        for x in 0..width {
            if block.len() == block_len {
                sink(&block)?;
                block.clear();
            }
            block.extend_from_slice(&rgba_bytes(image.get_pixel(x, y)));
        }
    }

    if !block.is_empty() {
        sink(&block)?;
    }
    Ok(())
}

/// Serialize the whole image into one RGBA plane
pub fn extract_rgba<I>(image: &I) -> PixelPayload
where
    I: GenericImageView,
    <I::Pixel as Pixel>::Subpixel: Channel,
{
    let (width, height) = image.dimensions();
    let dimensions = Dimensions::new(width, height);
    let mut bytes = Vec::with_capacity(dimensions.rgba_len());

    let filled: Result<(), std::convert::Infallible> =
        extract_blocks(image, dimensions.rgba_len(), |block| {
            bytes.extend_from_slice(block);
            Ok(())
        });
    // Infallible sink
    let Ok(()) = filled;

    PixelPayload { dimensions, bytes }
}
