// ABOUTME: Terminal image printer that orchestrates size query, scaling, and transmission
// ABOUTME: One call fits an image to the terminal and writes it as kitty graphics commands

use crate::compression::PayloadCompressor;
use crate::constants::buffers::COMPRESSION_BLOCK_SIZE;
use crate::error::{Result, TermpixError};
use crate::kitty::{ProtocolFramer, Quiet};
use crate::pixels::{self, Channel};
use crate::scaling::{ImageScaler, ScalingConfig};
use crate::terminal::{Dimensions, TerminalSize, TtyDevice};
use image::{GenericImageView, Pixel};
use std::io::Write;

#[derive(Debug, Clone)]
pub struct PrinterOptions {
    /// zlib-compress the pixel plane before encoding
    pub compress: bool,
    pub quiet: Quiet,
    /// Emit a newline after the image so following output starts below it
    pub trailing_newline: bool,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub scaling: ScalingConfig,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            compress: true,
            quiet: Quiet::default(),
            trailing_newline: false,
            max_width: None,
            max_height: None,
            scaling: ScalingConfig::default(),
        }
    }
}

pub struct TerminalImagePrinter<T: TerminalSize> {
    terminal: T,
    scaler: ImageScaler,
    framer: ProtocolFramer,
    options: PrinterOptions,
}

impl TerminalImagePrinter<TtyDevice> {
    /// Printer bound to the process's controlling terminal
    pub fn for_tty(options: PrinterOptions) -> Self {
        Self::new(TtyDevice::default(), options)
    }
}

impl<T: TerminalSize> TerminalImagePrinter<T> {
    pub fn new(terminal: T, options: PrinterOptions) -> Self {
        Self {
            terminal,
            scaler: ImageScaler::with_config(options.scaling.clone()),
            framer: ProtocolFramer::with_quiet(options.quiet),
            options,
        }
    }

    pub fn options(&self) -> &PrinterOptions {
        &self.options
    }

    /// Bounds the image must fit in: terminal size narrowed by the caps
    pub fn target_bounds(&self) -> Result<Dimensions> {
        let bounds = self
            .terminal
            .pixel_size()?
            .capped(self.options.max_width, self.options.max_height);

        if bounds.is_empty() {
            return Err(TermpixError::InvalidTarget {
                width: bounds.width,
                height: bounds.height,
            });
        }
        Ok(bounds)
    }

    /// Fit `image` to the terminal and write it to `sink`.
    ///
    /// Nothing is written unless the size query and scaling succeed. The
    /// source image is never modified and nothing is kept between calls.
    pub fn print<I, W>(&self, image: &I, sink: &mut W) -> Result<()>
    where
        I: GenericImageView,
        <I::Pixel as Pixel>::Subpixel: Channel,
        W: Write + ?Sized,
    {
        let bounds = self.target_bounds()?;
        self.print_within(image, bounds, sink)
    }

    /// Like `print`, but fits the image to `bounds` from an earlier
    /// `target_bounds` call instead of querying the terminal again
    pub fn print_within<I, W>(&self, image: &I, bounds: Dimensions, sink: &mut W) -> Result<()>
    where
        I: GenericImageView,
        <I::Pixel as Pixel>::Subpixel: Channel,
        W: Write + ?Sized,
    {
        let scaled = self.scaler.scale(image, bounds)?;
        let (width, height) = scaled.dimensions();
        let dims = Dimensions::new(width, height);

        if self.options.compress {
            let mut compressor = PayloadCompressor::new();
            pixels::extract_blocks(&scaled, COMPRESSION_BLOCK_SIZE, |block| {
                compressor.feed(block)
            })?;
            drop(scaled);
            let payload = compressor.finish()?;
            self.framer.frame(&payload, dims, true, sink)?;
        } else {
            let payload = pixels::extract_rgba(&scaled);
            drop(scaled);
            self.framer.frame(payload.as_bytes(), dims, false, sink)?;
        }

        if self.options.trailing_newline {
            sink.write_all(b"\n")
                .and_then(|_| sink.flush())
                .map_err(TermpixError::Transmit)?;
        }

        Ok(())
    }
}
