// ABOUTME: termpix SDK: draws raster images inline via the Kitty terminal graphics protocol
// ABOUTME: Pipeline of terminal size query, scaling, RGBA extraction, zlib, and chunked framing

pub mod compression;
pub mod constants;
pub mod error;
pub mod kitty;
pub mod pixels;
pub mod printer;
pub mod scaling;
pub mod terminal;

#[cfg(test)]
mod test_helpers;

pub use compression::{PayloadCompressor, compress};
pub use error::{Result, TermpixError};
pub use kitty::{ProtocolFramer, Quiet};
pub use pixels::{Channel, PixelPayload, extract_rgba};
pub use printer::{PrinterOptions, TerminalImagePrinter};
pub use scaling::{ImageScaler, ScalingConfig};
pub use terminal::{Dimensions, FixedSize, TerminalSize, TtyDevice};
