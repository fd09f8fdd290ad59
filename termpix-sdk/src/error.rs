// ABOUTME: Error types for the termpix transmission pipeline with user-facing hints
// ABOUTME: One variant per failure stage: terminal query, scaling, compression, transmit

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TermpixError {
    #[error("Terminal unavailable: {0}")]
    TerminalUnavailable(String),

    #[error("Invalid scaling target {width}x{height}: both bounds must be positive")]
    InvalidTarget { width: u32, height: u32 },

    #[error("Scaled image {width}x{height} is too large to send")]
    TargetTooLarge { width: u32, height: u32 },

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Compression failed: {0}")]
    CompressionFailure(String),

    #[error("Failed to write image data to terminal: {0}")]
    Transmit(#[source] std::io::Error),
}

impl TermpixError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            TermpixError::TerminalUnavailable(_) => Some(
                "Run termpix from an interactive terminal, or pass --size WIDTHxHEIGHT to skip the size query",
            ),
            TermpixError::InvalidTarget { .. } => {
                Some("Maximum width and height must both be at least 1 pixel")
            }
            TermpixError::TargetTooLarge { .. } => {
                Some("Use a smaller --size, --max-width or --max-height, or drop --upscale")
            }
            TermpixError::Transmit(err) if err.kind() == std::io::ErrorKind::BrokenPipe => {
                Some("The output was closed before the image finished sending")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TermpixError>;
