// ABOUTME: Streaming zlib compression for pixel payloads (kitty's o=z transmission)
// ABOUTME: One encoder is fed incrementally and finalized once per image

use crate::constants::buffers::COMPRESSION_BLOCK_SIZE;
use crate::error::{Result, TermpixError};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

/// Incremental zlib compressor producing a single self-terminated stream
pub struct PayloadCompressor {
    encoder: ZlibEncoder<Vec<u8>>,
    fed: usize,
}

impl Default for PayloadCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadCompressor {
    pub fn new() -> Self {
        Self {
            encoder: ZlibEncoder::new(Vec::new(), Compression::default()),
            fed: 0,
        }
    }

    /// Append uncompressed bytes to the stream
    pub fn feed(&mut self, block: &[u8]) -> Result<()> {
        self.encoder
            .write_all(block)
            .map_err(|e| TermpixError::CompressionFailure(e.to_string()))?;
        self.fed += block.len();
        Ok(())
    }

    /// Number of uncompressed bytes fed so far
    pub fn bytes_in(&self) -> usize {
        self.fed
    }

    /// Finalize the stream and return the compressed bytes
    pub fn finish(self) -> Result<Vec<u8>> {
        let fed = self.fed;
        let compressed = self
            .encoder
            .finish()
            .map_err(|e| TermpixError::CompressionFailure(e.to_string()))?;

        log::debug!("Compressed {} bytes to {}", fed, compressed.len());
        Ok(compressed)
    }
}

/// Compress a whole payload, feeding it in fixed-size blocks
pub fn compress(payload: &[u8]) -> Result<Vec<u8>> {
    let mut compressor = PayloadCompressor::new();
    for block in payload.chunks(COMPRESSION_BLOCK_SIZE) {
        compressor.feed(block)?;
    }
    compressor.finish()
}
