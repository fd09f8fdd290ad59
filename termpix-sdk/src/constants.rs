// ABOUTME: Centralized constants for the termpix SDK
// ABOUTME: Contains kitty graphics protocol markers, chunk limits, and buffer sizes

/// Kitty graphics protocol wire constants
pub mod protocol {
    /// Start of an APC graphics command: ESC _ G
    pub const APC_START: &[u8] = b"\x1b_G";

    /// String terminator closing every graphics command: ESC \
    pub const APC_END: &[u8] = b"\x1b\\";

    /// Maximum base64 bytes carried by a single escape sequence
    pub const MAX_CHUNK_BASE64: usize = 4096;

    /// Raw bytes that encode to exactly one full base64 chunk
    pub const RAW_BYTES_PER_CHUNK: usize = MAX_CHUNK_BASE64 / 4 * 3;

    /// `f=32`: 32-bit RGBA pixel data
    pub const FORMAT_RGBA: u32 = 32;

    /// Largest uncompressed pixel plane kitty accepts for one image
    pub const MAX_IMAGE_BYTES: usize = 400 * 1024 * 1024;
}

/// Buffer sizes for the streaming pipeline
pub mod buffers {
    /// Block size used when feeding pixel bytes into the compressor
    pub const COMPRESSION_BLOCK_SIZE: usize = 16 * 1024;
}

/// Controlling terminal device
pub mod terminal {
    pub const TTY_PATH: &str = "/dev/tty";
}
