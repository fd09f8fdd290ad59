// ABOUTME: Kitty terminal graphics protocol framing for raw RGBA transmissions
// ABOUTME: Handles base64 encoding and 4096-byte chunking according to Kitty spec

use crate::constants::protocol::{
    APC_END, APC_START, FORMAT_RGBA, MAX_CHUNK_BASE64, RAW_BYTES_PER_CHUNK,
};
use crate::error::{Result, TermpixError};
use crate::terminal::Dimensions;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::io::Write;

/// Response suppression requested from the terminal (`q=` key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quiet {
    /// Terminal replies to every command
    Verbose,
    /// Suppress OK replies, keep errors
    Errors,
    /// Suppress all replies
    #[default]
    Silent,
}

impl Quiet {
    pub fn level(self) -> u8 {
        match self {
            Quiet::Verbose => 0,
            Quiet::Errors => 1,
            Quiet::Silent => 2,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Quiet::Verbose),
            1 => Some(Quiet::Errors),
            2 => Some(Quiet::Silent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProtocolFramer {
    quiet: Quiet,
}

impl ProtocolFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quiet(quiet: Quiet) -> Self {
        Self { quiet }
    }

    pub fn quiet(&self) -> Quiet {
        self.quiet
    }

    /// Control data for the first chunk: transmit-and-display of raw RGBA
    fn first_header(&self, dims: Dimensions, compressed: bool, more: bool) -> String {
        let mut header = format!(
            "a=T,f={},s={},v={},t=d",
            FORMAT_RGBA, dims.width, dims.height
        );
        if compressed {
            header.push_str(",o=z");
        }
        self.push_tail(&mut header, more);
        header
    }

    /// Continuation chunks only carry the more-data flag
    fn continuation_header(&self, more: bool) -> String {
        let mut header = String::new();
        self.push_tail(&mut header, more);
        header
    }

    fn push_tail(&self, header: &mut String, more: bool) {
        if !header.is_empty() {
            header.push(',');
        }
        if self.quiet != Quiet::Verbose {
            header.push_str(&format!("q={},", self.quiet.level()));
        }
        header.push_str(if more { "m=1" } else { "m=0" });
    }

    /// Encode `payload` and write it to `sink` as one or more escape sequences.
    ///
    /// `dims` is the size of the image the payload describes and `compressed`
    /// marks a zlib payload. Chunks already written stay written if the sink
    /// fails part way through.
    pub fn frame<W: Write + ?Sized>(
        &self,
        payload: &[u8],
        dims: Dimensions,
        compressed: bool,
        sink: &mut W,
    ) -> Result<()> {
        // 3072 raw bytes encode to exactly 4096 base64 bytes with no padding,
        // so chunking the raw bytes equals chunking the full base64 string
        let raw_chunks: Vec<&[u8]> = if payload.is_empty() {
            vec![payload]
        } else {
            payload.chunks(RAW_BYTES_PER_CHUNK).collect()
        };
        let last = raw_chunks.len() - 1;

        let mut encoded = String::with_capacity(MAX_CHUNK_BASE64);
        for (i, raw) in raw_chunks.iter().enumerate() {
            let more = i != last;
            let header = if i == 0 {
                self.first_header(dims, compressed, more)
            } else {
                self.continuation_header(more)
            };

            encoded.clear();
            STANDARD.encode_string(*raw, &mut encoded);
            debug_assert!(encoded.len() <= MAX_CHUNK_BASE64);

            write_chunk(sink, &header, encoded.as_bytes()).map_err(TermpixError::Transmit)?;
        }

        sink.flush().map_err(TermpixError::Transmit)?;

        log::debug!(
            "Framed {} payload bytes for {} image into {} chunk(s)",
            payload.len(),
            dims,
            raw_chunks.len()
        );
        Ok(())
    }
}

fn write_chunk<W: Write + ?Sized>(sink: &mut W, header: &str, data: &[u8]) -> std::io::Result<()> {
    sink.write_all(APC_START)?;
    sink.write_all(header.as_bytes())?;
    sink.write_all(b";")?;
    sink.write_all(data)?;
    sink.write_all(APC_END)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingWriter, decode_payload, parse_chunks};
    use proptest::prelude::*;

    #[test]
    fn test_quiet_levels() {
        assert_eq!(Quiet::default(), Quiet::Silent);
        for level in 0..=2 {
            assert_eq!(Quiet::from_level(level).unwrap().level(), level);
        }
        assert_eq!(Quiet::from_level(3), None);
    }

    #[test]
    fn test_framer_quiet_setting() {
        assert_eq!(ProtocolFramer::new().quiet(), Quiet::Silent);
        let framer = ProtocolFramer::with_quiet(Quiet::Verbose);
        assert_eq!(framer.quiet(), Quiet::Verbose);

        let mut out = Vec::new();
        framer
            .frame(&[0; 4], Dimensions::new(1, 1), false, &mut out)
            .unwrap();
        assert!(!parse_chunks(&out)[0].control.contains_key("q"));
    }

    #[test]
    fn test_single_chunk_frame() {
        let mut out = Vec::new();
        ProtocolFramer::with_quiet(Quiet::Verbose)
            .frame(&[255, 0, 0, 255], Dimensions::new(1, 1), false, &mut out)
            .unwrap();

        assert_eq!(out, b"\x1b_Ga=T,f=32,s=1,v=1,t=d,m=0;/wAA/w==\x1b\\".to_vec());
    }

    #[test]
    fn test_compressed_flag_and_quiet() {
        let mut out = Vec::new();
        ProtocolFramer::new()
            .frame(b"abc", Dimensions::new(3, 7), true, &mut out)
            .unwrap();

        let chunks = parse_chunks(&out);
        assert_eq!(chunks.len(), 1);
        let control = &chunks[0].control;
        assert_eq!(control.get("a").map(String::as_str), Some("T"));
        assert_eq!(control.get("f").map(String::as_str), Some("32"));
        assert_eq!(control.get("s").map(String::as_str), Some("3"));
        assert_eq!(control.get("v").map(String::as_str), Some("7"));
        assert_eq!(control.get("o").map(String::as_str), Some("z"));
        assert_eq!(control.get("q").map(String::as_str), Some("2"));
        assert_eq!(control.get("m").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_uncompressed_has_no_o_key() {
        let mut out = Vec::new();
        ProtocolFramer::new()
            .frame(b"abcd", Dimensions::new(1, 1), false, &mut out)
            .unwrap();
        assert!(!parse_chunks(&out)[0].control.contains_key("o"));
    }

    #[test]
    fn test_multi_chunk_frame() {
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i * 7) as u8).collect();
        let mut out = Vec::new();
        ProtocolFramer::new()
            .frame(&payload, Dimensions::new(50, 50), false, &mut out)
            .unwrap();

        let chunks = parse_chunks(&out);
        // 10000 raw bytes -> 13336 base64 bytes -> 4 chunks
        assert_eq!(chunks.len(), 4);
        assert!(chunks[..3].iter().all(|c| c.data.len() == 4096));
        assert!(chunks[..3].iter().all(|c| c.more()));
        assert!(!chunks[3].more());

        // Only the first chunk describes the image
        assert!(chunks[0].control.contains_key("s"));
        for chunk in &chunks[1..] {
            let mut keys: Vec<&str> = chunk.control.keys().map(String::as_str).collect();
            keys.sort_unstable();
            assert_eq!(keys, vec!["m", "q"]);
        }

        assert_eq!(decode_payload(&chunks), payload);
    }

    #[test]
    fn test_exact_chunk_boundary() {
        let payload = vec![1u8; RAW_BYTES_PER_CHUNK * 2];
        let mut out = Vec::new();
        ProtocolFramer::new()
            .frame(&payload, Dimensions::new(1, 1), false, &mut out)
            .unwrap();

        let chunks = parse_chunks(&out);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].data.len(), 4096);
        assert!(!chunks[1].more());
        assert_eq!(decode_payload(&chunks), payload);
    }

    #[test]
    fn test_empty_payload_single_final_chunk() {
        let mut out = Vec::new();
        ProtocolFramer::new()
            .frame(&[], Dimensions::new(1, 1), false, &mut out)
            .unwrap();

        let chunks = parse_chunks(&out);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].data.is_empty());
        assert!(!chunks[0].more());
    }

    #[test]
    fn test_write_failure_is_transmit_error() {
        let payload = vec![0u8; RAW_BYTES_PER_CHUNK * 3];
        let mut sink = FailingWriter::new(5000);

        let result = ProtocolFramer::new().frame(&payload, Dimensions::new(1, 1), false, &mut sink);

        match result {
            Err(TermpixError::Transmit(err)) => {
                assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe)
            }
            other => panic!("Expected Transmit error, got {:?}", other),
        }
        // The first chunk went out before the failure and is not retracted
        assert_eq!(sink.written().len(), 5000);
        assert!(sink.written().starts_with(b"\x1b_Ga=T"));
    }

    proptest! {
        #[test]
        fn prop_chunks_bounded_and_single_final(
            payload in proptest::collection::vec(any::<u8>(), 0..20_000),
        ) {
            let mut out = Vec::new();
            ProtocolFramer::new()
                .frame(&payload, Dimensions::new(2, 2), false, &mut out)
                .unwrap();

            let chunks = parse_chunks(&out);
            prop_assert!(!chunks.is_empty());
            prop_assert!(chunks.iter().all(|c| c.data.len() <= MAX_CHUNK_BASE64));

            let finals: Vec<usize> = chunks
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.more())
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(finals, vec![chunks.len() - 1]);
            prop_assert_eq!(decode_payload(&chunks), payload);
        }
    }
}
