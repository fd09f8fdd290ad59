// ABOUTME: Test helper utilities: an independent kitty escape-sequence parser and fake sinks
// ABOUTME: Lets unit tests verify framed output without a real terminal

use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::read::ZlibDecoder;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};

/// One `ESC _ G <control> ; <data> ESC \` sequence
#[derive(Debug, Clone)]
pub struct ParsedChunk {
    pub control: BTreeMap<String, String>,
    pub data: String,
}

impl ParsedChunk {
    pub fn more(&self) -> bool {
        self.control.get("m").map(String::as_str) == Some("1")
    }
}

/// Split raw terminal output into graphics commands.
///
/// Panics on anything a strict terminal parser would reject: stray bytes
/// between sequences, a missing terminator, malformed key=value pairs, or
/// non-base64 data.
pub fn parse_chunks(output: &[u8]) -> Vec<ParsedChunk> {
    let text = std::str::from_utf8(output).expect("graphics output is ASCII");
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        rest = rest
            .strip_prefix("\x1b_G")
            .unwrap_or_else(|| panic!("expected APC start, found {:?}", &rest[..rest.len().min(16)]));
        let end = rest.find("\x1b\\").expect("unterminated graphics command");
        let body = &rest[..end];
        rest = &rest[end + 2..];

        let (control, data) = body.split_once(';').expect("missing ';' separator");
        let control = control
            .split(',')
            .map(|pair| {
                let (k, v) = pair
                    .split_once('=')
                    .unwrap_or_else(|| panic!("malformed control pair {:?}", pair));
                (k.to_string(), v.to_string())
            })
            .collect();

        assert!(
            data.bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='),
            "payload is not base64"
        );

        chunks.push(ParsedChunk {
            control,
            data: data.to_string(),
        });
    }

    chunks
}

/// Join chunk data and decode it back to the transmitted bytes
pub fn decode_payload(chunks: &[ParsedChunk]) -> Vec<u8> {
    let joined: String = chunks.iter().map(|c| c.data.as_str()).collect();
    STANDARD.decode(joined).expect("valid base64 across chunks")
}

/// Decode and, when the first chunk says `o=z`, inflate
pub fn decode_pixels(chunks: &[ParsedChunk]) -> Vec<u8> {
    let payload = decode_payload(chunks);
    let compressed = chunks
        .first()
        .and_then(|c| c.control.get("o"))
        .is_some_and(|o| o == "z");

    if !compressed {
        return payload;
    }

    let mut pixels = Vec::new();
    ZlibDecoder::new(payload.as_slice())
        .read_to_end(&mut pixels)
        .expect("valid zlib stream");
    pixels
}

/// Sink that accepts `limit` bytes and then fails with a broken pipe
pub struct FailingWriter {
    limit: usize,
    written: Vec<u8>,
}

impl FailingWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.written.len();
        if room == 0 {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        let n = room.min(buf.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_chunks() {
        let raw = b"\x1b_Ga=T,m=1;QUJD\x1b\\\x1b_Gm=0;REVG\x1b\\";
        let chunks = parse_chunks(raw);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].more());
        assert!(!chunks[1].more());
        assert_eq!(decode_payload(&chunks), b"ABCDEF");
    }

    #[test]
    #[should_panic(expected = "unterminated")]
    fn test_parse_rejects_unterminated() {
        parse_chunks(b"\x1b_Gm=0;QUJD");
    }

    #[test]
    #[should_panic(expected = "expected APC start")]
    fn test_parse_rejects_stray_bytes() {
        parse_chunks(b"\x1b_Gm=0;QUJD\x1b\\\n");
    }

    #[test]
    fn test_failing_writer_limit() {
        let mut sink = FailingWriter::new(3);
        assert!(sink.write_all(b"abcdef").is_err());
        assert_eq!(sink.written(), b"abc");
    }
}
