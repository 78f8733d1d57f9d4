//! Newline-delimited JSON (NDJSON) decoding.
//!
//! Converts raw bytes from an HTTP response body into trimmed lines and
//! parses each line as JSON, falling back to the raw text when parsing
//! fails.

use ndtail_types::StreamData;

/// Incremental UTF-8 decoder for chunked input.
///
/// A multi-byte sequence split across chunk boundaries is carried over to
/// the next call. Invalid bytes decode to U+FFFD instead of failing.
pub struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self { carry: Vec::new() }
    }

    /// Decode a chunk, holding back any trailing partial sequence.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        let mut out = String::new();
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    // The prefix up to valid_up_to is guaranteed valid UTF-8
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.push_str(text);
                    }
                    match err.error_len() {
                        Some(invalid_len) => {
                            out.push('\u{FFFD}');
                            rest = &after[invalid_len..];
                        }
                        None => {
                            // Incomplete trailing sequence; wait for the next chunk
                            self.carry = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush at end of input. A dangling partial sequence becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            return String::new();
        }
        self.carry.clear();
        '\u{FFFD}'.to_string()
    }
}

/// Incremental line splitter over decoded text.
///
/// Lines are complete at each `\n`. They are trimmed of surrounding
/// whitespace (which also strips `\r` from CRLF input) and empty lines
/// are dropped.
pub struct LineBuffer {
    buffer: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Feed decoded text and return any complete lines.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut lines = Vec::new();

        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);
            if !line.is_empty() {
                lines.push(line);
            }
        }

        lines
    }

    /// Flush the remaining unterminated line at end of input, if any.
    pub fn finish(&mut self) -> Option<String> {
        let line = self.buffer.trim().to_string();
        self.buffer.clear();
        if line.is_empty() { None } else { Some(line) }
    }
}

/// Parse one non-empty line: JSON when possible, raw text otherwise.
pub fn parse_data_line(line: &str) -> StreamData {
    match serde_json::from_str(line) {
        Ok(value) => StreamData::Json(value),
        Err(_) => StreamData::Text(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_line() {
        let mut lines = LineBuffer::new();
        let out = lines.feed("{\"a\":1}\n");
        assert_eq!(out, vec!["{\"a\":1}"]);
    }

    #[test]
    fn test_multiple_lines_one_chunk() {
        let mut lines = LineBuffer::new();
        let out = lines.feed("{\"a\":1}\n{\"b\":2}\nplain\n");
        assert_eq!(out, vec!["{\"a\":1}", "{\"b\":2}", "plain"]);
    }

    #[test]
    fn test_partial_line_across_chunks() {
        let mut lines = LineBuffer::new();
        let out = lines.feed("{\"a\":1}\n{\"b\"");
        assert_eq!(out, vec!["{\"a\":1}"]);
        let out = lines.feed(":2}\n");
        assert_eq!(out, vec!["{\"b\":2}"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut lines = LineBuffer::new();
        let out = lines.feed("{\"a\":1}\r\n{\"b\":2}\r\n");
        assert_eq!(out, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let mut lines = LineBuffer::new();
        let out = lines.feed("\n \n{\"a\":1}\n\t\n");
        assert_eq!(out, vec!["{\"a\":1}"]);
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let mut lines = LineBuffer::new();
        let out = lines.feed("  {\"a\": 1}  \n");
        assert_eq!(out, vec!["{\"a\": 1}"]);
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut lines = LineBuffer::new();
        assert!(lines.feed("{\"tail\":true}").is_empty());
        assert_eq!(lines.finish().as_deref(), Some("{\"tail\":true}"));
        assert_eq!(lines.finish(), None);
    }

    #[test]
    fn test_finish_empty_buffer() {
        let mut lines = LineBuffer::new();
        assert_eq!(lines.finish(), None);
        lines.feed("complete\n");
        assert_eq!(lines.finish(), None);
    }

    #[test]
    fn test_decode_ascii_passthrough() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"hello"), "hello");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_decode_split_multibyte_sequence() {
        // "é" = 0xC3 0xA9, split across two chunks
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[b'a', 0xC3]), "a");
        assert_eq!(decoder.decode(&[0xA9, b'b']), "éb");
    }

    #[test]
    fn test_decode_split_four_byte_sequence() {
        // U+1F600 = F0 9F 98 80, split 1+3
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[0xF0]), "");
        assert_eq!(decoder.decode(&[0x9F, 0x98, 0x80]), "\u{1F600}");
    }

    #[test]
    fn test_decode_invalid_bytes_replaced() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }

    #[test]
    fn test_decode_dangling_partial_at_end() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[b'x', 0xE2, 0x82]), "x");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_parse_json_object_line() {
        let data = parse_data_line("{\"level\":\"info\"}");
        assert_eq!(data, StreamData::Json(json!({"level": "info"})));
    }

    #[test]
    fn test_parse_json_scalar_lines() {
        assert_eq!(parse_data_line("null"), StreamData::Json(json!(null)));
        assert_eq!(parse_data_line("42"), StreamData::Json(json!(42)));
        assert_eq!(
            parse_data_line("\"quoted\""),
            StreamData::Json(json!("quoted"))
        );
    }

    #[test]
    fn test_parse_non_json_line() {
        let data = parse_data_line("plain old log line");
        assert_eq!(data, StreamData::Text("plain old log line".into()));
    }

    #[test]
    fn test_parse_truncated_json_falls_back_to_text() {
        let data = parse_data_line("{\"unterminated\": tru");
        assert_eq!(data, StreamData::Text("{\"unterminated\": tru".into()));
    }
}
