//! Streaming NDJSON line parser
//!
//! Splits a byte stream into complete newline-terminated lines:
//! - each line is one JSON-encoded message
//! - an incomplete trailing fragment is retained and prefixed to the next chunk
//! - blank lines are skipped
//! - trailing `\r` is stripped (CRLF tolerance)
//!
//! JSON decoding is left to the caller so that one malformed line can be
//! logged and skipped without affecting the rest of the stream.

/// Streaming parser that accumulates bytes and yields complete lines.
pub struct NdjsonParser {
    /// Buffer for incomplete data.
    buffer: String,
}

impl NdjsonParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Feed bytes into the parser and return any complete lines.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        if let Ok(s) = std::str::from_utf8(bytes) {
            self.buffer.push_str(s);
        } else {
            // Invalid UTF-8, skip this chunk
            tracing::warn!("Received invalid UTF-8 in NDJSON stream");
            return Vec::new();
        }

        let mut lines = Vec::new();

        while let Some(newline_pos) = self.buffer.find('\n') {
            let line = self.buffer[..newline_pos].to_string();
            self.buffer = self.buffer[newline_pos + 1..].to_string();

            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                continue;
            }

            lines.push(line.to_string());
        }

        lines
    }

    /// True if a partial line is buffered.
    pub fn has_partial(&self) -> bool {
        !self.buffer.trim().is_empty()
    }

    /// Reset the parser state (e.g., on a fresh connection).
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for NdjsonParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let mut parser = NdjsonParser::new();
        let lines = parser.feed(b"{\"type\":\"init\"}\n");

        assert_eq!(lines, vec![r#"{"type":"init"}"#]);
        assert!(!parser.has_partial());
    }

    #[test]
    fn test_multiple_lines_per_chunk() {
        let mut parser = NdjsonParser::new();
        let lines = parser.feed(b"{\"a\":1}\n{\"b\":2}\n");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"a":1}"#);
        assert_eq!(lines[1], r#"{"b":2}"#);
    }

    #[test]
    fn test_chunk_splits_a_line() {
        let mut parser = NdjsonParser::new();

        let lines = parser.feed(b"{\"type\":\"game");
        assert!(lines.is_empty());
        assert!(parser.has_partial());

        let lines = parser.feed(b"Start\"}\n");
        assert_eq!(lines, vec![r#"{"type":"gameStart"}"#]);
    }

    #[test]
    fn test_trailing_fragment_retained_across_chunks() {
        let mut parser = NdjsonParser::new();

        let lines = parser.feed(b"{\"a\":1}\n{\"b\":");
        assert_eq!(lines, vec![r#"{"a":1}"#]);

        let lines = parser.feed(b"2}\n");
        assert_eq!(lines, vec![r#"{"b":2}"#]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut parser = NdjsonParser::new();
        let lines = parser.feed(b"\n\n{\"a\":1}\n\n");

        assert_eq!(lines, vec![r#"{"a":1}"#]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = NdjsonParser::new();
        let lines = parser.feed(b"{\"a\":1}\r\n");

        assert_eq!(lines, vec![r#"{"a":1}"#]);
    }

    #[test]
    fn test_reset_discards_partial() {
        let mut parser = NdjsonParser::new();
        parser.feed(b"{\"partial\":");

        parser.reset();
        assert!(!parser.has_partial());

        let lines = parser.feed(b"{\"fresh\":true}\n");
        assert_eq!(lines, vec![r#"{"fresh":true}"#]);
    }
}
