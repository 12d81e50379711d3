use crate::StreamEvent;
use tracing::debug;

/// Incremental parser turning raw byte chunks into complete [`StreamEvent`]s.
///
/// Network chunks may split a frame anywhere, including in the middle of a
/// multi-byte UTF-8 codepoint or a JSON payload. The parser carries the
/// undecodable byte suffix and the unterminated line across chunks, so the
/// emitted event sequence is independent of how the payload was chunked.
///
/// Lines without the `data: ` prefix (blank keep-alive lines, `:` comments)
/// are protocol noise and are discarded. A line whose payload fails to parse
/// as a known event is skipped; one corrupt frame must not lose the rest of
/// the response.
#[derive(Debug, Default)]
pub struct FrameParser {
    /// Bytes not yet decodable as UTF-8 (an incomplete trailing sequence).
    tail: Vec<u8>,
    /// Decoded text after the last newline, waiting for its terminator.
    line_buf: String,
}

impl FrameParser {
    /// Creates an empty parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte chunk, returning all events completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.tail.extend_from_slice(chunk);
        self.decode_tail();

        let mut events = Vec::new();
        while let Some(pos) = self.line_buf.find('\n') {
            let line: String = self.line_buf.drain(..=pos).collect();
            if let Some(event) = parse_line(line.trim()) {
                events.push(event);
            }
        }
        events
    }

    /// Whether any unparsed input remains buffered.
    ///
    /// At end of stream a leftover means the server closed mid-line; the
    /// fragment is discarded, never parsed.
    pub fn has_partial(&self) -> bool {
        !self.tail.is_empty() || !self.line_buf.is_empty()
    }

    /// Decodes the maximal valid UTF-8 prefix of `tail` into `line_buf`,
    /// keeping back an incomplete trailing sequence and replacing invalid
    /// sequences with U+FFFD.
    fn decode_tail(&mut self) {
        let mut bytes = std::mem::take(&mut self.tail);
        loop {
            match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    self.line_buf.push_str(text);
                    bytes.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.line_buf
                        .push_str(&String::from_utf8_lossy(&bytes[..valid]));
                    match err.error_len() {
                        // Truly invalid bytes: substitute and keep going.
                        Some(len) => {
                            self.line_buf.push(char::REPLACEMENT_CHARACTER);
                            bytes.drain(..valid + len);
                        }
                        // Incomplete sequence: wait for the next chunk.
                        None => {
                            bytes.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        self.tail = bytes;
    }
}

fn parse_line(line: &str) -> Option<StreamEvent> {
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let payload = line.strip_prefix("data: ")?;
    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            debug!(error = %err, "Skipping unparseable frame");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_single_complete_frame() {
        let mut parser = FrameParser::new();
        let events = parser.push(b"data: {\"type\": \"done\"}\n\n");
        assert_eq!(
            events,
            vec![StreamEvent::Done {
                thread_id: None,
                message_id: None
            }]
        );
        assert!(!parser.has_partial());
    }

    #[test]
    fn test_unterminated_line_stays_buffered() {
        let mut parser = FrameParser::new();
        assert!(parser.push(b"data: {\"type\": \"do").is_empty());
        assert!(parser.has_partial());

        let events = parser.push(b"ne\"}\n");
        assert_eq!(events.len(), 1);
        assert!(!parser.has_partial());
    }

    #[test]
    fn test_mid_codepoint_split() {
        let payload = "data: {\"type\": \"text_delta\", \"content\": \"dünya\"}\n".as_bytes();
        // "ü" is two bytes; split inside it.
        let split = payload.iter().position(|&b| b == 0xc3).unwrap() + 1;

        let mut parser = FrameParser::new();
        assert!(parser.push(&payload[..split]).is_empty());
        let events = parser.push(&payload[split..]);
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta {
                content: "dünya".to_string()
            }]
        );
    }

    #[test]
    fn test_noise_lines_discarded() {
        let mut parser = FrameParser::new();
        let events = parser.push(
            b": keep-alive\n\nevent: message\ndata: {\"type\": \"text_delta\", \"content\": \"a\"}\n",
        );
        assert_eq!(
            events,
            vec![StreamEvent::TextDelta {
                content: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_payload_skipped() {
        let mut parser = FrameParser::new();
        let events = parser.push(b"data: {not json}\ndata: {\"type\": \"done\"}\n");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_unknown_event_type_skipped() {
        let mut parser = FrameParser::new();
        let events =
            parser.push(b"data: {\"type\": \"usage\", \"tokens\": 12}\ndata: {\"type\": \"done\"}\n");
        assert_eq!(
            events,
            vec![StreamEvent::Done {
                thread_id: None,
                message_id: None
            }]
        );
    }

    #[test]
    fn test_invalid_utf8_replaced_not_fatal() {
        let mut parser = FrameParser::new();
        // 0xff can never start a UTF-8 sequence; it lands in a noise line and
        // must not poison the following frame.
        let mut input = b"garbage \xff line\n".to_vec();
        input.extend_from_slice(b"data: {\"type\": \"done\"}\n");
        let events = parser.push(&input);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = FrameParser::new();
        let events = parser.push(b"data: {\"type\": \"done\"}\r\n");
        assert_eq!(events.len(), 1);
    }
}
