//! Decoding of the Yuanbao chat event stream.
//!
//! The chat endpoint answers with server-sent events. Each useful line is
//! `data: <json>`, where the JSON object carries a `type` and either a
//! `content` or a `msg` field. Interleaved with those are bare control
//! markers (`data: status`, `data: reasoner`, `data: text`) and bracketed
//! markers such as `data: [plugin: ]` or `data: [DONE]`, which carry no text.

use serde_json::Value;
use tracing::trace;

use crate::models::ChatReply;

/// SSE field prefix for event payloads.
const DATA_PREFIX: &str = "data: ";

/// Bare payloads that only announce a phase change.
const CONTROL_MARKERS: [&str; 3] = ["status", "reasoner", "text"];

/// Fragments at or below this many characters are glued to their neighbours
/// when merging the thinking trace.
const SHORT_FRAGMENT_CHARS: usize = 2;

/// Placeholder printed when the model produced no thinking trace.
pub const EMPTY_THINKING: &str = "null";

/// A decoded, text-bearing stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Part of the reasoning trace.
    Think(String),
    /// Answer text from a `type: "text"` event.
    Text(String),
    /// Answer text from any other event carrying `content`.
    Content(String),
}

/// String value of `field`, if present and a string.
fn str_field<'a>(event: &'a Value, field: &str) -> Option<&'a str> {
    event.get(field).and_then(Value::as_str)
}

fn is_control_marker(payload: &str) -> bool {
    CONTROL_MARKERS.contains(&payload) || (payload.starts_with('[') && payload.ends_with(']'))
}

/// Decode a single line of the event stream.
///
/// Returns `None` for blank lines, non-data fields, control markers,
/// malformed JSON, and events that carry no text.
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let payload = line.trim().strip_prefix(DATA_PREFIX)?;

    if is_control_marker(payload) {
        return None;
    }

    let event: Value = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(e) => {
            trace!(error = %e, "Skipping undecodable stream payload");
            return None;
        }
    };

    // Fields are read one at a time; a field of an unexpected type
    // counts as absent instead of discarding the event.
    let content = str_field(&event, "content");
    match str_field(&event, "type") {
        Some("think") => Some(StreamEvent::Think(content.unwrap_or_default().to_string())),
        Some("text") if str_field(&event, "msg").is_some_and(|m| !m.is_empty()) => {
            str_field(&event, "msg").map(|m| StreamEvent::Text(m.to_string()))
        }
        _ => content
            .filter(|c| !c.is_empty())
            .map(|c| StreamEvent::Content(c.to_string())),
    }
}

/// Merge streamed thinking fragments into readable text.
///
/// The service streams the trace in pieces, many of them a single
/// character or punctuation mark. Short pieces are concatenated into a run;
/// a longer piece closes the current run and stands on its own. The
/// resulting segments are trimmed and joined with single spaces.
pub fn merge_thoughts<S: AsRef<str>>(fragments: &[S]) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut run = String::new();

    for fragment in fragments {
        let fragment = fragment.as_ref();
        if fragment.is_empty() {
            continue;
        }
        if fragment.trim().chars().count() <= SHORT_FRAGMENT_CHARS {
            run.push_str(fragment);
        } else {
            if !run.is_empty() {
                segments.push(std::mem::take(&mut run));
            }
            segments.push(fragment.to_string());
        }
    }
    if !run.is_empty() {
        segments.push(run);
    }

    let merged = segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if merged.is_empty() {
        EMPTY_THINKING.to_string()
    } else {
        merged
    }
}

/// Collects stream events into a `ChatReply`.
#[derive(Debug, Default)]
pub struct ChatAccumulator {
    thoughts: Vec<String>,
    answer: Vec<String>,
}

impl ChatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Think(t) => self.thoughts.push(t),
            StreamEvent::Text(t) | StreamEvent::Content(t) => self.answer.push(t),
        }
    }

    /// Decode a raw line and record it if it carries text.
    pub fn push_line(&mut self, line: &str) {
        if let Some(event) = parse_line(line) {
            self.push(event);
        }
    }

    pub fn thought_count(&self) -> usize {
        self.thoughts.len()
    }

    pub fn answer_count(&self) -> usize {
        self.answer.len()
    }

    pub fn finish(self) -> ChatReply {
        ChatReply {
            thinking: merge_thoughts(&self.thoughts),
            answer: self.answer.concat(),
        }
    }
}

/// Reassembles text lines from arbitrarily split byte chunks.
///
/// Splitting happens on raw bytes, so a multi-byte UTF-8 character cut
/// across two chunks is decoded only once its line is complete.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// Prefix of `pending` already known to hold no newline
    scanned: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        loop {
            let Some(offset) = self.pending[self.scanned..].iter().position(|&b| b == b'\n') else {
                break;
            };
            let pos = self.scanned + offset;
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(Self::decode(&line[..pos]));
            self.scanned = 0;
        }
        self.scanned = self.pending.len();
        lines
    }

    /// Return the trailing line left without a terminating newline.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(Self::decode(&self.pending))
        }
    }

    fn decode(bytes: &[u8]) -> String {
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_markers_are_skipped() {
        assert_eq!(parse_line("data: status"), None);
        assert_eq!(parse_line("data: reasoner"), None);
        assert_eq!(parse_line("data: text"), None);
        assert_eq!(parse_line("data: [DONE]"), None);
        assert_eq!(parse_line("data: [plugin: ]"), None);
        assert_eq!(parse_line("data: []"), None);
    }

    #[test]
    fn test_non_data_lines_are_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("event: message"), None);
        assert_eq!(parse_line(": keep-alive"), None);
        assert_eq!(parse_line(r#"{"type":"text","msg":"bare"}"#), None);
    }

    #[test]
    fn test_invalid_json_is_skipped() {
        assert_eq!(parse_line("data: {not json"), None);
        assert_eq!(parse_line("data: 42"), None);
    }

    #[test]
    fn test_event_classification() {
        assert_eq!(
            parse_line(r#"data: {"type":"think","content":"让我想想"}"#),
            Some(StreamEvent::Think("让我想想".to_string()))
        );
        assert_eq!(
            parse_line(r#"data: {"type":"think"}"#),
            Some(StreamEvent::Think(String::new()))
        );
        assert_eq!(
            parse_line(r#"  data: {"type":"text","msg":"你好"}  "#),
            Some(StreamEvent::Text("你好".to_string()))
        );
        assert_eq!(
            parse_line(r#"data: {"type":"deepSearch","content":"结果"}"#),
            Some(StreamEvent::Content("结果".to_string()))
        );
    }

    #[test]
    fn test_text_without_msg_falls_back_to_content() {
        assert_eq!(
            parse_line(r#"data: {"type":"text","msg":"","content":"备用"}"#),
            Some(StreamEvent::Content("备用".to_string()))
        );
        assert_eq!(parse_line(r#"data: {"type":"text","msg":""}"#), None);
        assert_eq!(parse_line(r#"data: {"type":"meta","content":""}"#), None);
    }

    #[test]
    fn test_non_string_fields_do_not_drop_event() {
        assert_eq!(
            parse_line(r#"data: {"type":"text","msg":123,"content":"数字消息"}"#),
            Some(StreamEvent::Content("数字消息".to_string()))
        );
        assert_eq!(
            parse_line(r#"data: {"type":"think","content":{"nested":true}}"#),
            Some(StreamEvent::Think(String::new()))
        );
        assert_eq!(
            parse_line(r#"data: {"type":7,"content":"still text"}"#),
            Some(StreamEvent::Content("still text".to_string()))
        );
        assert_eq!(parse_line(r#"data: ["not","an","object"]x"#), None);
    }

    #[test]
    fn test_merge_thoughts_glues_short_fragments() {
        let fragments = ["用户", "问", "我", "会什么，需要介绍能力", "。", ""];
        assert_eq!(merge_thoughts(&fragments), "用户问我 会什么，需要介绍能力 。");
    }

    #[test]
    fn test_merge_thoughts_trims_segments() {
        let fragments = ["  first thought ", " ", "second thought"];
        assert_eq!(merge_thoughts(&fragments), "first thought second thought");
    }

    #[test]
    fn test_merge_thoughts_empty_is_null() {
        let empty: [&str; 0] = [];
        assert_eq!(merge_thoughts(&empty), "null");
        assert_eq!(merge_thoughts(&["", " ", "  "]), "null");
    }

    #[test]
    fn test_accumulator_builds_reply() {
        let mut acc = ChatAccumulator::new();
        for line in [
            "data: reasoner",
            r#"data: {"type":"think","content":"Considering the question carefully"}"#,
            "data: text",
            r#"data: {"type":"text","msg":"我可以"}"#,
            r#"data: {"type":"text","msg":"帮你写代码。"}"#,
            "data: [DONE]",
        ] {
            acc.push_line(line);
        }
        assert_eq!(acc.thought_count(), 1);
        assert_eq!(acc.answer_count(), 2);

        let reply = acc.finish();
        assert_eq!(reply.thinking, "Considering the question carefully");
        assert_eq!(reply.answer, "我可以帮你写代码。");
    }

    #[test]
    fn test_accumulator_without_thinking() {
        let mut acc = ChatAccumulator::new();
        acc.push_line(r#"data: {"type":"text","msg":"hi"}"#);
        let reply = acc.finish();
        assert_eq!(reply.thinking, "null");
        assert_eq!(reply.answer, "hi");
    }

    #[test]
    fn test_line_buffer_reassembles_split_utf8() {
        let line = "data: {\"type\":\"text\",\"msg\":\"元宝\"}\r\n";
        let bytes = line.as_bytes();
        // Split inside the first CJK character
        let split = line.find('元').unwrap() + 1;

        let mut buf = LineBuffer::new();
        assert!(buf.push(&bytes[..split]).is_empty());
        let lines = buf.push(&bytes[split..]);
        assert_eq!(lines, vec!["data: {\"type\":\"text\",\"msg\":\"元宝\"}".to_string()]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn test_line_buffer_long_line_in_small_chunks() {
        let payload = format!("data: {{\"type\":\"text\",\"msg\":\"{}\"}}", "元".repeat(2000));
        let bytes = format!("{}\ndata: text\n", payload).into_bytes();

        let mut buf = LineBuffer::new();
        let mut lines = Vec::new();
        for chunk in bytes.chunks(7) {
            lines.extend(buf.push(chunk));
        }
        assert_eq!(lines, vec![payload, "data: text".to_string()]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn test_line_buffer_multiple_lines_and_tail() {
        let mut buf = LineBuffer::new();
        let lines = buf.push(b"data: status\n\ndata: text\ndata: [DO");
        assert_eq!(lines, vec!["data: status", "", "data: text"]);
        assert!(buf.push(b"NE]").is_empty());
        assert_eq!(buf.finish(), Some("data: [DONE]".to_string()));
    }
}
