use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolgate_policy::ToolArgs;

use crate::parser::{JsonRepairParser, StrictJsonParser};
use crate::shape::ModelOutputShape;

const FENCE: &str = "```";

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}'
    )
}

/// Split on every line boundary, treating `\r\n` as one. Unlike
/// `str::lines`, a bare `\r` also ends a line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + c.len_utf8();
        if c == '\r' && chars.next_if(|&(_, next)| next == '\n').is_some() {
            start += 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Strip surrounding whitespace and, when the whole message is a fenced code
/// block of at least three lines, the opening and closing fence lines.
pub fn normalize_model_output(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.starts_with(FENCE) && trimmed.ends_with(FENCE) {
        let lines = split_lines(trimmed);
        if lines.len() >= 3 {
            return lines[1..lines.len() - 1].join("\n").trim().to_string();
        }
    }
    trimmed.to_string()
}

/// A tool call extracted from model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool_name: String,
    #[serde(default)]
    pub tool_args: ToolArgs,
}

impl ToolRequest {
    /// Typed view of a parsed value. Requires an object with a string
    /// `tool_name`; a missing or non-object `tool_args` becomes empty.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let tool_name = object.get("tool_name")?.as_str()?.to_string();
        let tool_args = object
            .get("tool_args")
            .cloned()
            .map(ToolArgs::from_value)
            .unwrap_or_default();
        Some(Self {
            tool_name,
            tool_args,
        })
    }
}

/// Interprets raw model turns before tool-call extraction.
///
/// Only unambiguous plain text may bypass strict tool-call parsing. Anything
/// containing a brace, even malformed, stays on the strict path so repair and
/// warning logic downstream can run.
#[derive(Debug, Clone, Default)]
pub struct OutputAdapter<P = StrictJsonParser> {
    parser: P,
}

impl OutputAdapter<StrictJsonParser> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: JsonRepairParser> OutputAdapter<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    pub fn classify(&self, message: &str) -> ModelOutputShape {
        let normalized = normalize_model_output(message);
        let shape = self.classify_normalized(&normalized);
        tracing::debug!(shape = %shape, len = normalized.len(), "classified model output");
        shape
    }

    fn classify_normalized(&self, msg: &str) -> ModelOutputShape {
        if msg.is_empty() {
            return ModelOutputShape::Empty;
        }
        match (msg.contains('{'), msg.contains('}')) {
            (true, true) => {
                if self.parser.parse(msg).is_some() {
                    ModelOutputShape::JsonLike
                } else {
                    ModelOutputShape::MalformedJsonLike
                }
            }
            (true, false) | (false, true) => ModelOutputShape::MalformedJsonLike,
            (false, false) => ModelOutputShape::PlainResponse,
        }
    }

    /// True only for plain text responses.
    pub fn should_fallback_to_plain(&self, message: &str) -> bool {
        self.classify(message) == ModelOutputShape::PlainResponse
    }

    /// Whatever the parser makes of the normalized message.
    pub fn extract_tool_request(&self, message: &str) -> Option<Value> {
        self.parser.parse(&normalize_model_output(message))
    }

    pub fn extract_typed_tool_request(&self, message: &str) -> Option<ToolRequest> {
        self.extract_tool_request(message)
            .as_ref()
            .and_then(ToolRequest::from_value)
    }
}
