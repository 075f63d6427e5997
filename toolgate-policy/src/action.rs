use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Typed view over a tool call's argument object.
///
/// The keys that drive mutation detection and target resolution get their own
/// fields; everything else lands in `extra`. Values are kept exactly as the
/// model sent them, so serializing round-trips to the original object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ToolArgs {
    pub target: Option<Value>,
    pub url: Option<Value>,
    pub path: Option<Value>,
    pub file: Option<Value>,
    pub file_path: Option<Value>,
    pub command: Option<Value>,
    pub extra: Map<String, Value>,
}

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any JSON value. Non-object values yield empty arguments.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from(map),
            _ => Self::default(),
        }
    }

    pub fn with_target(mut self, target: impl Into<Value>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<Value>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<Value>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<Value>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// True when any key naming a target location or URL is present,
    /// regardless of its value.
    pub fn has_location_key(&self) -> bool {
        self.path.is_some()
            || self.file.is_some()
            || self.file_path.is_some()
            || self.url.is_some()
            || self.target.is_some()
    }

    /// Resolve the action target: `target`, then `url`, then `path`. The first
    /// truthy value wins and is returned with its JSON type intact.
    pub fn resolved_target(&self) -> Option<&Value> {
        [&self.target, &self.url, &self.path]
            .into_iter()
            .filter_map(Option::as_ref)
            .find(|value| is_truthy(value))
    }

    pub fn is_empty(&self) -> bool {
        !self.has_location_key() && self.command.is_none() && self.extra.is_empty()
    }
}

/// `null`, `false`, zero, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

impl From<Map<String, Value>> for ToolArgs {
    fn from(mut map: Map<String, Value>) -> Self {
        let mut take = |key: &str| map.remove(key);
        let target = take("target");
        let url = take("url");
        let path = take("path");
        let file = take("file");
        let file_path = take("file_path");
        let command = take("command");
        Self {
            target,
            url,
            path,
            file,
            file_path,
            command,
            extra: map,
        }
    }
}

impl From<ToolArgs> for Map<String, Value> {
    fn from(args: ToolArgs) -> Self {
        let mut map = args.extra;
        let known = [
            ("target", args.target),
            ("url", args.url),
            ("path", args.path),
            ("file", args.file),
            ("file_path", args.file_path),
            ("command", args.command),
        ];
        for (key, value) in known {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        }
        map
    }
}
