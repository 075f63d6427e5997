use serde_json::Value;

/// Best-effort JSON parsing capability.
///
/// Implementations never fail loudly: anything they cannot make sense of is
/// `None`. A JSON `null` counts as a failed parse.
pub trait JsonRepairParser: Send + Sync {
    fn parse(&self, text: &str) -> Option<Value>;
}

/// Strict `serde_json` parse, used when no repair parser is supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJsonParser;

impl JsonRepairParser for StrictJsonParser {
    fn parse(&self, text: &str) -> Option<Value> {
        serde_json::from_str::<Value>(text)
            .ok()
            .filter(|value| !value.is_null())
    }
}

impl<F> JsonRepairParser for F
where
    F: Fn(&str) -> Option<Value> + Send + Sync,
{
    fn parse(&self, text: &str) -> Option<Value> {
        self(text).filter(|value| !value.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_parser_accepts_valid_json() {
        assert_eq!(StrictJsonParser.parse(r#"{"a":1}"#), Some(json!({ "a": 1 })));
        assert_eq!(StrictJsonParser.parse("[1, 2]"), Some(json!([1, 2])));
    }

    #[test]
    fn test_strict_parser_rejects_invalid_and_null() {
        assert_eq!(StrictJsonParser.parse(r#"{"a":1"#), None);
        assert_eq!(StrictJsonParser.parse("null"), None);
        assert_eq!(StrictJsonParser.parse("not json"), None);
    }

    #[test]
    fn test_closures_are_parsers() {
        let always = |_: &str| Some(json!({ "fixed": true }));
        assert_eq!(always.parse("{"), Some(json!({ "fixed": true })));

        let returns_null = |_: &str| Some(Value::Null);
        assert_eq!(returns_null.parse("{}"), None);
    }
}
