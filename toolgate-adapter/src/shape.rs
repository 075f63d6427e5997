use serde::{Deserialize, Serialize};

/// Structural shape of one raw model turn.
///
/// Every input string falls into exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOutputShape {
    /// Nothing left after normalization.
    Empty,
    /// No braces at all.
    PlainResponse,
    /// Braces present and the parser produced a value.
    JsonLike,
    /// Braces present but unbalanced, or the parser gave up.
    MalformedJsonLike,
}

impl ModelOutputShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::PlainResponse => "plain_response",
            Self::JsonLike => "json_like",
            Self::MalformedJsonLike => "malformed_json_like",
        }
    }
}

impl std::fmt::Display for ModelOutputShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_serializes_to_snake_case() {
        let shapes = [
            (ModelOutputShape::Empty, "\"empty\""),
            (ModelOutputShape::PlainResponse, "\"plain_response\""),
            (ModelOutputShape::JsonLike, "\"json_like\""),
            (ModelOutputShape::MalformedJsonLike, "\"malformed_json_like\""),
        ];
        for (shape, expected) in shapes {
            assert_eq!(serde_json::to_string(&shape).unwrap(), expected);
            assert_eq!(format!("\"{shape}\""), expected);
        }
    }
}
