//! Move requests as submitted by players.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A proposed move, in whichever notation the caller speaks.
///
/// Deserializes from either `{"from": "e2", "to": "e4"}` (with an optional
/// `"promotion": "q"`) or a bare string in SAN (`"Nf3"`) or UCI (`"g1f3"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MoveRequest {
    /// Source and destination squares.
    Squares {
        /// Source square (e.g. "e2").
        from: String,
        /// Destination square (e.g. "e4").
        to: String,
        /// Promotion piece (`q`, `r`, `b` or `n`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        promotion: Option<String>,
    },
    /// A move in SAN or UCI notation.
    Notation(String),
}

impl MoveRequest {
    /// Builds a coordinate move without promotion.
    pub fn squares(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Squares {
            from: from.into(),
            to: to.into(),
            promotion: None,
        }
    }

    /// Builds a move from SAN or UCI text.
    pub fn notation(text: impl Into<String>) -> Self {
        Self::Notation(text.into())
    }
}

impl std::fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveRequest::Squares {
                from,
                to,
                promotion: Some(p),
            } => write!(f, "{}-{}={}", from, to, p),
            MoveRequest::Squares { from, to, .. } => write!(f, "{}-{}", from, to),
            MoveRequest::Notation(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_squares() {
        let mv: MoveRequest = serde_json::from_str(r#"{"from":"e2","to":"e4"}"#).unwrap();
        assert_eq!(mv, MoveRequest::squares("e2", "e4"));
    }

    #[test]
    fn test_deserialize_promotion() {
        let mv: MoveRequest =
            serde_json::from_str(r#"{"from":"e7","to":"e8","promotion":"n"}"#).unwrap();
        assert_eq!(
            mv,
            MoveRequest::Squares {
                from: "e7".into(),
                to: "e8".into(),
                promotion: Some("n".into()),
            }
        );
    }

    #[test]
    fn test_deserialize_notation() {
        let mv: MoveRequest = serde_json::from_str(r#""Nf3""#).unwrap();
        assert_eq!(mv, MoveRequest::notation("Nf3"));
    }

    #[test]
    fn test_display() {
        assert_eq!(MoveRequest::squares("e2", "e4").to_string(), "e2-e4");
        assert_eq!(MoveRequest::notation("O-O").to_string(), "O-O");
    }
}
