//! Relevance labels produced by the classifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// How well the indexed documents cover a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelevanceLabel {
    /// Passages hold enough explicit information for a complete answer
    CanAnswer,
    /// Passages touch the topic but miss details
    Partial,
    /// Passages do not discuss the topic at all
    NoMatch,
}

impl RelevanceLabel {
    pub const ALL: [RelevanceLabel; 3] = [Self::CanAnswer, Self::Partial, Self::NoMatch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanAnswer => "CAN_ANSWER",
            Self::Partial => "PARTIAL",
            Self::NoMatch => "NO_MATCH",
        }
    }

    /// Strict label parsing: the trimmed text must equal a label exactly.
    ///
    /// Anything else (extra words, other casing, empty) is `NoMatch`.
    pub fn parse_strict(raw: &str) -> Self {
        match raw.trim() {
            "CAN_ANSWER" => Self::CanAnswer,
            "PARTIAL" => Self::Partial,
            _ => Self::NoMatch,
        }
    }

    /// Whether the pipeline should go on to draft an answer
    pub fn should_proceed(&self) -> bool {
        matches!(self, Self::CanAnswer | Self::Partial)
    }
}

impl fmt::Display for RelevanceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_labels_parse() {
        for label in RelevanceLabel::ALL {
            assert_eq!(RelevanceLabel::parse_strict(label.as_str()), label);
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(
            RelevanceLabel::parse_strict("  PARTIAL\n"),
            RelevanceLabel::Partial
        );
    }

    #[test]
    fn test_anything_else_fails_closed() {
        for raw in ["", "can_answer", "CAN_ANSWER.", "Label: PARTIAL", "PARTIAL match", "YES"] {
            assert_eq!(
                RelevanceLabel::parse_strict(raw),
                RelevanceLabel::NoMatch,
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_should_proceed() {
        assert!(RelevanceLabel::CanAnswer.should_proceed());
        assert!(RelevanceLabel::Partial.should_proceed());
        assert!(!RelevanceLabel::NoMatch.should_proceed());
    }

    #[test]
    fn test_serde_uses_wire_labels() {
        let json = serde_json::to_string(&RelevanceLabel::CanAnswer).unwrap();
        assert_eq!(json, "\"CAN_ANSWER\"");
    }
}
