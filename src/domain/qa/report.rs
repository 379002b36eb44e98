//! Verification report: the structured verdict on a draft answer
//!
//! The verifier model answers in a line-oriented format. Everything it sends
//! back is untrusted text, so [`VerificationReport::parse`] is total: every
//! field has a default and no input makes it fail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Affirmative verdict token
pub const AFFIRMATIVE: &str = "YES";
/// Negative verdict token
pub const NEGATIVE: &str = "NO";
/// Marker rendered for empty list and free-text fields
pub const NONE_MARKER: &str = "None";

pub const EMPTY_RESPONSE_NOTE: &str = "Empty response from model.";
pub const PARSE_FAILURE_NOTE: &str = "Failed to parse model response.";
pub const MODEL_FAILURE_NOTE: &str = "Verification model call failed.";

const KEY_SUPPORTED: &str = "Supported";
const KEY_UNSUPPORTED_CLAIMS: &str = "Unsupported Claims";
const KEY_CONTRADICTIONS: &str = "Contradictions";
const KEY_RELEVANT: &str = "Relevant";
const KEY_ADDITIONAL_DETAILS: &str = "Additional Details";

/// Upper-cased verdict token as the model wrote it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    Yes,
    No,
    /// Anything other than the two tokens, kept verbatim (upper-cased)
    Other(String),
}

impl Verdict {
    pub fn from_token(raw: &str) -> Self {
        let token = raw.trim().to_uppercase();
        match token.as_str() {
            AFFIRMATIVE => Self::Yes,
            NEGATIVE => Self::No,
            _ => Self::Other(token),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Yes => AFFIRMATIVE,
            Self::No => NEGATIVE,
            Self::Other(token) => token,
        }
    }

    /// True only for the literal negative token
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::No)
    }

    pub fn is_affirmative(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<String> for Verdict {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<Verdict> for String {
    fn from(value: Verdict) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured verification of a draft answer against its passages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub supported: Verdict,
    pub unsupported_claims: Vec<String>,
    pub contradictions: Vec<String>,
    pub relevant: Verdict,
    pub additional_details: String,
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self::negative("")
    }
}

impl VerificationReport {
    /// All-negative report carrying a note in the free-text field
    pub fn negative(note: impl Into<String>) -> Self {
        Self {
            supported: Verdict::No,
            unsupported_claims: Vec::new(),
            contradictions: Vec::new(),
            relevant: Verdict::No,
            additional_details: note.into(),
        }
    }

    /// Parse a verifier response.
    ///
    /// Each line with a colon is split on the first colon. Keys are matched
    /// case-insensitively after stripping markdown emphasis. Missing fields
    /// default to the negative token, an empty list, or empty text. A blank
    /// response, or one where no expected key appears, yields the negative
    /// report with a note saying why.
    pub fn parse(response: &str) -> Self {
        if response.trim().is_empty() {
            return Self::negative(EMPTY_RESPONSE_NOTE);
        }

        let mut supported = None;
        let mut unsupported_claims = None;
        let mut contradictions = None;
        let mut relevant = None;
        let mut additional_details = None;

        for line in response.lines() {
            let Some((raw_key, raw_value)) = line.split_once(':') else {
                continue;
            };
            let value = strip_emphasis(raw_value);

            match normalize_key(raw_key).as_str() {
                "supported" => supported = Some(Verdict::from_token(value)),
                "unsupported claims" => unsupported_claims = Some(parse_list(value)),
                "contradictions" => contradictions = Some(parse_list(value)),
                "relevant" => relevant = Some(Verdict::from_token(value)),
                "additional details" => additional_details = Some(parse_free_text(value)),
                _ => {}
            }
        }

        let recognised = supported.is_some()
            || unsupported_claims.is_some()
            || contradictions.is_some()
            || relevant.is_some()
            || additional_details.is_some();

        if !recognised {
            return Self::negative(PARSE_FAILURE_NOTE);
        }

        Self {
            supported: supported.unwrap_or(Verdict::No),
            unsupported_claims: unsupported_claims.unwrap_or_default(),
            contradictions: contradictions.unwrap_or_default(),
            relevant: relevant.unwrap_or(Verdict::No),
            additional_details: additional_details.unwrap_or_default(),
        }
    }

    /// Human-readable report, one labelled line per field
    pub fn format(&self) -> String {
        let details = if self.additional_details.is_empty() {
            NONE_MARKER
        } else {
            self.additional_details.as_str()
        };

        format!(
            "**{}:** {}\n**{}:** {}\n**{}:** {}\n**{}:** {}\n**{}:** {}\n",
            KEY_SUPPORTED,
            self.supported,
            KEY_UNSUPPORTED_CLAIMS,
            format_list(&self.unsupported_claims),
            KEY_CONTRADICTIONS,
            format_list(&self.contradictions),
            KEY_RELEVANT,
            self.relevant,
            KEY_ADDITIONAL_DETAILS,
            details,
        )
    }

    /// Whether the draft must be re-researched: either check came back negative
    pub fn needs_revision(&self) -> bool {
        self.supported.is_negative() || self.relevant.is_negative()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn is_key_noise(c: char) -> bool {
    c == '*' || c == '-' || c == '#' || c.is_whitespace()
}

fn normalize_key(raw: &str) -> String {
    raw.trim_matches(is_key_noise)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn strip_emphasis(raw: &str) -> &str {
    raw.trim().trim_matches('*').trim()
}

fn parse_list(value: &str) -> Vec<String> {
    let Some(inner) = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return Vec::new();
    };

    inner
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim_matches('\'').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_free_text(value: &str) -> String {
    if value.eq_ignore_ascii_case(NONE_MARKER) {
        String::new()
    } else {
        value.to_string()
    }
}

fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        NONE_MARKER.to_string()
    } else {
        format!("[{}]", items.join(", "))
    }
}
