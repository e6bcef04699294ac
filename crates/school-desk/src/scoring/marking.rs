use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ScoringError;

/// Points awarded per correct answer and per wrong answer. Unattempted questions score zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkingScheme {
    pub correct: i32,
    pub wrong: i32,
}

impl MarkingScheme {
    pub const SIXTEEN_MINUS_FOUR: MarkingScheme = MarkingScheme {
        correct: 16,
        wrong: -4,
    };
    pub const FOUR_MINUS_ONE: MarkingScheme = MarkingScheme {
        correct: 4,
        wrong: -1,
    };
    pub const ONE_NO_PENALTY: MarkingScheme = MarkingScheme {
        correct: 1,
        wrong: 0,
    };

    /// Substring match on the free-text label. Unknown labels fall back to one mark, no penalty.
    pub fn resolve(label: &str) -> MarkingScheme {
        Self::recognize(label).unwrap_or(Self::ONE_NO_PENALTY)
    }

    /// Resolve a label under the given policy.
    pub fn resolve_with(label: &str, policy: SchemePolicy) -> Result<MarkingScheme, ScoringError> {
        if let Some(scheme) = Self::recognize(label) {
            return Ok(scheme);
        }

        match policy {
            SchemePolicy::Lenient => {
                warn!(
                    label,
                    "unrecognized marking scheme, scoring as +1 correct / 0 wrong"
                );
                Ok(Self::ONE_NO_PENALTY)
            }
            SchemePolicy::Strict => Err(ScoringError::UnrecognizedMarkingScheme(
                label.to_string(),
            )),
        }
    }

    fn recognize(label: &str) -> Option<MarkingScheme> {
        if awards(label, "+16") {
            Some(Self::SIXTEEN_MINUS_FOUR)
        } else if awards(label, "+4") {
            Some(Self::FOUR_MINUS_ONE)
        } else if awards(label, "+1") {
            Some(Self::ONE_NO_PENALTY)
        } else {
            None
        }
    }

    pub fn points_for(&self, outcome: AnswerOutcome) -> i64 {
        match outcome {
            AnswerOutcome::Correct => i64::from(self.correct),
            AnswerOutcome::Wrong => i64::from(self.wrong),
            AnswerOutcome::Unattempted => 0,
        }
    }
}

/// `points` appears in `label` and is not the prefix of a longer number: `+1` never matches
/// `+10` or `+1.5`.
fn awards(label: &str, points: &str) -> bool {
    label.match_indices(points).any(|(start, matched)| {
        !label[start + matched.len()..]
            .chars()
            .next()
            .is_some_and(|next| next.is_ascii_digit() || next == '.')
    })
}

impl Default for MarkingScheme {
    fn default() -> Self {
        Self::ONE_NO_PENALTY
    }
}

/// How to treat marking-scheme labels that match none of the known schemes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemePolicy {
    /// Score as +1/0 and log a warning.
    #[default]
    Lenient,
    /// Refuse to score.
    Strict,
}

impl SchemePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" | "fallback" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Wrong,
    Unattempted,
}
