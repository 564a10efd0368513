//! Candidate scoring — the contract with the generative oracle.
//!
//! The oracle is non-deterministic and its output schema is advisory, so the
//! parse layer is lenient: every field is optional and the score tolerates
//! numeric strings. Missing fields become per-field defaults downstream;
//! only an unparseable payload fails the pair.
//!
//! `AppState` holds an `Arc<dyn CandidateScorer>`, so tests swap in mocks.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::llm_client::{LlmError, OllamaClient};
use crate::screening::criteria::CriteriaRow;
use crate::screening::prompts::{build_screen_prompt, SCREEN_SYSTEM};

/// The oracle's verdict for one (document, criteria-row) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Judgment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Accepts an integer, a float, or a numeric string. Models drift between
/// `85`, `85.0`, and `"85"`.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("score is out of integer range")),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| Some(f.round() as i64))
            .map_err(|_| serde::de::Error::custom(format!("score is not numeric: {s:?}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "unexpected score type: {other}"
        ))),
    }
}

/// The scoring oracle seam. One implementation talks to Ollama; tests
/// implement it with canned verdicts and call counters.
#[async_trait]
pub trait CandidateScorer: Send + Sync {
    /// Scores one pair with at most one oracle call, never retried. An
    /// `Err` means the pair is dropped by the caller.
    async fn score(
        &self,
        cv_text: &str,
        row: &CriteriaRow,
        model: &str,
    ) -> Result<Judgment, LlmError>;
}

/// Scorer backed by a local Ollama model.
pub struct OllamaScorer {
    llm: OllamaClient,
}

impl OllamaScorer {
    pub fn new(llm: OllamaClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CandidateScorer for OllamaScorer {
    async fn score(
        &self,
        cv_text: &str,
        row: &CriteriaRow,
        model: &str,
    ) -> Result<Judgment, LlmError> {
        let prompt = build_screen_prompt(cv_text, row);
        self.llm
            .generate_json::<Judgment>(model, SCREEN_SYSTEM, &prompt)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_judgment_deserializes() {
        let judgment: Judgment = serde_json::from_str(
            r#"{"name":"Jane Doe","score":85,"status":"Shortlisted","summary":"Strong fit"}"#,
        )
        .unwrap();
        assert_eq!(judgment.name.as_deref(), Some("Jane Doe"));
        assert_eq!(judgment.score, Some(85));
        assert_eq!(judgment.status.as_deref(), Some("Shortlisted"));
        assert_eq!(judgment.summary.as_deref(), Some("Strong fit"));
    }

    #[test]
    fn test_missing_fields_become_none() {
        let judgment: Judgment = serde_json::from_str(r#"{"score": 40}"#).unwrap();
        assert!(judgment.name.is_none());
        assert_eq!(judgment.score, Some(40));
        assert!(judgment.status.is_none());
        assert!(judgment.summary.is_none());

        let empty: Judgment = serde_json::from_str("{}").unwrap();
        assert!(empty.score.is_none());
    }

    #[test]
    fn test_score_accepts_numeric_string() {
        let judgment: Judgment = serde_json::from_str(r#"{"score": "85"}"#).unwrap();
        assert_eq!(judgment.score, Some(85));
    }

    #[test]
    fn test_score_rounds_float() {
        let judgment: Judgment = serde_json::from_str(r#"{"score": 72.6}"#).unwrap();
        assert_eq!(judgment.score, Some(73));
    }

    #[test]
    fn test_score_out_of_nominal_range_is_trusted() {
        // The nominal range is 0-100 but model output is taken as-is.
        let judgment: Judgment = serde_json::from_str(r#"{"score": 140}"#).unwrap();
        assert_eq!(judgment.score, Some(140));
    }

    #[test]
    fn test_non_numeric_score_fails_the_pair() {
        assert!(serde_json::from_str::<Judgment>(r#"{"score": "excellent"}"#).is_err());
        assert!(serde_json::from_str::<Judgment>(r#"{"score": [85]}"#).is_err());
    }

    #[test]
    fn test_null_score_becomes_none() {
        let judgment: Judgment = serde_json::from_str(r#"{"score": null}"#).unwrap();
        assert!(judgment.score.is_none());
    }
}
