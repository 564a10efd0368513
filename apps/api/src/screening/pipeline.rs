//! Match pipeline — the documents × criteria-rows cross product.
//!
//! Strictly sequential: one extraction per document, one oracle call per
//! pair, full batch before the final sort. Per-document and per-pair
//! failures are absorbed and the faulty unit is simply omitted; a partial
//! result set always beats failing the whole batch.

use bytes::Bytes;
use serde::Serialize;
use tracing::warn;

use crate::extraction::TextExtractor;
use crate::screening::criteria::CriteriaRow;
use crate::screening::scorer::CandidateScorer;

pub const FALLBACK_CANDIDATE: &str = "Unknown Candidate";
pub const FALLBACK_STATUS: &str = "Pending";
pub const FALLBACK_REASON: &str = "No feedback provided";

/// One uploaded résumé: filename plus raw bytes, text derived once per run.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content: Bytes,
}

/// One successful judgment flattened with its source identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub candidate: String,
    pub role: String,
    pub score: i64,
    pub status: String,
    pub reason: String,
    pub filename: String,
}

/// Runs the full batch: extract each document once, score every
/// (document, criteria-row) pair, and return the results sorted by score
/// descending (stable sort; ties keep encounter order).
pub async fn run_screening(
    documents: &[UploadedDocument],
    rows: &[CriteriaRow],
    model: &str,
    extractor: &dyn TextExtractor,
    scorer: &dyn CandidateScorer,
) -> Vec<MatchResult> {
    let mut results = Vec::new();

    for document in documents {
        let cv_text = extractor.extract(&document.filename, &document.content).await;
        if cv_text.is_empty() {
            warn!("Skipping {}: no extractable text", document.filename);
            continue;
        }

        for row in rows {
            let judgment = match scorer.score(&cv_text, row, model).await {
                Ok(judgment) => judgment,
                Err(e) => {
                    warn!(
                        "Scoring failed for {} against '{}': {e}",
                        document.filename, row.role
                    );
                    continue;
                }
            };

            results.push(MatchResult {
                candidate: judgment
                    .name
                    .unwrap_or_else(|| FALLBACK_CANDIDATE.to_string()),
                role: row.role.clone(),
                score: judgment.score.unwrap_or(0),
                status: judgment
                    .status
                    .unwrap_or_else(|| FALLBACK_STATUS.to_string()),
                reason: judgment
                    .summary
                    .unwrap_or_else(|| FALLBACK_REASON.to_string()),
                filename: document.filename.clone(),
            });
        }
    }

    // Vec::sort_by is stable, so equal scores keep input encounter order.
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}
