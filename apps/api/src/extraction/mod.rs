//! Text extraction — best-effort conversion of an uploaded résumé PDF into
//! plain text.
//!
//! Two-stage strategy: read the text layer of the first few pages directly,
//! and fall back to rasterize-and-OCR only when the text layer is too thin
//! to be a digitally-authored document. Thresholding on extracted length is
//! a format-agnostic heuristic; it needs no "is this scanned" metadata.
//!
//! The contract is "empty string on irrecoverable failure": a corrupt
//! document or a missing OCR engine must never fail a screening batch.

use async_trait::async_trait;
use lopdf::Document;
use tracing::warn;

mod ocr;

/// Pages read from the text layer. Fixed cap to bound cost on large uploads.
const DIRECT_PAGE_CAP: usize = 4;

/// Stripped text shorter than this marks the document as image-based/scanned
/// and triggers the OCR fallback.
const OCR_TRIGGER_CHARS: usize = 50;

/// Locations of the external extraction engines. Built per invocation from
/// request overrides plus config defaults and passed down the call chain;
/// never stored in process-global state, so concurrent screening runs with
/// different engine paths cannot race.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub tesseract_path: String,
    pub pdftoppm_path: String,
}

/// Document-to-text seam. The pipeline only sees this trait, so tests can
/// swap in canned extractors.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Best-effort extraction. Returns the empty string when nothing can be
    /// recovered; never fails.
    async fn extract(&self, filename: &str, content: &[u8]) -> String;
}

/// PDF extractor: lopdf text layer first, `pdftoppm` + `tesseract` fallback.
pub struct PdfExtractor {
    config: ExtractionConfig,
}

impl PdfExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, filename: &str, content: &[u8]) -> String {
        // lopdf is synchronous; keep it off the async runtime.
        let bytes = content.to_vec();
        let direct = tokio::task::spawn_blocking(move || direct_page_text(&bytes)).await;

        let mut text = match direct {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("Failed to read {filename}: {e}");
                return String::new();
            }
            Err(e) => {
                warn!("Extraction task failed for {filename}: {e}");
                return String::new();
            }
        };

        if needs_ocr_fallback(&text) {
            match ocr::rasterize_and_ocr(content, &self.config).await {
                Ok(ocr_text) => text.push_str(&ocr_text),
                // OCR is never fatal: keep whatever the text layer gave us.
                Err(e) => warn!("OCR fallback failed for {filename}: {e}"),
            }
        }

        text
    }
}

/// Concatenated text layer of the first `DIRECT_PAGE_CAP` pages, in page
/// order. Any structural failure aborts the whole read; the caller maps it
/// to an empty result.
fn direct_page_text(bytes: &[u8]) -> Result<String, lopdf::Error> {
    let doc = Document::load_mem(bytes)?;
    let mut text = String::new();
    for page_number in doc.get_pages().keys().take(DIRECT_PAGE_CAP) {
        text.push_str(&doc.extract_text(&[*page_number])?);
    }
    Ok(text)
}

fn needs_ocr_fallback(text: &str) -> bool {
    text.trim().chars().count() < OCR_TRIGGER_CHARS
}
