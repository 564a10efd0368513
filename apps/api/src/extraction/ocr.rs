//! OCR fallback for scanned documents: rasterize pages with poppler's
//! `pdftoppm`, then read each page image with `tesseract`.
//!
//! Both engines are external executables addressed by caller-supplied paths.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::warn;

use super::ExtractionConfig;

/// Pages rasterized for OCR. Lower than the text-layer cap: OCR is the
/// expensive path.
const OCR_PAGE_CAP: usize = 3;

/// Matches pdf2image's default rendering resolution.
const RASTER_DPI: &str = "200";

/// Rasterizes the first `OCR_PAGE_CAP` pages and OCRs them in page order.
///
/// A rasterizer failure is an error for the caller to absorb. A tesseract
/// failure mid-loop stops the loop but keeps the pages already read, so
/// partial OCR output still reaches the prompt.
pub(crate) async fn rasterize_and_ocr(
    content: &[u8],
    config: &ExtractionConfig,
) -> Result<String> {
    let dir = tempfile::tempdir().context("failed to create OCR staging directory")?;
    let pdf_path = dir.path().join("input.pdf");
    tokio::fs::write(&pdf_path, content)
        .await
        .context("failed to stage document for rasterization")?;

    let prefix = dir.path().join("page");
    let output = Command::new(&config.pdftoppm_path)
        .arg("-png")
        .arg("-r")
        .arg(RASTER_DPI)
        .arg("-f")
        .arg("1")
        .arg("-l")
        .arg(OCR_PAGE_CAP.to_string())
        .arg(&pdf_path)
        .arg(&prefix)
        .output()
        .await
        .with_context(|| format!("failed to run rasterizer '{}'", config.pdftoppm_path))?;

    if !output.status.success() {
        bail!(
            "pdftoppm exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    // pdftoppm names output page-<n>.png, zero-padding <n> uniformly within
    // a run, so a lexicographic sort is page order.
    let mut pages: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .context("failed to list rasterized pages")?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
        .collect();
    pages.sort();

    let mut text = String::new();
    for page in &pages {
        let output = match Command::new(&config.tesseract_path)
            .arg(page)
            .arg("stdout")
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(
                    "failed to run OCR engine '{}': {e}",
                    config.tesseract_path
                );
                break;
            }
        };

        if !output.status.success() {
            warn!(
                "tesseract exited with {} on {}: {}",
                output.status,
                page.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            break;
        }

        text.push_str(&String::from_utf8_lossy(&output.stdout));
    }

    Ok(text)
}
