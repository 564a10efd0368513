//! Axum route handlers for the Screening API.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::{ExtractionConfig, PdfExtractor};
use crate::screening::criteria::{parse_criteria, project, ColumnMapping};
use crate::screening::pipeline::{run_screening, MatchResult, UploadedDocument};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub status: &'static str,
    pub data: Vec<MatchResult>,
}

/// POST /api/v1/screen
///
/// Multipart batch: one criteria spreadsheet, any number of CV files, plus
/// optional column mapping, model, and extraction-engine overrides. Returns
/// the ranked match list. A missing input aborts before any processing; a
/// bad document or a bad model response only drops its own unit.
pub async fn handle_screen(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScreenResponse>, AppError> {
    let mut criteria_file: Option<Bytes> = None;
    let mut documents: Vec<UploadedDocument> = Vec::new();
    let mut mapping = ColumnMapping::default();
    let mut model: Option<String> = None;
    let mut tesseract_path: Option<String> = None;
    let mut pdftoppm_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        match field.name().unwrap_or("") {
            "criteria_file" => {
                criteria_file = Some(read_bytes(field, "criteria_file").await?);
            }
            "cv_files" => {
                let filename = field.file_name().unwrap_or("unknown").to_string();
                let content = read_bytes(field, "cv_files").await?;
                documents.push(UploadedDocument { filename, content });
            }
            "col_role" => mapping.role = non_empty(read_text(field, "col_role").await?),
            "col_skills" => mapping.skills = non_empty(read_text(field, "col_skills").await?),
            "col_exp" => mapping.experience = non_empty(read_text(field, "col_exp").await?),
            "model" => model = non_empty(read_text(field, "model").await?),
            "tesseract_path" => {
                tesseract_path = non_empty(read_text(field, "tesseract_path").await?)
            }
            "poppler_path" => pdftoppm_path = non_empty(read_text(field, "poppler_path").await?),
            // Unknown fields are ignored, same as unused form inputs.
            _ => {}
        }
    }

    let criteria_bytes = criteria_file
        .ok_or_else(|| AppError::Validation("Missing criteria spreadsheet".to_string()))?;
    if documents.is_empty() {
        return Err(AppError::Validation("Missing CV files".to_string()));
    }

    let table = parse_criteria(&criteria_bytes)?;
    let rows = project(&table, &mapping);

    let model = model.unwrap_or_else(|| state.config.default_model.clone());
    let extractor = PdfExtractor::new(ExtractionConfig {
        tesseract_path: tesseract_path.unwrap_or_else(|| state.config.tesseract_path.clone()),
        pdftoppm_path: pdftoppm_path.unwrap_or_else(|| state.config.pdftoppm_path.clone()),
    });

    info!(
        "Screening {} documents against {} criteria rows with model '{}'",
        documents.len(),
        rows.len(),
        model
    );

    let data = run_screening(&documents, &rows, &model, &extractor, state.scorer.as_ref()).await;

    Ok(Json(ScreenResponse {
        status: "success",
        data,
    }))
}

async fn read_bytes(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<Bytes, AppError> {
    field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
