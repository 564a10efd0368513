use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a fixed fallback default: the service carries no
/// required secrets, and the extraction engines must work out of the box
/// when `tesseract`/`pdftoppm` are on PATH.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the Ollama server used as the scoring oracle.
    pub ollama_url: String,
    /// Model used when a screening request does not name one.
    pub default_model: String,
    /// Tesseract executable used for OCR fallback on scanned documents.
    pub tesseract_path: String,
    /// Poppler pdftoppm executable used to rasterize pages before OCR.
    pub pdftoppm_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            default_model: env_or("OLLAMA_MODEL", "mistral"),
            tesseract_path: env_or("TESSERACT_PATH", "tesseract"),
            pdftoppm_path: env_or("PDFTOPPM_PATH", "pdftoppm"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
