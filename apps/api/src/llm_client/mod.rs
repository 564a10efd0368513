/// LLM Client — the single point of entry for all Ollama calls in the service.
///
/// ARCHITECTURAL RULE: No other module may call the Ollama API directly.
/// All model interactions MUST go through this module.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    /// Constrains the model to emit a single JSON object.
    format: &'a str,
    /// The whole completion in one response body, no chunk stream.
    stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// The single Ollama client used by all services in the binary.
/// Wraps `POST /api/generate` with JSON-constrained output.
///
/// Deliberately retry-free: a screening batch makes one call per
/// (document, criteria-row) pair, and a failed pair is dropped by the
/// caller rather than re-asked.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Makes a raw generate call, returning the full response object.
    pub async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<GenerateResponse, LlmError> {
        let request_body = GenerateRequest {
            model,
            system,
            prompt,
            format: "json",
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, GENERATE_PATH))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let generate_response: GenerateResponse = response.json().await?;

        debug!(
            "LLM call succeeded: model={}, response_chars={}",
            model,
            generate_response.response.len()
        );

        Ok(generate_response)
    }

    /// Convenience method that calls the model and deserializes the response
    /// text as JSON. The prompt must instruct the model to return valid JSON.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<T, LlmError> {
        let response = self.generate(model, system, prompt).await?;

        let text = response.response.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
