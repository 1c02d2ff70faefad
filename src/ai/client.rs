//! Gemini API client
//!
//! Wraps the `generateContent` REST endpoint for the five operations the
//! pipeline uses: validate, analyze, compare, chat and comparison chat.
//! Every call is a single attempt; failures surface as
//! [`RemoteServiceError`] and the workflow decides what the user sees.
//! There are no automatic retries anywhere.

use crate::ai::http_client::{analysis_client, validation_client};
use crate::ai::prompts::{ANALYSIS_PROMPT, COMPARISON_PROMPT, VALIDATION_PROMPT};
use crate::ai::response::extract_json_object;
use crate::config::{GeminiConfig, OperationSettings};
use crate::document::PdfDocument;
use crate::types::{AnalysisResult, ComparisonResult, ValidationResult};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generic user-facing messages shown when a remote operation fails. The
/// underlying error is logged but never propagated past the workflow.
pub const VALIDATE_RETRY_MESSAGE: &str = "Failed to validate the document. Please try again.";
pub const ANALYZE_RETRY_MESSAGE: &str = "Failed to analyze the PDF. Please try again.";
pub const COMPARE_RETRY_MESSAGE: &str = "Failed to compare the PDFs. Please try again.";
pub const CHAT_RETRY_MESSAGE: &str = "Failed to process the message. Please try again.";
pub const COMPARE_CHAT_RETRY_MESSAGE: &str = "Failed to process the question. Please try again.";

/// Failure calling the remote service
#[derive(Debug, Error)]
pub enum RemoteServiceError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// The remote capabilities the consent workflow depends on. A trait seam so
/// the workflow is testable with a stub instead of the network.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn validate(&self, document: &PdfDocument)
        -> Result<ValidationResult, RemoteServiceError>;

    async fn analyze(&self, document: &PdfDocument)
        -> Result<AnalysisResult, RemoteServiceError>;

    async fn compare(
        &self,
        first: &PdfDocument,
        second: &PdfDocument,
    ) -> Result<ComparisonResult, RemoteServiceError>;
}

/// Client for Google's Gemini `generateContent` API
pub struct GeminiClient {
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self { config }
    }

    /// Free-form follow-up question about one analyzed contract. The caller
    /// builds the full prompt (see [`crate::ai::prompts::build_chat_prompt`]).
    pub async fn chat(&self, prompt: &str) -> Result<String, RemoteServiceError> {
        self.generate(
            &self.config.chat,
            vec![Part::text(prompt)],
            analysis_client(),
        )
        .await
    }

    /// Follow-up question about a comparison of two contracts.
    pub async fn comparison_chat(&self, prompt: &str) -> Result<String, RemoteServiceError> {
        self.generate(
            &self.config.comparison_chat,
            vec![Part::text(prompt)],
            analysis_client(),
        )
        .await
    }

    /// Issue one `generateContent` call and join the reply's text parts.
    async fn generate(
        &self,
        settings: &OperationSettings,
        parts: Vec<Part>,
        client: &Client,
    ) -> Result<String, RemoteServiceError> {
        if !self.config.has_api_key() {
            return Err(RemoteServiceError::MissingApiKey);
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, settings.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.max_output_tokens,
                response_mime_type: settings
                    .json_response
                    .then(|| "application/json".to_string()),
            },
        };

        tracing::debug!("[Gemini] POST {} (model {})", url, settings.model);

        let response = client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::warn!("[Gemini] API error {}: {}", status, message);
            return Err(RemoteServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GenerateContentResponse = response.json().await?;
        let text = reply.joined_text();
        if text.is_empty() {
            return Err(RemoteServiceError::MalformedResponse(
                "reply contained no text parts".to_string(),
            ));
        }
        Ok(text)
    }

    /// Run an operation whose reply must parse as JSON of type `T`.
    async fn generate_json<T: serde::de::DeserializeOwned>(
        &self,
        settings: &OperationSettings,
        parts: Vec<Part>,
        client: &Client,
    ) -> Result<T, RemoteServiceError> {
        let text = self.generate(settings, parts, client).await?;
        let json = extract_json_object(&text).map_err(RemoteServiceError::MalformedResponse)?;
        serde_json::from_str(&json).map_err(|e| {
            tracing::warn!("[Gemini] Failed to parse reply JSON: {}", e);
            RemoteServiceError::MalformedResponse(e.to_string())
        })
    }
}

#[async_trait]
impl AnalysisService for GeminiClient {
    async fn validate(
        &self,
        document: &PdfDocument,
    ) -> Result<ValidationResult, RemoteServiceError> {
        tracing::info!("[Gemini] Validating {}", document.file_name());
        self.generate_json(
            &self.config.validate,
            vec![Part::pdf(document), Part::text(VALIDATION_PROMPT)],
            validation_client(),
        )
        .await
    }

    async fn analyze(
        &self,
        document: &PdfDocument,
    ) -> Result<AnalysisResult, RemoteServiceError> {
        tracing::info!("[Gemini] Analyzing {}", document.file_name());
        self.generate_json(
            &self.config.analyze,
            vec![Part::pdf(document), Part::text(ANALYSIS_PROMPT)],
            analysis_client(),
        )
        .await
    }

    async fn compare(
        &self,
        first: &PdfDocument,
        second: &PdfDocument,
    ) -> Result<ComparisonResult, RemoteServiceError> {
        tracing::info!(
            "[Gemini] Comparing {} vs {}",
            first.file_name(),
            second.file_name()
        );
        self.generate_json(
            &self.config.compare,
            vec![
                Part::text("CONTRATO 1:"),
                Part::pdf(first),
                Part::text("CONTRATO 2:"),
                Part::pdf(second),
                Part::text(COMPARISON_PROMPT),
            ],
            analysis_client(),
        )
        .await
    }
}

// Wire types for generateContent

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData,
    },
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    fn pdf(document: &PdfDocument) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: "application/pdf".to_string(),
                data: base64::engine::general_purpose::STANDARD.encode(document.bytes()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn joined_text(&self) -> String {
        self.candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Google error body: `{"error": {"code": ..., "message": ..., "status": ...}}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pdf() -> PdfDocument {
        PdfDocument::new("contrato.pdf", b"%PDF-1.4 cuerpo".to_vec()).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::pdf(&sample_pdf()), Part::text("analiza esto")],
            }],
            generation_config: GenerationConfig {
                // 0.25 survives the f32 -> f64 conversion exactly
                temperature: 0.25,
                max_output_tokens: Some(8192),
                response_mime_type: Some("application/json".to_string()),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert!(!parts[0]["inlineData"]["data"].as_str().unwrap().is_empty());
        assert_eq!(parts[1]["text"], "analiza esto");
        assert_eq!(json["generationConfig"]["temperature"], 0.25);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_generation_config_omits_unset_fields() {
        let config = GenerationConfig {
            temperature: 0.4,
            max_output_tokens: None,
            response_mime_type: None,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("maxOutputTokens").is_none());
        assert!(json.get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_text_joining() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"isContract\":"}, {"text": " true}"}]}}
            ]
        }"#;
        let reply: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(reply.joined_text(), "{\"isContract\": true}");
    }

    #[test]
    fn test_empty_candidates_join_to_empty() {
        let reply: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(reply.joined_text().is_empty());
    }

    #[test]
    fn test_api_error_body_parsing() {
        let raw = r#"{"error": {"code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        let parsed: ApiErrorBody = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.message, "Resource exhausted");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let config = GeminiConfig {
            api_key: String::new(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(config);
        let err = client.chat("hola").await.unwrap_err();
        assert!(matches!(err, RemoteServiceError::MissingApiKey));
    }
}
