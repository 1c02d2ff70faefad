//! Runtime configuration for the Gemini-backed analysis service
//!
//! Per-operation model tuning mirrors what each operation needs: validation
//! runs cold (temperature 0.1) and strict-JSON, chat runs warmer and free-form.
//! The API key is read from the environment (`GEMINI_API_KEY`), optionally via
//! a `.env` file.

/// Generation tuning for a single `generateContent` operation
#[derive(Debug, Clone)]
pub struct OperationSettings {
    /// Model ID, e.g. "gemini-3-flash-preview"
    pub model: String,
    pub temperature: f32,
    /// Token cap for the reply; `None` leaves the service default
    pub max_output_tokens: Option<u32>,
    /// Ask the service for `application/json` replies
    pub json_response: bool,
}

impl OperationSettings {
    fn new(model: &str, temperature: f32, max_output_tokens: Option<u32>, json_response: bool) -> Self {
        Self {
            model: model.to_string(),
            temperature,
            max_output_tokens,
            json_response,
        }
    }
}

/// Configuration for the remote analysis client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key (from GEMINI_API_KEY env var)
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Is-this-a-contract pre-check
    pub validate: OperationSettings,
    /// Clause-by-clause analysis of one contract
    pub analyze: OperationSettings,
    /// Side-by-side comparison of two contracts
    pub compare: OperationSettings,
    /// Follow-up questions about one analyzed contract
    pub chat: OperationSettings,
    /// Follow-up questions about a comparison
    pub comparison_chat: OperationSettings,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            // Validation needs determinism more than creativity; the token
            // limit prevents truncated JSON on verbose classifier replies
            validate: OperationSettings::new("gemini-3-pro-preview", 0.1, Some(8192), true),
            analyze: OperationSettings::new("gemini-3-flash-preview", 0.2, None, true),
            compare: OperationSettings::new("gemini-2.0-flash", 0.2, Some(8192), true),
            chat: OperationSettings::new("gemini-3-pro-preview", 0.4, Some(8192), false),
            comparison_chat: OperationSettings::new("gemini-3-flash-preview", 0.4, Some(1024), false),
        }
    }
}

impl GeminiConfig {
    /// Load configuration after sourcing a `.env` file if one exists
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::default()
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_operation_tuning() {
        let config = GeminiConfig::default();
        assert_eq!(config.validate.model, "gemini-3-pro-preview");
        assert_eq!(config.validate.temperature, 0.1);
        assert_eq!(config.validate.max_output_tokens, Some(8192));
        assert!(config.validate.json_response);

        assert_eq!(config.analyze.model, "gemini-3-flash-preview");
        assert_eq!(config.analyze.max_output_tokens, None);

        assert_eq!(config.compare.model, "gemini-2.0-flash");

        assert!(!config.chat.json_response);
        assert_eq!(config.comparison_chat.max_output_tokens, Some(1024));
    }

    #[test]
    fn test_default_base_url() {
        let config = GeminiConfig::default();
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
    }
}
