//! JSON extraction from model replies
//!
//! Even with a JSON response MIME type requested, the model occasionally
//! wraps its reply in markdown fences or leading prose. One extractor
//! handles all the operations instead of per-call cleanup.

/// Extract a JSON object from a reply that may contain markdown or other
/// text.
///
/// Handles:
/// - ```json code blocks
/// - Plain ``` code blocks
/// - Raw JSON objects (first `{` to last `}`)
pub(crate) fn extract_json_object(text: &str) -> Result<String, String> {
    // Try to find JSON in ```json blocks
    if let Some(start) = text.find("```json") {
        let json_start = start + 7;
        if let Some(end) = text[json_start..].find("```") {
            return Ok(text[json_start..json_start + end].trim().to_string());
        }
    }

    // Try plain code blocks
    if let Some(start) = text.find("```") {
        let block_start = start + 3;
        let content_start = text[block_start..]
            .find('\n')
            .map(|i| block_start + i + 1)
            .unwrap_or(block_start);
        if let Some(end) = text[content_start..].find("```") {
            return Ok(text[content_start..content_start + end].trim().to_string());
        }
    }

    // Try to find raw JSON object
    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if end > start {
                return Ok(text[start..=end].to_string());
            }
        }
    }

    Err("No JSON object found in response".to_string())
}
