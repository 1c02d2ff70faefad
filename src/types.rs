//! Shared types for the contract analysis pipeline
//!
//! These mirror the JSON contract of the remote analysis service, so every
//! struct serializes with camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Risk level assigned to a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Safe,
    Warning,
    Harmful,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "safe",
            Severity::Warning => "warning",
            Severity::Harmful => "harmful",
        }
    }
}

/// Overall verdict for a contract: harmful if any clause is harmful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Harmful,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Harmful => "harmful",
        }
    }
}

/// A single contract clause as identified by the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    /// Sequential clause number
    pub number: u32,
    /// Short descriptive title
    pub title: String,
    /// Plain-language summary of what the clause means for the signer
    pub summary: String,
    pub severity: Severity,
    /// Why this severity was assigned
    pub explanation: String,
    /// Literal fragments (5-15 words) copied from the contract, used to
    /// locate the clause in the source document
    pub text_snippets: Vec<String>,
}

/// Full clause-by-clause analysis of one contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub clauses: Vec<Clause>,
    pub verdict: Verdict,
    pub verdict_summary: String,
}

/// Outcome of the is-this-a-contract pre-check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_contract: bool,
    /// Classifier confidence in 0.0..=1.0
    pub confidence: f32,
    /// What the document appears to be ("factura", "currículum", ...)
    pub document_type: String,
    pub reason: String,
}

/// Which contract a comparison favors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Contract1,
    Contract2,
    Similar,
}

/// Which side of a single compared aspect is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoredContract {
    Contract1,
    Contract2,
    Equal,
}

/// One aspect where the two contracts differ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonDifference {
    /// What is being compared ("duración", "penalizaciones", ...)
    pub aspect: String,
    /// How contract 1 handles it
    pub contract1: String,
    /// How contract 2 handles it
    pub contract2: String,
    pub favored_contract: FavoredContract,
}

/// Side-by-side analysis of two contracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub contract1_analysis: AnalysisResult,
    pub contract2_analysis: AnalysisResult,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
    pub key_differences: Vec<ComparisonDifference>,
    pub overall_summary: String,
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// Message in a follow-up conversation about an analyzed contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_serializes_camel_case() {
        let clause = Clause {
            number: 3,
            title: "Permanencia".to_string(),
            summary: "Obliga a 24 meses de permanencia".to_string(),
            severity: Severity::Harmful,
            explanation: "Penalización desproporcionada por baja anticipada".to_string(),
            text_snippets: vec!["permanencia mínima de veinticuatro meses".to_string()],
        };

        let json = serde_json::to_value(&clause).unwrap();
        assert_eq!(json["severity"], "harmful");
        assert!(json.get("textSnippets").is_some());
        assert!(json.get("text_snippets").is_none());
    }

    #[test]
    fn test_validation_result_round_trip() {
        let raw = r#"{"isContract":false,"confidence":0.92,"documentType":"factura","reason":"Es un documento de facturación"}"#;
        let parsed: ValidationResult = serde_json::from_str(raw).unwrap();
        assert!(!parsed.is_contract);
        assert_eq!(parsed.document_type, "factura");
    }

    #[test]
    fn test_recommendation_wire_values() {
        assert_eq!(
            serde_json::to_string(&Recommendation::Contract1).unwrap(),
            "\"contract1\""
        );
        assert_eq!(
            serde_json::to_string(&Recommendation::Similar).unwrap(),
            "\"similar\""
        );
        assert_eq!(
            serde_json::to_string(&FavoredContract::Equal).unwrap(),
            "\"equal\""
        );
    }

    #[test]
    fn test_comparison_result_field_names() {
        let raw = r#"{
            "contract1Analysis": {"clauses": [], "verdict": "safe", "verdictSummary": "ok"},
            "contract2Analysis": {"clauses": [], "verdict": "harmful", "verdictSummary": "mal"},
            "recommendation": "contract1",
            "recommendationReason": "Menos cláusulas abusivas",
            "keyDifferences": [
                {"aspect": "duración", "contract1": "12 meses", "contract2": "24 meses", "favoredContract": "contract1"}
            ],
            "overallSummary": "El primero es más equilibrado"
        }"#;
        let parsed: ComparisonResult = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.recommendation, Recommendation::Contract1);
        assert_eq!(parsed.key_differences.len(), 1);
        assert_eq!(
            parsed.key_differences[0].favored_contract,
            FavoredContract::Contract1
        );
        assert_eq!(parsed.contract2_analysis.verdict, Verdict::Harmful);
    }

    #[test]
    fn test_severity_and_verdict_tags_match_wire_values() {
        assert_eq!(Severity::Warning.as_str(), "warning");
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"warning\""
        );
        assert_eq!(Verdict::Harmful.as_str(), "harmful");
        assert_eq!(
            serde_json::to_string(&Verdict::Harmful).unwrap(),
            "\"harmful\""
        );
    }

    #[test]
    fn test_chat_message_constructors() {
        let msg = ChatMessage::user("¿Qué significa la cláusula 3?");
        assert_eq!(msg.role, ChatRole::User);
        assert_eq!(msg.role.as_str(), "user");
        assert!(!msg.content.is_empty());
    }
}
