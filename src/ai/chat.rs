//! Follow-up chat sessions
//!
//! A session holds the extracted contract text, the prior analysis and the
//! conversation so far. Questions are answered by the remote service
//! grounded in that context; a failed call records nothing, so the history
//! never contains a question without its answer. Failures surface as the
//! generic per-operation retry message, the underlying error is only logged.

use crate::ai::client::{GeminiClient, CHAT_RETRY_MESSAGE, COMPARE_CHAT_RETRY_MESSAGE};
use crate::ai::prompts::{build_chat_prompt, build_comparison_chat_prompt};
use crate::types::{AnalysisResult, ChatMessage, ComparisonResult};

/// Conversation about one analyzed contract
pub struct ChatSession {
    contract_text: String,
    analysis: AnalysisResult,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(contract_text: impl Into<String>, analysis: AnalysisResult) -> Self {
        Self {
            contract_text: contract_text.into(),
            analysis,
            messages: Vec::new(),
        }
    }

    /// Ask a follow-up question. On success the question and the reply are
    /// appended to the history and the reply is returned; on failure the
    /// error is the user-facing retry message.
    pub async fn ask(&mut self, client: &GeminiClient, question: &str) -> Result<String, String> {
        let prompt = build_chat_prompt(question, &self.contract_text, &self.analysis, &self.messages);
        let reply = match client.chat(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("[Chat] Remote call failed: {e}");
                return Err(CHAT_RETRY_MESSAGE.to_string());
            }
        };

        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// Conversation about a comparison of two contracts
pub struct ComparisonChatSession {
    contract1_text: String,
    contract2_text: String,
    comparison: ComparisonResult,
    messages: Vec<ChatMessage>,
}

impl ComparisonChatSession {
    pub fn new(
        contract1_text: impl Into<String>,
        contract2_text: impl Into<String>,
        comparison: ComparisonResult,
    ) -> Self {
        Self {
            contract1_text: contract1_text.into(),
            contract2_text: contract2_text.into(),
            comparison,
            messages: Vec::new(),
        }
    }

    pub async fn ask(&mut self, client: &GeminiClient, question: &str) -> Result<String, String> {
        let prompt = build_comparison_chat_prompt(
            question,
            &self.contract1_text,
            &self.contract2_text,
            &self.comparison,
            &self.messages,
        );
        let reply = match client.comparison_chat(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("[Chat] Remote call failed: {e}");
                return Err(COMPARE_CHAT_RETRY_MESSAGE.to_string());
            }
        };

        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}
