//! Remote analysis: Gemini client, prompts and chat sessions

pub mod chat;
pub mod client;
pub mod http_client;
pub mod prompts;
mod response;

pub use chat::{ChatSession, ComparisonChatSession};
pub use client::{AnalysisService, GeminiClient, RemoteServiceError};
