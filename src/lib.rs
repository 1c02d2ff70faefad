//! Contract intake pipeline: validate a PDF, scan its text locally for
//! sensitive personal data, gate the remote call on explicit consent, and
//! only then send the document to Gemini for clause analysis.

pub mod ai;
pub mod config;
pub mod document;
pub mod extract;
pub mod gate;
pub mod scanner;
pub mod types;

pub use ai::{AnalysisService, ChatSession, ComparisonChatSession, GeminiClient, RemoteServiceError};
pub use config::GeminiConfig;
pub use document::{DocumentError, PdfDocument};
pub use extract::{DocumentFormatError, PdfTextExtractor, TextExtractor};
pub use gate::{AnalysisWorkflow, ComparisonWorkflow, WorkflowState};
pub use scanner::{scan_sensitive_data, ScanResult, SensitiveMatch};
pub use types::{AnalysisResult, ComparisonResult, ValidationResult};

use tracing_subscriber::EnvFilter;

/// Load environment and install the global tracing subscriber.
///
/// Call once at startup. Reads `.env` from the working directory (falling
/// back to the parent directory), then honors `RUST_LOG`; the default keeps
/// dependencies at `warn` with our own spans at `info`.
pub fn init_tracing() {
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,clausecheck=info")),
        )
        .init();
}
