//! Effect-execution drivers for the consent machine
//!
//! Two drivers, mirroring the two user-facing flows: one document analyzed
//! on its own, or two documents compared side by side. Both own their state
//! machine exclusively (`&mut self` everywhere), so there is no locking;
//! all sequencing rules live in [`super::machine`].
//!
//! Every error is converted to a terminal `Failed` state carrying a display
//! string; nothing propagates past this boundary and nothing is retried. A
//! new attempt starts from `Idle` via `reset`.

use crate::ai::client::{
    AnalysisService, ANALYZE_RETRY_MESSAGE, COMPARE_RETRY_MESSAGE, VALIDATE_RETRY_MESSAGE,
};
use crate::document::PdfDocument;
use crate::extract::TextExtractor;
use crate::gate::machine::{ConsentMachine, Effect, WorkflowEvent, WorkflowState};
use crate::scanner::{merge_labeled, scan_sensitive_data, ScanResult};
use crate::types::{AnalysisResult, ComparisonResult, ValidationResult};
use std::sync::Arc;

/// Single-document flow: validate, extract and scan, gate on consent,
/// analyze.
pub struct AnalysisWorkflow<S: AnalysisService, X: TextExtractor> {
    service: S,
    extractor: X,
    machine: ConsentMachine<Arc<PdfDocument>>,
    extracted_text: Option<String>,
    scan: Option<ScanResult>,
    analysis: Option<AnalysisResult>,
}

impl<S: AnalysisService, X: TextExtractor> AnalysisWorkflow<S, X> {
    pub fn new(service: S, extractor: X) -> Self {
        Self {
            service,
            extractor,
            machine: ConsentMachine::new(),
            extracted_text: None,
            scan: None,
            analysis: None,
        }
    }

    /// Submit a document and drive the pipeline as far as it can go without
    /// user input: to `AwaitingConsent`, `Completed` or `Failed`.
    pub async fn submit(&mut self, document: PdfDocument) {
        tracing::info!("[Workflow] Submitted {}", document.file_name());
        let effect = self.machine.apply(WorkflowEvent::Submit {
            document: Arc::new(document),
        });
        self.run_effects(effect).await;
    }

    /// Explicit user approval at `AwaitingConsent`; proceeds to analysis.
    pub async fn confirm(&mut self) {
        let effect = self.machine.apply(WorkflowEvent::ConsentGranted);
        self.run_effects(effect).await;
    }

    /// User declined at `AwaitingConsent`; back to `Idle`, pending state
    /// discarded.
    pub async fn cancel(&mut self) {
        let effect = self.machine.apply(WorkflowEvent::ConsentWithdrawn);
        self.run_effects(effect).await;
    }

    /// Abandon the current attempt from any state.
    pub async fn reset(&mut self) {
        let effect = self.machine.apply(WorkflowEvent::Reset);
        self.run_effects(effect).await;
    }

    pub fn state(&self) -> &WorkflowState<Arc<PdfDocument>> {
        self.machine.state()
    }

    pub fn scan_result(&self) -> Option<&ScanResult> {
        self.scan.as_ref()
    }

    /// Extracted text is kept after analysis so follow-up chat can ground
    /// itself in the contract.
    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    async fn run_effects(&mut self, mut effect: Option<Effect<Arc<PdfDocument>>>) {
        while let Some(current) = effect.take() {
            let event = match current {
                Effect::StartValidation(document) => {
                    Some(match self.service.validate(&document).await {
                        Ok(validation) if validation.is_contract => {
                            WorkflowEvent::ValidationPassed
                        }
                        Ok(validation) => WorkflowEvent::ValidationRejected {
                            message: rejection_message(&validation),
                        },
                        Err(e) => {
                            tracing::warn!("[Workflow] Validation call failed: {e}");
                            WorkflowEvent::ValidationErrored {
                                message: VALIDATE_RETRY_MESSAGE.to_string(),
                            }
                        }
                    })
                }
                Effect::StartExtractionAndScan(document) => {
                    Some(match self.extractor.extract_text(&document).await {
                        Ok(text) => {
                            let scan = scan_sensitive_data(&text);
                            self.extracted_text = Some(text);
                            self.scan = Some(scan.clone());
                            WorkflowEvent::ScanCompleted { scan }
                        }
                        Err(e) => WorkflowEvent::ExtractionFailed {
                            message: e.to_string(),
                        },
                    })
                }
                Effect::StartAnalysis(document) => {
                    self.machine.apply(WorkflowEvent::AnalysisStarted);
                    Some(match self.service.analyze(&document).await {
                        Ok(result) => {
                            tracing::info!(
                                "[Workflow] Analysis done: verdict {}, {} clause(s)",
                                result.verdict.as_str(),
                                result.clauses.len()
                            );
                            self.analysis = Some(result);
                            WorkflowEvent::AnalysisSucceeded
                        }
                        Err(e) => {
                            tracing::warn!("[Workflow] Analysis call failed: {e}");
                            WorkflowEvent::AnalysisFailed {
                                message: ANALYZE_RETRY_MESSAGE.to_string(),
                            }
                        }
                    })
                }
                Effect::DiscardPending => {
                    self.extracted_text = None;
                    self.scan = None;
                    self.analysis = None;
                    None
                }
            };

            if let Some(event) = event {
                effect = self.machine.apply(event);
            }
        }
    }
}

fn rejection_message(validation: &ValidationResult) -> String {
    format!(
        "El documento no es un contrato. Tipo detectado: {}. {}",
        validation.document_type, validation.reason
    )
}

/// The two documents of a comparison, handled as one pending unit
#[derive(Debug, Clone)]
pub struct DocumentPair {
    pub first: Arc<PdfDocument>,
    pub second: Arc<PdfDocument>,
}

/// Dual-document flow: both validations run concurrently, both
/// extraction+scan sequences run concurrently, and one combined consent
/// decision covers both documents before a single compare call.
pub struct ComparisonWorkflow<S: AnalysisService, X: TextExtractor> {
    service: S,
    extractor: X,
    machine: ConsentMachine<DocumentPair>,
    extracted_text1: Option<String>,
    extracted_text2: Option<String>,
    scan: Option<ScanResult>,
    comparison: Option<ComparisonResult>,
}

impl<S: AnalysisService, X: TextExtractor> ComparisonWorkflow<S, X> {
    pub fn new(service: S, extractor: X) -> Self {
        Self {
            service,
            extractor,
            machine: ConsentMachine::new(),
            extracted_text1: None,
            extracted_text2: None,
            scan: None,
            comparison: None,
        }
    }

    pub async fn submit(&mut self, first: PdfDocument, second: PdfDocument) {
        tracing::info!(
            "[Workflow] Submitted pair: {} / {}",
            first.file_name(),
            second.file_name()
        );
        let effect = self.machine.apply(WorkflowEvent::Submit {
            document: DocumentPair {
                first: Arc::new(first),
                second: Arc::new(second),
            },
        });
        self.run_effects(effect).await;
    }

    pub async fn confirm(&mut self) {
        let effect = self.machine.apply(WorkflowEvent::ConsentGranted);
        self.run_effects(effect).await;
    }

    pub async fn cancel(&mut self) {
        let effect = self.machine.apply(WorkflowEvent::ConsentWithdrawn);
        self.run_effects(effect).await;
    }

    pub async fn reset(&mut self) {
        let effect = self.machine.apply(WorkflowEvent::Reset);
        self.run_effects(effect).await;
    }

    pub fn state(&self) -> &WorkflowState<DocumentPair> {
        self.machine.state()
    }

    /// Combined scan over both documents, with per-contract labels in the
    /// summary.
    pub fn scan_result(&self) -> Option<&ScanResult> {
        self.scan.as_ref()
    }

    pub fn extracted_texts(&self) -> (Option<&str>, Option<&str>) {
        (self.extracted_text1.as_deref(), self.extracted_text2.as_deref())
    }

    pub fn comparison(&self) -> Option<&ComparisonResult> {
        self.comparison.as_ref()
    }

    async fn run_effects(&mut self, mut effect: Option<Effect<DocumentPair>>) {
        while let Some(current) = effect.take() {
            let event = match current {
                Effect::StartValidation(pair) => {
                    let outcome = tokio::try_join!(
                        self.service.validate(&pair.first),
                        self.service.validate(&pair.second),
                    );
                    Some(match outcome {
                        Ok((v1, v2)) => pair_validation_event(&v1, &v2),
                        Err(e) => {
                            tracing::warn!("[Workflow] Pair validation failed: {e}");
                            WorkflowEvent::ValidationErrored {
                                message: "Error al verificar los documentos".to_string(),
                            }
                        }
                    })
                }
                Effect::StartExtractionAndScan(pair) => {
                    let outcome = tokio::try_join!(
                        self.extractor.extract_text(&pair.first),
                        self.extractor.extract_text(&pair.second),
                    );
                    Some(match outcome {
                        Ok((text1, text2)) => {
                            let scan1 = scan_sensitive_data(&text1);
                            let scan2 = scan_sensitive_data(&text2);
                            let combined =
                                merge_labeled(&scan1, &scan2).unwrap_or_else(ScanResult::empty);
                            self.extracted_text1 = Some(text1);
                            self.extracted_text2 = Some(text2);
                            self.scan = Some(combined.clone());
                            WorkflowEvent::ScanCompleted { scan: combined }
                        }
                        Err(e) => WorkflowEvent::ExtractionFailed {
                            message: e.to_string(),
                        },
                    })
                }
                Effect::StartAnalysis(pair) => {
                    self.machine.apply(WorkflowEvent::AnalysisStarted);
                    Some(
                        match self.service.compare(&pair.first, &pair.second).await {
                            Ok(result) => {
                                self.comparison = Some(result);
                                WorkflowEvent::AnalysisSucceeded
                            }
                            Err(e) => {
                                tracing::warn!("[Workflow] Compare call failed: {e}");
                                WorkflowEvent::AnalysisFailed {
                                    message: COMPARE_RETRY_MESSAGE.to_string(),
                                }
                            }
                        },
                    )
                }
                Effect::DiscardPending => {
                    self.extracted_text1 = None;
                    self.extracted_text2 = None;
                    self.scan = None;
                    self.comparison = None;
                    None
                }
            };

            if let Some(event) = event {
                effect = self.machine.apply(event);
            }
        }
    }
}

/// Per-contract rejection messages, worded as the consent UI shows them
fn pair_validation_event<D>(v1: &ValidationResult, v2: &ValidationResult) -> WorkflowEvent<D> {
    if !v1.is_contract && !v2.is_contract {
        WorkflowEvent::ValidationRejected {
            message: format!(
                "Ninguno de los documentos es un contrato. Contrato 1: {}. Contrato 2: {}.",
                v1.document_type, v2.document_type
            ),
        }
    } else if !v1.is_contract {
        WorkflowEvent::ValidationRejected {
            message: format!(
                "El Contrato 1 no es un contrato. Tipo detectado: {}. {}",
                v1.document_type, v1.reason
            ),
        }
    } else if !v2.is_contract {
        WorkflowEvent::ValidationRejected {
            message: format!(
                "El Contrato 2 no es un contrato. Tipo detectado: {}. {}",
                v2.document_type, v2.reason
            ),
        }
    } else {
        WorkflowEvent::ValidationPassed
    }
}
