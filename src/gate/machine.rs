//! Pure consent state machine
//!
//! The sequencing rules of the pipeline (validate, extract and scan, pause
//! for consent, analyze) live here as a total transition function with no
//! I/O, so they are testable without a network or real documents. The
//! machine is generic over the pending-document handle `D`: the single flow
//! uses one document, the comparison flow a pair.
//!
//! The gating invariant: `StartAnalysis` is only ever emitted from a clean
//! scan, or from `AwaitingConsent` on an explicit `ConsentGranted`. There is
//! no other path to the remote analyzer.

use crate::scanner::ScanResult;

/// Where a workflow attempt currently stands
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState<D> {
    Idle,
    Validating { pending: D },
    ExtractingAndScanning { pending: D },
    /// Sensitive data found; the pipeline is suspended until the user
    /// decides. Holds what the consent prompt needs to show.
    AwaitingConsent { pending: D, scan: ScanResult },
    /// Clean scan; analysis starts without a consent step
    ReadyToAnalyze { pending: D },
    Analyzing { pending: D },
    Completed,
    /// Terminal for this attempt; only `Reset` leaves it
    Failed { reason: String },
}

impl<D> WorkflowState<D> {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::Validating { .. } => "Validating",
            WorkflowState::ExtractingAndScanning { .. } => "ExtractingAndScanning",
            WorkflowState::AwaitingConsent { .. } => "AwaitingConsent",
            WorkflowState::ReadyToAnalyze { .. } => "ReadyToAnalyze",
            WorkflowState::Analyzing { .. } => "Analyzing",
            WorkflowState::Completed => "Completed",
            WorkflowState::Failed { .. } => "Failed",
        }
    }
}

/// Everything that can happen to a workflow: user actions and completions
/// of asynchronous steps
#[derive(Debug, Clone)]
pub enum WorkflowEvent<D> {
    Submit { document: D },
    ValidationPassed,
    /// The validator classified the document as not a contract; a normal
    /// negative outcome, surfaced verbatim
    ValidationRejected { message: String },
    ValidationErrored { message: String },
    ScanCompleted { scan: ScanResult },
    ExtractionFailed { message: String },
    ConsentGranted,
    ConsentWithdrawn,
    AnalysisStarted,
    AnalysisSucceeded,
    AnalysisFailed { message: String },
    Reset,
}

impl<D> WorkflowEvent<D> {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::Submit { .. } => "Submit",
            WorkflowEvent::ValidationPassed => "ValidationPassed",
            WorkflowEvent::ValidationRejected { .. } => "ValidationRejected",
            WorkflowEvent::ValidationErrored { .. } => "ValidationErrored",
            WorkflowEvent::ScanCompleted { .. } => "ScanCompleted",
            WorkflowEvent::ExtractionFailed { .. } => "ExtractionFailed",
            WorkflowEvent::ConsentGranted => "ConsentGranted",
            WorkflowEvent::ConsentWithdrawn => "ConsentWithdrawn",
            WorkflowEvent::AnalysisStarted => "AnalysisStarted",
            WorkflowEvent::AnalysisSucceeded => "AnalysisSucceeded",
            WorkflowEvent::AnalysisFailed { .. } => "AnalysisFailed",
            WorkflowEvent::Reset => "Reset",
        }
    }
}

/// Side effect the driver must execute after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<D> {
    StartValidation(D),
    StartExtractionAndScan(D),
    StartAnalysis(D),
    /// Drop pending documents, extracted text and scan results
    DiscardPending,
}

/// Pure transition function. Events that do not apply to the current state
/// are ignored with a warning; this is how stale async completions after a
/// cancel or reset get discarded.
pub fn transition<D: Clone>(
    state: WorkflowState<D>,
    event: WorkflowEvent<D>,
) -> (WorkflowState<D>, Option<Effect<D>>) {
    match (state, event) {
        (WorkflowState::Idle, WorkflowEvent::Submit { document }) => (
            WorkflowState::Validating {
                pending: document.clone(),
            },
            Some(Effect::StartValidation(document)),
        ),

        (WorkflowState::Validating { pending }, WorkflowEvent::ValidationPassed) => (
            WorkflowState::ExtractingAndScanning {
                pending: pending.clone(),
            },
            Some(Effect::StartExtractionAndScan(pending)),
        ),
        (WorkflowState::Validating { .. }, WorkflowEvent::ValidationRejected { message })
        | (WorkflowState::Validating { .. }, WorkflowEvent::ValidationErrored { message }) => {
            (WorkflowState::Failed { reason: message }, None)
        }

        (WorkflowState::ExtractingAndScanning { pending }, WorkflowEvent::ScanCompleted { scan }) => {
            if scan.has_sensitive_data {
                (WorkflowState::AwaitingConsent { pending, scan }, None)
            } else {
                (
                    WorkflowState::ReadyToAnalyze {
                        pending: pending.clone(),
                    },
                    Some(Effect::StartAnalysis(pending)),
                )
            }
        }
        (
            WorkflowState::ExtractingAndScanning { .. },
            WorkflowEvent::ExtractionFailed { message },
        ) => (WorkflowState::Failed { reason: message }, None),

        // The scan result is dropped here: consent has been recorded and the
        // findings are no longer needed
        (WorkflowState::AwaitingConsent { pending, .. }, WorkflowEvent::ConsentGranted) => (
            WorkflowState::Analyzing {
                pending: pending.clone(),
            },
            Some(Effect::StartAnalysis(pending)),
        ),
        (WorkflowState::AwaitingConsent { .. }, WorkflowEvent::ConsentWithdrawn) => {
            (WorkflowState::Idle, Some(Effect::DiscardPending))
        }

        (WorkflowState::ReadyToAnalyze { pending }, WorkflowEvent::AnalysisStarted) => {
            (WorkflowState::Analyzing { pending }, None)
        }
        // Consent path enters Analyzing directly; the start marker is a no-op
        (WorkflowState::Analyzing { pending }, WorkflowEvent::AnalysisStarted) => {
            (WorkflowState::Analyzing { pending }, None)
        }
        (WorkflowState::Analyzing { .. }, WorkflowEvent::AnalysisSucceeded) => {
            (WorkflowState::Completed, None)
        }
        (WorkflowState::Analyzing { .. }, WorkflowEvent::AnalysisFailed { message }) => {
            (WorkflowState::Failed { reason: message }, None)
        }

        (_, WorkflowEvent::Reset) => (WorkflowState::Idle, Some(Effect::DiscardPending)),

        (state, event) => {
            tracing::warn!(
                "[Workflow] Ignoring {} in state {}",
                event.name(),
                state.name()
            );
            (state, None)
        }
    }
}

/// Holds the current state and applies events through [`transition`]
pub struct ConsentMachine<D: Clone> {
    state: WorkflowState<D>,
}

impl<D: Clone> ConsentMachine<D> {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Idle,
        }
    }

    pub fn state(&self) -> &WorkflowState<D> {
        &self.state
    }

    /// Apply one event; returns the effect the driver must execute, if any
    pub fn apply(&mut self, event: WorkflowEvent<D>) -> Option<Effect<D>> {
        let from = self.state.name();
        let current = std::mem::replace(&mut self.state, WorkflowState::Idle);
        let (next, effect) = transition(current, event);
        if next.name() != from {
            tracing::debug!("[Workflow] {} -> {}", from, next.name());
        }
        self.state = next;
        effect
    }
}

impl<D: Clone> Default for ConsentMachine<D> {
    fn default() -> Self {
        Self::new()
    }
}
