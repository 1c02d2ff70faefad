//! Consent gate: the state machine and its async drivers

pub mod machine;
pub mod workflow;


pub use machine::{ConsentMachine, Effect, WorkflowEvent, WorkflowState};
pub use workflow::{AnalysisWorkflow, ComparisonWorkflow, DocumentPair};
