//! Per-target packaging pipeline

pub mod context;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;
pub mod report;
pub mod state;

pub use context::PipelineContext;
pub use orchestrator::PipelineOrchestrator;
pub use phase_trait::TargetPhase;
pub use report::{RunAction, RunReport, TargetOutcome, TargetStatus};
pub use state::{TargetStage, TargetState};
