use super::context::PipelineContext;
use super::phase_trait::TargetPhase;
use super::phases::{install_phases, teardown_phases};
use super::report::{RunAction, RunReport, TargetOutcome, TargetStatus};
use super::state::TargetState;
use crate::error::Severity;
use crate::progress::{LoggingHandler, ProgressEvent, ProgressHandler};
use crate::selection::Target;
use crate::util::logging::log_ignorable;
use futures_util::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{debug, info};

/// Upper bound on concurrently processed targets when none is configured
pub const DEFAULT_MAX_JOBS: usize = 4;

pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(DEFAULT_MAX_JOBS)
}

/// Runs every target through a fixed phase list. Targets are independent:
/// an ignorable failure ends only that target, a fatal one is recorded and
/// fails the run once every target has finished.
pub struct PipelineOrchestrator {
    progress_handler: Option<LoggingHandler>,
    jobs: usize,
}

impl PipelineOrchestrator {
    pub fn new(progress_handler: Option<LoggingHandler>) -> Self {
        Self {
            progress_handler,
            jobs: default_jobs(),
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Shim, validate, clean, stage, and install for each target
    pub async fn install(&self, context: &PipelineContext, targets: Vec<Target>) -> RunReport {
        self.execute(RunAction::Package, context, targets, install_phases())
            .await
    }

    /// Remove generated artifacts for each target
    pub async fn teardown(&self, context: &PipelineContext, targets: Vec<Target>) -> RunReport {
        self.execute(RunAction::Clean, context, targets, teardown_phases())
            .await
    }

    async fn execute(
        &self,
        action: RunAction,
        context: &PipelineContext,
        targets: Vec<Target>,
        phases: Vec<Box<dyn TargetPhase>>,
    ) -> RunReport {
        let start = Instant::now();
        info!(
            action = %action,
            targets = targets.len(),
            jobs = self.jobs,
            "Starting pipeline in {}",
            context.service_dir.display()
        );
        self.emit(ProgressEvent::RunStarted {
            action: action.to_string(),
            targets: targets.len(),
        });

        let phases = &phases;
        let outcomes: Vec<TargetOutcome> = stream::iter(targets)
            .map(|target| self.run_target(context, target, phases))
            .buffered(self.jobs)
            .collect()
            .await;

        let report = RunReport {
            action,
            targets: outcomes,
        };
        self.emit(ProgressEvent::RunComplete {
            completed: report.completed(),
            skipped: report.skipped(),
            failed: report.failed(),
            total_time: start.elapsed(),
        });
        report
    }

    async fn run_target(
        &self,
        context: &PipelineContext,
        target: Target,
        phases: &[Box<dyn TargetPhase>],
    ) -> TargetOutcome {
        let start = Instant::now();
        let layout = target.layout(&context.options);
        let mut state = TargetState::new(target, layout);
        let function = state.name().to_string();

        self.emit(ProgressEvent::TargetStarted {
            function: function.clone(),
        });

        for phase in phases {
            let phase_start = Instant::now();
            debug!(function = %function, "Phase: {}", phase.name());

            if let Err(error) = phase.execute(context, &mut state).await {
                let status = match error.severity() {
                    Severity::Ignorable => {
                        log_ignorable(&error);
                        self.emit(ProgressEvent::TargetSkipped {
                            function: function.clone(),
                            reason: error.to_string(),
                        });
                        TargetStatus::Skipped {
                            reason: error.to_string(),
                        }
                    }
                    Severity::Fatal => {
                        self.emit(ProgressEvent::TargetFailed {
                            function: function.clone(),
                            error: error.to_string(),
                        });
                        TargetStatus::Failed {
                            error: error.to_string(),
                        }
                    }
                };
                return TargetOutcome {
                    function,
                    stage: state.stage,
                    status,
                };
            }

            state.stage = phase.reaches();
            self.emit(ProgressEvent::StageComplete {
                function: function.clone(),
                stage: state.stage.to_string(),
                duration: phase_start.elapsed(),
            });
        }

        self.emit(ProgressEvent::TargetComplete {
            function: function.clone(),
            total_time: start.elapsed(),
        });
        TargetOutcome {
            function,
            stage: state.stage,
            status: TargetStatus::Completed,
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }
}
