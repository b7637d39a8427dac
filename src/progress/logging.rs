//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, error, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { action, targets } => {
                info!(action = %action, targets, "Starting run");
            }
            ProgressEvent::TargetStarted { function } => {
                info!(function = %function, "Processing function");
            }
            ProgressEvent::StageComplete {
                function,
                stage,
                duration,
            } => {
                debug!(
                    function = %function,
                    stage = %stage,
                    duration_ms = duration.as_millis(),
                    "Stage complete"
                );
            }
            ProgressEvent::TargetSkipped { function, reason } => {
                warn!(function = %function, "Skipped: {}", reason);
            }
            ProgressEvent::TargetFailed { function, error } => {
                error!(function = %function, "Failed: {}", error);
            }
            ProgressEvent::TargetComplete {
                function,
                total_time,
            } => {
                info!(
                    function = %function,
                    total_time_ms = total_time.as_millis(),
                    "Function complete"
                );
            }
            ProgressEvent::RunComplete {
                completed,
                skipped,
                failed,
                total_time,
            } => {
                if *failed > 0 {
                    warn!(
                        completed,
                        skipped,
                        failed,
                        total_time_ms = total_time.as_millis(),
                        "Run finished with failures"
                    );
                } else {
                    info!(
                        completed,
                        skipped,
                        total_time_ms = total_time.as_millis(),
                        "Run complete"
                    );
                }
            }
        }
    }
}
