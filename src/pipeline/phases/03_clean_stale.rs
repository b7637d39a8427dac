use crate::cleaner::{self, RemovalPolicy};
use crate::error::PackResult;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::TargetPhase;
use crate::pipeline::state::{TargetStage, TargetState};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Removes a library directory left over from an earlier run. Every stale
/// path that exists must go; a leftover that cannot be removed fails the
/// target.
pub struct CleanStalePhase;

#[async_trait]
impl TargetPhase for CleanStalePhase {
    fn name(&self) -> &'static str {
        "CleanStalePhase"
    }

    fn reaches(&self) -> TargetStage {
        TargetStage::StaleCleaned
    }

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()> {
        let fs = context.file_system.as_ref();
        let stale: Vec<PathBuf> = [context.path(&state.layout.lib_dir)]
            .into_iter()
            .filter(|p| fs.exists(p))
            .collect();

        if stale.is_empty() {
            debug!(function = state.name(), "No stale artifacts");
            return Ok(());
        }

        cleaner::remove(fs, &stale, RemovalPolicy::Hard)?;
        Ok(())
    }
}
