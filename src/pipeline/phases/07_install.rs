use crate::error::{PackError, PackResult};
use crate::installer;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::TargetPhase;
use crate::pipeline::state::{TargetStage, TargetState};
use async_trait::async_trait;

pub struct InstallPhase;

#[async_trait]
impl TargetPhase for InstallPhase {
    fn name(&self) -> &'static str {
        "InstallPhase"
    }

    fn reaches(&self) -> TargetStage {
        TargetStage::Installed
    }

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()> {
        let command = state.install_command.as_ref().ok_or_else(|| {
            PackError::io(
                format!("Install for `{}`", state.name()),
                anyhow::anyhow!("no installer command was planned"),
            )
        })?;

        installer::run(
            context.runner.as_ref(),
            &context.service_dir,
            state.name(),
            command,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectiveOptions;
    use crate::pipeline::phases::preinstall::PreinstallPhase;
    use crate::runner::CommandOutput;
    use crate::selection::Target;

    #[tokio::test]
    async fn test_runs_planned_command() {
        let (context, _, runner) = PipelineContext::with_mocks(EffectiveOptions::default());
        let target = Target::hello("python3.8");
        let mut state = TargetState::new(target.clone(), target.layout(&context.options));
        PreinstallPhase.execute(&context, &mut state).await.unwrap();

        InstallPhase.execute(&context, &mut state).await.unwrap();

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].cwd, std::path::PathBuf::from("/mock"));
    }

    #[tokio::test]
    async fn test_failed_install_is_fatal() {
        let (context, _, runner) = PipelineContext::with_mocks(EffectiveOptions::default());
        runner.respond("python3.8", None, CommandOutput::with_stderr("Could not find a version"));
        let target = Target::hello("python3.8");
        let mut state = TargetState::new(target.clone(), target.layout(&context.options));
        PreinstallPhase.execute(&context, &mut state).await.unwrap();

        let err = InstallPhase.execute(&context, &mut state).await.unwrap_err();
        assert!(!err.is_ignorable());
    }

    #[tokio::test]
    async fn test_unplanned_install_is_fatal() {
        let (context, _, _) = PipelineContext::with_mocks(EffectiveOptions::default());
        let target = Target::hello("python3.8");
        let mut state = TargetState::new(target.clone(), target.layout(&context.options));

        assert!(InstallPhase.execute(&context, &mut state).await.is_err());
    }
}
