use crate::error::PackResult;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::TargetPhase;
use crate::pipeline::state::{TargetStage, TargetState};
use crate::shim;
use async_trait::async_trait;

pub struct WriteShimPhase;

#[async_trait]
impl TargetPhase for WriteShimPhase {
    fn name(&self) -> &'static str {
        "WriteShimPhase"
    }

    fn reaches(&self) -> TargetStage {
        TargetStage::ShimWritten
    }

    async fn execute(&self, context: &PipelineContext, state: &mut TargetState) -> PackResult<()> {
        let options = &context.options;
        shim::generate(
            context.file_system.as_ref(),
            &context.path(&state.layout.handler_dir),
            &options.shim_filename(),
            &options.lib_sub_dir,
            &state.target.real_handler,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectiveOptions;
    use crate::error::PackError;
    use crate::fs::FileSystem;
    use crate::selection::Target;

    #[tokio::test]
    async fn test_writes_shim_next_to_handler() {
        let (context, fs, _) = PipelineContext::with_mocks(EffectiveOptions::default());
        let target = Target::hello("python3.8");
        let mut state = TargetState::new(target.clone(), target.layout(&context.options));

        WriteShimPhase.execute(&context, &mut state).await.unwrap();

        let shim = fs.contents("hello/wrap.py").unwrap();
        assert!(shim.contains("from hello import handler as _real_handler"));
    }

    #[tokio::test]
    async fn test_invalid_real_handler_is_ignorable() {
        let (context, fs, _) = PipelineContext::with_mocks(EffectiveOptions::default());
        let mut target = Target::hello("python3.8");
        target.real_handler = "not a handler".to_string();
        let mut state = TargetState::new(target.clone(), target.layout(&context.options));

        let err = WriteShimPhase.execute(&context, &mut state).await.unwrap_err();
        assert!(matches!(err, PackError::InvalidHandler { .. }));
        assert!(!fs.exists(std::path::Path::new("hello/wrap.py")));
    }
}
