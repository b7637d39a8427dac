//! Pipeline context for managing dependencies

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::EffectiveOptions;
use crate::fs::FileSystem;
use crate::runner::CommandRunner;

/// Context shared by every target of one run
pub struct PipelineContext {
    /// File system abstraction
    pub file_system: Arc<dyn FileSystem>,

    /// Launches the installer and the container runtime
    pub runner: Arc<dyn CommandRunner>,

    /// Options resolved for this invocation
    pub options: EffectiveOptions,

    /// Directory holding the service file; target paths are relative to it
    pub service_dir: PathBuf,
}

impl PipelineContext {
    pub fn new(
        file_system: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        options: EffectiveOptions,
        service_dir: PathBuf,
    ) -> Self {
        Self {
            file_system,
            runner,
            options,
            service_dir,
        }
    }

    /// Absolute location of a service-relative path
    pub fn path(&self, relative: &Path) -> PathBuf {
        self.service_dir.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::runner::MockCommandRunner;
    use crate::selection::Target;
    use crate::service::FunctionDescriptor;

    impl PipelineContext {
        /// Context over in-memory seams rooted at `/mock`
        pub fn with_mocks(
            options: EffectiveOptions,
        ) -> (Self, Arc<MockFileSystem>, Arc<MockCommandRunner>) {
            let file_system = Arc::new(MockFileSystem::new());
            let runner = Arc::new(MockCommandRunner::new());
            let context = Self::new(
                file_system.clone(),
                runner.clone(),
                options,
                PathBuf::from("/mock"),
            );
            (context, file_system, runner)
        }
    }

    impl Target {
        /// `hello` wrapped as `hello/wrap.handler` around `hello.handler`
        pub fn hello(runtime: &str) -> Self {
            Target {
                name: "hello".to_string(),
                function: FunctionDescriptor {
                    name: "hello".to_string(),
                    handler: "hello/wrap.handler".to_string(),
                    runtime: runtime.to_string(),
                },
                real_handler: "hello.handler".to_string(),
            }
        }
    }

    #[test]
    fn test_context_creation() {
        let context = PipelineContext::new(
            Arc::new(MockFileSystem::new()),
            Arc::new(MockCommandRunner::new()),
            EffectiveOptions::default(),
            PathBuf::from("/mock"),
        );

        assert_eq!(
            context.path(Path::new("hello/wrap.py")),
            PathBuf::from("/mock/hello/wrap.py")
        );
        assert_eq!(context.options.wrap_name, "wrap");
    }
}
