//! Host lifecycle hooks
//!
//! Each hook maps onto one packaging operation. Ignorable failures raised
//! before any target runs (missing section, switched-off tool, disabled
//! cleanup, invalid single-target selection) turn the whole hook into a
//! logged no-op; fatal ones propagate.

use crate::config::{self, CliOptions, EffectiveOptions};
use crate::error::{PackError, PackResult};
use crate::fs::FileSystem;
use crate::pipeline::{PipelineContext, PipelineOrchestrator, RunReport};
use crate::runner::CommandRunner;
use crate::selection::{self, Target};
use crate::service::{ServiceDefinition, SERVICE_FILE};
use crate::util::logging::log_ignorable;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// `before:deploy:createDeploymentArtifacts`
    BeforeCreateArtifacts,
    /// `after:deploy:createDeploymentArtifacts`
    AfterCreateArtifacts,
    /// `before:deploy:function:packageFunction`
    BeforePackageFunction,
    /// `after:deploy:function:packageFunction`
    AfterPackageFunction,
}

impl Hook {
    pub const ALL: [Hook; 4] = [
        Hook::BeforeCreateArtifacts,
        Hook::AfterCreateArtifacts,
        Hook::BeforePackageFunction,
        Hook::AfterPackageFunction,
    ];

    pub fn host_name(&self) -> &'static str {
        match self {
            Hook::BeforeCreateArtifacts => "before:deploy:createDeploymentArtifacts",
            Hook::AfterCreateArtifacts => "after:deploy:createDeploymentArtifacts",
            Hook::BeforePackageFunction => "before:deploy:function:packageFunction",
            Hook::AfterPackageFunction => "after:deploy:function:packageFunction",
        }
    }

    pub fn from_host_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.host_name() == name)
    }

    /// Whether the hook acts on the single function named by the host
    pub fn is_single_function(&self) -> bool {
        matches!(
            self,
            Hook::BeforePackageFunction | Hook::AfterPackageFunction
        )
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

impl FromStr for Hook {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_host_name(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(Hook::host_name).collect();
            format!("unknown hook `{}` (expected one of: {})", s, known.join(", "))
        })
    }
}

/// Result of a hook that did not fail fatally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HookOutcome {
    Completed { report: RunReport },
    Skipped { reason: String },
}

impl HookOutcome {
    /// True when a target failed fatally inside the run
    pub fn has_failures(&self) -> bool {
        match self {
            HookOutcome::Completed { report } => report.has_failures(),
            HookOutcome::Skipped { .. } => false,
        }
    }
}

/// Ignorable errors become a skipped outcome; fatal ones pass through
fn absorb_ignorable(result: PackResult<HookOutcome>) -> PackResult<HookOutcome> {
    match result {
        Err(error) if error.is_ignorable() => {
            log_ignorable(&error);
            Ok(HookOutcome::Skipped {
                reason: error.to_string(),
            })
        }
        other => other,
    }
}

/// Entry point for every packaging operation on one service
pub struct Packager {
    file_system: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
    service_dir: PathBuf,
    service: ServiceDefinition,
    orchestrator: PipelineOrchestrator,
}

impl Packager {
    pub fn new(
        file_system: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        service_dir: PathBuf,
        service: ServiceDefinition,
    ) -> Self {
        Self {
            file_system,
            runner,
            service_dir,
            service,
            orchestrator: PipelineOrchestrator::new(None),
        }
    }

    /// Read the service file from `service_file`, or `serverless.yml` in
    /// `service_dir` when not given
    pub fn load(
        file_system: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        service_dir: PathBuf,
        service_file: Option<&Path>,
    ) -> PackResult<Self> {
        let path = service_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| service_dir.join(SERVICE_FILE));
        let service = ServiceDefinition::load(file_system.as_ref(), &path)?;
        Ok(Self::new(file_system, runner, service_dir, service))
    }

    pub fn with_orchestrator(mut self, orchestrator: PipelineOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn service(&self) -> &ServiceDefinition {
        &self.service
    }

    pub fn service_dir(&self) -> &Path {
        &self.service_dir
    }

    /// Dispatch a host lifecycle hook. `function` names the target of the
    /// single-function hooks and is ignored by the others.
    pub async fn run_hook(
        &self,
        hook: Hook,
        cli: &CliOptions,
        function: Option<&str>,
    ) -> PackResult<HookOutcome> {
        info!(hook = %hook, "Running hook");
        match (hook, function) {
            (Hook::BeforeCreateArtifacts, _) => self.package_all(cli).await,
            (Hook::AfterCreateArtifacts, _) => self.clean_all(cli).await,
            (Hook::BeforePackageFunction, Some(name)) => self.package_one(cli, name).await,
            (Hook::AfterPackageFunction, Some(name)) => self.clean_one(cli, name).await,
            (_, None) => absorb_ignorable(Err(PackError::SelectionInvalid {
                function: String::new(),
                reason: format!("hook `{}` needs a target function", hook),
            })),
        }
    }

    /// Package every function with an override entry
    pub async fn package_all(&self, cli: &CliOptions) -> PackResult<HookOutcome> {
        absorb_ignorable(self.package(cli, None).await)
    }

    /// Package only `name`
    pub async fn package_one(&self, cli: &CliOptions, name: &str) -> PackResult<HookOutcome> {
        absorb_ignorable(self.package(cli, Some(name)).await)
    }

    /// Remove the artifacts of every selected function
    pub async fn clean_all(&self, cli: &CliOptions) -> PackResult<HookOutcome> {
        absorb_ignorable(self.clean(cli, None).await)
    }

    /// Remove the artifacts of `name`
    pub async fn clean_one(&self, cli: &CliOptions, name: &str) -> PackResult<HookOutcome> {
        absorb_ignorable(self.clean(cli, Some(name)).await)
    }

    /// The targets a packaging run would process. Runs no external checks
    /// and touches nothing on disk.
    pub fn list_targets(&self, cli: &CliOptions) -> PackResult<(EffectiveOptions, Vec<Target>)> {
        let options = config::merge(&self.service, cli)?;
        let targets = selection::select_all(&self.service, &options);
        Ok((options, targets))
    }

    async fn package(&self, cli: &CliOptions, only: Option<&str>) -> PackResult<HookOutcome> {
        let options = config::resolve(
            &self.service,
            cli,
            self.runner.as_ref(),
            &self.service_dir,
        )
        .await?;

        let targets = self.select(&options, only)?;
        let context = self.context(options);
        let report = self.orchestrator.install(&context, targets).await;
        Ok(HookOutcome::Completed { report })
    }

    async fn clean(&self, cli: &CliOptions, only: Option<&str>) -> PackResult<HookOutcome> {
        let options = config::merge(&self.service, cli)?;
        if !options.cleanup_enabled {
            return Err(PackError::Disabled {
                what: "cleanup".to_string(),
            });
        }

        let targets = self.select(&options, only)?;
        let context = self.context(options);
        let report = self.orchestrator.teardown(&context, targets).await;
        Ok(HookOutcome::Completed { report })
    }

    fn select(&self, options: &EffectiveOptions, only: Option<&str>) -> PackResult<Vec<Target>> {
        match only {
            None => Ok(selection::select_all(&self.service, options)),
            Some(name) => {
                let descriptor =
                    self.service
                        .function(name)
                        .ok_or_else(|| PackError::SelectionInvalid {
                            function: name.to_string(),
                            reason: "no such function in the service".to_string(),
                        })?;
                Ok(vec![selection::select_one(
                    &self.service,
                    options,
                    name,
                    descriptor,
                )?])
            }
        }
    }

    fn context(&self, options: EffectiveOptions) -> PipelineContext {
        PipelineContext::new(
            self.file_system.clone(),
            self.runner.clone(),
            options,
            self.service_dir.clone(),
        )
    }
}
