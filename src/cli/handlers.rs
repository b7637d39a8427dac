//! Subcommand handlers. Each returns the process exit code.

use super::commands::{CliArgs, HookArgs, PluginArgs, RunArgs, TargetsArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::fs::RealFileSystem;
use crate::hooks::{Hook, HookOutcome, Packager};
use crate::pipeline::orchestrator::default_jobs;
use crate::pipeline::PipelineOrchestrator;
use crate::progress::LoggingHandler;
use crate::runner::RealCommandRunner;
use crate::util::log_ignorable;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

/// Absolute service directory; it is bind-mounted into the build container
fn service_dir(requested: Option<&Path>) -> Result<PathBuf> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(match requested {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}

fn build_packager(args: &CliArgs, plugin: &PluginArgs) -> Result<Packager> {
    let service_dir = service_dir(args.service_dir.as_deref())?;

    let jobs = plugin.jobs.unwrap_or_else(default_jobs);
    let packager = Packager::load(
        Arc::new(RealFileSystem),
        Arc::new(RealCommandRunner),
        service_dir,
        args.config.as_deref(),
    )?;
    debug!(
        "Loaded {} functions from {}",
        packager.service().functions.len(),
        packager.service_dir().display()
    );

    Ok(packager.with_orchestrator(PipelineOrchestrator::new(Some(LoggingHandler)).with_jobs(jobs)))
}

fn finish(outcome: Result<HookOutcome>, format: OutputFormat) -> i32 {
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    match OutputFormatter::new(format).format_outcome(&outcome) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    }

    if outcome.has_failures() {
        error!("One or more functions failed");
        1
    } else {
        0
    }
}

async fn run_hook(
    args: &CliArgs,
    plugin: &PluginArgs,
    hook: Hook,
    function: Option<&str>,
) -> Result<HookOutcome> {
    let packager = build_packager(args, plugin)?;
    let outcome = packager
        .run_hook(hook, &plugin.cli_options(), function)
        .await
        .with_context(|| format!("Hook {} failed", hook))?;
    Ok(outcome)
}

/// `pyshim package`
pub async fn handle_package(args: &CliArgs, run: &RunArgs) -> i32 {
    let hook = if run.function.is_some() {
        Hook::BeforePackageFunction
    } else {
        Hook::BeforeCreateArtifacts
    };
    let outcome = run_hook(args, &run.plugin, hook, run.function.as_deref()).await;
    finish(outcome, run.plugin.format.into())
}

/// `pyshim clean`
pub async fn handle_clean(args: &CliArgs, run: &RunArgs) -> i32 {
    let hook = if run.function.is_some() {
        Hook::AfterPackageFunction
    } else {
        Hook::AfterCreateArtifacts
    };
    let outcome = run_hook(args, &run.plugin, hook, run.function.as_deref()).await;
    finish(outcome, run.plugin.format.into())
}

/// `pyshim hook <HOOK>`
pub async fn handle_hook(args: &CliArgs, hook: &HookArgs) -> i32 {
    let outcome = run_hook(args, &hook.plugin, hook.hook, hook.function.as_deref()).await;
    finish(outcome, hook.plugin.format.into())
}

/// `pyshim targets`
pub fn handle_targets(args: &CliArgs, targets: &TargetsArgs) -> i32 {
    let formatter = OutputFormatter::new(targets.plugin.format.into());
    let listing = build_packager(args, &targets.plugin).and_then(|packager| {
        match packager.list_targets(&targets.plugin.cli_options()) {
            Ok((options, selected)) => formatter.format_targets(&options, &selected),
            Err(e) if e.is_ignorable() => {
                log_ignorable(&e);
                formatter.format_outcome(&HookOutcome::Skipped {
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    });

    match listing {
        Ok(text) => {
            print!("{}", text);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}
