//! Dependency installation
//!
//! Dependencies are installed by a staged Python script, either directly on
//! the host or inside a build image matched to the function's runtime. The
//! installer's stderr decides the outcome: empty output or pip's version
//! nag pass, anything else fails the target.

pub mod container;

use crate::error::{PackError, PackResult};
use crate::runner::{CommandOutput, CommandRunner};
use crate::selection::TargetLayout;
use std::path::Path;
use tracing::{debug, info, warn};

/// Installer script staged into every library directory
pub const INSTALLER_SCRIPT: &str = include_str!("../../assets/install_requirements.py");

/// Warning pip prints when a newer pip is available
pub const BENIGN_STDERR_MARKER: &str = "You are using pip version";

/// Follow-up line of the same warning
const BENIGN_STDERR_FOLLOWUP: &str = "You should consider upgrading";

/// A fully planned installer invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InstallCommand {
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// True when stderr is empty or holds nothing but pip's version warning
pub fn stderr_is_benign(stderr: &str) -> bool {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .all(|line| {
            let line = line.trim_start_matches("WARNING: ");
            line.starts_with(BENIGN_STDERR_MARKER) || line.starts_with(BENIGN_STDERR_FOLLOWUP)
        })
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

/// Shell wrapper for the legacy build image: upgrade `virtualenv`, then run
/// the staged installer
pub fn legacy_wrapper_script(layout: &TargetLayout) -> String {
    format!(
        "#!/bin/sh\n# Staged by pyshim for the {runtime} build image.\nset -e\npip install --upgrade virtualenv\nexec python {script} {manifest} {lib}\n",
        runtime = container::LEGACY_RUNTIME,
        script = arg(&layout.installer_script),
        manifest = arg(&layout.manifest),
        lib = arg(&layout.lib_dir),
    )
}

pub fn needs_legacy_wrapper(runtime: &str, use_container: bool) -> bool {
    use_container && runtime == container::LEGACY_RUNTIME
}

/// Installer invocation on the host
pub fn plan_local(layout: &TargetLayout, python: &str) -> InstallCommand {
    InstallCommand {
        program: python.to_string(),
        args: vec![
            arg(&layout.installer_script),
            arg(&layout.manifest),
            arg(&layout.lib_dir),
        ],
    }
}

/// Installer invocation inside the build image for `runtime`
pub fn plan_container(layout: &TargetLayout, service_dir: &Path, runtime: &str) -> InstallCommand {
    let command = if runtime == container::LEGACY_RUNTIME {
        vec!["sh".to_string(), arg(&layout.legacy_script)]
    } else {
        vec![
            "python".to_string(),
            arg(&layout.installer_script),
            arg(&layout.manifest),
            arg(&layout.lib_dir),
        ]
    };

    InstallCommand {
        program: container::CONTAINER_RUNTIME.to_string(),
        args: container::run_args(service_dir, runtime, &command),
    }
}

/// Run a planned install for `function` and classify its result
pub async fn run(
    runner: &dyn CommandRunner,
    service_dir: &Path,
    function: &str,
    command: &InstallCommand,
) -> PackResult<CommandOutput> {
    info!(function, "Installing dependencies: {}", command.display());

    let output = runner
        .run(&command.program, &command.args, service_dir)
        .await
        .map_err(|source| PackError::Spawn {
            program: command.program.clone(),
            source,
        })?;

    for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
        debug!(function, "installer: {}", line);
    }

    if !stderr_is_benign(&output.stderr) || !output.success() {
        return Err(PackError::InstallerFailed {
            function: function.to_string(),
            status_code: output.status_code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    if !output.stderr.trim().is_empty() {
        warn!(function, "installer: {}", output.stderr.trim());
    }
    Ok(output)
}
