//! Container runtime invocations

use crate::error::{PackError, PackResult};
use crate::runner::CommandRunner;
use std::path::Path;
use tracing::{debug, info};

pub const CONTAINER_RUNTIME: &str = "docker";
pub const IMAGE_PREFIX: &str = "lambci/lambda:build";
/// Mount point of the service directory inside the build container
pub const CONTAINER_WORKDIR: &str = "/var/task";
/// Runtime whose build image ships a `virtualenv` too old for the installer
pub const LEGACY_RUNTIME: &str = "python2.7";

const CLIENT_MARKER: &str = "Client:";
const SERVER_MARKER: &str = "Server:";

pub fn image_for(runtime: &str) -> String {
    format!("{}-{}", IMAGE_PREFIX, runtime)
}

/// Ownership of container-written files is meaningless on Windows hosts
pub fn ownership_fix_supported() -> bool {
    !cfg!(windows)
}

/// `docker run` arguments for `command` inside the build image of `runtime`,
/// with `service_dir` mounted read-write as the working directory
pub fn run_args(service_dir: &Path, runtime: &str, command: &[String]) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--rm".to_string(),
        "-v".to_string(),
        format!("{}:{}:rw", service_dir.display(), CONTAINER_WORKDIR),
        "-w".to_string(),
        CONTAINER_WORKDIR.to_string(),
        image_for(runtime),
    ];
    args.extend(command.iter().cloned());
    args
}

/// Check that both the client and the daemon of the container runtime answer
pub async fn preflight(runner: &dyn CommandRunner, cwd: &Path) -> PackResult<()> {
    debug!("Checking container runtime");
    let output = runner
        .run(CONTAINER_RUNTIME, &["version".to_string()], cwd)
        .await
        .map_err(|e| PackError::ContainerPreflight {
            reason: format!("failed to run `{} version`: {}", CONTAINER_RUNTIME, e),
        })?;

    if !output.stderr.trim().is_empty() {
        return Err(PackError::ContainerPreflight {
            reason: output.stderr.trim().to_string(),
        });
    }
    if !output.success() {
        return Err(PackError::ContainerPreflight {
            reason: format!("`{} version` exited with {}", CONTAINER_RUNTIME, output.status_code),
        });
    }
    for marker in [CLIENT_MARKER, SERVER_MARKER] {
        if !output.stdout.contains(marker) {
            return Err(PackError::ContainerPreflight {
                reason: format!("`{} version` output has no `{}` section", CONTAINER_RUNTIME, marker),
            });
        }
    }

    info!("Container runtime is available");
    Ok(())
}

/// Numeric uid and gid of the invoking user
pub async fn invoking_ids(runner: &dyn CommandRunner, cwd: &Path) -> Result<(u32, u32), String> {
    let uid = id_of(runner, cwd, "-u").await?;
    let gid = id_of(runner, cwd, "-g").await?;
    Ok((uid, gid))
}

async fn id_of(runner: &dyn CommandRunner, cwd: &Path, flag: &str) -> Result<u32, String> {
    let output = runner
        .run("id", &[flag.to_string()], cwd)
        .await
        .map_err(|e| format!("failed to execute id {}: {}", flag, e))?;

    if !output.success() {
        return Err(format!("id {} returned non-zero status", flag));
    }
    output
        .stdout
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("failed to parse id {} output: {}", flag, e))
}

/// Hand `path` (relative to the service directory) back to the invoking user
pub async fn fix_ownership(
    runner: &dyn CommandRunner,
    service_dir: &Path,
    runtime: &str,
    path: &Path,
) -> PackResult<()> {
    let failed = |reason: String| PackError::OwnershipFailed {
        path: path.to_path_buf(),
        reason,
    };

    let (uid, gid) = invoking_ids(runner, service_dir).await.map_err(failed)?;
    let command = vec![
        "chown".to_string(),
        "-R".to_string(),
        format!("{}:{}", uid, gid),
        path.display().to_string(),
    ];
    let args = run_args(service_dir, runtime, &command);

    let output = runner
        .run(CONTAINER_RUNTIME, &args, service_dir)
        .await
        .map_err(|e| failed(format!("failed to launch {}: {}", CONTAINER_RUNTIME, e)))?;

    if !output.success() || !output.stderr.trim().is_empty() {
        return Err(failed(format!(
            "exit code {}: {}",
            output.status_code,
            output.stderr.trim()
        )));
    }

    debug!(path = %path.display(), uid, gid, "Fixed ownership");
    Ok(())
}
