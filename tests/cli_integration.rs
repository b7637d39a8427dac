//! CLI integration tests
//!
//! These run the built binary against service directories on disk.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the pyshim binary
fn pyshim_bin() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .parent()
        .expect("No parent")
        .to_path_buf();

    // If we're in deps/, go up one more level
    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join("pyshim")
}

fn pyshim(dir: &Path, args: &[&str]) -> Output {
    Command::new(pyshim_bin())
        .arg("--service-dir")
        .arg(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("PYSHIM_LOG_JSON")
        .output()
        .expect("Failed to execute pyshim")
}

/// Service with one wrapped function `hello` and one plain function
fn create_service(dir: &TempDir, extra: &str) -> PathBuf {
    let root = dir.path().to_path_buf();
    let service = format!(
        "\
service: demo
provider:
  runtime: python3.8
functions:
  hello:
    handler: hello/wrap.handler
  plain:
    handler: plain.handler
custom:
  pyshim:
{}    wrap:hello: hello.handler
",
        extra
    );
    fs::write(root.join("serverless.yml"), service).expect("Failed to write serverless.yml");
    fs::create_dir_all(root.join("hello")).expect("Failed to create hello/");
    fs::write(root.join("hello/hello.py"), "def handler(event, context):\n    return 1\n")
        .expect("Failed to write hello.py");
    fs::write(root.join("hello/requirements.txt"), "six\n").expect("Failed to write requirements");
    root
}

#[test]
fn test_cli_help() {
    let output = Command::new(pyshim_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute pyshim");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("package"));
    assert!(stdout.contains("clean"));
    assert!(stdout.contains("hook"));
    assert!(stdout.contains("targets"));
}

#[test]
fn test_cli_version() {
    let output = Command::new(pyshim_bin())
        .arg("--version")
        .output()
        .expect("Failed to execute pyshim");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("pyshim"));
}

#[test]
fn test_targets_json() {
    let dir = TempDir::new().unwrap();
    let root = create_service(&dir, "");

    let output = pyshim(&root, &["targets", "--format", "json"]);

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let targets = parsed["targets"].as_array().unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0]["name"], "hello");
    assert_eq!(targets[0]["real_handler"], "hello.handler");
    assert!(!root.join("hello/wrap.py").exists());
}

#[test]
fn test_missing_service_file_fails() {
    let dir = TempDir::new().unwrap();

    let output = pyshim(dir.path(), &["package"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("serverless.yml"));
}

#[test]
fn test_disabled_run_is_skipped() {
    let dir = TempDir::new().unwrap();
    let root = create_service(&dir, "");

    let output = pyshim(&root, &["package", "--disable", "--format", "json"]);

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["outcome"], "skipped");
    assert!(!root.join("hello/wrap.py").exists());
}

#[test]
fn test_conflicting_flags_fail() {
    let dir = TempDir::new().unwrap();
    let root = create_service(&dir, "");

    let output = pyshim(&root, &["package", "--dockerized-pip", "--no-dockerized-pip"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--dockerized-pip"));
}

#[test]
fn test_unknown_hook_is_rejected() {
    let dir = TempDir::new().unwrap();
    let root = create_service(&dir, "");

    let output = pyshim(&root, &["hook", "before:deploy:deploy"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown hook"));
}

#[cfg(unix)]
fn fake_interpreter(root: &Path, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = root.join("fake-python");
    fs::write(&path, format!("#!/bin/sh\n{}\n", script)).expect("Failed to write fake python");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to mark fake python executable");
    path
}

#[cfg(unix)]
#[test]
fn test_package_and_clean_with_local_installer() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    // Records the arguments the installer is started with
    let python = fake_interpreter(&root, "echo \"$@\" > \"$3/installed-by\"");
    create_service(&dir, &format!("    pythonBin: {}\n", python.display()));

    let output = pyshim(&root, &["hook", "before:deploy:createDeploymentArtifacts"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let shim = fs::read_to_string(root.join("hello/wrap.py")).unwrap();
    assert!(shim.contains("from hello import handler as _real_handler"));
    let installed = fs::read_to_string(root.join("hello/lib/installed-by")).unwrap();
    assert_eq!(
        installed.trim(),
        "hello/lib/.pyshim_install.py hello/requirements.txt hello/lib"
    );
    assert!(!root.join("hello/lib/.pyshim_install.py").exists());
    assert!(!root.join("plain.py").exists());

    let output = pyshim(&root, &["hook", "after:deploy:createDeploymentArtifacts"]);
    assert!(output.status.success());
    assert!(!root.join("hello/wrap.py").exists());
    assert!(!root.join("hello/lib").exists());
    assert!(root.join("hello/hello.py").exists());
}

#[cfg(unix)]
#[test]
fn test_failing_installer_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    let python = fake_interpreter(&root, "echo 'ERROR: resolution failed' >&2\nexit 1");
    create_service(&dir, &format!("    pythonBin: {}\n", python.display()));

    let output = pyshim(&root, &["package", "--format", "json"]);

    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["report"]["targets"][0]["status"], "failed");
    assert_eq!(parsed["report"]["targets"][0]["stage"], "preinstall_done");
}

#[test]
fn test_clean_without_cleanup_keeps_artifacts() {
    let dir = TempDir::new().unwrap();
    let root = create_service(&dir, "    cleanup: false\n");
    fs::write(root.join("hello/wrap.py"), "").unwrap();

    let output = pyshim(&root, &["clean", "--function", "hello"]);

    assert!(output.status.success());
    assert!(root.join("hello/wrap.py").exists());
}
