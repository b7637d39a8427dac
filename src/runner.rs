//! Subprocess execution seam
//!
//! The installer and the container runtime are only ever launched through
//! [`CommandRunner`], which waits for the child to exit and hands back its
//! exit status and both captured output streams.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::process::Command;
use tracing::{debug, trace};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }

    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn with_stderr(stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    pub fn failed(status_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status_code,
            stderr: stderr.into(),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion in `cwd`. `Err` means the process could
    /// not be launched at all.
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<CommandOutput>;
}

pub struct RealCommandRunner;

#[async_trait]
impl CommandRunner for RealCommandRunner {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<CommandOutput> {
        debug!(program, ?args, cwd = %cwd.display(), "Running command");

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .await?;

        let status_code = output
            .status
            .code()
            .unwrap_or(if output.status.success() { 0 } else { 1 });
        let result = CommandOutput {
            status_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(status_code, stdout = %result.stdout, stderr = %result.stderr, "Command finished");
        Ok(result)
    }
}

/// A command observed by [`MockCommandRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone)]
enum MockResponse {
    Output(CommandOutput),
    LaunchError,
}

#[derive(Debug, Clone)]
struct Rule {
    program: String,
    arg_contains: Option<String>,
    response: MockResponse,
}

/// Scripted runner for tests. The first rule whose program matches (and
/// whose needle appears in one of the arguments, when given) decides the
/// response; unmatched commands succeed with empty output.
#[derive(Default)]
pub struct MockCommandRunner {
    rules: Mutex<Vec<Rule>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, program: &str, arg_contains: Option<&str>, output: CommandOutput) {
        self.push_rule(program, arg_contains, MockResponse::Output(output));
    }

    pub fn fail_to_launch(&self, program: &str, arg_contains: Option<&str>) {
        self.push_rule(program, arg_contains, MockResponse::LaunchError);
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    fn push_rule(&self, program: &str, arg_contains: Option<&str>, response: MockResponse) {
        self.rules.lock().unwrap().push(Rule {
            program: program.to_string(),
            arg_contains: arg_contains.map(str::to_string),
            response,
        });
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<CommandOutput> {
        self.invocations.lock().unwrap().push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        });

        let rules = self.rules.lock().unwrap();
        let matched = rules.iter().find(|rule| {
            rule.program == program
                && rule
                    .arg_contains
                    .as_deref()
                    .map_or(true, |needle| args.iter().any(|a| a.contains(needle)))
        });

        match matched.map(|r| &r.response) {
            Some(MockResponse::Output(output)) => Ok(output.clone()),
            Some(MockResponse::LaunchError) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: command not found", program),
            )),
            None => Ok(CommandOutput::default()),
        }
    }
}
