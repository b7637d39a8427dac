use crate::config::{CliOptions, FlagPair};
use crate::hooks::Hook;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shim generator and per-function dependency packager for Python serverless functions
#[derive(Parser, Debug)]
#[command(
    name = "pyshim",
    about = "Per-function dependency packaging for Python serverless functions",
    version,
    long_about = "pyshim wraps Python function handlers in a generated shim module and \
                  installs each function's requirements.txt into a private library \
                  directory, either locally or inside a runtime-matched build container."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Service directory (defaults to current directory)"
    )]
    pub service_dir: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Service file (defaults to <service-dir>/serverless.yml)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate shims and install dependencies",
        long_about = "Generates the shim module and installs requirements for every function \
                      with an override entry, or only for --function.\n\n\
                      Examples:\n  \
                      pyshim package\n  \
                      pyshim package --function hello\n  \
                      pyshim package --dockerized-pip --jobs 2"
    )]
    Package(RunArgs),

    #[command(
        about = "Remove generated shims and library directories",
        long_about = "Removes generated artifacts for every selected function, or only for \
                      --function. Does nothing when cleanup is disabled.\n\n\
                      Examples:\n  \
                      pyshim clean\n  \
                      pyshim clean --function hello"
    )]
    Clean(RunArgs),

    #[command(
        about = "Run a host lifecycle hook",
        long_about = "Dispatches a deployment framework lifecycle hook name to the matching \
                      operation.\n\n\
                      Examples:\n  \
                      pyshim hook before:deploy:createDeploymentArtifacts\n  \
                      pyshim hook before:deploy:function:packageFunction --function hello"
    )]
    Hook(HookArgs),

    #[command(about = "List the functions a package run would process")]
    Targets(TargetsArgs),
}

/// Switches every subcommand accepts
#[derive(Args, Debug, Clone, Default)]
pub struct PluginArgs {
    #[arg(long, help = "Disable pyshim for this invocation")]
    pub disable: bool,

    #[arg(long, help = "Remove generated artifacts after packaging")]
    pub cleanup: bool,

    #[arg(long, help = "Keep generated artifacts after packaging")]
    pub no_cleanup: bool,

    #[arg(long, help = "Install dependencies inside a build container")]
    pub dockerized_pip: bool,

    #[arg(long, help = "Install dependencies on the host")]
    pub no_dockerized_pip: bool,

    #[arg(
        short = 'j',
        long,
        value_name = "N",
        help = "Functions processed concurrently (default: CPU count, at most 4)"
    )]
    pub jobs: Option<usize>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

impl PluginArgs {
    pub fn cli_options(&self) -> CliOptions {
        CliOptions {
            disabled: self.disable,
            cleanup: FlagPair {
                enable: self.cleanup,
                disable: self.no_cleanup,
            },
            dockerized_pip: FlagPair {
                enable: self.dockerized_pip,
                disable: self.no_dockerized_pip,
            },
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, value_name = "NAME", help = "Only process this function")]
    pub function: Option<String>,

    #[command(flatten)]
    pub plugin: PluginArgs,
}

#[derive(Args, Debug, Clone)]
pub struct HookArgs {
    #[arg(value_name = "HOOK", value_parser = parse_hook, help = "Host lifecycle hook name")]
    pub hook: Hook,

    #[arg(long, value_name = "NAME", help = "Function targeted by single-function hooks")]
    pub function: Option<String>,

    #[command(flatten)]
    pub plugin: PluginArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TargetsArgs {
    #[command(flatten)]
    pub plugin: PluginArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    #[default]
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_hook(s: &str) -> Result<Hook, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_package_args() {
        let args = CliArgs::parse_from(["pyshim", "package"]);
        match args.command {
            Commands::Package(run) => {
                assert!(run.function.is_none());
                assert_eq!(run.plugin.format, OutputFormatArg::Human);
                assert!(run.plugin.jobs.is_none());
                let cli = run.plugin.cli_options();
                assert!(!cli.disabled);
                assert_eq!(cli.cleanup, FlagPair::default());
            }
            _ => panic!("Expected Package command"),
        }
    }

    #[test]
    fn test_package_with_options() {
        let args = CliArgs::parse_from([
            "pyshim",
            "package",
            "--function",
            "hello",
            "--no-cleanup",
            "--dockerized-pip",
            "--jobs",
            "2",
            "--format",
            "json",
        ]);
        match args.command {
            Commands::Package(run) => {
                assert_eq!(run.function.as_deref(), Some("hello"));
                assert_eq!(run.plugin.jobs, Some(2));
                assert_eq!(run.plugin.format, OutputFormatArg::Json);
                let cli = run.plugin.cli_options();
                assert_eq!(cli.cleanup, FlagPair::disabled());
                assert_eq!(cli.dockerized_pip, FlagPair::enabled());
            }
            _ => panic!("Expected Package command"),
        }
    }

    #[test]
    fn test_conflicting_pair_reaches_resolution() {
        let args = CliArgs::parse_from(["pyshim", "clean", "--cleanup", "--no-cleanup"]);
        match args.command {
            Commands::Clean(run) => {
                let cli = run.plugin.cli_options();
                assert!(cli.cleanup.resolve("cleanup").is_err());
            }
            _ => panic!("Expected Clean command"),
        }
    }

    #[test]
    fn test_hook_command() {
        let args = CliArgs::parse_from([
            "pyshim",
            "hook",
            "before:deploy:function:packageFunction",
            "--function",
            "hello",
        ]);
        match args.command {
            Commands::Hook(hook) => {
                assert_eq!(hook.hook, Hook::BeforePackageFunction);
                assert_eq!(hook.function.as_deref(), Some("hello"));
            }
            _ => panic!("Expected Hook command"),
        }
    }

    #[test]
    fn test_unknown_hook_rejected() {
        assert!(CliArgs::try_parse_from(["pyshim", "hook", "before:deploy:deploy"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from([
            "pyshim",
            "-v",
            "--service-dir",
            "/srv/app",
            "--config",
            "/srv/app/other.yml",
            "targets",
        ]);
        assert!(args.verbose);
        assert!(!args.quiet);
        assert_eq!(args.service_dir, Some(PathBuf::from("/srv/app")));
        assert_eq!(args.config, Some(PathBuf::from("/srv/app/other.yml")));
        assert!(matches!(args.command, Commands::Targets(_)));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(CliArgs::try_parse_from(["pyshim", "-v", "-q", "targets"]).is_err());
    }

    #[test]
    fn test_log_level_flag() {
        let args = CliArgs::parse_from(["pyshim", "--log-level", "debug", "package"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }
}
