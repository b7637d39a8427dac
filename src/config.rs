//! Option resolution for a single invocation
//!
//! Every option is merged from three layers, highest precedence first:
//!
//! 1. an explicit CLI flag pair (`--cleanup` / `--no-cleanup`)
//! 2. the same-named key in `custom.pyshim` of the service file
//! 3. a built-in default
//!
//! The result is an immutable [`EffectiveOptions`] that is threaded through
//! every later stage of the run.
//!
//! # Service file keys
//!
//! - `wrapName` - wrapper keyword, default `"wrap"`
//! - `libSubDir` - dependency directory next to the shim, default `"lib"`
//! - `cleanup` - remove generated artifacts after packaging, default `true`
//! - `dockerizedPip` (alias `useContainer`) - install inside a container, default `false`
//! - `pythonBin` - interpreter used for local installs
//! - `<wrapName>:<function>` - override entries naming the real handler

use crate::error::{PackError, PackResult};
use crate::installer::container;
use crate::runner::CommandRunner;
use crate::service::ServiceDefinition;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Name of the tool's block under `custom` in the service file
pub const CONFIG_SECTION: &str = "pyshim";

const DEFAULT_WRAP_NAME: &str = "wrap";
const DEFAULT_LIB_SUB_DIR: &str = "lib";
const DEFAULT_CLEANUP: bool = true;
const DEFAULT_DOCKERIZED_PIP: bool = false;

/// An `--<key>` / `--no-<key>` switch pair as given on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagPair {
    pub enable: bool,
    pub disable: bool,
}

impl FlagPair {
    pub fn enabled() -> Self {
        Self {
            enable: true,
            disable: false,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enable: false,
            disable: true,
        }
    }

    /// `Some` when the operator expressed a preference
    pub fn resolve(&self, option: &str) -> PackResult<Option<bool>> {
        match (self.enable, self.disable) {
            (true, true) => Err(PackError::ConflictingFlags {
                option: option.to_string(),
            }),
            (true, false) => Ok(Some(true)),
            (false, true) => Ok(Some(false)),
            (false, false) => Ok(None),
        }
    }
}

/// Flags the host CLI hands to a hook
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub disabled: bool,
    pub cleanup: FlagPair,
    pub dockerized_pip: FlagPair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveOptions {
    pub wrap_name: String,
    pub lib_sub_dir: String,
    pub cleanup_enabled: bool,
    pub use_container: bool,
    pub python_bin: Option<String>,
}

impl Default for EffectiveOptions {
    fn default() -> Self {
        Self {
            wrap_name: DEFAULT_WRAP_NAME.to_string(),
            lib_sub_dir: DEFAULT_LIB_SUB_DIR.to_string(),
            cleanup_enabled: DEFAULT_CLEANUP,
            use_container: DEFAULT_DOCKERIZED_PIP,
            python_bin: None,
        }
    }
}

impl EffectiveOptions {
    /// `wrap:` - prefix of override keys
    pub fn override_prefix(&self) -> String {
        format!("{}:", self.wrap_name)
    }

    /// `wrap.handler` - required suffix of a wrapped function's handler
    pub fn wrapper_suffix(&self) -> String {
        format!("{}.handler", self.wrap_name)
    }

    /// `wrap.py` - generated shim file name
    pub fn shim_filename(&self) -> String {
        format!("{}.py", self.wrap_name)
    }

    /// Interpreter for a local install of a function on `runtime`
    pub fn python_for(&self, runtime: &str) -> String {
        match &self.python_bin {
            Some(bin) => bin.clone(),
            None if runtime.starts_with("python") => runtime.to_string(),
            None => "python".to_string(),
        }
    }
}

impl fmt::Display for EffectiveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pyshim options:")?;
        writeln!(f, "  Wrap name: {}", self.wrap_name)?;
        writeln!(f, "  Library dir: {}", self.lib_sub_dir)?;
        writeln!(f, "  Cleanup: {}", self.cleanup_enabled)?;
        writeln!(f, "  Dockerized pip: {}", self.use_container)?;
        if let Some(ref bin) = self.python_bin {
            writeln!(f, "  Python: {}", bin)?;
        }
        Ok(())
    }
}

/// Merge defaults, the service file section, and CLI flags without any
/// external checks. Fails ignorably when the section is absent or the
/// tool is switched off, fatally on contradictory flags.
pub fn merge(service: &ServiceDefinition, cli: &CliOptions) -> PackResult<EffectiveOptions> {
    let cleanup_flag = cli.cleanup.resolve("cleanup")?;
    let dockerized_flag = cli.dockerized_pip.resolve("dockerized-pip")?;

    if cli.disabled {
        return Err(PackError::Disabled {
            what: "pyshim".to_string(),
        });
    }

    let section = service
        .section(CONFIG_SECTION)
        .ok_or_else(|| PackError::ConfigMissing {
            section: CONFIG_SECTION.to_string(),
        })?;

    let mut options = EffectiveOptions::default();

    if let Some(wrap_name) = non_empty_string(section, "wrapName")? {
        options.wrap_name = wrap_name;
    }
    if let Some(lib_sub_dir) = non_empty_string(section, "libSubDir")? {
        options.lib_sub_dir = lib_sub_dir;
    }
    options.python_bin = non_empty_string(section, "pythonBin")?;

    if let Some(cleanup) = cleanup_flag.or(bool_key(section, "cleanup")?) {
        options.cleanup_enabled = cleanup;
    }

    let configured_container = match bool_key(section, "dockerizedPip")? {
        Some(v) => Some(v),
        None => bool_key(section, "useContainer")?,
    };
    if let Some(use_container) = dockerized_flag.or(configured_container) {
        options.use_container = use_container;
    }

    debug!(
        wrap_name = %options.wrap_name,
        lib_sub_dir = %options.lib_sub_dir,
        cleanup = options.cleanup_enabled,
        dockerized_pip = options.use_container,
        "Resolved options"
    );
    Ok(options)
}

/// Resolve the effective options for this invocation. When containerized
/// installs are on, the container runtime is checked before returning so
/// a broken runtime fails the run before any target is touched.
pub async fn resolve(
    service: &ServiceDefinition,
    cli: &CliOptions,
    runner: &dyn CommandRunner,
    service_dir: &Path,
) -> PackResult<EffectiveOptions> {
    let options = merge(service, cli)?;
    if options.use_container {
        container::preflight(runner, service_dir).await?;
    }
    Ok(options)
}

fn non_empty_string(section: &Mapping, key: &str) -> PackResult<Option<String>> {
    match section.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(PackError::InvalidOption {
            key: key.to_string(),
            expected: "a string",
        }),
    }
}

fn bool_key(section: &Mapping, key: &str) -> PackResult<Option<bool>> {
    match section.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(_) => Err(PackError::InvalidOption {
            key: key.to_string(),
            expected: "a boolean",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, MockCommandRunner};
    use yare::parameterized;

    fn service(section: &str) -> ServiceDefinition {
        let yaml = format!(
            "functions:\n  hello:\n    handler: hello/wrap.handler\ncustom:\n  pyshim:\n{}",
            section
        );
        ServiceDefinition::from_yaml(&yaml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let options = merge(&service("    wrap:hello: hello.handler\n"), &CliOptions::default())
            .unwrap();
        assert_eq!(options, EffectiveOptions::default());
        assert_eq!(options.override_prefix(), "wrap:");
        assert_eq!(options.wrapper_suffix(), "wrap.handler");
        assert_eq!(options.shim_filename(), "wrap.py");
    }

    #[test]
    fn test_missing_section_is_ignorable() {
        let service = ServiceDefinition::from_yaml("functions: {}\n").unwrap();
        let err = merge(&service, &CliOptions::default()).unwrap_err();
        assert!(matches!(err, PackError::ConfigMissing { .. }));
        assert!(err.is_ignorable());
    }

    #[test]
    fn test_config_values_override_defaults() {
        let options = merge(
            &service(
                "    wrapName: shim\n    libSubDir: vendor\n    cleanup: false\n    dockerizedPip: true\n    pythonBin: python3\n",
            ),
            &CliOptions::default(),
        )
        .unwrap();
        assert_eq!(options.wrap_name, "shim");
        assert_eq!(options.lib_sub_dir, "vendor");
        assert!(!options.cleanup_enabled);
        assert!(options.use_container);
        assert_eq!(options.python_bin.as_deref(), Some("python3"));
    }

    #[test]
    fn test_empty_strings_keep_defaults() {
        let options = merge(
            &service("    wrapName: ''\n    libSubDir: ''\n"),
            &CliOptions::default(),
        )
        .unwrap();
        assert_eq!(options.wrap_name, "wrap");
        assert_eq!(options.lib_sub_dir, "lib");
    }

    #[test]
    fn test_use_container_alias() {
        let options =
            merge(&service("    useContainer: true\n"), &CliOptions::default()).unwrap();
        assert!(options.use_container);
    }

    #[parameterized(
        flag_beats_config_off = { "    cleanup: true\n", FlagPair::disabled(), false },
        flag_beats_config_on = { "    cleanup: false\n", FlagPair::enabled(), true },
        config_without_flag = { "    cleanup: false\n", FlagPair::default(), false },
        default_without_either = { "    wrapName: wrap\n", FlagPair::default(), true },
        string_boolean = { "    cleanup: 'FALSE'\n", FlagPair::default(), false },
    )]
    fn test_cleanup_precedence(section: &str, flag: FlagPair, expected: bool) {
        let cli = CliOptions {
            cleanup: flag,
            ..Default::default()
        };
        let options = merge(&service(section), &cli).unwrap();
        assert_eq!(options.cleanup_enabled, expected);
    }

    #[test]
    fn test_conflicting_flags_are_fatal() {
        let cli = CliOptions {
            dockerized_pip: FlagPair {
                enable: true,
                disable: true,
            },
            ..Default::default()
        };
        let err = merge(&service("    cleanup: true\n"), &cli).unwrap_err();
        assert!(matches!(err, PackError::ConflictingFlags { ref option } if option == "dockerized-pip"));
        assert!(!err.is_ignorable());
    }

    #[test]
    fn test_conflicting_flags_fatal_even_without_section() {
        let service = ServiceDefinition::from_yaml("functions: {}\n").unwrap();
        let cli = CliOptions {
            cleanup: FlagPair {
                enable: true,
                disable: true,
            },
            ..Default::default()
        };
        assert!(!merge(&service, &cli).unwrap_err().is_ignorable());
    }

    #[test]
    fn test_disabled_is_ignorable() {
        let cli = CliOptions {
            disabled: true,
            ..Default::default()
        };
        let err = merge(&service("    cleanup: true\n"), &cli).unwrap_err();
        assert!(matches!(err, PackError::Disabled { .. }));
        assert!(err.is_ignorable());
    }

    #[test]
    fn test_wrong_type_is_invalid_option() {
        let err = merge(&service("    cleanup: [1, 2]\n"), &CliOptions::default()).unwrap_err();
        assert!(matches!(err, PackError::InvalidOption { ref key, .. } if key == "cleanup"));
    }

    #[parameterized(
        explicit_bin = { Some("python3"), "python3.9", "python3" },
        runtime_named = { None, "python3.9", "python3.9" },
        non_python_runtime = { None, "provided", "python" },
    )]
    fn test_python_for(bin: Option<&str>, runtime: &str, expected: &str) {
        let options = EffectiveOptions {
            python_bin: bin.map(str::to_string),
            ..Default::default()
        };
        assert_eq!(options.python_for(runtime), expected);
    }

    #[tokio::test]
    async fn test_resolve_runs_preflight_only_for_containers() {
        let runner = MockCommandRunner::new();
        resolve(
            &service("    cleanup: true\n"),
            &CliOptions::default(),
            &runner,
            Path::new("/svc"),
        )
        .await
        .unwrap();
        assert!(runner.invocations().is_empty());

        runner.respond(
            "docker",
            Some("version"),
            CommandOutput::with_stdout("Client:\n Version: 20.10\nServer:\n Engine:\n"),
        );
        let options = resolve(
            &service("    dockerizedPip: true\n"),
            &CliOptions::default(),
            &runner,
            Path::new("/svc"),
        )
        .await
        .unwrap();
        assert!(options.use_container);
        assert_eq!(runner.command_lines(), vec!["docker version"]);
    }

    #[tokio::test]
    async fn test_resolve_fails_when_server_marker_missing() {
        let runner = MockCommandRunner::new();
        runner.respond(
            "docker",
            Some("version"),
            CommandOutput::with_stdout("Client:\n Version: 20.10\n"),
        );
        let err = resolve(
            &service("    dockerizedPip: true\n"),
            &CliOptions::default(),
            &runner,
            Path::new("/svc"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PackError::ContainerPreflight { .. }));
        assert!(!err.is_ignorable());
    }

    #[test]
    fn test_display() {
        let display = format!("{}", EffectiveOptions::default());
        assert!(display.contains("Wrap name: wrap"));
        assert!(display.contains("Library dir: lib"));
    }
}
