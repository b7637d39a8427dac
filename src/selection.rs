//! Target selection
//!
//! Override entries are keyed by `<wrapName>:<function>` strings, so the
//! structure has to be re-derived from those conventions on every run.
//! A key only selects a function when the function exists and its declared
//! handler ends with `<wrapName>.handler` as a whole path segment.

use crate::config::EffectiveOptions;
use crate::error::{PackError, PackResult};
use crate::service::{FunctionDescriptor, ServiceDefinition};
use serde::Serialize;
use serde_yaml::Value;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Name of the requirements manifest expected next to each shim
pub const MANIFEST_FILE: &str = "requirements.txt";
/// Installer script staged inside the library directory
pub const INSTALLER_SCRIPT_FILE: &str = ".pyshim_install.py";
/// Wrapper script staged for the legacy container image
pub const LEGACY_SCRIPT_FILE: &str = ".pyshim_install.sh";

/// One function to process during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub name: String,
    pub function: FunctionDescriptor,
    pub real_handler: String,
}

/// Paths of a target's artifacts, relative to the service directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLayout {
    pub handler_dir: PathBuf,
    pub shim_file: PathBuf,
    pub lib_dir: PathBuf,
    pub manifest: PathBuf,
    pub installer_script: PathBuf,
    pub legacy_script: PathBuf,
}

/// Directory part of a handler that points at the shim module, or `None`
/// when the handler does not end with `<wrapName>.handler` on a `/` boundary
pub fn shim_dir<'a>(handler: &'a str, options: &EffectiveOptions) -> Option<&'a str> {
    handler
        .strip_suffix(options.wrapper_suffix().as_str())
        .filter(|dir| dir.is_empty() || dir.ends_with('/'))
}

impl Target {
    pub fn layout(&self, options: &EffectiveOptions) -> TargetLayout {
        let dir = shim_dir(&self.function.handler, options).unwrap_or("");
        let handler_dir = PathBuf::from(dir);
        let lib_dir = handler_dir.join(&options.lib_sub_dir);

        TargetLayout {
            shim_file: handler_dir.join(options.shim_filename()),
            manifest: handler_dir.join(MANIFEST_FILE),
            installer_script: lib_dir.join(INSTALLER_SCRIPT_FILE),
            legacy_script: lib_dir.join(LEGACY_SCRIPT_FILE),
            lib_dir,
            handler_dir,
        }
    }
}

fn real_handler_for(
    service: &ServiceDefinition,
    options: &EffectiveOptions,
    function: &str,
) -> Option<String> {
    let section = service.section(crate::config::CONFIG_SECTION)?;
    let key = format!("{}{}", options.override_prefix(), function);
    section.get(key.as_str()).map(value_to_string)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Select the function named on the command line
pub fn select_one(
    service: &ServiceDefinition,
    options: &EffectiveOptions,
    name: &str,
    descriptor: &FunctionDescriptor,
) -> PackResult<Target> {
    let real_handler =
        real_handler_for(service, options, name).ok_or_else(|| PackError::SelectionInvalid {
            function: name.to_string(),
            reason: format!(
                "no `{}{}` entry in custom.{}",
                options.override_prefix(),
                name,
                crate::config::CONFIG_SECTION
            ),
        })?;

    let suffix = options.wrapper_suffix();
    if shim_dir(&descriptor.handler, options).is_none() {
        return Err(PackError::SelectionInvalid {
            function: name.to_string(),
            reason: format!(
                "handler `{}` does not end with `{}`",
                descriptor.handler, suffix
            ),
        });
    }

    debug!(function = name, real_handler = %real_handler, "Selected function");
    Ok(Target {
        name: name.to_string(),
        function: descriptor.clone(),
        real_handler,
    })
}

/// Select every function with a matching override entry, in the order the
/// entries appear in the service file
pub fn select_all(service: &ServiceDefinition, options: &EffectiveOptions) -> Vec<Target> {
    let Some(section) = service.section(crate::config::CONFIG_SECTION) else {
        return Vec::new();
    };
    let prefix = options.override_prefix();
    let suffix = options.wrapper_suffix();

    let mut targets = Vec::new();
    for (key, value) in section {
        let Some(key) = key.as_str() else {
            continue;
        };
        let Some(name) = key.strip_prefix(prefix.as_str()) else {
            continue;
        };
        if name.is_empty() {
            trace!(key, "Skipping override with empty function name");
            continue;
        }
        let Some(function) = service.function(name) else {
            debug!(key, "Skipping override for unknown function");
            continue;
        };
        if shim_dir(&function.handler, options).is_none() {
            debug!(
                key,
                handler = %function.handler,
                "Skipping override, handler does not end with {}", suffix
            );
            continue;
        }

        targets.push(Target {
            name: name.to_string(),
            function: function.clone(),
            real_handler: value_to_string(value),
        });
    }

    debug!("Selected {} target(s)", targets.len());
    targets
}
