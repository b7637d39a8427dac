//! Shim module generation
//!
//! The shim is a small Python module that puts its own directory and the
//! vendored library directory at the front of `sys.path` (in that order),
//! imports the real entry point under a private alias, and re-exposes it as
//! `handler(event, context)`.

use crate::error::{PackError, PackResult};
use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `<module>.<entry>` split of a real handler reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRef {
    pub module: String,
    pub entry: String,
}

impl HandlerRef {
    pub fn parse(reference: &str) -> PackResult<Self> {
        let invalid = |reason: &str| PackError::InvalidHandler {
            handler: reference.to_string(),
            reason: reason.to_string(),
        };

        let (module_path, entry) = reference
            .rsplit_once('.')
            .ok_or_else(|| invalid("expected <module>.<function>"))?;
        let module_path = module_path.strip_suffix(".py").unwrap_or(module_path);
        let module = module_path.trim_matches('/').replace('/', ".");

        if !is_identifier(entry) {
            return Err(invalid("entry point is not a valid identifier"));
        }
        if module.is_empty() || !module.split('.').all(is_identifier) {
            return Err(invalid("module path is not importable"));
        }

        Ok(Self {
            module,
            entry: entry.to_string(),
        })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Render the shim source
pub fn render(shim_filename: &str, lib_sub_dir: &str, real_handler: &str) -> PackResult<String> {
    let handler = HandlerRef::parse(real_handler)?;

    Ok(format!(
        r#"# -*- coding: utf-8 -*-
# {shim_filename}
# Generated by pyshim. Do not edit; changes are overwritten on every package run.
import os
import sys

_here = os.path.dirname(os.path.abspath(__file__))
sys.path[0:0] = [_here, os.path.join(_here, {lib_literal})]

from {module} import {entry} as _real_handler


def handler(event, context):
    return _real_handler(event, context)
"#,
        shim_filename = shim_filename,
        lib_literal = python_string(lib_sub_dir),
        module = handler.module,
        entry = handler.entry,
    ))
}

fn python_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Write the shim for `real_handler` to `target_dir/shim_filename`,
/// replacing any existing file.
pub fn generate(
    fs: &dyn FileSystem,
    target_dir: &Path,
    shim_filename: &str,
    lib_sub_dir: &str,
    real_handler: &str,
) -> PackResult<PathBuf> {
    let content = render(shim_filename, lib_sub_dir, real_handler)?;
    let path = target_dir.join(shim_filename);

    fs.write_atomic(&path, &content)
        .map_err(|e| PackError::io(format!("Failed to write shim {}", path.display()), e))?;

    debug!(path = %path.display(), real_handler, "Wrote shim");
    Ok(path)
}
