//! Service definition as read from the host framework's `serverless.yml`
//!
//! Only the parts the packaging pipeline consumes are modeled: the function
//! table (in file order), the provider default runtime, and the `custom`
//! block that holds this tool's settings and override entries.

use crate::error::{PackError, PackResult};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::debug;

pub const SERVICE_FILE: &str = "serverless.yml";
pub const DEFAULT_RUNTIME: &str = "python3.8";

/// A function declared by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub handler: String,
    pub runtime: String,
}

#[derive(Debug, Deserialize)]
struct RawService {
    #[serde(default)]
    service: Option<Value>,
    #[serde(default)]
    provider: Option<RawProvider>,
    #[serde(default)]
    functions: Option<Mapping>,
    #[serde(default)]
    custom: Option<Mapping>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProvider {
    #[serde(default)]
    runtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    handler: String,
    #[serde(default)]
    runtime: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceDefinition {
    pub service: Option<String>,
    pub functions: Vec<FunctionDescriptor>,
    pub custom: Mapping,
}

impl ServiceDefinition {
    pub fn from_yaml(source: &str) -> Result<Self, String> {
        let raw: RawService = serde_yaml::from_str(source).map_err(|e| e.to_string())?;

        let default_runtime = raw
            .provider
            .and_then(|p| p.runtime)
            .unwrap_or_else(|| DEFAULT_RUNTIME.to_string());

        let mut functions = Vec::new();
        for (key, value) in raw.functions.unwrap_or_default() {
            let name = match key {
                Value::String(s) => s,
                other => return Err(format!("function name must be a string, got {:?}", other)),
            };
            let entry: RawFunction = serde_yaml::from_value(value)
                .map_err(|e| format!("function `{}`: {}", name, e))?;
            functions.push(FunctionDescriptor {
                name,
                handler: entry.handler,
                runtime: entry.runtime.unwrap_or_else(|| default_runtime.clone()),
            });
        }

        let service = match raw.service {
            Some(Value::String(s)) => Some(s),
            Some(Value::Mapping(m)) => m
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        };

        Ok(Self {
            service,
            functions,
            custom: raw.custom.unwrap_or_default(),
        })
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> PackResult<Self> {
        debug!("Loading service definition from {}", path.display());
        let source = fs.read_to_string(path).map_err(|e| PackError::ServiceFile {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        })?;
        Self::from_yaml(&source).map_err(|reason| PackError::ServiceFile {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// The tool's settings block under `custom.<section>`
    pub fn section(&self, section: &str) -> Option<&Mapping> {
        self.custom.get(section).and_then(Value::as_mapping)
    }
}
