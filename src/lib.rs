//! pyshim - per-function dependency packaging for Python serverless functions
//!
//! For every function whose declared handler ends in `<wrapName>.handler`
//! and that has a `<wrapName>:<function>` override entry, pyshim writes a
//! small shim module next to the handler and installs the function's
//! `requirements.txt` into a private library directory the shim puts on the
//! import path. Installs run on the host or inside a build container matched
//! to the function's runtime.
//!
//! # Core Concepts
//!
//! - **Override entry**: `custom.pyshim["<wrapName>:<function>"]` naming the
//!   real handler the shim delegates to
//! - **Target**: a selected function together with its real handler
//! - **Pipeline**: the ordered phases each target goes through
//! - **Ignorable failure**: ends one target (or a whole hook) as a logged
//!   no-op; everything else is fatal and fails the command
//!
//! # Example Usage
//!
//! ```no_run
//! use pyshim::{CliOptions, Packager, RealCommandRunner, RealFileSystem};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), pyshim::PackError> {
//! let packager = Packager::load(
//!     Arc::new(RealFileSystem),
//!     Arc::new(RealCommandRunner),
//!     PathBuf::from("."),
//!     None,
//! )?;
//! let outcome = packager.package_all(&CliOptions::default()).await?;
//! assert!(!outcome.has_failures());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`config`]: option resolution from defaults, the service file, and flags
//! - [`selection`]: target selection from override entries
//! - [`shim`]: shim module rendering
//! - [`cleaner`]: artifact removal
//! - [`installer`]: installer planning and execution, container helpers
//! - [`pipeline`]: per-target phases and the orchestrator
//! - [`hooks`]: host lifecycle hooks over the above

pub mod cleaner;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod hooks;
pub mod installer;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod selection;
pub mod service;
pub mod shim;
pub mod util;

pub use config::{CliOptions, EffectiveOptions, FlagPair};
pub use error::{PackError, PackResult, Severity};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use hooks::{Hook, HookOutcome, Packager};
pub use pipeline::{PipelineOrchestrator, RunReport, TargetStatus};
pub use runner::{CommandOutput, CommandRunner, MockCommandRunner, RealCommandRunner};
pub use selection::Target;
pub use service::{FunctionDescriptor, ServiceDefinition};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
