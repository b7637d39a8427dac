//! Per-target pipeline state

use crate::installer::InstallCommand;
use crate::selection::{Target, TargetLayout};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Last stage a target's pipeline completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStage {
    Selected,
    ShimWritten,
    InputValidated,
    StaleCleaned,
    DirEnsured,
    InstallerStaged,
    PreinstallDone,
    Installed,
    PostinstallDone,
    ArtifactsRemoved,
}

impl TargetStage {
    pub fn name(&self) -> &'static str {
        match self {
            TargetStage::Selected => "selected",
            TargetStage::ShimWritten => "shim_written",
            TargetStage::InputValidated => "input_validated",
            TargetStage::StaleCleaned => "stale_cleaned",
            TargetStage::DirEnsured => "dir_ensured",
            TargetStage::InstallerStaged => "installer_staged",
            TargetStage::PreinstallDone => "preinstall_done",
            TargetStage::Installed => "installed",
            TargetStage::PostinstallDone => "postinstall_done",
            TargetStage::ArtifactsRemoved => "artifacts_removed",
        }
    }
}

impl fmt::Display for TargetStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Working state threaded through the phases of one target
#[derive(Debug, Clone)]
pub struct TargetState {
    pub target: Target,
    pub layout: TargetLayout,
    pub stage: TargetStage,
    /// Files staged into the library directory, relative to the service dir
    pub staged: Vec<PathBuf>,
    pub install_command: Option<InstallCommand>,
}

impl TargetState {
    pub fn new(target: Target, layout: TargetLayout) -> Self {
        Self {
            target,
            layout,
            stage: TargetStage::Selected,
            staged: Vec::new(),
            install_command: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.target.name
    }

    pub fn runtime(&self) -> &str {
        &self.target.function.runtime
    }
}
