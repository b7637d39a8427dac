// Per-target pipeline phases
//
// Install runs every phase from 01 to 08 in order; teardown runs only
// the artifact removal phase.

#[path = "01_shim.rs"]
pub mod shim;
#[path = "02_validate.rs"]
pub mod validate;
#[path = "03_clean_stale.rs"]
pub mod clean_stale;
#[path = "04_ensure_dir.rs"]
pub mod ensure_dir;
#[path = "05_stage.rs"]
pub mod stage;
#[path = "06_preinstall.rs"]
pub mod preinstall;
#[path = "07_install.rs"]
pub mod install;
#[path = "08_postinstall.rs"]
pub mod postinstall;
pub mod teardown;

use super::phase_trait::TargetPhase;

pub fn install_phases() -> Vec<Box<dyn TargetPhase>> {
    vec![
        Box::new(shim::WriteShimPhase),
        Box::new(validate::ValidateInputsPhase),
        Box::new(clean_stale::CleanStalePhase),
        Box::new(ensure_dir::EnsureDirPhase),
        Box::new(stage::StageInstallerPhase),
        Box::new(preinstall::PreinstallPhase),
        Box::new(install::InstallPhase),
        Box::new(postinstall::PostinstallPhase),
    ]
}

pub fn teardown_phases() -> Vec<Box<dyn TargetPhase>> {
    vec![Box::new(teardown::RemoveArtifactsPhase)]
}
