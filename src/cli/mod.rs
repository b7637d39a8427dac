pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, HookArgs, PluginArgs, RunArgs, TargetsArgs};
pub use output::{OutputFormat, OutputFormatter};
