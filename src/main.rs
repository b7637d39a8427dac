use pyshim::cli::commands::{CliArgs, Commands};
use pyshim::cli::handlers::{handle_clean, handle_hook, handle_package, handle_targets};
use pyshim::util::logging::{init_logging, json_from_env, parse_level, LoggingConfig, LOG_LEVEL_ENV};
use pyshim::{NAME, VERSION};

use clap::Parser;
use std::env;
use std::process;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Package(run) => handle_package(&args, run).await,
        Commands::Clean(run) => handle_clean(&args, run).await,
        Commands::Hook(hook) => handle_hook(&args, hook).await,
        Commands::Targets(targets) => handle_targets(&args, targets),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    init_logging(LoggingConfig {
        use_json: json_from_env(),
        ..LoggingConfig::with_level(level)
    });
}
