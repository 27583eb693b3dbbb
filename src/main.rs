mod cli;
mod logging;
mod progress;

use std::path::Path;
use std::process;
use std::sync::Arc;

use archup::{inspector, AppConfig, BackupEngine, Profile};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, InspectArgs, ProfileArgs};
use colored::*;
use dotenv::dotenv;
use progress::CliNotifier;
use tracing::error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match archup::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Backup(profile_args)) => {
            if let Err(err) = run_backup(&config, profile_args, false) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Update(profile_args)) => {
            if let Err(err) = run_backup(&config, profile_args, true) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Inspect(inspect_args)) => run_inspect(inspect_args),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_backup(
    config: &AppConfig,
    args: ProfileArgs,
    is_update: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = Profile::new(
        args.name,
        args.folders,
        args.files,
        args.target,
        args.keep_structure,
        false,
    );

    let notifier = Arc::new(CliNotifier::new());
    let engine = BackupEngine::new(config.backup.clone(), notifier)?;

    let errors = if is_update {
        engine.update_backup(&profile)?
    } else {
        engine.start_backup(&profile)?
    };

    if errors.is_empty() {
        println!("{}", "Backup completed with no errors".green());
    } else {
        println!(
            "Backup completed with {} errors:",
            format!("{}", errors.len()).red()
        );
        for line in &errors {
            println!("  {}", line);
        }
    }

    Ok(())
}

fn run_inspect(args: InspectArgs) {
    let state = inspector::inspect(
        Path::new(&args.path),
        args.folder,
        !args.write,
        args.write,
        args.deep,
    );
    let label = state.label();
    if label.is_empty() {
        println!("{} {}", args.path.display(), "[OK]".green());
    } else {
        println!("{} {}", args.path.display(), label.yellow());
    }
}
