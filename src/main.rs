//! selfwatch - pipeline self-monitoring tool
//!
//! Runs the heartbeat probes and the self-state monitor, or inspects and
//! edits the shared health state.

use clap::Parser;
use selfwatch::cli::args::{generate_completions, Cli, Commands};
use selfwatch::commands::{run_check, run_daemon, run_reset, run_status, run_touch};
use selfwatch::config::{ConfigBuilder, Settings};
use selfwatch::error::{AppError, ConfigError};

fn main() {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        generate_completions(*shell);
        return;
    }

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        settings.log_level
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_level(level)
        .format_timestamp_secs()
        .init();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::from)
        .and_then(|runtime| runtime.block_on(run(&cli, settings)));

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_log_level(cli.log_level.clone())
        .with_store_path(cli.state_dir.clone())
        .build()
        .validate()
}

async fn run(cli: &Cli, settings: Settings) -> Result<(), AppError> {
    match &cli.command {
        Commands::Run(args) => run_daemon(args, cli.format, settings).await,

        Commands::Check(args) => run_check(args, cli.format, settings).await,

        Commands::Status => run_status(cli.format, &settings).await,

        Commands::Reset => run_reset(cli.format, &settings).await,

        Commands::Touch { dimension } => run_touch(*dimension, cli.format, &settings).await,

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Store(_) => {
            eprintln!();
            eprintln!("Hint: Check that the store directory exists and is writable,");
            eprintln!("      or pass --state-dir to point at another one.");
        }
        AppError::Config(ConfigError::UnknownContactType(_)) => {
            eprintln!();
            eprintln!("Hint: Supported contact types are stderr, stdout and file.");
        }
        _ => {}
    }
}
