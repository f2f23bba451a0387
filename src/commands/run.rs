//! Run command implementation
//!
//! Hosts the heartbeat probes and the self-state monitor until interrupted.

use crate::cli::args::{OutputFormat, RunArgs};
use crate::cli::output::{print_output, Message};
use crate::config::Settings;
use crate::error::Result;
use crate::services::Pipeline;

/// Execute the run command
pub async fn run_daemon(
    args: &RunArgs,
    format: OutputFormat,
    mut settings: Settings,
) -> Result<()> {
    if args.no_monitor {
        settings.selfstate.enabled = false;
    }

    log::info!("Starting selfwatch");
    log::info!("  Store: {:?}", settings.store.backend);
    log::info!(
        "  Heartbeat intervals: received {:?}, matched {:?}",
        settings.heartbeat.received_check_interval,
        settings.heartbeat.matched_check_interval
    );
    log::info!("  Self state monitor: {}", settings.selfstate.enabled);

    let pipeline = Pipeline::from_settings(settings)?;
    let supervisor = pipeline.start()?;

    tokio::signal::ctrl_c().await?;
    log::info!("Interrupt received, shutting down");

    supervisor.shutdown().await?;

    print_output(
        &Message {
            message: "Stopped".to_string(),
            success: true,
        },
        format,
    )?;

    Ok(())
}
