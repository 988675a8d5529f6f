use chrono::Utc;
use clap::{CommandFactory, Parser};
use gcal::commands::{self, Cli};
use gcal::components::google_calendar;
use gcal::error::usage_error;
use gcal::startup;
use std::io;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Parse first so --help works without any configuration
    let cli = Cli::parse();

    startup::init_logging()?;

    let Some(command) = cli.command else {
        Cli::command().print_help().map_err(gcal::error::Error::from)?;
        println!();
        return Err(usage_error("No subcommand given").into());
    };

    let config = startup::load_config()?;
    let client = google_calendar::connect(&config).await?;
    info!("Running {:?}", command);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(command, &config, &client, Utc::now(), &mut out).await?;

    Ok(())
}
