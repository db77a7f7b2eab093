use bikeyard::adapter::inbound::cli::command::{Cli, ColorChoice};
use bikeyard::adapter::inbound::cli::diagnostic::CommandFailed;
use bikeyard::adapter::inbound::cli::output::{self, OutputConfig};
use bikeyard::adapter::inbound::cli::run;
use bikeyard::infrastructure::config::Config;
use clap::Parser;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let config = Config::load_or_default(&cli.config).map_err(CommandFailed::from)?;

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => config.logging.level.as_str(),
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    config.logging.with_level(level).init();
    debug!(config = %cli.config.display(), "bikeyard starting");

    if let Err(err) = run::execute(&cli.command, &config).await {
        error!(error = %err, "Command failed");
        return Err(CommandFailed::from(err).into());
    }
    Ok(())
}
