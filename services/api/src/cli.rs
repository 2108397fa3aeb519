use crate::demo::{run_demo, run_eligibility_report, DemoArgs, EligibilityArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hiperfarma_meeting::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Hiperfarma Business Meeting Manager",
    about = "Run the business meeting manager service, sweepstake demo and eligibility reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the current draw pool of every award tier
    Eligibility(EligibilityArgs),
    /// Seed mock data in memory and run every tier's sweepstake to exhaustion
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the JSON snapshot file holding the event
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Eligibility(args) => run_eligibility_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
