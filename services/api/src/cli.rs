use crate::demo::{run_demo, run_timeline, DemoArgs, TimelineArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_tracker::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Tracker",
    about = "Track loan application progress and the document checklist from the command line",
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
    /// Print projected timelines for one application or a CSV roster
    Timeline(TimelineArgs),
    /// Walk a sample application and three uploads through the dashboard
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
    /// Seed the in-memory repository from an application roster CSV
    #[arg(long)]
    pub(crate) applications_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Timeline(args) => run_timeline(args),
        Command::Demo(args) => run_demo(args),
    }
}
