use crate::batch::{run_batch, BatchArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::interview::{run_interview, InterviewArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_intake::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Intake",
    about = "Collect loan applications through a guided interview and score them",
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
    /// Run the interview in the terminal
    Interview(InterviewArgs),
    /// Score a CSV of applicants through the same validation as the interview
    Batch(BatchArgs),
    /// Walk the reference applicant through the interview non-interactively
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
    /// Scorecard JSON to load instead of APP_SCORECARD_PATH
    #[arg(long)]
    pub(crate) scorecard: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Interview(args) => run_interview(args),
        Command::Batch(args) => run_batch(args),
        Command::Demo(args) => run_demo(args),
    }
}
