use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use milvue_client::{
    DEFAULT_ENDPOINT, ENDPOINT_ENV, Milvue, MilvueCredentials, MilvueError, TIMEOUT_ENV, TOKEN_ENV,
};

use crate::commands;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "milvue",
    version,
    about = "Poll Milvue inference jobs and retrieve their results"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Base URL of the API.
    #[arg(long, global = true, env = ENDPOINT_ENV, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
    /// Access token sent with every request.
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,
    /// Timeout of each HTTP request in seconds, 0 disables it.
    #[arg(long, global = true, env = TIMEOUT_ENV, default_value_t = 60)]
    pub timeout: u64,
}

impl ConnectionArgs {
    pub fn connect(&self) -> anyhow::Result<Milvue> {
        let token = self
            .token
            .as_deref()
            .with_context(|| format!("No access token: pass --token or set {TOKEN_ENV}"))?;
        let credentials = MilvueCredentials::from_str(token).map_err(anyhow::Error::msg)?;

        let milvue = Milvue::builder(credentials)
            .with_endpoint(&self.endpoint)
            .with_timeout(Duration::from_secs(self.timeout))
            .build()?;
        Ok(milvue)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the status of the job of a study.
    Status(commands::status::StatusArgs),
    /// Wait until the job of a study is done or failed.
    Wait(commands::wait::WaitArgs),
    /// Retrieve the artifacts produced for a study.
    Get(commands::get::GetArgs),
    /// Print the JSON report of a study.
    Report(commands::report::ReportArgs),
}

pub fn cli_main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init();

    match handle_command(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<MilvueError>() {
            Some(error) if error.is_retryable() => {
                eprintln!("{} {error}, retry later", "warning:".yellow().bold());
                ExitCode::from(2)
            }
            _ => {
                eprintln!("{} {e:#}", "error:".red().bold());
                ExitCode::FAILURE
            }
        },
    }
}

fn handle_command(args: CliArgs) -> anyhow::Result<()> {
    let milvue = args.connection.connect()?;
    log::debug!("Using endpoint {}", milvue.endpoint());

    match args.command {
        Commands::Status(status_args) => commands::status::handle_command(status_args, &milvue),
        Commands::Wait(wait_args) => commands::wait::handle_command(wait_args, &milvue),
        Commands::Get(get_args) => commands::get::handle_command(get_args, &milvue),
        Commands::Report(report_args) => commands::report::handle_command(report_args, &milvue),
    }
}
