use clap::Args;
use colored::Colorize;
use milvue_client::{JobStatus, Milvue, StatusResponse};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Study instance UID of the job.
    pub study: String,
}

pub fn handle_command(args: StatusArgs, milvue: &Milvue) -> anyhow::Result<()> {
    let response = milvue.get_status(&args.study)?;
    print_status(&response);
    Ok(())
}

pub(crate) fn print_status(response: &StatusResponse) {
    let status = match response.status {
        JobStatus::Done => response.status.as_str().green(),
        JobStatus::Error => response.status.as_str().red(),
        _ => response.status.as_str().yellow(),
    };
    println!(
        "{} {status} (version {})",
        response.study_instance_uid.bold(),
        response.version
    );
}
