use std::time::Duration;

use clap::Args;
use milvue_client::{Milvue, WaitOptions};

use super::status::print_status;

#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Study instance UID of the job.
    pub study: String,
    /// Seconds between two polls.
    #[arg(long, default_value_t = 5)]
    pub interval: u64,
    /// Seconds after which waiting is abandoned.
    #[arg(long, default_value_t = 600)]
    pub total_wait: u64,
}

pub fn handle_command(args: WaitArgs, milvue: &Milvue) -> anyhow::Result<()> {
    let options = WaitOptions::new(
        Duration::from_secs(args.interval),
        Duration::from_secs(args.total_wait),
    );
    let response = milvue.wait_done(&args.study, options)?;
    print_status(&response);
    Ok(())
}
