use clap::Args;
use milvue_client::{Milvue, ReportKind};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Report to fetch: smarturgences or smartxpert.
    pub kind: ReportKind,
    /// Study instance UID of the job.
    pub study: String,
}

pub fn handle_command(args: ReportArgs, milvue: &Milvue) -> anyhow::Result<()> {
    let report: serde_json::Value = milvue.get_report(args.kind, &args.study)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
