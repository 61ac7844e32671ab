use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use colored::Colorize;
use milvue_client::{Milvue, RawArtifact, ResultRequest};

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Study instance UID of the job.
    pub study: String,
    /// Inference command whose results are retrieved.
    #[arg(long)]
    pub command: String,
    /// Download each artifact from a signed URL instead of inline.
    #[arg(long)]
    pub signed_url: bool,
    /// Write the artifacts to this directory instead of listing them.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Extra query parameter, as `key=value`. May be repeated.
    #[arg(long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
}

pub fn handle_command(args: GetArgs, milvue: &Milvue) -> anyhow::Result<()> {
    let request = args
        .params
        .iter()
        .fold(ResultRequest::new(&args.study, &args.command), |request, (key, value)| {
            request.with_param(key, value)
        });

    match &args.out {
        Some(folder) => {
            let paths = if args.signed_url {
                milvue.get_signed_url_to_file(&request, folder)?
            } else {
                milvue.get_to_file(&request, folder)?
            };
            for path in &paths {
                println!("{}", path.display());
            }
        }
        None => {
            let artifacts: Vec<RawArtifact> = if args.signed_url {
                milvue.get_signed_url(&request)?
            } else {
                milvue.get(&request)?
            };
            println!(
                "{} artifact(s) for study {}",
                artifacts.len().to_string().bold(),
                args.study
            );
            for (index, artifact) in artifacts.iter().enumerate() {
                println!("  #{} {} bytes", index + 1, artifact.len());
            }
        }
    }

    Ok(())
}

fn parse_key_val(s: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .with_context(|| format!("expected key=value, got `{s}`"))?;
    if key.is_empty() {
        anyhow::bail!("empty parameter name in `{s}`");
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("language=fr", ("language", "fr"))]
    #[case("filter=a=b", ("filter", "a=b"))]
    #[case("empty=", ("empty", ""))]
    fn should_parse_key_value(#[case] input: &str, #[case] expected: (&str, &str)) {
        let (key, value) = parse_key_val(input).unwrap();
        assert_eq!((key.as_str(), value.as_str()), expected);
    }

    #[rstest]
    #[case("novalue")]
    #[case("=value")]
    fn should_reject_malformed_key_value(#[case] input: &str) {
        assert!(parse_key_val(input).is_err());
    }
}
