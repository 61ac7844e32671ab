use std::process::ExitCode;

fn main() -> ExitCode {
    milvue_cli::cli::cli_main()
}
