use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    glossdb::cli::run_cli()
}
