use clap::Parser;
use sisp::cli::{Cli, log_filter, run};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .init();
    run(cli)
}
