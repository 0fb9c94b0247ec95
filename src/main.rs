use clap::Parser;
use replenish::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
