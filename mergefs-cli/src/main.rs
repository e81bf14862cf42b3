//! CLI entrypoint for `mergecat`.

use clap::Parser;
use mergecat::cli::Args;
use mergecat::error::CliError;
use mergecat::{logging, run};

fn main() -> Result<(), CliError> {
    logging::init()?;
    let args = Args::parse();
    run(&args, &mut std::io::stdout().lock())
}
