//! vgreport - HTML and text reports from Valgrind XML output.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use vgreport::cli::Cli;
use vgreport::{logging, run};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    let mut stdout = std::io::stdout();
    let code = match run::run(&cli, &cwd, &mut stdout.lock()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("vgreport: {}", e);
            e.exit_code()
        }
    };
    stdout.flush().context("cannot flush stdout")?;
    std::process::exit(code)
}
