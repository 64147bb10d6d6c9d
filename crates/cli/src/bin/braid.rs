use braid_cli::args::{BraidArgs, Colors};
use braid_cli::{log::setup_stderr_logging, Braid};
use clap::Parser;
use std::process::exit;

fn main() {
    let cli = BraidArgs::parse();
    setup_stderr_logging(
        cli.verbose,
        match cli.colors {
            Colors::Auto => None,
            Colors::Always => Some(true),
            Colors::Never => Some(false),
        },
    );

    match Braid::new().execute(cli) {
        Ok(status) => {
            exit(status);
        }
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "operation failed");
            exit(1);
        }
    }
}
