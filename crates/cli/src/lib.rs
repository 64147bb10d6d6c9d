#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod args;
mod execute;
pub mod log;

use args::{BraidArgs, Colors, RootCommand};

/// Exit status of a CLI run: 0 for success, 1 when unmatched brackets
/// were reported (partial output is still written).
pub type ExitStatus = i32;

pub struct Braid {
    colors: bool,
}

impl Braid {
    #[must_use]
    pub fn new() -> Self {
        Self { colors: false }
    }

    pub fn execute(&mut self, args: BraidArgs) -> Result<ExitStatus, anyhow::Error> {
        self.colors = match args.colors {
            Colors::Auto => atty::is(atty::Stream::Stderr),
            Colors::Always => true,
            Colors::Never => false,
        };

        match args.cmd {
            RootCommand::Build(cmd) => self.execute_build(cmd),
        }
    }
}

impl Default for Braid {
    fn default() -> Self {
        Self::new()
    }
}
