use clap::{crate_version, ArgEnum, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Clone, Parser)]
#[clap(name = "braid")]
#[clap(bin_name = "braid")]
#[clap(version = crate_version!())]
pub struct BraidArgs {
    #[clap(long, arg_enum, global = true, default_value = "auto")]
    pub colors: Colors,
    /// Enable a verbose logging format.
    #[clap(long, global = true)]
    pub verbose: bool,
    #[clap(subcommand)]
    pub cmd: RootCommand,
}

#[derive(Clone, Subcommand)]
pub enum RootCommand {
    /// Translate source files into host sources.
    Build(BuildCommand),
}

#[derive(Clone, clap::Args)]
pub struct BuildCommand {
    /// Input files.
    #[clap(required = true)]
    pub files: Vec<PathBuf>,
    /// Output path; `-` writes to the standard output. Only valid
    /// with a single input file.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
    /// Rewrite top-level functions into variable bindings.
    #[clap(long)]
    pub interactive: bool,
    /// Record fresh math bindings in the data filesystem.
    #[clap(long)]
    pub record: bool,
    /// Package name used when the source has no package clause.
    #[clap(long)]
    pub package: Option<String>,
}

#[derive(Clone, Copy, ArgEnum)]
pub enum Colors {
    /// Determine whether to colorize output automatically.
    Auto,
    /// Always colorize output.
    Always,
    /// Never colorize output.
    Never,
}
