#![warn(clippy::pedantic)]
#![allow(
    clippy::single_match,
    clippy::wildcard_imports,
    clippy::too_many_lines,
    clippy::enum_glob_use,
    clippy::cast_possible_truncation,
    clippy::cast_lossless,
    clippy::module_name_repetitions,
    clippy::single_match_else,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::match_like_matches_macro
)]

//! Translation of mixed-mode source files into pure host source.
//!
//! A source line is either host code (passed through, with a few
//! rewrites), a shell command (lowered onto the `runtime` object), or
//! math notation (lowered onto the tensor libraries). The
//! [`classify`] module decides which, line by line; [`Transpiler`]
//! drives whole files.

pub mod classify;
mod driver;
mod error;
mod host;
mod math;
mod shell;
mod state;
pub mod words;

pub use driver::{Output, Transpiler};
pub use error::{Error, LineError};
pub use state::State;

use serde::{Deserialize, Serialize};

/// Translation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// Interactive translation: top-level `func NAME(…)` becomes
    /// `NAME := func(…)` so definitions can be replaced.
    pub interactive: bool,
    /// Register every fresh math binding in the data filesystem under
    /// its own name.
    pub record_vars: bool,
    /// Package name used when the source has no `package` clause.
    pub package: Option<String>,
}
