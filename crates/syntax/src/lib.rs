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

pub mod ast;
pub mod parser;
pub mod syntax;
pub mod token;
