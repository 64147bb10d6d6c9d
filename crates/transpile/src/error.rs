//! Error kinds collected while translating a file.
//!
//! None of these abort translation: they accumulate per file and the
//! caller decides how to report them. Only the bracket-depth check at
//! the end of a file affects the exit status.

use braid_syntax::parser::ParseError;
use thiserror::Error;

use crate::words::SplitError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Bytes the lexer could not make sense of. The original
    /// characters are kept in the output.
    #[error("invalid input {text:?}")]
    Lex { pos: u32, text: String },

    #[error(transparent)]
    Split(#[from] SplitError),

    /// A math span that does not reparse as a host expression. The
    /// original tokens pass through unchanged.
    #[error("math expression {src:?}: {err}")]
    MathParse { src: String, err: ParseError },

    /// A math construct the walker rejects outright.
    #[error("math expression {src:?}: {msg}")]
    Math { src: String, msg: String },

    /// Unbalanced brackets at the end of the file.
    #[error("incomplete brackets at end of file ({})", describe_depths(.paren, .brace, .brack))]
    UnclosedBrackets { paren: i32, brace: i32, brack: i32 },
}

/// An error tied to the 1-based source line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {error}")]
pub struct LineError {
    pub line: usize,
    pub error: Error,
}

fn describe_depths(paren: &i32, brace: &i32, brack: &i32) -> String {
    let mut parts = Vec::new();
    for (count, open, close) in [(*paren, "(", ")"), (*brace, "{", "}"), (*brack, "[", "]")] {
        if count > 0 {
            parts.push(format!("{count} unclosed {open}"));
        } else if count < 0 {
            parts.push(format!("{} extra {close}", -count));
        }
    }
    parts.join(", ")
}
