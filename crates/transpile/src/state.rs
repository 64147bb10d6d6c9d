//! Per-file translation state.

use crate::error::{Error, LineError};

/// Mutable state threaded through the translation of one file.
///
/// Bracket depths are updated from every emitted line; when a
/// syntactically complete file has been processed they are all back to
/// zero, and anything else is reported as an incomplete-brackets
/// error.
#[derive(Debug, Default)]
pub struct State {
    pub paren_depth: i32,
    pub brace_depth: i32,
    pub brack_depth: i32,

    /// Open `type …{` scopes; their bodies never reclassify.
    pub type_depth: i32,
    /// Open grouped `import`/`var`/`const`/`type` `(…)` scopes.
    pub decl_depth: i32,

    /// Sticky whole-line math mode, toggled by `##`.
    pub math_mode: bool,

    /// Rewrite top-level `func NAME(…)` into `NAME := func(…)`.
    pub func_to_var: bool,
    /// Register fresh math bindings in the data filesystem.
    pub math_record: bool,

    /// Finished output chunks; each compiles in isolation.
    pub chunks: Vec<String>,
    /// Lines of the chunk in progress.
    pub lines: Vec<String>,

    pub errors: Vec<LineError>,
    /// 1-based line currently being translated, for error records.
    pub line_no: usize,

    /// Name of the `command NAME {` block currently open, so its
    /// closing brace can finish the registration call.
    pub last_command_name: Option<String>,
    /// Command aliases defined so far in this file.
    pub commands: Vec<String>,

    pub saw_package: bool,
}

impl State {
    #[must_use]
    pub fn new(func_to_var: bool, math_record: bool) -> Self {
        Self {
            func_to_var,
            math_record,
            ..Self::default()
        }
    }

    /// Record a non-fatal error against the current line.
    pub fn error(&mut self, error: Error) {
        tracing::debug!(line = self.line_no, %error, "translation error");
        self.errors.push(LineError {
            line: self.line_no,
            error,
        });
    }

    /// Whether a command alias with this name was defined earlier in
    /// the file.
    #[must_use]
    pub fn is_command(&self, name: &str) -> bool {
        self.commands.iter().any(|c| c == name)
    }

    /// Close out the current chunk, if it has any content.
    pub fn flush_chunk(&mut self) {
        if !self.lines.is_empty() {
            self.chunks.push(self.lines.join("\n"));
            self.lines.clear();
        }
    }
}
