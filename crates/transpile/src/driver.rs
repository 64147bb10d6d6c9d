//! The line driver: tokenize, classify, emit, track depths, stitch
//! chunks, and assemble the final host source.

use braid_syntax::syntax::SyntaxKind::*;
use braid_syntax::token::tokenize;
use braid_syntax::T;

use crate::classify::{classify, Mode};
use crate::error::{Error, LineError};
use crate::state::State;
use crate::words;
use crate::{host, math, shell, Options};

/// The result of translating one file.
#[derive(Debug, Clone)]
pub struct Output {
    /// The assembled host source.
    pub code: String,
    /// Non-fatal errors collected along the way.
    pub errors: Vec<LineError>,
    /// False when brackets were left unbalanced at EOF; the code is
    /// still usable as a best effort.
    pub balanced: bool,
}

/// Translates source files.
///
/// # Example
///
/// ```
/// use braid_transpile::{Options, Transpiler};
///
/// let out = Transpiler::new(Options::default()).transpile("ls -la\n");
/// assert!(out.code.contains(r#"runtime.Run("ls", "-la")"#));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transpiler {
    options: Options,
}

impl Transpiler {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Translate one source file into host source.
    #[must_use]
    pub fn transpile(&self, source: &str) -> Output {
        let mut state = State::new(self.options.interactive, self.options.record_vars);

        for (i, line) in source.lines().enumerate() {
            state.line_no = i + 1;
            self.line(&mut state, line);
        }

        let balanced =
            state.paren_depth == 0 && state.brace_depth == 0 && state.brack_depth == 0;
        if !balanced {
            state.error(Error::UnclosedBrackets {
                paren: state.paren_depth,
                brace: state.brace_depth,
                brack: state.brack_depth,
            });
        }

        state.flush_chunk();

        Output {
            code: self.assemble(&state),
            errors: state.errors,
            balanced,
        }
    }

    /// Process a single line.
    fn line(&self, state: &mut State, line: &str) {
        if line.trim().is_empty() {
            state.lines.push(String::new());
            return;
        }

        let tokens = tokenize(line);
        for t in tokens.iter() {
            if t.kind == ERROR {
                state.error(Error::Lex {
                    pos: t.pos,
                    text: t.text().to_string(),
                });
            }
        }

        let (split, split_err) = words::split(line);
        let mode = classify(state, line, &tokens, &split);
        tracing::trace!(?mode, line, "classified");

        if tokens.kind(0) == Some(T!["package"]) {
            state.saw_package = true;
        }

        let emitted = match mode {
            Mode::Skip => {
                state.lines.push(String::new());
                return;
            }
            Mode::MathOn => {
                state.math_mode = true;
                state.lines.push(String::new());
                return;
            }
            Mode::MathOff => {
                state.math_mode = false;
                state.lines.push(String::new());
                return;
            }
            Mode::Math => math::rewrite_line(&tokens, line, state),
            Mode::MathLine => {
                let rest = tokens.slice(1..tokens.len());
                let src = tokens
                    .get(1)
                    .map_or("", |t| &line[t.pos as usize - 1..]);
                math::rewrite_line(&rest, src, state)
            }
            Mode::Shell { optional } => {
                if let Some(err) = split_err {
                    state.error(err.into());
                }
                shell::emit(&split.words, false, optional || split.optional, state)
            }
            Mode::Command => {
                let name = tokens.get(1).map_or(String::new(), |t| t.text().to_string());
                shell::emit_command_open(&name, state)
            }
            Mode::Host { strip_braces } => {
                let tokens = if strip_braces {
                    tokens.slice(1..tokens.len() - 1)
                } else {
                    tokens
                };
                host::rewrite(tokens, line, state)
            }
        };

        let depths = emitted.depths();
        state.paren_depth += depths.paren;
        state.brace_depth += depths.brace;
        state.brack_depth += depths.brack;

        let mut text = emitted.code();

        // A closing brace that ends a `command NAME { … }` block also
        // closes the surrounding registration call.
        if state.brace_depth == 0 && depths.brace < 0 && state.last_command_name.take().is_some() {
            text.push(')');
            state.paren_depth -= 1;
        }

        state.lines.push(text);

        if state.brace_depth == 0 {
            state.type_depth = 0;

            // A top-level scope just closed: finish the chunk.
            if depths.brace < 0 {
                state.flush_chunk();
            }
        }
        if state.paren_depth == 0 && state.decl_depth > 0 {
            state.decl_depth = 0;
            state.flush_chunk();
        }
    }

    /// Join the chunks and wrap them in the generated preamble.
    fn assemble(&self, state: &State) -> String {
        let body = state.chunks.join("\n\n");
        let mut out = String::from("// Code generated by \"braid build\"; DO NOT EDIT.\n\n");

        if state.saw_package {
            out.push_str(&body);
            out.push('\n');
            return out;
        }

        let package = self.options.package.as_deref().unwrap_or("main");
        out.push_str(&format!("package {package}\n\n"));

        if package == "main" {
            out.push_str("func main() {\n\truntime := braidrt.New()\n\t_ = runtime\n\n");
            out.push_str(&body);
            out.push_str("\n}\n");
        } else {
            out.push_str(&body);
            out.push('\n');
        }

        out
    }
}
