//! Per-line mode classification.
//!
//! Every line is classified exactly once into one of the three
//! sublanguages (or a handful of driver directives). The decision
//! table is ordered; the first matching row wins, and there is no
//! "ambiguous" outcome.

use braid_syntax::syntax::SyntaxKind::*;
use braid_syntax::token::Tokens;
use braid_syntax::T;

use crate::state::State;
use crate::words::Split;

/// What the driver should do with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Emit nothing (shebang).
    Skip,
    /// Turn sticky math mode on, emit nothing.
    MathOn,
    /// Turn sticky math mode off, emit nothing.
    MathOff,
    /// The whole line is a math statement.
    Math,
    /// The tokens after the leading `#` are a math statement.
    MathLine,
    Shell {
        optional: bool,
    },
    /// `command NAME {` opens a command-alias definition.
    Command,
    Host {
        strip_braces: bool,
    },
}

/// Classify one line. Declaration-opening lines bump the type/decl
/// depths on `state` as a side effect.
pub fn classify(state: &mut State, line: &str, tokens: &Tokens, split: &Split) -> Mode {
    let trimmed = line.trim();

    if state.math_mode {
        if trimmed == "##" {
            return Mode::MathOff;
        }
        return Mode::Math;
    }

    if trimmed.starts_with("#!") {
        return Mode::Skip;
    }

    let first = match tokens.first() {
        Some(t) => t,
        None => return Mode::Host { strip_braces: false },
    };

    match first.kind {
        // A second `#` turns sticky math mode on; anything after the
        // pair is discarded along with the markers.
        HASH if tokens.kind(1) == Some(HASH) => return Mode::MathOn,
        HASH => return Mode::MathLine,
        SHEBANG => return Mode::Skip,
        DOLLAR => return Mode::Shell { optional: false },
        _ => {}
    }

    if state.type_depth > 0 || state.decl_depth > 0 {
        return Mode::Host { strip_braces: false };
    }

    // Declaration openers.
    let depths = tokens.depths();
    match first.kind {
        T!["type"] => {
            if tokens.kind(1) == Some(T!["("]) && depths.paren > 0 {
                state.decl_depth += 1;
            } else if depths.brace > 0 {
                state.type_depth += 1;
            }
            return Mode::Host { strip_braces: false };
        }
        T!["import"] | T!["var"] | T!["const"] => {
            if tokens.kind(1) == Some(T!["("]) && depths.paren > 0 {
                state.decl_depth += 1;
            }
            return Mode::Host { strip_braces: false };
        }
        _ => {}
    }

    if first.kind == T!["{"] && tokens.right_matching(0) == Some(tokens.len() - 1) {
        return Mode::Host { strip_braces: true };
    }

    if first.kind == T!["["] {
        return Mode::Shell { optional: true };
    }

    if first.kind == IDENT
        && first.text() == "command"
        && tokens.kind(1) == Some(IDENT)
        && tokens.last().map(|t| t.kind) == Some(T!["{"])
    {
        return Mode::Command;
    }

    let has_paren = tokens.iter().any(|t| t.kind == T!["("]);

    if first.kind.is_keyword() && first.kind != T!["go"] && !has_paren {
        return Mode::Host { strip_braces: false };
    }

    if first.kind == T!["go"] && !has_paren {
        // No call syntax in sight: this runs the external `go` tool.
        return Mode::Shell { optional: false };
    }

    if matches!(tokens.last().map(|t| t.kind), Some(T!["++"] | T!["--"])) {
        return Mode::Host { strip_braces: false };
    }

    let first_word = split.words.iter().find(|w| w.text != "[").map(|w| w.text.as_str());

    if first_word.map_or(false, is_path_like) {
        return Mode::Shell { optional: false };
    }

    if first.kind == LIT_STR {
        return Mode::Shell { optional: false };
    }

    let command_like = first_word.map_or(false, is_command_like);

    if command_like && split.words.len() == 1 {
        return Mode::Shell { optional: false };
    }

    if first.kind != IDENT {
        return Mode::Host { strip_braces: false };
    }

    if command_like {
        // An assignment or definition: the second word carries the
        // operator, or the second token is the `,` of a tuple
        // assignment.
        let second = split.words.get(1).map(|w| w.text.as_str()).unwrap_or("");
        if second.starts_with('=') || second.starts_with(':') || second.starts_with('+')
            || tokens.kind(1) == Some(T![","])
        {
            return Mode::Host { strip_braces: false };
        }

        return Mode::Shell { optional: false };
    }

    Mode::Host { strip_braces: false }
}

/// A bare identifier-like name: callable as an external command.
fn is_command_like(word: &str) -> bool {
    word.chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && !word.contains('(')
        && !word.contains('=')
}

/// Whether a first word starts a filesystem path or URL.
fn is_path_like(word: &str) -> bool {
    word == "."
        || word == ".."
        || word.starts_with('/')
        || word.starts_with("./")
        || word.starts_with("../")
        || word.starts_with("~/")
        || word.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words;
    use braid_syntax::token::tokenize;

    fn run(state: &mut State, line: &str) -> Mode {
        let tokens = tokenize(line);
        let (split, _) = words::split(line);
        classify(state, line, &tokens, &split)
    }

    fn mode(line: &str) -> Mode {
        run(&mut State::default(), line)
    }

    const SHELL: Mode = Mode::Shell { optional: false };
    const HOST: Mode = Mode::Host { strip_braces: false };

    #[test]
    fn sticky_math_mode() {
        let mut state = State::default();
        state.math_mode = true;
        assert_eq!(run(&mut state, "x + 1"), Mode::Math);
        assert_eq!(run(&mut state, "##"), Mode::MathOff);
    }

    #[test]
    fn math_toggles_and_lines() {
        assert_eq!(mode("##"), Mode::MathOn);
        assert_eq!(mode("## start of a math block"), Mode::MathOn);
        assert_eq!(mode("# x := a + 1"), Mode::MathLine);
    }

    #[test]
    fn shebang_is_skipped() {
        assert_eq!(mode("#!/usr/bin/env braid"), Mode::Skip);
    }

    #[test]
    fn explicit_shell_marker() {
        assert_eq!(mode("$ ls -la"), SHELL);
    }

    #[test]
    fn open_declarations_stay_host() {
        let mut state = State::default();
        state.decl_depth = 1;
        assert_eq!(run(&mut state, "ls"), HOST);

        let mut state = State::default();
        state.type_depth = 1;
        assert_eq!(run(&mut state, "Name string"), HOST);
    }

    #[test]
    fn declaration_openers_bump_depths() {
        let mut state = State::default();
        assert_eq!(run(&mut state, "import ("), HOST);
        assert_eq!(state.decl_depth, 1);

        let mut state = State::default();
        assert_eq!(run(&mut state, "type Config struct {"), HOST);
        assert_eq!(state.type_depth, 1);
    }

    #[test]
    fn braced_host_line() {
        assert_eq!(mode("{ x := 1 }"), Mode::Host { strip_braces: true });
    }

    #[test]
    fn optional_shell() {
        assert_eq!(mode("[mkdir sub]"), Mode::Shell { optional: true });
    }

    #[test]
    fn command_definition() {
        assert_eq!(mode("command build {"), Mode::Command);
    }

    #[test]
    fn keywords_without_parens() {
        assert_eq!(mode("return x"), HOST);
        assert_eq!(mode("go build"), SHELL);
        assert_eq!(mode("go func() {"), HOST);
    }

    #[test]
    fn incdec_is_host() {
        assert_eq!(mode("i++"), HOST);
    }

    #[test]
    fn paths_and_urls_are_shell() {
        assert_eq!(mode("./run.sh --fast"), SHELL);
        assert_eq!(mode("/bin/echo hi"), SHELL);
        assert_eq!(mode("https://example.com/x"), SHELL);
    }

    #[test]
    fn leading_string_is_shell() {
        assert_eq!(mode(r#""my program" arg"#), SHELL);
    }

    #[test]
    fn single_bare_identifier_is_shell() {
        assert_eq!(mode("ls"), SHELL);
    }

    #[test]
    fn assignments_are_host() {
        assert_eq!(mode("x = 1"), HOST);
        assert_eq!(mode("x := f(1)"), HOST);
        assert_eq!(mode("x += 2"), HOST);
        assert_eq!(mode("a, b := f()"), HOST);
        assert_eq!(mode("x + 1"), HOST);
    }

    #[test]
    fn command_with_args_is_shell() {
        assert_eq!(mode("ls -la"), SHELL);
        assert_eq!(mode("cat file | grep x"), SHELL);
    }

    #[test]
    fn calls_are_host() {
        assert_eq!(mode(r#"fmt.Println("hi")"#), HOST);
        assert_eq!(mode("3 + 4"), HOST);
    }

    #[test]
    fn lone_braces_are_host() {
        assert_eq!(mode("{"), HOST);
        assert_eq!(mode("}"), HOST);
        assert_eq!(mode("} else {"), HOST);
    }
}
