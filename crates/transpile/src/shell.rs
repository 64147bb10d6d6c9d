//! Rewriting shell word sequences into runtime calls.
//!
//! A single command becomes one `runtime.FUNC(…)` call with every
//! word as a quoted string argument. Pipes and `;` split the sequence
//! into several calls; `&` and the `[ … ]` wrapper pick a different
//! FUNC. `{ … }` words splice in host expressions.

use braid_syntax::token::{Token, Tokens};
use braid_syntax::T;

use crate::host;
use crate::state::State;
use crate::words::Word;

/// The runtime method a command lowers to.
fn select_func(need_output: bool, optional: bool, start: bool) -> &'static str {
    if start {
        return "Start";
    }
    match (need_output, optional) {
        (false, false) => "Run",
        (false, true) => "RunErrOK",
        (true, false) => "Output",
        (true, true) => "OutputErrOK",
    }
}

/// Emit a whole shell line (possibly several `;`/pipe-separated
/// statements).
pub(crate) fn emit(
    words: &[Word],
    need_output: bool,
    optional: bool,
    state: &mut State,
) -> Tokens {
    let mut out = Tokens::new();
    emit_stmt(words, need_output, optional, state, &mut out);
    out
}

fn emit_stmt(
    words: &[Word],
    need_output: bool,
    optional: bool,
    state: &mut State,
    out: &mut Tokens,
) {
    // Strip the optional wrapper and background markers; they only
    // select the runtime method.
    let words: Vec<&Word> = words
        .iter()
        .filter(|w| !matches!(w.text.as_str(), "[" | "]"))
        .collect();

    if words.is_empty() {
        return;
    }

    let mut background = false;
    let mut args: Vec<&Word> = Vec::new();
    let mut rest: Option<&[&Word]> = None;
    let mut piped = false;

    for (i, w) in words.iter().enumerate() {
        match w.text.as_str() {
            ";" if !w.braced => {
                rest = Some(&words[i + 1..]);
                break;
            }
            "&" if !w.braced => {
                background = true;
            }
            _ if w.is_pipe() => {
                // The pipe itself is passed along, and the producing
                // command must not block.
                args.push(*w);
                piped = true;
                rest = Some(&words[i + 1..]);
                break;
            }
            _ => args.push(*w),
        }
    }

    if !args.is_empty() {
        emit_call(&args, need_output, optional, background || piped, state, out);
    }

    if let Some(rest) = rest {
        if !rest.is_empty() {
            if !out.is_empty() {
                out.tok(T![";"]);
            }
            let rest: Vec<Word> = rest.iter().map(|w| (*w).clone()).collect();
            emit_stmt(&rest, need_output, optional, state, out);
        }
    }
}

/// One `runtime.FUNC(arg, …)` call.
fn emit_call(
    args: &[&Word],
    need_output: bool,
    optional: bool,
    start: bool,
    state: &mut State,
    out: &mut Tokens,
) {
    // A first word naming a command alias defined earlier dispatches
    // through the command registry instead.
    if let Some(first) = args.first() {
        if !first.braced && state.is_command(&first.text) {
            emit_run_commands(args, state, out);
            return;
        }
    }

    out.ident("runtime");
    out.tok(T!["."]);
    out.ident(select_func(need_output, optional, start));
    out.tok(T!["("]);

    let mut i = 0;
    let mut first = true;
    while i < args.len() {
        let w = args[i];

        if !first {
            out.tok(T![","]);
        }
        first = false;

        if w.text == "{" && !w.braced {
            // `{`, interior, `}`: evaluate the interior as a host
            // expression and splice it in as one argument.
            if let Some(interior) = args.get(i + 1) {
                let inner = braid_syntax::token::tokenize(&interior.text);
                out.extend(host::rewrite(inner, &interior.text, state));
            }
            i += 3;
            continue;
        }

        push_word(w, state, out);
        i += 1;
    }

    out.tok(T![")"]);
}

/// `runtime.RunCommands([]any{"name", args…})`.
fn emit_run_commands(args: &[&Word], state: &mut State, out: &mut Tokens) {
    out.ident("runtime");
    out.tok(T!["."]);
    out.ident("RunCommands");
    out.tok(T!["("]);
    out.tok(T!["["]);
    out.tok(T!["]"]);
    out.ident("any");
    out.tok(T!["{"]);

    for (i, w) in args.iter().enumerate() {
        if i > 0 {
            out.tok(T![","]);
        }
        push_word(w, state, out);
    }

    out.tok(T!["}"]);
    out.tok(T![")"]);
}

fn push_word(w: &Word, state: &mut State, out: &mut Tokens) {
    // Inside a command body the positional arguments pass through
    // unquoted.
    if w.text == "args..." && state.last_command_name.is_some() {
        out.ident("args");
        out.tok(T!["..."]);
        return;
    }

    if w.is_quoted() {
        out.push(Token::lit_str(w.text.clone()));
    } else {
        out.push(Token::quoted(&w.text));
    }
}

/// The opening of a `command NAME { … }` definition:
/// `runtime.AddCommand("NAME", func(args ...string) {`.
///
/// The driver appends the closing `)` of the `AddCommand` call when
/// the user's brace closes.
pub(crate) fn emit_command_open(name: &str, state: &mut State) -> Tokens {
    let mut out = Tokens::new();
    out.ident("runtime");
    out.tok(T!["."]);
    out.ident("AddCommand");
    out.tok(T!["("]);
    out.push(Token::quoted(name));
    out.tok(T![","]);
    out.tok(T!["func"]);
    out.tok(T!["("]);
    out.ident("args");
    out.tok(T!["..."]);
    out.ident("string");
    out.tok(T![")"]);
    out.tok(T!["{"]);

    state.last_command_name = Some(name.to_string());
    state.commands.push(name.to_string());

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words;
    use pretty_assertions::assert_eq;

    fn emit_line(line: &str) -> String {
        let mut state = State::default();
        let (split, _) = words::split(line);
        emit(&split.words, false, split.optional, &mut state).code()
    }

    #[test]
    fn run_simple() {
        assert_eq!(emit_line("ls -la"), r#"runtime.Run("ls", "-la")"#);
    }

    #[test]
    fn optional_failure() {
        assert_eq!(emit_line("[mkdir sub]"), r#"runtime.RunErrOK("mkdir", "sub")"#);
    }

    #[test]
    fn background_start() {
        assert_eq!(emit_line("go build &"), r#"runtime.Start("go", "build")"#);
    }

    #[test]
    fn pipe_splits_and_starts() {
        assert_eq!(
            emit_line("cat file | grep -v exe > test.out"),
            r#"runtime.Start("cat", "file", "|"); runtime.Run("grep", "-v", "exe", ">", "test.out")"#
        );
    }

    #[test]
    fn semicolon_splits() {
        assert_eq!(
            emit_line("mkdir x; cd x"),
            r#"runtime.Run("mkdir", "x"); runtime.Run("cd", "x")"#
        );
    }

    #[test]
    fn quoted_words_pass_through() {
        assert_eq!(
            emit_line(r#"echo "a b c""#),
            r#"runtime.Run("echo", "a b c")"#
        );
    }

    #[test]
    fn interior_quotes_escaped() {
        assert_eq!(
            emit_line(r#"grep he"llo"#),
            r#"runtime.Run("grep", "he\"llo")"#
        );
    }

    #[test]
    fn braced_host_expression() {
        let mut state = State::default();
        let (split, _) = words::split("echo {x + 1}");
        let out = emit(&split.words, false, false, &mut state).code();
        assert_eq!(out, r#"runtime.Run("echo", x + 1)"#);
    }

    #[test]
    fn command_alias_dispatch() {
        let mut state = State::default();
        state.commands.push("build".into());
        let (split, _) = words::split("build all");
        let out = emit(&split.words, false, false, &mut state).code();
        assert_eq!(out, r#"runtime.RunCommands([]any{"build", "all"})"#);
    }

    #[test]
    fn command_open() {
        let mut state = State::default();
        let out = emit_command_open("build", &mut state).code();
        assert_eq!(out, r#"runtime.AddCommand("build", func(args ...string) {"#);
        assert_eq!(state.last_command_name.as_deref(), Some("build"));
        assert!(state.is_command("build"));
    }

    #[test]
    fn output_value_position() {
        let mut state = State::default();
        let (split, _) = words::split("cat file");
        let out = emit(&split.words, true, false, &mut state).code();
        assert_eq!(out, r#"runtime.Output("cat", "file")"#);
    }

    #[test]
    fn remote_host_prefix_is_plain_argument() {
        assert_eq!(
            emit_line("scp @cluster:data.csv ."),
            r#"runtime.Run("scp", "@cluster:data.csv", ".")"#
        );
    }

    #[test]
    fn backtick_words_stay_raw_strings() {
        assert_eq!(
            emit_line(r"grep `a|b` log"),
            r#"runtime.Run("grep", `a|b`, "log")"#
        );
    }
}
