//! Rewrites applied to lines that stay in the host language.
//!
//! Three things can still happen on a host line: inline `#…#` /
//! `$…$` spans are spliced out to the math and shell emitters,
//! interactive mode turns top-level `func NAME` into a variable
//! binding, and multi-dimensional indexing is lowered onto the tensor
//! accessors.

use braid_syntax::syntax::SyntaxKind::*;
use braid_syntax::token::Tokens;
use braid_syntax::T;

use crate::state::State;
use crate::words;
use crate::{math, shell};

/// Rewrite one host-mode token sequence. `src` is the original line,
/// used to recover the exact text of inline spans from token
/// positions.
pub(crate) fn rewrite(tokens: Tokens, src: &str, state: &mut State) -> Tokens {
    let tokens = func_to_var(tokens, state);

    let mut out = Tokens::new();
    let mut i = 0;

    while i < tokens.len() {
        let t = &tokens[i];

        match t.kind {
            HASH => {
                if let Some(end) = tokens.mode_end(i) {
                    let inner = tokens.slice(i + 1..end);
                    out.extend(math::rewrite_expr(&inner, state));
                    i = end + 1;
                    continue;
                }
                out.push(t.clone());
            }
            DOLLAR => {
                if let Some(end) = tokens.mode_end(i) {
                    let inner = tokens.slice(i + 1..end);
                    let (split, err) = words::split(&span_text(&inner, src));
                    if let Some(err) = err {
                        state.error(err.into());
                    }
                    out.extend(shell::emit(&split.words, true, split.optional, state));
                    i = end + 1;
                    continue;
                }
                out.push(t.clone());
            }
            IDENT if tokens.kind(i + 1) == Some(T!["["]) => {
                if let Some(consumed) = try_nd_index(&tokens, i, src, state, &mut out) {
                    i = consumed;
                    continue;
                }
                out.push(t.clone());
            }
            _ => out.push(t.clone()),
        }

        i += 1;
    }

    out
}

/// The source substring covered by a token span, recovered from the
/// first and last byte positions. Falls back to reconstruction for
/// manufactured tokens.
fn span_text(tokens: &Tokens, src: &str) -> String {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return String::new();
    };

    if first.pos == 0 || last.pos == 0 {
        return tokens.code();
    }

    let start = first.pos as usize - 1;
    let end = last.pos as usize - 1 + last.text().len();
    src.get(start..end)
        .map_or_else(|| tokens.code(), ToString::to_string)
}

/// In interactive translation, a top-level function declaration
/// becomes a variable binding so it can be redefined:
/// `func f(…) { … }` → `f := func(…) { … }`.
fn func_to_var(tokens: Tokens, state: &mut State) -> Tokens {
    if !state.func_to_var || state.brace_depth > 0 {
        return tokens;
    }
    if !(tokens.kind(0) == Some(T!["func"]) && tokens.kind(1) == Some(IDENT)) {
        return tokens;
    }

    let mut out = Tokens::new();
    out.push(tokens[1].clone());
    out.tok(T![":="]);
    out.push(tokens[0].clone());
    for t in tokens.iter().skip(2) {
        out.push(t.clone());
    }
    out
}

/// Lower `ident[i, j, …]` (two or more top-level indices) onto
/// `Value`/`Set…` calls. Returns the index to continue at, or `None`
/// if the brackets hold fewer than two indices.
fn try_nd_index(
    tokens: &Tokens,
    i: usize,
    src: &str,
    state: &mut State,
    out: &mut Tokens,
) -> Option<usize> {
    let open = i + 1;
    let close = tokens.right_matching(open)?;
    let indices = split_indices(tokens, open + 1, close);
    if indices.len() < 2 {
        return None;
    }

    let ident = tokens[i].clone();

    // `a[i, j] = rhs` and the compound variants replace the whole
    // statement with a setter call; the value comes first.
    let set_method = match tokens.kind(close + 1) {
        Some(T!["="]) => Some("Set"),
        Some(T!["+="]) => Some("SetAdd"),
        Some(T!["-="]) => Some("SetSub"),
        Some(T!["*="]) => Some("SetMul"),
        Some(T!["/="]) => Some("SetDiv"),
        _ => None,
    };

    out.push(ident);
    out.tok(T!["."]);

    if let Some(method) = set_method {
        let rhs = tokens.slice(close + 2..tokens.len());
        out.ident(method);
        out.tok(T!["("]);
        out.extend(rewrite(rhs, src, state));
        for span in &indices {
            out.tok(T![","]);
            push_int_cast(tokens, span, src, state, out);
        }
        out.tok(T![")"]);
        Some(tokens.len())
    } else {
        out.ident("Value");
        out.tok(T!["("]);
        for (n, span) in indices.iter().enumerate() {
            if n > 0 {
                out.tok(T![","]);
            }
            push_int_cast(tokens, span, src, state, out);
        }
        out.tok(T![")"]);
        Some(close + 1)
    }
}

fn push_int_cast(
    tokens: &Tokens,
    span: &std::ops::Range<usize>,
    src: &str,
    state: &mut State,
    out: &mut Tokens,
) {
    out.ident("int");
    out.tok(T!["("]);
    out.extend(rewrite(tokens.slice(span.clone()), src, state));
    out.tok(T![")"]);
}

/// Split the token range between brackets at top-level commas.
fn split_indices(tokens: &Tokens, start: usize, end: usize) -> Vec<std::ops::Range<usize>> {
    let mut spans = Vec::new();
    let mut depth = 0_i32;
    let mut from = start;

    for idx in start..end {
        match tokens.kind(idx) {
            Some(PUNCT_PAREN_START | PUNCT_BRACKET_START | PUNCT_BRACE_START) => depth += 1,
            Some(PUNCT_PAREN_END | PUNCT_BRACKET_END | PUNCT_BRACE_END) => depth -= 1,
            Some(PUNCT_COMMA) if depth == 0 => {
                spans.push(from..idx);
                from = idx + 1;
            }
            _ => {}
        }
    }

    if from < end {
        spans.push(from..end);
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_syntax::token::tokenize;
    use pretty_assertions::assert_eq;

    fn run(line: &str) -> String {
        let mut state = State::default();
        rewrite(tokenize(line), line, &mut state).code()
    }

    #[test]
    fn passthrough() {
        assert_eq!(run("x := f(1, 2)"), "x := f(1, 2)");
    }

    #[test]
    fn nd_index_get() {
        assert_eq!(run("y := a[1, 2]"), "y := a.Value(int(1), int(2))");
        assert_eq!(run("y := a[i, j, k]"), "y := a.Value(int(i), int(j), int(k))");
    }

    #[test]
    fn nd_index_set() {
        assert_eq!(run("a[1,2] = 55"), "a.Set(55, int(1), int(2))");
        assert_eq!(run("a[1,2] += x"), "a.SetAdd(x, int(1), int(2))");
    }

    #[test]
    fn single_index_untouched() {
        assert_eq!(run("y := a[1]"), "y := a[1]");
        assert_eq!(run("y := a[f(1, 2)]"), "y := a[f(1, 2)]");
    }

    #[test]
    fn nested_nd_index_in_rhs() {
        assert_eq!(
            run("a[1,2] = b[3,4]"),
            "a.Set(b.Value(int(3), int(4)), int(1), int(2))"
        );
    }

    #[test]
    fn func_to_var_rewrite() {
        let mut state = State::default();
        state.func_to_var = true;
        let line = "func hello(name string) {";
        let out = rewrite(tokenize(line), line, &mut state).code();
        assert_eq!(out, "hello := func(name string) {");
    }

    #[test]
    fn inline_shell_span() {
        let mut state = State::default();
        let line = "files := $ls -1$";
        let out = rewrite(tokenize(line), line, &mut state).code();
        assert_eq!(out, r#"files := runtime.Output("ls", "-1")"#);
    }

    #[test]
    fn inline_math_span() {
        let mut state = State::default();
        let line = "v := #a + 1#";
        let out = rewrite(tokenize(line), line, &mut state).code();
        assert_eq!(out, "v := tmath.Add(a, tensor.NewIntScalar(1))");
    }
}
