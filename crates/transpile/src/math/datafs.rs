//! Shell-style builtins inside math mode.
//!
//! `cd`, `ls`, `mkdir`, `get` and `set` navigate the data filesystem,
//! a hierarchical store of tensors keyed by path. They read like
//! shell commands but lower to `datafs` calls; `get` and `set` also
//! exist in expression form and are handled by the expression walker.

use braid_syntax::syntax::SyntaxKind::IDENT;
use braid_syntax::token::{Token, Tokens};
use braid_syntax::T;

use crate::error::Error;
use crate::state::State;
use crate::words;

use super::{Reject, Walker};

const BUILTINS: &[&str] = &["cd", "ls", "mkdir", "get", "set"];

/// Rewrite a statement whose first word is a filesystem builtin.
/// `None` when the line is not one (including call-syntax uses, which
/// belong to the expression walker).
pub(super) fn try_rewrite(tokens: &Tokens, src: &str, state: &mut State) -> Option<Tokens> {
    let first = tokens.first()?;
    if first.kind != IDENT || !BUILTINS.contains(&first.text()) {
        return None;
    }
    if tokens.kind(1) == Some(T!["("]) {
        return None;
    }

    let (split, _) = words::split(src.trim());
    let args: Vec<&str> = split.words.iter().skip(1).map(|w| w.text.as_str()).collect();

    let mut out = Tokens::new();
    match first.text() {
        "cd" => {
            out.ident("datafs");
            out.tok(T!["."]);
            out.ident("Cd");
            out.tok(T!["("]);
            out.push(Token::quoted(args.first().copied().unwrap_or("")));
            out.tok(T![")"]);
        }
        "mkdir" => {
            out.ident("datafs");
            out.tok(T!["."]);
            out.ident("Mkdir");
            out.tok(T!["("]);
            out.push(Token::quoted(args.first().copied().unwrap_or("")));
            out.tok(T![")"]);
        }
        "ls" => {
            out.ident("datafs");
            out.tok(T!["."]);
            out.ident("List");
            out.tok(T!["("]);
            let mut first_arg = true;
            for arg in &args {
                if !first_arg {
                    out.tok(T![","]);
                }
                first_arg = false;
                match *arg {
                    "-l" => {
                        out.ident("datafs");
                        out.tok(T!["."]);
                        out.ident("Long");
                    }
                    "-r" => {
                        out.ident("datafs");
                        out.tok(T!["."]);
                        out.ident("Recursive");
                    }
                    path => out.push(Token::quoted(path)),
                }
            }
            out.tok(T![")"]);
        }
        "get" => {
            out.ident("datafs");
            out.tok(T!["."]);
            out.ident("Get");
            out.tok(T!["("]);
            out.push(Token::quoted(args.first().copied().unwrap_or("")));
            out.tok(T![")"]);
        }
        "set" => return Some(rewrite_set(tokens, src, &args, state)),
        _ => return None,
    }

    Some(out)
}

/// `set PATH EXPR`: the value round-trips through the math walker so
/// arbitrary expressions work.
fn rewrite_set(tokens: &Tokens, src: &str, args: &[&str], state: &mut State) -> Tokens {
    let path = args.first().copied().unwrap_or("");

    // Everything after the path word is the value expression. The
    // path starts at the second token and spans one shell word, which
    // may cover several tokens (`sub/x`).
    let path_end = tokens
        .get(1)
        .map_or(0, |t| t.pos as usize - 1 + path.len());
    let value: Tokens = tokens
        .iter()
        .skip(2)
        .filter(|t| t.pos == 0 || t.pos as usize - 1 >= path_end)
        .cloned()
        .collect();

    let expr = match braid_syntax::parser::Parser::new(&value).parse_expr() {
        Ok(expr) => expr,
        Err(err) => {
            state.error(Error::MathParse {
                src: src.trim().to_string(),
                err,
            });
            return tokens.clone();
        }
    };

    let mut walker = Walker::new(false);
    walker.qualified("datafs.Set");
    walker.out.tok(T!["("]);
    walker.out.push(Token::quoted(path));
    walker.out.tok(T![","]);
    let walked = walker.in_call("datafs.Set", |w| {
        w.set_arg(1);
        w.walk_expr(&expr)
    });
    walker.out.tok(T![")"]);

    match walked {
        Ok(()) => walker.out,
        Err(Reject::Unhandled) => tokens.clone(),
        Err(Reject::Invalid(msg)) => {
            state.error(Error::Math {
                src: src.trim().to_string(),
                msg,
            });
            tokens.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_syntax::token::tokenize;
    use pretty_assertions::assert_eq;

    fn run(line: &str) -> String {
        let mut state = State::default();
        let tokens = tokenize(line);
        try_rewrite(&tokens, line, &mut state)
            .expect("not a builtin")
            .code()
    }

    #[test]
    fn cd_and_mkdir() {
        assert_eq!(run("cd sub"), r#"datafs.Cd("sub")"#);
        assert_eq!(run("cd"), r#"datafs.Cd("")"#);
        assert_eq!(run("mkdir results"), r#"datafs.Mkdir("results")"#);
    }

    #[test]
    fn ls_flags() {
        assert_eq!(run("ls"), "datafs.List()");
        assert_eq!(run("ls -l"), "datafs.List(datafs.Long)");
        assert_eq!(
            run("ls -r sub"),
            r#"datafs.List(datafs.Recursive, "sub")"#
        );
    }

    #[test]
    fn get_statement() {
        assert_eq!(run("get x"), r#"datafs.Get("x")"#);
    }

    #[test]
    fn set_statement_walks_value() {
        assert_eq!(
            run("set x a + 1"),
            r#"datafs.Set("x", tmath.Add(a, tensor.NewIntScalar(1)))"#
        );
    }

    #[test]
    fn set_statement_with_path() {
        assert_eq!(run("set sub/x v"), r#"datafs.Set("sub/x", v)"#);
    }

    #[test]
    fn call_syntax_is_not_claimed() {
        let mut state = State::default();
        let tokens = tokenize("get(\"x\") + 1");
        assert!(try_rewrite(&tokens, "get(\"x\") + 1", &mut state).is_none());
    }
}
