//! A recursive-descent parser for the host statement and expression
//! subset, over already-lexed token sequences.
//!
//! The math rewriter reparses mode spans through this parser to get
//! operator precedence and associativity right; working off the flat
//! token stream alone is not enough.

use crate::ast::{Expr, Stmt};
use crate::syntax::SyntaxKind;
use crate::token::Tokens;
use thiserror::Error;

use self::context::Context;

mod context;
mod exprs;
mod stmts;

/// A parser over one token sequence.
///
/// # Example
///
/// ```
/// use braid_syntax::parser::Parser;
/// use braid_syntax::token::tokenize;
///
/// let toks = tokenize("a + b * 2");
/// let expr = Parser::new(&toks).parse_expr().unwrap();
/// ```
pub struct Parser<'t> {
    context: Context<'t>,
}

impl<'t> Parser<'t> {
    /// Create a new parser over the given tokens. Comment tokens are
    /// skipped.
    #[must_use]
    pub fn new(tokens: &'t Tokens) -> Self {
        Self {
            context: Context::new(tokens),
        }
    }

    /// Parse a `;`-separated statement list, consuming every token.
    pub fn parse_stmts(mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut out = Vec::new();

        while !self.context.at_end() {
            if self.context.eat(SyntaxKind::PUNCT_SEMI) {
                continue;
            }
            out.push(stmts::parse_stmt(&mut self.context)?);
        }

        Ok(out)
    }

    /// Parse a single expression, consuming every token.
    pub fn parse_expr(mut self) -> Result<Expr, ParseError> {
        let expr = exprs::parse_expr(&mut self.context)?;

        if self.context.at_end() {
            Ok(expr)
        } else {
            Err(self.context.unexpected())
        }
    }
}

/// A parse (syntax) error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {pos}: {kind}")]
pub struct ParseError {
    /// 1-based byte offset into the parsed line; 0 for positions the
    /// emitters manufactured.
    pub pos: u32,
    /// Error kind.
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(pos: u32, kind: ParseErrorKind) -> Self {
        Self { pos, kind }
    }
}

/// All the parsing errors that can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected EOF")]
    UnexpectedEof,

    #[error("unexpected token")]
    UnexpectedToken,

    #[error(r#"expected token "{0:?}""#)]
    ExpectedToken(SyntaxKind),
}
