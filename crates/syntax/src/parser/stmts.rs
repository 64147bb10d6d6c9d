//! Statement parsing.
//!
//! A statement may be cut off by the end of its line: block bodies
//! whose closing brace has not been seen yet come back with
//! `closed: false` so that emitters can reproduce the open header.

use crate::ast::{Block, Expr, Ident, Stmt};
use crate::syntax::{SyntaxKind, SyntaxKind::*};
use crate::T;
use tracing::instrument;

use super::context::Context;
use super::{ParseError, ParseErrorKind};

/// A simple (one-line, non-compound) statement, or the range clause of
/// a `for` header.
enum Simple {
    Stmt(Stmt),
    Range {
        key: Option<Ident>,
        value: Option<Ident>,
        tok: SyntaxKind,
        expr: Expr,
    },
}

#[instrument(level = "trace", skip(ctx))]
pub(crate) fn parse_stmt(ctx: &mut Context) -> Result<Stmt, ParseError> {
    let kind = ctx.kind().ok_or_else(|| ctx.unexpected())?;

    match kind {
        T![";"] => {
            ctx.bump();
            Ok(Stmt::Empty)
        }
        T!["{"] => Ok(Stmt::Block(parse_block(ctx)?)),
        T!["if"] => parse_if(ctx),
        T!["for"] => parse_for(ctx),
        T!["return"] => {
            ctx.bump();
            let mut results = Vec::new();
            if expr_follows(ctx) {
                results.push(super::exprs::parse_expr(ctx)?);
                while ctx.eat(T![","]) {
                    results.push(super::exprs::parse_expr(ctx)?);
                }
            }
            Ok(Stmt::Return(results))
        }
        T!["break"] | T!["continue"] => {
            ctx.bump();
            let label = if ctx.at(IDENT) {
                let t = ctx.bump().ok_or_else(|| ctx.unexpected())?;
                Some(Ident::new(t.text(), t.pos))
            } else {
                None
            };
            Ok(Stmt::Branch { op: kind, label })
        }
        T!["goto"] => {
            ctx.bump();
            let t = ctx.expect(IDENT)?;
            Ok(Stmt::Branch {
                op: kind,
                label: Some(Ident::new(t.text(), t.pos)),
            })
        }
        T!["fallthrough"] => {
            ctx.bump();
            Ok(Stmt::Branch { op: kind, label: None })
        }
        T!["go"] => {
            ctx.bump();
            Ok(Stmt::Go(super::exprs::parse_expr(ctx)?))
        }
        T!["defer"] => {
            ctx.bump();
            Ok(Stmt::Defer(super::exprs::parse_expr(ctx)?))
        }
        _ => match parse_simple(ctx, false)? {
            Simple::Stmt(stmt) => Ok(stmt),
            Simple::Range { .. } => Err(ctx.unexpected()),
        },
    }
}

/// Expression statements, assignments, short declarations, send,
/// inc/dec. With `in_for_header`, a `:=`/`=` followed by `range`
/// produces the range clause instead.
fn parse_simple(ctx: &mut Context, in_for_header: bool) -> Result<Simple, ParseError> {
    let mut exprs = vec![super::exprs::parse_expr(ctx)?];
    while ctx.eat(T![","]) {
        exprs.push(super::exprs::parse_expr(ctx)?);
    }

    let kind = match ctx.kind() {
        Some(k) => k,
        None => return single(exprs).map(Simple::Stmt),
    };

    match kind {
        T![":="] => {
            let pos = ctx.pos();
            ctx.bump();

            let names = idents(exprs, pos)?;

            if in_for_header && ctx.at(T!["range"]) {
                ctx.bump();
                let expr = super::exprs::parse_expr(ctx)?;
                let mut names = names.into_iter();
                return Ok(Simple::Range {
                    key: names.next(),
                    value: names.next(),
                    tok: T![":="],
                    expr,
                });
            }

            let mut values = vec![super::exprs::parse_expr(ctx)?];
            while ctx.eat(T![","]) {
                values.push(super::exprs::parse_expr(ctx)?);
            }

            Ok(Simple::Stmt(Stmt::Define { names, values, pos }))
        }
        k if k.is_assign_op() => {
            let pos = ctx.pos();
            ctx.bump();

            if in_for_header && k == T!["="] && ctx.at(T!["range"]) {
                ctx.bump();
                let expr = super::exprs::parse_expr(ctx)?;
                let names = idents(exprs, pos)?;
                let mut names = names.into_iter();
                return Ok(Simple::Range {
                    key: names.next(),
                    value: names.next(),
                    tok: T!["="],
                    expr,
                });
            }

            let mut rhs = vec![super::exprs::parse_expr(ctx)?];
            while ctx.eat(T![","]) {
                rhs.push(super::exprs::parse_expr(ctx)?);
            }

            Ok(Simple::Stmt(Stmt::Assign {
                lhs: exprs,
                op: k,
                pos,
                rhs,
            }))
        }
        T!["++"] | T!["--"] => {
            let pos = ctx.pos();
            ctx.bump();
            let expr = single_expr(exprs, pos)?;
            Ok(Simple::Stmt(Stmt::IncDec { expr, op: kind, pos }))
        }
        T!["<-"] => {
            let pos = ctx.pos();
            ctx.bump();
            let chan = single_expr(exprs, pos)?;
            let value = super::exprs::parse_expr(ctx)?;
            Ok(Simple::Stmt(Stmt::Send { chan, value }))
        }
        _ => single(exprs).map(Simple::Stmt),
    }
}

#[instrument(level = "trace", skip(ctx))]
fn parse_if(ctx: &mut Context) -> Result<Stmt, ParseError> {
    ctx.expect(T!["if"])?;

    let first = parse_simple(ctx, false)?;
    let (init, cond) = if ctx.eat(T![";"]) {
        let Simple::Stmt(stmt) = first else {
            return Err(ctx.unexpected());
        };
        (Some(Box::new(stmt)), super::exprs::parse_expr(ctx)?)
    } else {
        match first {
            Simple::Stmt(Stmt::Expr(e)) => (None, e),
            _ => {
                return Err(ParseError::new(
                    ctx.pos(),
                    ParseErrorKind::ExpectedToken(PUNCT_SEMI),
                ))
            }
        }
    };

    let then = parse_block(ctx)?;

    let els = if ctx.eat(T!["else"]) {
        if ctx.at(T!["if"]) {
            Some(Box::new(parse_if(ctx)?))
        } else {
            Some(Box::new(Stmt::Block(parse_block(ctx)?)))
        }
    } else {
        None
    };

    Ok(Stmt::If {
        init,
        cond,
        then,
        els,
    })
}

#[instrument(level = "trace", skip(ctx))]
fn parse_for(ctx: &mut Context) -> Result<Stmt, ParseError> {
    ctx.expect(T!["for"])?;

    // `for {`
    if ctx.at(T!["{"]) {
        return Ok(Stmt::For {
            init: None,
            cond: None,
            post: None,
            body: parse_block(ctx)?,
        });
    }

    // `for range x {`
    if ctx.eat(T!["range"]) {
        let expr = super::exprs::parse_expr(ctx)?;
        return Ok(Stmt::ForRange {
            key: None,
            value: None,
            tok: T![":="],
            expr,
            body: parse_block(ctx)?,
        });
    }

    let first = parse_simple(ctx, true)?;

    match first {
        Simple::Range {
            key,
            value,
            tok,
            expr,
        } => Ok(Stmt::ForRange {
            key,
            value,
            tok,
            expr,
            body: parse_block(ctx)?,
        }),
        Simple::Stmt(stmt) => {
            if ctx.eat(T![";"]) {
                // `for init; cond; post { … }`
                let cond = if ctx.at(T![";"]) {
                    None
                } else {
                    Some(super::exprs::parse_expr(ctx)?)
                };
                ctx.expect(T![";"])?;

                let post = if ctx.at(T!["{"]) {
                    None
                } else {
                    match parse_simple(ctx, false)? {
                        Simple::Stmt(s) => Some(Box::new(s)),
                        Simple::Range { .. } => return Err(ctx.unexpected()),
                    }
                };

                Ok(Stmt::For {
                    init: Some(Box::new(stmt)),
                    cond,
                    post,
                    body: parse_block(ctx)?,
                })
            } else {
                // `for cond { … }`
                let Stmt::Expr(cond) = stmt else {
                    return Err(ctx.unexpected());
                };
                Ok(Stmt::For {
                    init: None,
                    cond: Some(cond),
                    post: None,
                    body: parse_block(ctx)?,
                })
            }
        }
    }
}

/// Parse `{ stmts… }`, tolerating a body cut off by the end of the
/// line.
fn parse_block(ctx: &mut Context) -> Result<Block, ParseError> {
    ctx.expect(T!["{"])?;

    let mut stmts = Vec::new();
    let closed = loop {
        while ctx.eat(T![";"]) {}

        if ctx.eat(T!["}"]) {
            break true;
        }
        if ctx.at_end() {
            break false;
        }

        stmts.push(parse_stmt(ctx)?);
    };

    Ok(Block { stmts, closed })
}

fn expr_follows(ctx: &Context) -> bool {
    !matches!(ctx.kind(), Some(T![";"] | T!["}"]) | None)
}

fn single(exprs: Vec<Expr>) -> Result<Stmt, ParseError> {
    let mut exprs = exprs;
    if exprs.len() == 1 {
        Ok(Stmt::Expr(exprs.remove(0)))
    } else {
        Err(ParseError::new(0, ParseErrorKind::UnexpectedToken))
    }
}

fn single_expr(exprs: Vec<Expr>, pos: u32) -> Result<Expr, ParseError> {
    let mut exprs = exprs;
    if exprs.len() == 1 {
        Ok(exprs.remove(0))
    } else {
        Err(ParseError::new(pos, ParseErrorKind::UnexpectedToken))
    }
}

fn idents(exprs: Vec<Expr>, pos: u32) -> Result<Vec<Ident>, ParseError> {
    exprs
        .into_iter()
        .map(|e| match e {
            Expr::Ident(id) => Ok(id),
            _ => Err(ParseError::new(pos, ParseErrorKind::ExpectedToken(IDENT))),
        })
        .collect()
}
