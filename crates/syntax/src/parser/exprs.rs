//! Pratt expression parsing.

use crate::ast::{Expr, Ident, IndexItem, Lit, LitKind};
use crate::syntax::{SyntaxKind, SyntaxKind::*};
use crate::T;
use tracing::instrument;

use super::context::Context;
use super::ParseError;

impl SyntaxKind {
    pub(crate) fn prefix_binding_power(self) -> Option<u8> {
        match self {
            OP_ADD | OP_SUB | OP_NOT | OP_MUL | OP_AND | OP_XOR | OP_ARROW => Some(13),
            _ => None,
        }
    }

    pub(crate) fn infix_binding_power(self) -> Option<(u8, u8)> {
        let bp = match self {
            OP_BOOL_OR => (1, 2),
            OP_BOOL_AND => (3, 4),
            OP_EQ | OP_NOT_EQ | OP_LT | OP_LT_EQ | OP_GT | OP_GT_EQ => (5, 6),
            OP_ADD | OP_SUB | OP_OR | OP_XOR => (7, 8),
            OP_MUL | OP_DIV | OP_REM | OP_SHL | OP_SHR | OP_AND | OP_AND_NOT | AT => (9, 10),
            // Power binds tighter than multiplication and is
            // right-associative.
            OP_POW => (12, 11),
            _ => return None,
        };
        Some(bp)
    }

    pub(crate) fn postfix_binding_power(self) -> Option<u8> {
        match self {
            PUNCT_PAREN_START | PUNCT_BRACKET_START | PUNCT_DOT => Some(15),
            _ => None,
        }
    }
}

#[instrument(level = "trace", skip(ctx))]
pub(crate) fn parse_expr(ctx: &mut Context) -> Result<Expr, ParseError> {
    parse_expr_bp(ctx, 0)
}

pub(crate) fn parse_expr_bp(ctx: &mut Context, min_bp: u8) -> Result<Expr, ParseError> {
    let token = ctx.current().ok_or_else(|| ctx.unexpected())?;

    let mut lhs = match token.kind {
        IDENT => {
            let t = ctx.bump().unwrap_or(token);
            Expr::Ident(Ident::new(t.text(), t.pos))
        }
        LIT_INT | LIT_FLOAT | LIT_STR | LIT_CHAR => {
            let t = ctx.bump().unwrap_or(token);
            Expr::Lit(Lit {
                kind: match t.kind {
                    LIT_INT => LitKind::Int,
                    LIT_FLOAT => LitKind::Float,
                    LIT_STR => LitKind::Str,
                    _ => LitKind::Char,
                },
                text: t.text().to_string(),
                pos: t.pos,
            })
        }
        T!["("] => {
            ctx.bump();
            let inner = parse_expr_bp(ctx, 0)?;
            ctx.expect(T![")"])?;
            Expr::Paren(Box::new(inner))
        }
        T!["["] => parse_array(ctx)?,
        op => {
            if let Some(r_bp) = op.prefix_binding_power() {
                let pos = token.pos;
                ctx.bump();
                let operand = parse_expr_bp(ctx, r_bp)?;
                Expr::Unary {
                    op,
                    pos,
                    expr: Box::new(operand),
                }
            } else {
                return Err(ctx.unexpected());
            }
        }
    };

    loop {
        let op = match ctx.kind() {
            Some(k) => k,
            None => break,
        };

        if let Some(l_bp) = op.postfix_binding_power() {
            if l_bp < min_bp {
                break;
            }

            match op {
                T!["("] => {
                    ctx.bump();
                    let (args, spread) = parse_call_args(ctx)?;
                    lhs = Expr::Call {
                        func: Box::new(lhs),
                        args,
                        spread,
                    };
                }
                T!["["] => {
                    ctx.bump();
                    let items = parse_index_items(ctx)?;
                    lhs = Expr::Index {
                        expr: Box::new(lhs),
                        items,
                    };
                }
                _ => {
                    ctx.bump();
                    let sel = ctx.expect(IDENT)?;
                    lhs = Expr::Selector {
                        expr: Box::new(lhs),
                        sel: Ident::new(sel.text(), sel.pos),
                    };
                }
            }

            continue;
        }

        let (l_bp, r_bp) = match op.infix_binding_power() {
            Some(bp) => bp,
            None => break,
        };
        if l_bp < min_bp {
            break;
        }

        let pos = ctx.pos();
        ctx.bump();
        let rhs = parse_expr_bp(ctx, r_bp)?;
        lhs = Expr::Binary {
            op,
            pos,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }

    Ok(lhs)
}

/// `[e0, e1, …]` in operand position.
fn parse_array(ctx: &mut Context) -> Result<Expr, ParseError> {
    let pos = ctx.pos();
    ctx.expect(T!["["])?;

    let mut elems = Vec::new();
    loop {
        if ctx.at(T!["]"]) {
            break;
        }
        elems.push(parse_expr_bp(ctx, 0)?);
        if !ctx.eat(T![","]) {
            break;
        }
    }
    ctx.expect(T!["]"])?;

    Ok(Expr::Array { elems, pos })
}

fn parse_call_args(ctx: &mut Context) -> Result<(Vec<Expr>, bool), ParseError> {
    let mut args = Vec::new();
    let mut spread = false;

    loop {
        if ctx.at(T![")"]) {
            break;
        }
        args.push(parse_expr_bp(ctx, 0)?);
        if ctx.eat(T!["..."]) {
            spread = true;
            break;
        }
        if !ctx.eat(T![","]) {
            break;
        }
    }
    ctx.expect(T![")"])?;

    Ok((args, spread))
}

/// The comma-separated items between index brackets: plain
/// expressions, `lo:hi:step` slices, bare `:`, and `…`.
fn parse_index_items(ctx: &mut Context) -> Result<Vec<IndexItem>, ParseError> {
    let mut items = Vec::new();

    loop {
        if ctx.at(T!["]"]) {
            break;
        }

        let item = if ctx.at(T![":"]) {
            parse_slice_rest(ctx, None)?
        } else if ctx.at(T!["..."]) {
            let pos = ctx.pos();
            ctx.bump();
            IndexItem::Expr(Expr::Ellipsis(pos))
        } else {
            let start = parse_expr_bp(ctx, 0)?;
            if ctx.at(T![":"]) {
                parse_slice_rest(ctx, Some(start))?
            } else {
                IndexItem::Expr(start)
            }
        };
        items.push(item);

        if !ctx.eat(T![","]) {
            break;
        }
    }
    ctx.expect(T!["]"])?;

    Ok(items)
}

fn parse_slice_rest(ctx: &mut Context, start: Option<Expr>) -> Result<IndexItem, ParseError> {
    ctx.expect(T![":"])?;

    let stop = if slice_part_follows(ctx) {
        Some(parse_expr_bp(ctx, 0)?)
    } else {
        None
    };

    let step = if ctx.eat(T![":"]) {
        if slice_part_follows(ctx) {
            Some(parse_expr_bp(ctx, 0)?)
        } else {
            None
        }
    } else {
        None
    };

    Ok(IndexItem::Slice { start, stop, step })
}

fn slice_part_follows(ctx: &Context) -> bool {
    !matches!(ctx.kind(), Some(T![":"] | T![","] | T!["]"]) | None)
}
