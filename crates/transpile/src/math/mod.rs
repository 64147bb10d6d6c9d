//! The math rewriter.
//!
//! Math-mode text is reparsed through the host expression grammar and
//! re-emitted as tensor library calls. The walker carries a stack of
//! function-argument descriptors so that children know whether to
//! become scalar tensors, stay plain integers, or spread into a dims
//! slice.

use braid_syntax::ast::{Block, Expr, Stmt};
use braid_syntax::parser::Parser;
use braid_syntax::token::{Token, Tokens};
use braid_syntax::T;

use crate::error::Error;
use crate::state::State;

mod datafs;
mod exprs;
mod funcs;

use funcs::Arg;

/// Rewrite a whole math-mode line (one or more `;`-separated
/// statements). `src` is the math source text of the span.
pub(crate) fn rewrite_line(tokens: &Tokens, src: &str, state: &mut State) -> Tokens {
    let (code, comments) = split_comments(tokens);

    if code.is_empty() {
        return comments;
    }

    // Lines that only continue or close an open block pass through,
    // as do statement forms with no element-wise meaning.
    if matches!(
        code.kind(0),
        Some(T!["}"] | T!["switch"] | T!["select"] | T!["case"] | T!["default"])
    ) {
        return tokens.clone();
    }

    if let Some(out) = datafs::try_rewrite(&code, src, state) {
        return with_comments(out, comments);
    }

    let stmts = match Parser::new(&code).parse_stmts() {
        Ok(stmts) => stmts,
        Err(err) => {
            state.error(Error::MathParse {
                src: src.trim().to_string(),
                err,
            });
            return tokens.clone();
        }
    };

    let mut walker = Walker::new(state.math_record);
    match walker.walk_stmts(&stmts) {
        Ok(()) => with_comments(walker.out, comments),
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

/// Rewrite an inline `#…#` span: a single expression in value
/// position.
pub(crate) fn rewrite_expr(tokens: &Tokens, state: &mut State) -> Tokens {
    let expr = match Parser::new(tokens).parse_expr() {
        Ok(expr) => expr,
        Err(err) => {
            state.error(Error::MathParse {
                src: tokens.code(),
                err,
            });
            return tokens.clone();
        }
    };

    let mut walker = Walker::new(false);
    match walker.walk_expr(&expr) {
        Ok(()) => walker.out,
        Err(Reject::Unhandled) => tokens.clone(),
        Err(Reject::Invalid(msg)) => {
            state.error(Error::Math {
                src: tokens.code(),
                msg,
            });
            tokens.clone()
        }
    }
}

fn split_comments(tokens: &Tokens) -> (Tokens, Tokens) {
    let code: Tokens = tokens
        .iter()
        .filter(|t| !t.kind.is_comment())
        .cloned()
        .collect();
    let comments: Tokens = tokens
        .iter()
        .filter(|t| t.kind.is_comment())
        .cloned()
        .collect();
    (code, comments)
}

fn with_comments(mut out: Tokens, comments: Tokens) -> Tokens {
    out.extend(comments);
    out
}

/// Why a walk gave up on a statement.
pub(super) enum Reject {
    /// A construct outside the handled subset; the original tokens
    /// pass through silently.
    Unhandled,
    /// Recognizably math, recognizably wrong; reported.
    Invalid(String),
}

/// One function-call context: the argument descriptors of the call
/// being emitted and the index of the argument in progress.
struct Frame {
    args: &'static [Arg],
    idx: usize,
}

pub(super) struct Walker {
    record: bool,
    recorded: bool,
    stack: Vec<Frame>,
    pub(super) out: Tokens,
}

impl Walker {
    pub(super) fn new(record: bool) -> Self {
        Self {
            record,
            recorded: false,
            stack: Vec::new(),
            out: Tokens::new(),
        }
    }

    /// The argument descriptor for the position being emitted.
    fn cur_arg(&self) -> Arg {
        let frame = match self.stack.last() {
            Some(f) => f,
            None => return Arg::default(),
        };

        match frame.args.get(frame.idx) {
            Some(arg) => *arg,
            None => match frame.args.last() {
                Some(last) if last.variadic => *last,
                _ => Arg::default(),
            },
        }
    }

    fn set_arg(&mut self, idx: usize) {
        if let Some(f) = self.stack.last_mut() {
            f.idx = idx;
        }
    }

    /// Run `f` with the argument context of `qualified` pushed.
    fn in_call<R>(
        &mut self,
        qualified: &str,
        f: impl FnOnce(&mut Self) -> Result<R, Reject>,
    ) -> Result<R, Reject> {
        static NO_ARGS: &[Arg] = &[];
        let args = funcs::lookup(qualified).map_or(NO_ARGS, |i| i.args);
        self.stack.push(Frame { args, idx: 0 });
        let out = f(self);
        self.stack.pop();
        out
    }

    /// Run `f` with no coercions applied to direct children.
    fn neutral<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R, Reject>) -> Result<R, Reject> {
        static PLAIN: &[Arg] = &[Arg {
            tensor: false,
            int: false,
            variadic: true,
        }];
        self.stack.push(Frame {
            args: PLAIN,
            idx: 0,
        });
        let out = f(self);
        self.stack.pop();
        out
    }

    /// Emit `pkg.Name` for a qualified function name.
    fn qualified(&mut self, name: &str) {
        match name.split_once('.') {
            Some((pkg, func)) => {
                self.out.ident(pkg);
                self.out.tok(T!["."]);
                self.out.ident(func);
            }
            None => self.out.ident(name),
        }
    }

    /// Capture the tokens emitted by `f` instead of appending them.
    fn capture(&mut self, f: impl FnOnce(&mut Self) -> Result<(), Reject>) -> Result<Tokens, Reject> {
        let saved = std::mem::take(&mut self.out);
        let res = f(self);
        let captured = std::mem::replace(&mut self.out, saved);
        res.map(|()| captured)
    }

    pub(super) fn walk_stmts(&mut self, stmts: &[Stmt]) -> Result<(), Reject> {
        let mut first = true;
        for stmt in stmts {
            if matches!(stmt, Stmt::Empty) {
                continue;
            }
            if !first {
                self.out.tok(T![";"]);
            }
            first = false;
            self.walk_stmt(stmt)?;
        }
        Ok(())
    }

    fn walk_stmt(&mut self, stmt: &Stmt) -> Result<(), Reject> {
        match stmt {
            Stmt::Empty => Ok(()),
            Stmt::Expr(e) => self.walk_expr(e),
            Stmt::Define { names, values, pos: _ } => self.walk_define(names, values),
            Stmt::Assign { lhs, op, rhs, .. } => self.walk_assign(lhs, *op, rhs),
            Stmt::IncDec { expr, op, .. } => {
                let func = if *op == T!["++"] { "tmath.Inc" } else { "tmath.Dec" };
                self.qualified(func);
                self.out.tok(T!["("]);
                self.in_call(func, |w| w.walk_expr(expr))?;
                self.out.tok(T![")"]);
                Ok(())
            }
            Stmt::Send { chan, value } => {
                self.walk_expr(chan)?;
                self.out.tok(T!["<-"]);
                self.walk_expr(value)
            }
            Stmt::Go(call) => {
                self.out.tok(T!["go"]);
                self.walk_expr(call)
            }
            Stmt::Defer(call) => {
                self.out.tok(T!["defer"]);
                self.walk_expr(call)
            }
            Stmt::Return(results) => {
                self.out.tok(T!["return"]);
                for (i, e) in results.iter().enumerate() {
                    if i > 0 {
                        self.out.tok(T![","]);
                    }
                    self.walk_expr(e)?;
                }
                Ok(())
            }
            Stmt::Branch { op, label } => {
                self.out.tok(*op);
                if let Some(label) = label {
                    self.out.ident(label.name.clone());
                }
                Ok(())
            }
            Stmt::Block(block) => self.walk_block(block),
            Stmt::If {
                init,
                cond,
                then,
                els,
            } => self.walk_if(init.as_deref(), cond, then, els.as_deref()),
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => self.walk_for(init.as_deref(), cond.as_ref(), post.as_deref(), body),
            Stmt::ForRange {
                key,
                value,
                tok,
                expr,
                body,
            } => self.walk_for_range(key.as_ref(), value.as_ref(), *tok, expr, body),
        }
    }

    /// `x := rhs` becomes `x := tensor.Tensor(rhs')` so the binding
    /// has the generic tensor type regardless of what the right side
    /// produced.
    fn walk_define(
        &mut self,
        names: &[braid_syntax::ast::Ident],
        values: &[Expr],
    ) -> Result<(), Reject> {
        let (Some(name), Some(value)) = (names.first(), values.first()) else {
            return Err(Reject::Unhandled);
        };
        if names.len() != 1 || values.len() != 1 {
            return Err(Reject::Unhandled);
        }

        self.out.ident(name.name.clone());
        self.out.tok(T![":="]);
        self.qualified("tensor.Tensor");
        self.out.tok(T!["("]);
        self.in_call("tensor.Tensor", |w| w.walk_expr(value))?;
        self.out.tok(T![")"]);

        if self.record && !self.recorded {
            self.recorded = true;
            self.out.tok(T![";"]);
            self.qualified("datafs.Record");
            self.out.tok(T!["("]);
            self.out.ident(name.name.clone());
            self.out.tok(T![","]);
            self.out.push(Token::quoted(&name.name));
            self.out.tok(T![")"]);
        }

        Ok(())
    }

    fn walk_assign(&mut self, lhs: &[Expr], op: braid_syntax::syntax::SyntaxKind, rhs: &[Expr]) -> Result<(), Reject> {
        let (Some(target), Some(value)) = (lhs.first(), rhs.first()) else {
            return Err(Reject::Unhandled);
        };
        if lhs.len() != 1 || rhs.len() != 1 {
            return Err(Reject::Unhandled);
        }

        if let Expr::Ident(id) = target {
            // Plain variable assignment keeps its shape; the right
            // side still sees a tensor context.
            self.out.ident(id.name.clone());
            self.out.tok(op);
            return self.in_call("tensor.Tensor", |w| w.walk_expr(value));
        }

        let func = match op {
            T!["="] => "tmath.Assign",
            T!["+="] => "tmath.AddAssign",
            T!["-="] => "tmath.SubAssign",
            T!["*="] => "tmath.MulAssign",
            T!["/="] => "tmath.DivAssign",
            _ => return Err(Reject::Unhandled),
        };

        self.qualified(func);
        self.out.tok(T!["("]);
        self.in_call(func, |w| {
            w.walk_expr(target)?;
            w.out.tok(T![","]);
            w.set_arg(1);
            w.walk_expr(value)
        })?;
        self.out.tok(T![")"]);
        Ok(())
    }

    fn walk_block(&mut self, block: &Block) -> Result<(), Reject> {
        self.out.tok(T!["{"]);
        self.walk_stmts(&block.stmts)?;
        if block.closed {
            self.out.tok(T!["}"]);
        }
        Ok(())
    }

    /// Conditions producing tensor booleans are collapsed back to a
    /// host boolean.
    fn walk_cond(&mut self, cond: &Expr) -> Result<(), Reject> {
        let boolean = cond.is_boolean();
        self.walk_expr(cond)?;
        if boolean {
            self.out.tok(T!["."]);
            self.out.ident("Bool1D");
            self.out.tok(T!["("]);
            self.out.push(Token::int(0));
            self.out.tok(T![")"]);
        }
        Ok(())
    }

    fn walk_if(
        &mut self,
        init: Option<&Stmt>,
        cond: &Expr,
        then: &Block,
        els: Option<&Stmt>,
    ) -> Result<(), Reject> {
        self.out.tok(T!["if"]);
        if let Some(init) = init {
            self.walk_stmt(init)?;
            self.out.tok(T![";"]);
        }
        self.walk_cond(cond)?;
        self.walk_block(then)?;

        if let Some(els) = els {
            self.out.tok(T!["else"]);
            self.walk_stmt(els)?;
        }
        Ok(())
    }

    fn walk_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        post: Option<&Stmt>,
        body: &Block,
    ) -> Result<(), Reject> {
        self.out.tok(T!["for"]);

        if init.is_none() && post.is_none() {
            if let Some(cond) = cond {
                self.walk_cond(cond)?;
            }
            return self.walk_block(body);
        }

        if let Some(init) = init {
            self.walk_stmt(init)?;
        }
        self.out.tok(T![";"]);
        if let Some(cond) = cond {
            self.walk_cond(cond)?;
        }
        self.out.tok(T![";"]);
        if let Some(post) = post {
            self.walk_stmt(post)?;
        }
        self.walk_block(body)
    }

    /// `for i, v := range x` is lowered to an index loop over the
    /// flattened tensor.
    fn walk_for_range(
        &mut self,
        key: Option<&braid_syntax::ast::Ident>,
        value: Option<&braid_syntax::ast::Ident>,
        tok: braid_syntax::syntax::SyntaxKind,
        expr: &Expr,
        body: &Block,
    ) -> Result<(), Reject> {
        let Some(key) = key else {
            return Err(Reject::Unhandled);
        };
        if tok != T![":="] {
            return Err(Reject::Unhandled);
        }
        if key.is_blank() || value.map_or(false, braid_syntax::ast::Ident::is_blank) {
            return Err(Reject::Invalid(
                "cannot range with a blank identifier".into(),
            ));
        }

        let target = self.capture(|w| w.neutral(|w| w.walk_expr(expr)))?;

        self.out.tok(T!["for"]);
        self.out.ident(key.name.clone());
        self.out.tok(T![":="]);
        self.out.push(Token::int(0));
        self.out.tok(T![";"]);
        self.out.ident(key.name.clone());
        self.out.tok(T!["<"]);
        self.out.extend(target.clone());
        self.out.tok(T!["."]);
        self.out.ident("Len");
        self.out.tok(T!["("]);
        self.out.tok(T![")"]);
        self.out.tok(T![";"]);
        self.out.ident(key.name.clone());
        self.out.tok(T!["++"]);
        self.out.tok(T!["{"]);

        if let Some(value) = value {
            self.out.ident(value.name.clone());
            self.out.tok(T![":="]);
            self.out.extend(target);
            self.out.tok(T!["."]);
            self.out.ident("Float1D");
            self.out.tok(T!["("]);
            self.out.ident(key.name.clone());
            self.out.tok(T![")"]);
        }

        if !body.stmts.is_empty() {
            if value.is_some() {
                self.out.tok(T![";"]);
            }
            self.walk_stmts(&body.stmts)?;
        }
        if body.closed {
            self.out.tok(T!["}"]);
        }
        Ok(())
    }
}
