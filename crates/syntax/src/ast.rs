//! An owned AST for the host statement and expression subset that the
//! math rewriter reparses.
//!
//! This is deliberately smaller than the full host grammar: it covers
//! the expressions and statements that can appear inside a math span.
//! Anything outside of it is a parse error, which callers treat as
//! "pass the original tokens through".

use crate::syntax::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: u32,
}

impl Ident {
    #[must_use]
    pub fn new(name: impl Into<String>, pos: u32) -> Self {
        Self {
            name: name.into(),
            pos,
        }
    }

    /// The blank identifier `_`.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Str,
    Char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lit {
    pub kind: LitKind,
    /// Source text, including quotes for strings.
    pub text: String,
    pub pos: u32,
}

/// One element between the brackets of an index expression.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexItem {
    Expr(Expr),
    /// `lo:hi:step` with any part absent; a bare `:` has all three
    /// absent.
    Slice {
        start: Option<Expr>,
        stop: Option<Expr>,
        step: Option<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Lit(Lit),
    Paren(Box<Expr>),
    Unary {
        op: SyntaxKind,
        pos: u32,
        expr: Box<Expr>,
    },
    Binary {
        op: SyntaxKind,
        pos: u32,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Selector {
        expr: Box<Expr>,
        sel: Ident,
    },
    Index {
        expr: Box<Expr>,
        items: Vec<IndexItem>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        /// A trailing `...` after the last argument.
        spread: bool,
    },
    /// `[e0, e1, …]`, possibly nested.
    Array {
        elems: Vec<Expr>,
        pos: u32,
    },
    /// A bare `…` (only meaningful between index brackets).
    Ellipsis(u32),
}

impl Expr {
    /// Whether the expression produces a boolean mask: a comparison or
    /// a logical combination of them.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        match self {
            Expr::Binary { op, .. } => {
                op.is_comparison() || matches!(op, SyntaxKind::OP_BOOL_AND | SyntaxKind::OP_BOOL_OR)
            }
            Expr::Unary { op, expr, .. } => *op == SyntaxKind::OP_NOT || expr.is_boolean(),
            Expr::Paren(inner) => inner.is_boolean(),
            _ => false,
        }
    }

    /// The identifier name, for a plain identifier expression.
    #[must_use]
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(id) => Some(id),
            _ => None,
        }
    }
}

/// A braced statement list. `closed` is false when the line ended
/// before the closing brace (the body continues on following lines).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Empty,
    Expr(Expr),
    /// `lhs op rhs` for `=`, `+=`, `-=`, `*=`, `/=`, …
    Assign {
        lhs: Vec<Expr>,
        op: SyntaxKind,
        pos: u32,
        rhs: Vec<Expr>,
    },
    /// `names := values`
    Define {
        names: Vec<Ident>,
        values: Vec<Expr>,
        pos: u32,
    },
    IncDec {
        expr: Expr,
        op: SyntaxKind,
        pos: u32,
    },
    Send {
        chan: Expr,
        value: Expr,
    },
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    Branch {
        op: SyntaxKind,
        label: Option<Ident>,
    },
    Block(Block),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        els: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    ForRange {
        key: Option<Ident>,
        value: Option<Ident>,
        /// `:=` or `=`.
        tok: SyntaxKind,
        expr: Expr,
        body: Block,
    },
}
