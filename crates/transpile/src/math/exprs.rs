//! Expression walking for the math rewriter.

use braid_syntax::ast::{Expr, Ident, IndexItem, Lit, LitKind};
use braid_syntax::syntax::SyntaxKind;
use braid_syntax::token::Token;
use braid_syntax::T;

use super::funcs::{self, Property};
use super::{Reject, Walker};

/// The library call an infix operator lowers to.
fn binary_target(op: SyntaxKind) -> Option<&'static str> {
    let name = match op {
        T!["+"] => "tmath.Add",
        T!["-"] => "tmath.Sub",
        T!["*"] => "tmath.Mul",
        T!["/"] => "tmath.Div",
        T!["%"] => "tmath.Mod",
        T!["**"] => "tmath.Pow",
        T!["@"] => "matrix.Mul",
        T!["=="] => "tmath.Equal",
        T!["!="] => "tmath.NotEqual",
        T!["<"] => "tmath.Less",
        T!["<="] => "tmath.LessEqual",
        T![">"] => "tmath.Greater",
        T![">="] => "tmath.GreaterEqual",
        T!["&&"] => "tmath.And",
        T!["||"] => "tmath.Or",
        _ => return None,
    };
    Some(name)
}

impl Walker {
    pub(super) fn walk_expr(&mut self, expr: &Expr) -> Result<(), Reject> {
        match expr {
            Expr::Ident(id) => {
                self.walk_ident(id);
                Ok(())
            }
            Expr::Lit(lit) => {
                self.walk_lit(lit);
                Ok(())
            }
            Expr::Paren(inner) => {
                self.out.tok(T!["("]);
                self.walk_expr(inner)?;
                self.out.tok(T![")"]);
                Ok(())
            }
            Expr::Unary { op, expr, .. } => self.walk_unary(*op, expr),
            Expr::Binary { op, lhs, rhs, .. } => self.walk_binary(*op, lhs, rhs),
            Expr::Selector { expr, sel } => self.walk_selector(expr, sel),
            Expr::Index { expr, items } => self.walk_index(expr, items),
            Expr::Call { func, args, spread } => self.walk_call(func, args, *spread),
            Expr::Array { elems, pos } => self.walk_array(elems, *pos),
            Expr::Ellipsis(_) => {
                self.out.tok(T!["..."]);
                Ok(())
            }
        }
    }

    /// In a variadic-integer position a tensor-valued identifier
    /// supplies the whole dims slice.
    fn walk_ident(&mut self, id: &Ident) {
        let arg = self.cur_arg();
        if arg.int && arg.variadic {
            self.qualified("tensor.AsIntSlice");
            self.out.tok(T!["("]);
            self.out.ident(id.name.clone());
            self.out.tok(T![")"]);
            self.out.tok(T!["..."]);
        } else {
            self.out.ident(id.name.clone());
        }
    }

    /// Literals become scalar tensors when the argument wants one.
    fn walk_lit(&mut self, lit: &Lit) {
        let arg = self.cur_arg();
        let ctor = match lit.kind {
            LitKind::Int => "tensor.NewIntScalar",
            LitKind::Float => "tensor.NewFloat64Scalar",
            LitKind::Str => "tensor.NewStringScalar",
            LitKind::Char => "",
        };

        if arg.tensor && !ctor.is_empty() {
            self.qualified(ctor);
            self.out.tok(T!["("]);
            self.push_lit(lit);
            self.out.tok(T![")"]);
        } else {
            self.push_lit(lit);
        }
    }

    fn push_lit(&mut self, lit: &Lit) {
        let kind = match lit.kind {
            LitKind::Int => T!["lit_int"],
            LitKind::Float => T!["lit_float"],
            LitKind::Str => T!["lit_str"],
            LitKind::Char => T!["lit_char"],
        };
        self.out.push(Token {
            kind,
            text: lit.text.clone(),
            pos: 0,
        });
    }

    fn walk_unary(&mut self, op: SyntaxKind, operand: &Expr) -> Result<(), Reject> {
        let target = match op {
            T!["-"] => Some("tmath.Negate"),
            T!["!"] => Some("tmath.Not"),
            _ => None,
        };

        match target {
            Some(func) => {
                self.qualified(func);
                self.out.tok(T!["("]);
                self.in_call(func, |w| w.walk_expr(operand))?;
                self.out.tok(T![")"]);
                Ok(())
            }
            None => {
                self.out.tok(op);
                self.neutral(|w| w.walk_expr(operand))
            }
        }
    }

    fn walk_binary(&mut self, op: SyntaxKind, lhs: &Expr, rhs: &Expr) -> Result<(), Reject> {
        let Some(func) = binary_target(op) else {
            // Shifts and bitwise operators have no element-wise
            // counterpart; they pass through.
            self.neutral(|w| {
                w.walk_expr(lhs)?;
                w.out.tok(op);
                w.walk_expr(rhs)
            })?;
            return Ok(());
        };

        self.qualified(func);
        self.out.tok(T!["("]);
        self.in_call(func, |w| {
            w.walk_expr(lhs)?;
            w.out.tok(T![","]);
            w.set_arg(1);
            w.walk_expr(rhs)
        })?;
        self.out.tok(T![")"]);
        Ok(())
    }

    fn walk_selector(&mut self, expr: &Expr, sel: &Ident) -> Result<(), Reject> {
        match funcs::property(&sel.name) {
            Some(prop) => self.walk_property(prop, expr),
            None => {
                self.neutral(|w| w.walk_expr(expr))?;
                self.out.tok(T!["."]);
                self.out.ident(sel.name.clone());
                Ok(())
            }
        }
    }

    /// `a.ndim` → `tensor.NewIntScalar(a.NumDims())` and friends.
    fn walk_property(&mut self, prop: Property, expr: &Expr) -> Result<(), Reject> {
        match prop {
            Property::NumDims | Property::Len => {
                self.qualified("tensor.NewIntScalar");
                self.out.tok(T!["("]);
                self.neutral(|w| w.walk_expr(expr))?;
                self.out.tok(T!["."]);
                self.out
                    .ident(if prop == Property::NumDims { "NumDims" } else { "Len" });
                self.out.tok(T!["("]);
                self.out.tok(T![")"]);
                self.out.tok(T![")"]);
            }
            Property::Shape => {
                self.qualified("tensor.NewIntFromValues");
                self.out.tok(T!["("]);
                self.neutral(|w| w.walk_expr(expr))?;
                self.out.tok(T!["."]);
                self.out.ident("Shape");
                self.out.tok(T!["("]);
                self.out.tok(T![")"]);
                self.out.tok(T!["."]);
                self.out.ident("Sizes");
                self.out.tok(T!["..."]);
                self.out.tok(T![")"]);
            }
        }
        Ok(())
    }

    fn walk_index(&mut self, expr: &Expr, items: &[IndexItem]) -> Result<(), Reject> {
        // A boolean sub-expression selects by mask instead of
        // position.
        let mask = items.iter().find_map(|item| match item {
            IndexItem::Expr(e) if e.is_boolean() => Some(e),
            _ => None,
        });
        if let Some(cond) = mask {
            self.qualified("tensor.Mask");
            self.out.tok(T!["("]);
            self.in_call("tensor.Mask", |w| {
                w.walk_expr(expr)?;
                w.out.tok(T![","]);
                w.set_arg(1);
                w.walk_expr(cond)
            })?;
            self.out.tok(T![")"]);
            return Ok(());
        }

        // `a[i]` with one plain index stays host indexing.
        if let [IndexItem::Expr(single)] = items {
            if !matches!(single, Expr::Ellipsis(_)) && !is_new_axis(single) {
                self.neutral(|w| w.walk_expr(expr))?;
                self.out.tok(T!["["]);
                self.neutral(|w| w.walk_expr(single))?;
                self.out.tok(T!["]"]);
                return Ok(());
            }
        }

        self.qualified("tensor.Reslice");
        self.out.tok(T!["("]);
        self.in_call("tensor.Reslice", |w| {
            w.walk_expr(expr)?;
            w.set_arg(1);
            for item in items {
                w.out.tok(T![","]);
                w.walk_index_item(item)?;
            }
            Ok(())
        })?;
        self.out.tok(T![")"]);
        Ok(())
    }

    fn walk_index_item(&mut self, item: &IndexItem) -> Result<(), Reject> {
        match item {
            IndexItem::Expr(Expr::Ellipsis(_)) => {
                self.qualified("tensor.Ellipsis");
                Ok(())
            }
            IndexItem::Expr(e) if is_new_axis(e) => {
                self.qualified("tensor.NewAxis");
                Ok(())
            }
            IndexItem::Expr(e) => self.walk_expr(e),
            IndexItem::Slice {
                start: None,
                stop: None,
                step: None,
            } => {
                self.qualified("tensor.FullAxis");
                Ok(())
            }
            IndexItem::Slice { start, stop, step } => {
                self.qualified("tensor.Slice");
                self.out.tok(T!["{"]);
                let mut first = true;
                for (field, value) in [("Start", start), ("Stop", stop), ("Step", step)] {
                    let Some(value) = value else { continue };
                    if !first {
                        self.out.tok(T![","]);
                    }
                    first = false;
                    self.out.ident(field);
                    self.out.tok(T![":"]);
                    self.walk_expr(value)?;
                }
                self.out.tok(T!["}"]);
                Ok(())
            }
        }
    }

    fn walk_call(&mut self, func: &Expr, args: &[Expr], spread: bool) -> Result<(), Reject> {
        match func {
            Expr::Ident(id) => {
                if let Some(mapped) = funcs::free_fn(&id.name) {
                    return self.emit_call(mapped, None, args, spread);
                }
                if args.len() == 1 {
                    if let Some(prop) = funcs::property(&id.name) {
                        return self.walk_property(prop, &args[0]);
                    }
                }
                if let Some((qualified, _)) = funcs::lookup_unqualified(&id.name) {
                    return self.emit_call(qualified, None, args, spread);
                }

                // Unresolved: keep the call as written.
                self.out.ident(id.name.clone());
                self.emit_plain_args(args, spread)
            }
            Expr::Selector { expr, sel } => {
                if let Some(mapped) = funcs::method(&sel.name) {
                    return self.emit_call(mapped, Some(expr.as_ref()), args, spread);
                }

                if let Expr::Ident(pkg) = &**expr {
                    let qualified = format!("{}.{}", pkg.name, sel.name);
                    if funcs::lookup(&qualified).is_some() {
                        return self.emit_call(&qualified, None, args, spread);
                    }
                }

                // Unknown method call: keep it, rewrite the receiver.
                self.neutral(|w| w.walk_expr(expr))?;
                self.out.tok(T!["."]);
                self.out.ident(sel.name.clone());
                self.emit_plain_args(args, spread)
            }
            _ => {
                self.neutral(|w| w.walk_expr(func))?;
                self.emit_plain_args(args, spread)
            }
        }
    }

    /// Emit a call to a registered function, optionally with a
    /// receiver spliced in as the first argument.
    fn emit_call(
        &mut self,
        qualified: &str,
        receiver: Option<&Expr>,
        args: &[Expr],
        spread: bool,
    ) -> Result<(), Reject> {
        self.qualified(qualified);
        self.out.tok(T!["("]);
        self.in_call(qualified, |w| {
            let mut idx = 0;
            if let Some(receiver) = receiver {
                w.walk_expr(receiver)?;
                idx = 1;
            }
            for arg in args {
                if idx > 0 {
                    w.out.tok(T![","]);
                }
                w.set_arg(idx);
                w.walk_expr(arg)?;
                idx += 1;
            }
            Ok(())
        })?;
        if spread {
            self.out.tok(T!["..."]);
        }
        self.out.tok(T![")"]);
        Ok(())
    }

    fn emit_plain_args(&mut self, args: &[Expr], spread: bool) -> Result<(), Reject> {
        self.out.tok(T!["("]);
        self.neutral(|w| {
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    w.out.tok(T![","]);
                }
                w.walk_expr(arg)?;
            }
            Ok(())
        })?;
        if spread {
            self.out.tok(T!["..."]);
        }
        self.out.tok(T![")"]);
        Ok(())
    }

    /// Array literals become value-list constructors; nested literals
    /// reshape the flattened values to the full shape.
    fn walk_array(&mut self, elems: &[Expr], pos: u32) -> Result<(), Reject> {
        let arg = self.cur_arg();
        if arg.int && arg.variadic {
            // A dims position takes the raw values.
            self.neutral(|w| {
                for (i, e) in flatten(elems).iter().enumerate() {
                    if i > 0 {
                        w.out.tok(T![","]);
                    }
                    w.walk_expr(e)?;
                }
                Ok(())
            })?;
            return Ok(());
        }

        let shape = array_shape(elems, pos)?;
        let flat = flatten(elems);
        let (ctor, elem_type) = match element_kind(&flat) {
            LitKind::Float => ("tensor.NewFloat64FromValues", "float64"),
            LitKind::Str => ("tensor.NewStringFromValues", "string"),
            _ => ("tensor.NewIntFromValues", "int"),
        };

        if shape.len() > 1 {
            self.qualified("tensor.Reshape");
            self.out.tok(T!["("]);
        }

        self.qualified(ctor);
        self.out.tok(T!["("]);
        self.out.tok(T!["["]);
        self.out.tok(T!["]"]);
        self.out.ident(elem_type);
        self.out.tok(T!["{"]);
        self.neutral(|w| {
            for (i, e) in flat.iter().enumerate() {
                if i > 0 {
                    w.out.tok(T![","]);
                }
                w.walk_expr(e)?;
            }
            Ok(())
        })?;
        self.out.tok(T!["}"]);
        self.out.tok(T!["..."]);
        self.out.tok(T![")"]);

        if shape.len() > 1 {
            for dim in shape {
                self.out.tok(T![","]);
                self.out.push(Token::int(dim as i64));
            }
            self.out.tok(T![")"]);
        }

        Ok(())
    }
}

fn is_new_axis(e: &Expr) -> bool {
    matches!(e, Expr::Ident(id) if id.name == "newaxis")
}

/// The full shape of a (possibly nested) array literal. Ragged
/// nesting is rejected.
fn array_shape(elems: &[Expr], pos: u32) -> Result<Vec<usize>, Reject> {
    let mut shape = vec![elems.len()];

    if let Some(Expr::Array { elems: inner, .. }) = elems.first() {
        let inner_shape = array_shape(inner, pos)?;
        for e in elems {
            match e {
                Expr::Array { elems: nested, pos } => {
                    if array_shape(nested, *pos)? != inner_shape {
                        return Err(Reject::Invalid("ragged array literal".into()));
                    }
                }
                _ => return Err(Reject::Invalid("ragged array literal".into())),
            }
        }
        shape.extend(inner_shape);
    } else if elems
        .iter()
        .any(|e| matches!(e, Expr::Array { .. }))
    {
        return Err(Reject::Invalid("ragged array literal".into()));
    }

    Ok(shape)
}

fn flatten(elems: &[Expr]) -> Vec<&Expr> {
    let mut out = Vec::new();
    for e in elems {
        match e {
            Expr::Array { elems: inner, .. } => out.extend(flatten(inner)),
            _ => out.push(e),
        }
    }
    out
}

/// Element kind inferred from the first literal, promoted to float
/// when any float literal appears.
fn element_kind(flat: &[&Expr]) -> LitKind {
    let mut kind = None;
    for e in flat {
        if let Expr::Lit(lit) = e {
            if kind.is_none() {
                kind = Some(lit.kind);
            }
            if lit.kind == LitKind::Float {
                return LitKind::Float;
            }
        }
    }
    kind.unwrap_or(LitKind::Float)
}
