use braid_syntax::ast::{Expr, IndexItem, Stmt};
use braid_syntax::parser::Parser;
use braid_syntax::syntax::SyntaxKind;
use braid_syntax::token::tokenize;
use braid_syntax::T;
use test_case::test_case;

fn expr(src: &str) -> Expr {
    let toks = tokenize(src);
    Parser::new(&toks).parse_expr().expect(src)
}

fn stmts(src: &str) -> Vec<Stmt> {
    let toks = tokenize(src);
    Parser::new(&toks).parse_stmts().expect(src)
}

#[test_case("a + b * c" ; "add mul")]
#[test_case("f(x, y)[0].field" ; "call index field")]
#[test_case("a[1:3, ..., newaxis]" ; "slice with ellipsis and newaxis")]
#[test_case("-x ** 2" ; "unary neg pow")]
#[test_case("(a + b) @ c" ; "paren matmul")]
#[test_case("[1, 2, [3]]" ; "nested array literal")]
fn parses(src: &str) {
    expr(src);
}

#[test]
fn precedence_shapes() {
    // `*` binds tighter than `+`.
    let Expr::Binary { op, rhs, .. } = expr("a + b * c") else {
        panic!("expected binary");
    };
    assert_eq!(op, T!["+"]);
    assert!(matches!(*rhs, Expr::Binary { op: T!["*"], .. }));

    // `**` binds tighter than `*` and associates right.
    let Expr::Binary { op, rhs, .. } = expr("a * b ** c ** d") else {
        panic!("expected binary");
    };
    assert_eq!(op, T!["*"]);
    let Expr::Binary { op, rhs, .. } = *rhs else {
        panic!("expected pow");
    };
    assert_eq!(op, T!["**"]);
    assert!(matches!(*rhs, Expr::Binary { op: T!["**"], .. }));

    // `@` sits at multiplicative precedence.
    let Expr::Binary { op, .. } = expr("a @ b + c") else {
        panic!("expected binary");
    };
    assert_eq!(op, T!["+"]);
}

#[test]
fn comparisons_bind_looser_than_arithmetic() {
    let Expr::Binary { op, .. } = expr("a + 1 > b * 2") else {
        panic!("expected binary");
    };
    assert_eq!(op, T![">"]);
}

#[test]
fn index_items() {
    let Expr::Index { items, .. } = expr("a[1:3, :, 2]") else {
        panic!("expected index");
    };
    assert_eq!(items.len(), 3);
    assert!(matches!(
        items[0],
        IndexItem::Slice {
            start: Some(_),
            stop: Some(_),
            step: None
        }
    ));
    assert!(matches!(
        items[1],
        IndexItem::Slice {
            start: None,
            stop: None,
            step: None
        }
    ));
    assert!(matches!(items[2], IndexItem::Expr(Expr::Lit(_))));
}

#[test]
fn call_spread() {
    let Expr::Call { spread, args, .. } = expr("f(xs...)") else {
        panic!("expected call");
    };
    assert!(spread);
    assert_eq!(args.len(), 1);
}

#[test]
fn statement_forms() {
    assert!(matches!(stmts("x := 1")[0], Stmt::Define { .. }));
    assert!(matches!(stmts("x += 1")[0], Stmt::Assign { .. }));
    assert!(matches!(stmts("x++")[0], Stmt::IncDec { .. }));
    assert!(matches!(stmts("ch <- v")[0], Stmt::Send { .. }));
    assert!(matches!(stmts("go f()")[0], Stmt::Go(_)));
    assert!(matches!(stmts("defer f()")[0], Stmt::Defer(_)));
    assert!(matches!(stmts("return a, b")[0], Stmt::Return(_)));
    assert!(matches!(stmts("break out")[0], Stmt::Branch { .. }));
    assert!(matches!(stmts("f(); g()").as_slice(), [Stmt::Expr(_), Stmt::Expr(_)]));
}

#[test]
fn if_else_chain() {
    let Stmt::If { cond, els, .. } = &stmts("if a > 1 { f() } else { g() }")[0] else {
        panic!("expected if");
    };
    assert!(matches!(cond, Expr::Binary { .. }));
    assert!(els.is_some());
}

#[test]
fn for_forms() {
    assert!(matches!(
        stmts("for i := 0; i < 10; i++ { f() }")[0],
        Stmt::For { init: Some(_), cond: Some(_), post: Some(_), .. }
    ));
    assert!(matches!(
        stmts("for x > 0 { f() }")[0],
        Stmt::For { init: None, cond: Some(_), post: None, .. }
    ));

    let Stmt::ForRange { key, value, body, .. } = &stmts("for i, v := range xs {")[0] else {
        panic!("expected range");
    };
    assert_eq!(key.as_ref().map(|k| k.name.as_str()), Some("i"));
    assert_eq!(value.as_ref().map(|v| v.name.as_str()), Some("v"));
    assert!(!body.closed);
}

#[test]
fn unclosed_block_is_tolerated() {
    let Stmt::If { then, .. } = &stmts("if a > 1 {")[0] else {
        panic!("expected if");
    };
    assert!(!then.closed);
    assert!(then.stmts.is_empty());
}

#[test]
fn errors_carry_positions() {
    let toks = tokenize("a + ");
    let err = Parser::new(&toks).parse_expr().unwrap_err();
    assert_eq!(err.kind, braid_syntax::parser::ParseErrorKind::UnexpectedEof);

    let toks = tokenize("f(,)");
    assert!(Parser::new(&toks).parse_expr().is_err());
}

#[test]
fn comments_are_skipped() {
    let toks = tokenize("x := 1 // trailing note");
    assert!(matches!(
        Parser::new(&toks).parse_stmts().unwrap()[0],
        Stmt::Define { .. }
    ));
}

#[test]
fn keywords_lex_as_keywords() {
    let toks = tokenize("for range if");
    let kinds: Vec<SyntaxKind> = toks.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![T!["for"], T!["range"], T!["if"]]);
}
