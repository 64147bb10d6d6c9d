use braid_transpile::{Options, Transpiler};
use test_case::test_case;

#[test_case("hello", include_str!("../../../testdata/valid/hello.bd"))]
#[test_case("pipeline", include_str!("../../../testdata/valid/pipeline.bd"))]
#[test_case("stats", include_str!("../../../testdata/valid/stats.bd"))]
#[test_case("matrix", include_str!("../../../testdata/valid/matrix.bd"))]
#[test_case("command", include_str!("../../../testdata/valid/command.bd"))]
#[test_case("funcs", include_str!("../../../testdata/valid/funcs.bd"))]
fn transpile_valid(name: &str, src: &str) {
    let out = Transpiler::new(Options::default()).transpile(src);

    assert!(out.balanced, "{name}: unbalanced brackets");
    assert!(out.errors.is_empty(), "{name}: {:#?}", out.errors);
    assert!(out.code.starts_with("// Code generated by \"braid build\"; DO NOT EDIT."));
}

#[test_case("hello", include_str!("../../../testdata/valid/hello.bd"))]
#[test_case("stats", include_str!("../../../testdata/valid/stats.bd"))]
#[test_case("matrix", include_str!("../../../testdata/valid/matrix.bd"))]
fn transpile_twice_is_identical(name: &str, src: &str) {
    let first = Transpiler::new(Options::default()).transpile(src).code;
    let second = Transpiler::new(Options::default()).transpile(src).code;
    assert_eq!(first, second, "{name}: differs between runs");
}
