use braid_transpile::{Options, Transpiler};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn transpile(src: &str) -> braid_transpile::Output {
    Transpiler::new(Options::default()).transpile(src)
}

/// Translate a single line and return the body line it produced.
fn line(src: &str) -> String {
    let out = transpile(src);
    for err in &out.errors {
        if !matches!(
            err.error,
            braid_transpile::Error::UnclosedBrackets { .. }
        ) {
            panic!("unexpected error for {src:?}: {err}");
        }
    }

    let lines: Vec<&str> = out.code.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.trim() == "_ = runtime")
        .expect("preamble");
    lines[start + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty() && *l != "}")
        .unwrap_or("")
        .to_string()
}

#[test_case("ls -la", r#"runtime.Run("ls", "-la")"#; "run simple")]
#[test_case(
    "cat file | grep -v exe > test.out",
    r#"runtime.Start("cat", "file", "|"); runtime.Run("grep", "-v", "exe", ">", "test.out")"#;
    "pipe"
)]
#[test_case("[mkdir sub]", r#"runtime.RunErrOK("mkdir", "sub")"#; "optional")]
#[test_case("go build &", r#"runtime.Start("go", "build")"#; "background")]
#[test_case("a[1,2] = 55", "a.Set(55, int(1), int(2))"; "nd index set")]
#[test_case(
    "# x := a + 1",
    "x := tensor.Tensor(tmath.Add(a, tensor.NewIntScalar(1)))";
    "math define"
)]
#[test_case("# zeros(3, 4)", "tensor.NewFloat64(3, 4)"; "zeros")]
#[test_case(
    "# a[:3, 2].reshape(4, 2)",
    "tensor.Reshape(tensor.Reslice(a, tensor.Slice{Stop:3}, 2), 4, 2)";
    "reslice reshape"
)]
#[test_case(
    "# a[a > 5]",
    "tensor.Mask(a, tmath.Greater(a, tensor.NewIntScalar(5)))";
    "boolean mask"
)]
#[test_case(
    "# for i, v := range a {",
    "for i := 0; i < a.Len(); i++ { v := a.Float1D(i)";
    "range lowering"
)]
fn scenarios(src: &str, expected: &str) {
    assert_eq!(line(src), expected);
}

#[test_case("x := f(1, 2)"; "call")]
#[test_case("if x > 5 { return }"; "if statement")]
#[test_case("y := a[1]"; "single index")]
#[test_case(r#"fmt.Println("hi")"#; "qualified call")]
fn host_passthrough_is_stable(src: &str) {
    assert_eq!(line(src), src);
}

#[test]
fn math_walker_is_deterministic() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let a = transpile("# a[:3, 2].reshape(4, 2)\n").code;
    let b = transpile("# a[:3, 2].reshape(4, 2)\n").code;
    assert_eq!(a, b);
}

#[test]
fn sticky_math_mode() {
    let out = transpile("##\nx := a + 1\n##\ny := 1\n");
    assert!(out
        .code
        .contains("x := tensor.Tensor(tmath.Add(a, tensor.NewIntScalar(1)))"));
    // After the second toggle the line is host again.
    assert!(out.code.contains("y := 1"));
    assert!(!out.code.contains("y := tensor"));
}

#[test]
fn math_toggle_is_idempotent() {
    let out = transpile("##\n##\n##\n##\nx := 1\n");
    assert!(out.code.contains("x := 1"));
    assert!(out.errors.is_empty());
}

#[test]
fn math_toggle_with_trailing_text() {
    // Anything after the `##` pair is commentary; the toggle still
    // engages and the line emits nothing.
    let out = transpile("## stats section\nx := a + 1\n##\n");
    assert!(out
        .code
        .contains("x := tensor.Tensor(tmath.Add(a, tensor.NewIntScalar(1)))"));
    assert!(!out.code.contains("stats section"));
    assert!(out.errors.is_empty());
}

#[test]
fn inline_spans_compose() {
    assert_eq!(
        line("v := #a + 1# + 2"),
        "v := tmath.Add(a, tensor.NewIntScalar(1)) + 2"
    );
    assert_eq!(line("files := $ls -1$"), r#"files := runtime.Output("ls", "-1")"#);
}

#[test]
fn command_block_round_trip() {
    let out = transpile("command build {\ngo build &\n}\nbuild all\n");
    assert!(out
        .code
        .contains(r#"runtime.AddCommand("build", func(args ...string) {"#));
    assert!(out.code.contains(r#"runtime.Start("go", "build")"#));
    assert!(out.code.contains("})"));
    assert!(out
        .code
        .contains(r#"runtime.RunCommands([]any{"build", "all"})"#));
    assert!(out.balanced);
}

#[test]
fn unbalanced_brackets_reported() {
    let out = transpile("func f() {\n");
    assert!(!out.balanced);
    assert!(out.errors.iter().any(|e| matches!(
        e.error,
        braid_transpile::Error::UnclosedBrackets { brace: 1, .. }
    )));
    // The partial output is still produced.
    assert!(out.code.contains("func f() {"));
}

#[test]
fn depths_balance_over_well_formed_file() {
    let out = transpile("func f() {\n\tx := 1\n}\n\nfunc g() {\n\ty := 2\n}\n");
    assert!(out.balanced);
    assert!(out.errors.is_empty());
}

#[test]
fn package_clause_suppresses_wrapper() {
    let out = transpile("package tools\n\nfunc f() {\n}\n");
    assert!(out.code.contains("package tools"));
    assert!(!out.code.contains("func main()"));
    assert!(out.code.starts_with("// Code generated by \"braid build\"; DO NOT EDIT."));
}

#[test]
fn wrapper_synthesized_without_package() {
    let out = transpile("ls\n");
    let expected = "// Code generated by \"braid build\"; DO NOT EDIT.\n\n\
                    package main\n\n\
                    func main() {\n\
                    \truntime := braidrt.New()\n\
                    \t_ = runtime\n\n\
                    runtime.Run(\"ls\")\n\
                    }\n";
    assert_eq!(out.code, expected);
}

#[test]
fn record_vars_appends_registration() {
    let out = Transpiler::new(Options {
        record_vars: true,
        ..Options::default()
    })
    .transpile("# x := 1\n");
    assert!(out
        .code
        .contains(r#"x := tensor.Tensor(tensor.NewIntScalar(1)); datafs.Record(x, "x")"#));
}

#[test]
fn interactive_rewrites_top_level_funcs() {
    let out = Transpiler::new(Options {
        interactive: true,
        ..Options::default()
    })
    .transpile("func hello() {\n}\n");
    assert!(out.code.contains("hello := func() {"));
}

#[test]
fn math_builtins() {
    assert_eq!(line("# cd sub"), r#"datafs.Cd("sub")"#);
    assert_eq!(line("# ls -l"), "datafs.List(datafs.Long)");
    assert_eq!(line("# mkdir results"), r#"datafs.Mkdir("results")"#);
    assert_eq!(
        line("# set x a + 1"),
        r#"datafs.Set("x", tmath.Add(a, tensor.NewIntScalar(1)))"#
    );
    assert_eq!(
        line("# y := get(\"x\") + 1"),
        r#"y := tensor.Tensor(tmath.Add(datafs.Get("x"), tensor.NewIntScalar(1)))"#
    );
}

#[test]
fn math_operators() {
    assert_eq!(line("# a ** 2"), "tmath.Pow(a, tensor.NewIntScalar(2))");
    assert_eq!(line("# a @ b"), "matrix.Mul(a, b)");
    assert_eq!(line("# -a"), "tmath.Negate(a)");
    assert_eq!(line("# !a"), "tmath.Not(a)");
    assert_eq!(
        line("# a && b || c"),
        "tmath.Or(tmath.And(a, b), c)"
    );
    assert_eq!(line("# x++"), "tmath.Inc(x)");
    assert_eq!(line("# cos(a)"), "tmath.Cos(a)");
    // Unresolved names pass through untouched.
    assert_eq!(line("# mean(a)"), "mean(a)");
    assert_eq!(line("# stats.Mean(a)"), "stats.Mean(a)");
}

#[test]
fn math_array_literals() {
    assert_eq!(
        line("# [1, 2, 3]"),
        "tensor.NewIntFromValues([]int{1, 2, 3}...)"
    );
    assert_eq!(
        line("# [1.5, 2]"),
        "tensor.NewFloat64FromValues([]float64{1.5, 2}...)"
    );
    assert_eq!(
        line("# [[1, 2], [3, 4]]"),
        "tensor.Reshape(tensor.NewIntFromValues([]int{1, 2, 3, 4}...), 2, 2)"
    );
}

#[test]
fn math_properties_and_slicing() {
    assert_eq!(line("# a.ndim"), "tensor.NewIntScalar(a.NumDims())");
    assert_eq!(
        line("# a.shape"),
        "tensor.NewIntFromValues(a.Shape().Sizes...)"
    );
    assert_eq!(
        line("# a[:, 1]"),
        "tensor.Reslice(a, tensor.FullAxis, 1)"
    );
    assert_eq!(
        line("# a[..., newaxis]"),
        "tensor.Reslice(a, tensor.Ellipsis, tensor.NewAxis)"
    );
    assert_eq!(
        line("# a[1:8:2]"),
        "tensor.Reslice(a, tensor.Slice{Start:1, Stop:8, Step:2})"
    );
}

#[test]
fn math_assignment_forms() {
    assert_eq!(
        line("# a[1] = 3"),
        "tmath.Assign(a[1], tensor.NewIntScalar(3))"
    );
    assert_eq!(
        line("# a[1] += 3"),
        "tmath.AddAssign(a[1], tensor.NewIntScalar(3))"
    );
    assert_eq!(
        line("# x = a + b"),
        "x = tmath.Add(a, b)"
    );
}

#[test]
fn math_if_condition_coerced() {
    assert_eq!(
        line("# if a > 5 {"),
        "if tmath.Greater(a, tensor.NewIntScalar(5)).Bool1D(0) {"
    );
}

#[test]
fn math_passes_unhandled_statements_through() {
    let out = transpile("##\nswitch x {\ncase 1:\n}\n##\n");
    assert!(out.code.contains("switch x {"));
    assert!(out.code.contains("case 1:"));
    assert!(out.errors.is_empty());
}

#[test]
fn math_parse_error_passes_through() {
    let out = transpile("# x := )broken\n");
    assert!(out
        .errors
        .iter()
        .any(|e| matches!(e.error, braid_transpile::Error::MathParse { .. })));
    // The original tokens survive.
    assert!(out.code.contains("broken"));
}

#[test]
fn blank_range_identifier_rejected() {
    let out = transpile("# for _, v := range a {\n");
    assert!(out
        .errors
        .iter()
        .any(|e| matches!(e.error, braid_transpile::Error::Math { .. })));
}

#[test]
fn line_counts_preserved() {
    let src = "#!/usr/bin/env braid\nls\n\nls\n";
    let out = transpile(src);
    let body: Vec<&str> = out
        .code
        .lines()
        .skip_while(|l| l.trim() != "_ = runtime")
        // the marker line and the blank that follows the preamble
        .skip(2)
        .collect();
    // shebang and blank lines keep their slots.
    assert_eq!(body[0], "");
    assert_eq!(body[1], r#"runtime.Run("ls")"#);
    assert_eq!(body[2], "");
    assert_eq!(body[3], r#"runtime.Run("ls")"#);
}
