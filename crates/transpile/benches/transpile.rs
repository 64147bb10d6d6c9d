use braid_transpile::{Options, Transpiler};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_transpile(c: &mut Criterion) {
    let transpiler = Transpiler::new(Options::default());

    c.bench_function("shell_pipeline", |b| {
        let src = include_str!("../../../testdata/valid/pipeline.bd");
        b.iter(|| transpiler.transpile(black_box(src)));
    });

    c.bench_function("math_matrix", |b| {
        let src = include_str!("../../../testdata/valid/matrix.bd");
        b.iter(|| transpiler.transpile(black_box(src)));
    });

    c.bench_function("host_passthrough", |b| {
        let src = include_str!("../../../testdata/valid/funcs.bd");
        b.iter(|| transpiler.transpile(black_box(src)));
    });
}

criterion_group!(benches, bench_transpile);
criterion_main!(benches);
