use budget_sync::services::{failing_tests, FailureParser};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn sample_output(failures: usize) -> String {
    let mut out = String::new();
    for i in 0..failures {
        out.push_str(&format!(
            "[info] - budget case {i} *** FAILED ***\n\
             [info]   \x1b[31mExUnits({}, {}) did not equal ExUnits({}, {})\x1b[0m\n\
             [info]   {} did not equal {} (ExprSizeAndBudgetTest.scala:{})\n",
            1000 + i,
            2_000_000 + i,
            1100 + i,
            2_100_000 + i,
            80 + i,
            120 + i,
            10 + i
        ));
    }
    out.push_str("[error] Failed tests:\n");
    for i in 0..failures {
        out.push_str(&format!("[error] \tscalus.bench.Case{i}Test\n"));
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let parser = FailureParser::new("ExUnits", "scala").unwrap();
    let mut group = c.benchmark_group("parse");

    for size in [10, 100, 1000] {
        let output = sample_output(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &output, |b, output| {
            b.iter(|| parser.parse(black_box(output)).unwrap());
        });
    }

    group.finish();
}

fn bench_failing_tests(c: &mut Criterion) {
    let output = sample_output(500);
    c.bench_function("failing_tests_500", |b| {
        b.iter(|| failing_tests(black_box(&output)));
    });
}

criterion_group!(benches, bench_parse, bench_failing_tests);
criterion_main!(benches);
