//! Throughput of both escape passes over generated translation units

use checks::{detect_auto_variable_escapes, detect_local_array_pointer_returns};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use diagnostics::Diagnostic;
use tokenizer::tokenize_str;

/// `count` functions mixing clean code with each escape shape
fn generate_unit(count: usize) -> String {
    let mut code = String::from("#include <stdlib.h>\n\n");

    for i in 0..count {
        match i % 4 {
            0 => code.push_str(&format!(
                "void out{i}(int **pp, int n)\n{{\n    int x{i} = n;\n    if (n) {{\n        *pp = &x{i};\n    }}\n}}\n\n"
            )),
            1 => code.push_str(&format!(
                "int *arr{i}(void)\n{{\n    int buf{i}[16];\n    buf{i}[0] = {i};\n    return buf{i};\n}}\n\n"
            )),
            2 => code.push_str(&format!(
                "void release{i}(int *heap)\n{{\n    int tmp{i}[4];\n    free(heap);\n    free(tmp{i});\n}}\n\n"
            )),
            _ => code.push_str(&format!(
                "int sum{i}(int *v, int n)\n{{\n    int i, total = 0;\n    for (i = 0; i < n; i++) {{\n        total += v[i];\n    }}\n    return total;\n}}\n\n"
            )),
        }
    }

    code
}

fn bench_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_variables");

    for count in [10, 100, 1000] {
        let tokens = tokenize_str(&generate_unit(count)).unwrap();

        group.bench_with_input(BenchmarkId::new("escapes", count), &tokens, |b, tokens| {
            b.iter(|| {
                let mut findings: Vec<Diagnostic> = Vec::new();
                detect_auto_variable_escapes(black_box(tokens), &mut findings);
                findings
            })
        });

        group.bench_with_input(
            BenchmarkId::new("local_array_returns", count),
            &tokens,
            |b, tokens| {
                b.iter(|| {
                    let mut findings: Vec<Diagnostic> = Vec::new();
                    detect_local_array_pointer_returns(black_box(tokens), &mut findings);
                    findings
                })
            },
        );
    }

    group.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    let source = generate_unit(1000);
    c.bench_function("tokenize_1000_functions", |b| {
        b.iter(|| tokenize_str(black_box(&source)).unwrap())
    });
}

criterion_group!(benches, bench_passes, bench_tokenize);
criterion_main!(benches);
