===== benches/parse_bench.rs =====
//! Parse throughput across document shapes, grouped by `BenchmarkId` so
//! a flamegraph run can tell flat-object parsing apart from deeply
//! nested parsing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use flatjson::{count_tokens, parse_into, Config};

fn flat_object(members: usize) -> String {
    let mut out = String::from("{");
    for i in 0..members {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!("\"k{i}\":{i}"));
    }
    out.push('}');
    out
}

fn nested_array(depth: usize) -> String {
    let mut out = String::new();
    for _ in 0..depth {
        out.push('[');
    }
    out.push('1');
    for _ in 0..depth {
        out.push(']');
    }
    out
}

fn mixed_document(repeat: usize) -> String {
    let mut out = String::from("[");
    for i in 0..repeat {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(r#"{{"id":{i},"name":"item{i}","tags":[1,2,3],"active":true}}"#));
    }
    out.push(']');
    out
}

fn bench_flat_objects(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_object");
    for &members in &[8usize, 64, 512] {
        let src = flat_object(members);
        group.bench_with_input(BenchmarkId::from_parameter(members), &src, |b, src| {
            let cfg = Config::default();
            b.iter(|| {
                let mut toks = Vec::new();
                parse_into(&mut toks, black_box(src.as_bytes()), &cfg).unwrap();
                black_box(toks.len())
            });
        });
    }
    group.finish();
}

fn bench_nested_arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_array");
    for &depth in &[8usize, 64, 256] {
        let src = nested_array(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &src, |b, src| {
            let cfg = Config::default();
            b.iter(|| {
                let mut toks = Vec::new();
                parse_into(&mut toks, black_box(src.as_bytes()), &cfg).unwrap();
                black_box(toks.len())
            });
        });
    }
    group.finish();
}

fn bench_mixed_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_document");
    for &repeat in &[16usize, 128, 1024] {
        let src = mixed_document(repeat);
        group.bench_with_input(BenchmarkId::from_parameter(repeat), &src, |b, src| {
            let cfg = Config::default();
            b.iter(|| {
                let mut toks = Vec::new();
                parse_into(&mut toks, black_box(src.as_bytes()), &cfg).unwrap();
                black_box(toks.len())
            });
        });
    }
    group.finish();
}

fn bench_count_only(c: &mut Criterion) {
    let src = mixed_document(256);
    let cfg = Config::default();
    c.bench_function("count_tokens_only", |b| {
        b.iter(|| black_box(count_tokens(black_box(src.as_bytes()), &cfg).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_flat_objects,
    bench_nested_arrays,
    bench_mixed_document,
    bench_count_only
);
criterion_main!(benches);


