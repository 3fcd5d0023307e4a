//! 参数解析基准测试

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use uvkit::cli::args;

fn bench_parse_install(c: &mut Criterion) {
    let raw: Vec<String> = ["install", "requests", "urllib3", "-py", "3.12", "*-e!."]
        .iter()
        .map(|s| s.to_string())
        .collect();

    c.bench_function("parse_install_with_passthrough", |b| {
        b.iter(|| args::parse(black_box(&raw)).unwrap())
    });
}

fn bench_parse_venv_list(c: &mut Criterion) {
    let raw: Vec<String> = ["venv", "list", "--all", "-p", "env"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    c.bench_function("parse_venv_list_all", |b| {
        b.iter(|| args::parse(black_box(&raw)).unwrap())
    });
}

criterion_group!(benches, bench_parse_install, bench_parse_venv_list);
criterion_main!(benches);
