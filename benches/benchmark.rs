//! Benchmarks for ctxpack's per-file and per-document hot paths.
//!
//! Run with: `cargo bench`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ctxpack::packer::{
    DocumentHeader, HeuristicEstimator, Minifier, PackedFile, TokenEstimator, WhitespaceMinifier,
    render_document,
};

fn sample_source(paragraphs: usize) -> String {
    let paragraph = "fn handler(request: Request) -> Response {\n    let body = request.body();\n    Response::ok(body)\n}\n\n\n\n";
    paragraph.repeat(paragraphs)
}

/// Benchmark blank-line minification.
fn bench_minify(c: &mut Criterion) {
    let mut group = c.benchmark_group("minify");
    let minifier = WhitespaceMinifier::default();

    for paragraphs in [10, 100, 1_000] {
        let source = sample_source(paragraphs);
        group.bench_with_input(
            BenchmarkId::new("whitespace", source.len()),
            &source,
            |b, text| b.iter(|| std::hint::black_box(minifier.minify(text, Some(".rs")))),
        );
    }

    group.finish();
}

/// Benchmark heuristic token estimation.
fn bench_token_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_estimate");
    let estimator = HeuristicEstimator::default();

    let small = "fn main() { println!(\"Hello\"); }";
    let medium = include_str!("../src/packer/engine.rs");

    group.bench_with_input(BenchmarkId::new("small_snippet", small.len()), &small, |b, text| {
        b.iter(|| std::hint::black_box(estimator.estimate(text)))
    });
    group.bench_with_input(
        BenchmarkId::new("medium_source", medium.len()),
        &medium,
        |b, text| b.iter(|| std::hint::black_box(estimator.estimate(text))),
    );

    group.finish();
}

/// Benchmark document rendering.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let generated = NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid timestamp");
    let header = DocumentHeader::new("bench", &[], generated, true);
    let content = sample_source(20);

    for count in [10, 200] {
        let files: Vec<PackedFile> = (0..count)
            .map(|i| PackedFile {
                relative_path: format!("src/module_{i}.rs"),
                content: content.clone(),
                original_size: content.len(),
                packed_size: content.len(),
                priority: 1000,
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("files", count), &files, |b, files| {
            b.iter(|| std::hint::black_box(render_document(&header, files)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_minify, bench_token_estimate, bench_render);
criterion_main!(benches);
