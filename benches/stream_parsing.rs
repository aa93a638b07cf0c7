//! Match-stream parsing and name extraction benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use codeatlas::indexing::content_hash;
use codeatlas::language::Language;
use codeatlas::query::{extract_names, extract_sources, queries, Category};
use codeatlas::scanner::parse_match_stream;

/// NDJSON stream shaped like the structural search tool's output
fn generate_stream(records: usize) -> String {
    let mut out = String::with_capacity(records * 200);
    for i in 0..records {
        let record = serde_json::json!({
            "file": format!("src/module_{}/file_{}.ts", i % 20, i),
            "text": format!("export function handler_{}(req, res) {{ return res; }}", i),
            "range": {"start": {"line": i % 400, "column": 0}},
            "metaVariables": {
                "single": {"NAME": {"text": format!("handler_{}", i)}},
                "multi": {"PARAMS": [{"text": "req"}, {"text": "res"}]}
            }
        });
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}

fn generate_export_lists(records: usize) -> String {
    let mut out = String::new();
    for i in 0..records {
        let record = serde_json::json!({
            "file": format!("src/index_{}.js", i),
            "text": format!("export {{ alpha_{i}, beta_{i} as gamma_{i}, delta_{i} }} from './lib_{i}'"),
            "range": {"start": {"line": 0, "column": 0}},
            "metaVariables": {
                "single": {"SOURCE": {"text": format!("'./lib_{}'", i)}},
                "multi": {}
            }
        });
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}

fn bench_parse_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_match_stream");

    for records in [100, 1_000, 10_000] {
        let stream = generate_stream(records);
        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(records), &stream, |b, stream| {
            b.iter(|| parse_match_stream(black_box(stream)))
        });
    }

    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    let single = queries(Language::TypeScript, Category::Exports)
        .find(|q| q.pattern == "export function $NAME($$$PARAMS) { $$$BODY }")
        .expect("catalog has the export function pattern");
    let matches = parse_match_stream(&generate_stream(1_000)).matches;
    group.throughput(Throughput::Elements(matches.len() as u64));
    group.bench_function("single_name", |b| {
        b.iter(|| {
            for record in &matches {
                black_box(extract_names(single, record));
            }
        })
    });

    let list = queries(Language::JavaScript, Category::Exports)
        .find(|q| q.pattern == "export { $$$NAMES } from $SOURCE")
        .expect("catalog has the re-export list pattern");
    let imports = queries(Language::JavaScript, Category::Imports)
        .find(|q| q.pattern == "export { $$$NAMES } from $SOURCE")
        .expect("catalog has the re-export import pattern");
    let lists = parse_match_stream(&generate_export_lists(1_000)).matches;
    group.bench_function("export_list", |b| {
        b.iter(|| {
            for record in &lists {
                black_box(extract_names(list, record));
                black_box(extract_sources(imports, record));
            }
        })
    });

    group.finish();
}

fn bench_content_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_hash");

    for size_kb in [1, 64, 1024] {
        let bytes = vec![b'x'; size_kb * 1024];
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("kb", size_kb), &bytes, |b, bytes| {
            b.iter(|| content_hash(black_box(bytes)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_stream, bench_extraction, bench_content_hash);
criterion_main!(benches);
