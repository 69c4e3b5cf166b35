//! Benchmark suite for jxview
//!
//! Run with: `cargo bench --bench benchmarks`
//! View report: `open target/criterion/report/index.html`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use jxview::config::{Config, SerializerConfig};
use jxview::file_types::DocumentFormat;
use jxview::parsers::Parser;
use jxview::parsers::json::JsonParser;
use jxview::parsers::xml::XmlParser;
use jxview::reactive::ViewModelExt;
use jxview::serializers;
use jxview::tree::{NodePath, TreeNode};
use jxview::viewmodels::TreeNodeViewModel;
use jxview::viewmodels::node::{BEGIN_EDIT, COMMIT_EDIT};

// =============================================================================
// Test Data Generation
// =============================================================================

fn generate_json(record_count: usize) -> String {
    let records: Vec<String> = (0..record_count)
        .map(|i| {
            format!(
                r#"{{"id": {i}, "name": "record-{i}", "active": {}, "score": {}.5, "tags": ["a", "b"], "parent": null}}"#,
                i % 2 == 0,
                i * 3
            )
        })
        .collect();
    format!(r#"{{"version": 2, "records": [{}]}}"#, records.join(", "))
}

fn generate_xml(record_count: usize) -> String {
    let mut content = String::from("<?xml version=\"1.0\"?>\n<records version=\"2\">\n");
    for i in 0..record_count {
        content.push_str(&format!(
            "  <record id=\"{i}\">\n    <name>record-{i}</name>\n    <active>{}</active>\n    <note>a &amp; b</note>\n  </record>\n",
            i % 2 == 0
        ));
    }
    content.push_str("</records>\n");
    content
}

// =============================================================================
// Parser Benchmarks
// =============================================================================

fn bench_parsers(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsers");

    for record_count in [10, 100, 1000] {
        let json_content = generate_json(record_count);
        let json_parser = JsonParser::new();
        group.bench_with_input(
            BenchmarkId::new("json", record_count),
            &json_content,
            |b, content| {
                b.iter(|| json_parser.parse(black_box(content)));
            },
        );

        let xml_content = generate_xml(record_count);
        let xml_parser = XmlParser::new();
        group.bench_with_input(
            BenchmarkId::new("xml", record_count),
            &xml_content,
            |b, content| {
                b.iter(|| xml_parser.parse(black_box(content)));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Serializer Benchmarks
// =============================================================================

fn bench_serializers(c: &mut Criterion) {
    let mut group = c.benchmark_group("serializers");
    let pretty = SerializerConfig::default();

    for record_count in [10, 100, 1000] {
        let json_tree = JsonParser::new()
            .parse(&generate_json(record_count))
            .unwrap();
        group.bench_with_input(
            BenchmarkId::new("json", record_count),
            &json_tree,
            |b, tree| {
                b.iter(|| serializers::serialize(black_box(tree), DocumentFormat::Json, &pretty));
            },
        );

        let xml_tree = XmlParser::new().parse(&generate_xml(record_count)).unwrap();
        group.bench_with_input(
            BenchmarkId::new("xml", record_count),
            &xml_tree,
            |b, tree| {
                b.iter(|| serializers::serialize(black_box(tree), DocumentFormat::Xml, &pretty));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Tree Benchmarks
// =============================================================================

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    let tree = JsonParser::new().parse(&generate_json(1000)).unwrap();

    group.bench_function("count", |b| {
        b.iter(|| black_box(&tree).count());
    });

    group.bench_function("find_last_record", |b| {
        b.iter(|| black_box(&tree).find("records/[999]/tags/[1]"));
    });

    group.bench_function("outline", |b| {
        let display = Config::default().display;
        b.iter(|| jxview::outline::render(black_box(&tree), &display, None));
    });

    group.finish();
}

// =============================================================================
// View-Model Benchmarks
// =============================================================================

fn bench_view_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_models");
    let leaf = TreeNode::leaf("port", "8080");

    group.bench_function("node_construction", |b| {
        b.iter(|| TreeNodeViewModel::new(black_box(&leaf), NodePath::root()));
    });

    group.bench_function("edit_cycle", |b| {
        let mut vm = TreeNodeViewModel::new(&leaf, NodePath::root()).unwrap();
        let values = ["9090", "8080"];
        let mut i = 0;
        b.iter(|| {
            vm.invoke(BEGIN_EDIT, None).ok();
            vm.invoke(COMMIT_EDIT, Some(values[i % 2])).ok();
            i += 1;
        });
    });

    group.bench_function("unchanged_write", |b| {
        let mut vm = TreeNodeViewModel::new(&leaf, NodePath::root()).unwrap();
        b.iter(|| vm.set_edit_text(black_box("8080")));
    });

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_parsers,
    bench_serializers,
    bench_tree,
    bench_view_models,
);

criterion_main!(benches);
