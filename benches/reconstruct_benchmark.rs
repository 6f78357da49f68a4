//! Benchmarks for unform reconstruction and schema inference.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic recorded layouts.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use unform::parser::{RecordedDocument, RecordedPage};

/// Creates a recorded layout with one line-item table per page.
fn create_test_layout(page_count: usize) -> Vec<u8> {
    let mut markdown = String::from("# Purchase Order\n\nPO4500012\n[TAB]\n");

    for page in 0..page_count {
        if page > 0 {
            markdown.push_str("-----\n");
        }
        markdown.push_str("##0;0;612;792##\n");
        if page == 0 {
            markdown.push_str("|Ship To: Acme Inc;Terms: Net 30|\n");
        }
        markdown.push_str("|Line #|Item|Qty|Price|Ship Date|\n|---|---|---|---|---|\n");
        for line in 0..25 {
            let n = page * 25 + line + 1;
            markdown.push_str(&format!("|{}|Part {}|{}|${}.50|3/{}/2024|\n", n, n, line + 1, n, line % 28 + 1));
        }
    }
    markdown.push_str("|Total|$1,309.75|\n");

    let doc = RecordedDocument {
        markdown,
        pages: vec![RecordedPage::default(); page_count],
    };
    serde_json::to_vec(&doc).unwrap()
}

/// Benchmark reconstruction at various sizes.
fn bench_reconstruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruction");

    for page_count in [1, 5, 10].iter() {
        let data = create_test_layout(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| {
                let _ = unform::Unform::new().reconstruct(black_box(&data), "bench.pdf");
            });
        });
    }

    group.finish();
}

/// Benchmark schema inference and change detection.
fn bench_schema_detection(c: &mut Criterion) {
    let data = create_test_layout(5);
    let result = unform::Unform::new().reconstruct(&data, "bench.pdf").unwrap();
    let annotations = unform::AnnotationSource::new(
        "Total $1,309.75",
        vec![unform::Entity::new("MONEY", "$1,309.75")],
    );
    let engine = unform::SchemaEngine::new(unform::SchemaOptions::new().with_data_source("bench"));

    c.bench_function("schema_detection", |b| {
        b.iter(|| result.infer_schema(&engine, black_box(&annotations), "orders").unwrap());
    });
}

criterion_group!(benches, bench_reconstruction, bench_schema_detection);
criterion_main!(benches);
