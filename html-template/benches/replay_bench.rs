use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use html_template::HtmlParser;
use std::hint::black_box;
use template_parser::ParseOptions;

// --- Template Generation ---

/// A table with `rows` rows; every cell holds one slot.
fn table_fragments(rows: usize) -> Vec<String> {
    let mut fragments = Vec::with_capacity(rows * 2 + 1);
    let mut current = String::from(r#"<table class="grid">"#);
    for row in 0..rows {
        current.push_str(&format!(r#"<tr id="row{row}"><td class="name">"#));
        fragments.push(std::mem::take(&mut current));
        current.push_str(r#"</td><td class="value" title="#);
        fragments.push(std::mem::take(&mut current));
        current.push_str("> text </td></tr>");
    }
    current.push_str("</table>");
    fragments.push(current);
    fragments
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("html_template");

    for rows in [10, 100] {
        let fragments = table_fragments(rows);
        let values: Vec<String> = (0..rows * 2).map(|index| format!("value {index}")).collect();
        let bytes: usize = fragments.iter().map(String::len).sum();
        group.throughput(Throughput::Bytes(bytes as u64));

        let parser = HtmlParser::<String>::new();
        group.bench_function(format!("uncached_{rows}_rows"), |b| {
            b.iter(|| {
                let element = parser.parse_with(
                    fragments.clone(),
                    black_box(&values),
                    &ParseOptions::uncached(),
                );
                black_box(element)
            })
        });

        // First call records the derivation; the measured calls replay it.
        let parser = HtmlParser::<String>::new();
        let _ = parser.parse(fragments.clone(), &values);
        group.bench_function(format!("replay_{rows}_rows"), |b| {
            b.iter(|| black_box(parser.parse(fragments.clone(), black_box(&values))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_replay);
criterion_main!(benches);
