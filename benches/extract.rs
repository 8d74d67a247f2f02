// benches/extract.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sc_sidekick::core::html::parse_document;
use sc_sidekick::core::parse;
use sc_sidekick::row;

fn sample_page(rows: usize) -> String {
    let mut out = String::from("<html><body><div id=\"rows\">");
    for i in 0..rows {
        out.push_str(&format!(
            "<div class=\"sale\"><h3>Product {i}</h3>\
             <a href=\"/encyclopedia/0/resource/{i}/\">link</a>\
             <div><span style=\"color: rgb(200, 40, 40)\">Profit per unit: $0.{:02}</span></div>\
             <div>Finishes: 18:00 ({}m)</div>\
             <input name=\"price\" value=\"2.{:02}\">\
             <input name=\"quantity\" value=\"{}\">\
             </div>",
            i % 100,
            1 + i % 59,
            i % 100,
            10 + i
        ));
    }
    out.push_str("</div></body></html>");
    out
}

fn bench_parse(c: &mut Criterion) {
    let page = sample_page(200);

    c.bench_function("parse_document_200_rows", |b| {
        b.iter(|| {
            let doc = parse_document(black_box(&page));
            black_box(doc.subtree(doc.root()).len())
        })
    });

    c.bench_function("extract_all_rows", |b| {
        let doc = parse_document(&page);
        let root = doc.root();
        let inputs: Vec<_> = doc
            .subtree(root)
            .into_iter()
            .filter(|&n| doc.is_input_named(n, "price"))
            .collect();
        b.iter(|| {
            let mut acc = 0.0;
            for &input in &inputs {
                if let Some(r) = row::sell_row_from_target(&doc, input) {
                    acc += row::extract_profit_per_unit(&doc, black_box(r));
                    acc += row::extract_finish_seconds(&doc, r);
                }
            }
            black_box(acc)
        })
    });
}

fn bench_numbers(c: &mut Criterion) {
    c.bench_function("parse_number", |b| {
        b.iter(|| black_box(parse::parse_number(black_box("total -$1,234.56 today"))))
    });
    c.bench_function("parse_duration", |b| {
        b.iter(|| black_box(parse::parse_duration_secs(black_box("1d 5h 30m 12s"))))
    });
}

criterion_group!(benches, bench_parse, bench_numbers);
criterion_main!(benches);
