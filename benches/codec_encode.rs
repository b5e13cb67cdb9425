//! Benchmarks for block encoding and article segmentation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wikitrans::codec::{encode, restore_elements};
use wikitrans::markup::parse_article;

fn paragraph(links: usize) -> String {
    let mut markup = String::from(r#"<p id="mwAQ">"#);
    for i in 0..links {
        markup.push_str(&format!(
            r#"Sentence {i} mentions <a rel="mw:WikiLink" href="./Topic_{i}" title="Topic {i}">topic {i}</a><sup typeof="mw:Extension/ref">[{i}]</sup>. "#
        ));
    }
    markup.push_str("</p>");
    markup
}

fn codec_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for links in [1_usize, 10, 100] {
        let markup = paragraph(links);
        group.bench_function(format!("encode_{links}_links"), |b| {
            b.iter(|| black_box(encode(black_box(&markup))));
        });

        let encoded = encode(&markup);
        group.bench_function(format!("restore_{links}_elements"), |b| {
            b.iter(|| black_box(restore_elements(black_box(&encoded.text), &encoded.vault)));
        });
    }

    group.finish();
}

fn segment_benchmark(c: &mut Criterion) {
    let body: String = (0..200).map(|_| paragraph(3)).collect();
    let document = format!(
        r#"<html><head><link rel="stylesheet" href="/w/load.php"></head><body class="mw-body"><section>{}</section></body></html>"#,
        body
    );
    c.bench_function("parse_article_200_blocks", |b| {
        b.iter(|| black_box(parse_article(black_box(&document), "https://en.wikipedia.org")));
    });
}

criterion_group!(benches, codec_benchmark, segment_benchmark);
criterion_main!(benches);
