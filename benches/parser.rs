use std::fmt::Write;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use xmi2hpo::Ontology;

/// Builds an obo file with a deep chain of terms below `HP:0000118`
fn synthetic_obo(terms: u32) -> String {
    let mut obo = String::from("format-version: 1.2\n\n[Term]\nid: HP:0000001\nname: All\n\n");
    obo.push_str("[Term]\nid: HP:0000118\nname: Phenotypic abnormality\nis_a: HP:0000001 ! All\n\n");
    for id in 1000..1000 + terms {
        let parent = if id % 10 == 0 { 118 } else { id - 1 };
        writeln!(
            obo,
            "[Term]\nid: HP:{id:07}\nname: Term {id}\nxref: UMLS:C{id:07}\nis_a: HP:{parent:07} ! parent\n"
        )
        .expect("writing to a String cannot fail");
    }
    obo
}

fn parse_obo_benchmark(c: &mut Criterion) {
    let obo = synthetic_obo(20_000);
    c.bench_function("parse obo", |b| {
        b.iter(|| {
            Ontology::from_obo_str(black_box(&obo))
                .expect("requires valid obo data")
                .len()
        })
    });
}

criterion_group! {
    name = parser;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(10));
    targets = parse_obo_benchmark
}
criterion_main!(parser);
