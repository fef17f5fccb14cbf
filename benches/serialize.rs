use std::time::Duration;

use criterion::measurement::WallTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};
use formpath::{
    parse_path, serialize, serialize_entries, validate_entries, Entry, FieldValue, FormField,
    SerializeOptions,
};

/// A dictionary entry form: `senses` with nested `examples`, plus flat metadata.
fn make_entry_form(senses: usize, examples: usize) -> Vec<Entry> {
    let mut fields = vec![
        ("lemma".to_string(), FieldValue::from("run")),
        ("meta.pos".to_string(), FieldValue::from("verb")),
        ("meta.published".to_string(), FieldValue::from(true)),
    ];
    for sense in 0..senses {
        fields.push((
            format!("senses[{sense}].definition"),
            FieldValue::from(format!("definition {sense}")),
        ));
        fields.push((
            format!("senses[{sense}].gloss.en"),
            FieldValue::from(format!("gloss {sense}")),
        ));
        for example in 0..examples {
            fields.push((
                format!("senses[{sense}].examples[{example}].text"),
                FieldValue::from(format!("example {sense}.{example}")),
            ));
        }
    }
    fields
}

/// Fields as a page would post them, including placeholders and disabled inputs.
fn make_page(senses: usize) -> Vec<FormField> {
    let mut fields = vec![
        FormField::new("senses[TEMPLATE].definition", ""),
        FormField::new("senses[TEMPLATE].examples[TEMPLATE].text", ""),
        FormField::new("relations[TEMPLATE].target", ""),
    ];
    for sense in 0..senses {
        fields.push(FormField::new(
            format!("senses[{sense}].definition"),
            format!("definition {sense}"),
        ));
        fields.push(
            FormField::new(format!("senses[{sense}].locked"), "yes").with_disabled(true),
        );
    }
    fields
}

fn make_deep_paths(count: usize, depth: usize) -> Vec<Entry> {
    (0..count)
        .map(|row| {
            let path = (0..depth)
                .map(|level| format!("n{}", (row + level) % 4))
                .collect::<Vec<_>>()
                .join(".");
            (format!("{path}.leaf{row}"), FieldValue::from("x"))
        })
        .collect()
}

fn bench_serialize(group: &mut BenchmarkGroup<'_, WallTime>, name: &str, entries: &[Entry]) {
    let options = SerializeOptions::default();
    group.throughput(criterion::Throughput::Elements(entries.len() as u64));
    group.bench_function(BenchmarkId::new("entries", name), |b| {
        b.iter(|| {
            let out = serialize_entries(black_box(entries).iter().cloned(), &options).unwrap();
            black_box(out);
        })
    });
}

fn bench_validate(group: &mut BenchmarkGroup<'_, WallTime>, name: &str, entries: &[Entry]) {
    let options = SerializeOptions::default();
    group.throughput(criterion::Throughput::Elements(entries.len() as u64));
    group.bench_function(BenchmarkId::new("names", name), |b| {
        b.iter(|| {
            let report = validate_entries(
                black_box(entries).iter().map(|(name, _)| name.as_str()),
                &options,
            );
            black_box(report);
        })
    });
}

fn quick_run(entries: &[Entry], page: &[FormField]) {
    let options = SerializeOptions::default();
    black_box(serialize_entries(black_box(entries).iter().cloned(), &options).unwrap());
    black_box(serialize(black_box(page), &options).unwrap());
    black_box(validate_entries(
        entries.iter().map(|(name, _)| name.as_str()),
        &options,
    ));
}

fn criterion_config() -> Criterion {
    if std::env::var("FORMPATH_BENCH_MINIMAL").is_ok() {
        Criterion::default()
            .warm_up_time(Duration::from_secs(0))
            .measurement_time(Duration::from_millis(10))
            .sample_size(1)
            .nresamples(1)
    } else {
        Criterion::default()
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let small = make_entry_form(4, 2);
    let large = make_entry_form(200, 5);
    let deep = make_deep_paths(1000, 24);
    let page = make_page(200);

    if std::env::var("FORMPATH_BENCH_QUICK").is_ok() {
        quick_run(&small, &page);
        quick_run(&large, &page);
        quick_run(&deep, &page);
        return;
    }

    let mut build = c.benchmark_group("serialize");
    bench_serialize(&mut build, "entry_small", &small);
    bench_serialize(&mut build, "entry_large", &large);
    bench_serialize(&mut build, "deep_paths", &deep);
    build.throughput(criterion::Throughput::Elements(page.len() as u64));
    build.bench_function(BenchmarkId::new("collect", "page_with_templates"), |b| {
        let options = SerializeOptions::default();
        b.iter(|| black_box(serialize(black_box(page.as_slice()), &options).unwrap()))
    });
    build.finish();

    let mut validate = c.benchmark_group("validate");
    bench_validate(&mut validate, "entry_large", &large);
    bench_validate(&mut validate, "deep_paths", &deep);
    validate.finish();

    let mut parse = c.benchmark_group("parse");
    for name in [
        "title",
        "senses[12].examples[3].text",
        "a.b.c.d.e.f.g.h.i.j.k.l.m.n.o.p",
    ] {
        parse.bench_function(BenchmarkId::new("path", name), |b| {
            b.iter(|| black_box(parse_path(black_box(name)).unwrap()))
        });
    }
    parse.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = criterion_benchmark
}
criterion_main!(benches);
