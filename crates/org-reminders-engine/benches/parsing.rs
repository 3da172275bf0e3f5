use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use org_reminders_engine::editing::{Document, DocumentWriter};
use org_reminders_engine::models::Stamp;
mod common;

fn bench_document_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let content = common::generate_org_content(100);
    group.bench_function("load", |b| {
        b.iter(|| {
            let doc = Document::load(std::hint::black_box(&content)).unwrap();
            std::hint::black_box(doc);
        });
    });

    let stamp = Stamp::new(
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap(),
    );
    group.bench_function("stamp_all_items", |b| {
        b.iter(|| {
            let mut doc = Document::load(&content).unwrap();
            let stamped = DocumentWriter::new(&mut doc)
                .update_changed_hashes(std::hint::black_box(stamp))
                .unwrap();
            std::hint::black_box(stamped);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_document_parsing);
criterion_main!(benches);
