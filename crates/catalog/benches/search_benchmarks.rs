use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lessonbook_catalog::{translate, Lesson};
use lessonbook_core::LessonId;

const SUBJECTS: [&str; 6] = ["Math", "English", "Music", "Art", "Science", "History"];
const LOCATIONS: [&str; 4] = ["Hendon", "Colindale", "Brent Cross", "Golders Green"];

fn catalog(size: usize) -> Vec<Lesson> {
    (0..size)
        .map(|i| Lesson {
            id: LessonId::new(),
            subject: format!("{} {}", SUBJECTS[i % SUBJECTS.len()], i),
            location: LOCATIONS[i % LOCATIONS.len()].to_string(),
            description: format!("Weekly session number {i}"),
            price: (i % 100) as f64,
            spaces: (i % 10) as i64,
            version: 1,
        })
        .collect()
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    for token in ["20", "  12.5 ", "math", "golders green"] {
        group.bench_with_input(BenchmarkId::from_parameter(token.trim()), token, |b, t| {
            b.iter(|| translate(black_box(t)).unwrap())
        });
    }
    group.finish();
}

fn bench_filter_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_scan");
    for size in [100usize, 1_000, 10_000] {
        let lessons = catalog(size);
        group.throughput(Throughput::Elements(size as u64));

        let numeric = translate("42").unwrap();
        group.bench_with_input(BenchmarkId::new("numeric", size), &lessons, |b, lessons| {
            b.iter(|| lessons.iter().filter(|l| numeric.matches(l)).count())
        });

        let text = translate("green").unwrap();
        group.bench_with_input(BenchmarkId::new("text", size), &lessons, |b, lessons| {
            b.iter(|| lessons.iter().filter(|l| text.matches(l)).count())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_translate, bench_filter_scan);
criterion_main!(benches);
