use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempo_core::materialization::complete_occurrence;
use tempo_core::models::{RecurrenceRule, Task, WeekdaySet};
use tempo_core::reconcile::merge;
use tempo_core::recurrence::{generate_instances, RecurrenceManager};
use tempo_core::timezone::CalendarContext;

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 6, 9, 0, 0).unwrap()
}

fn create_template(rule: RecurrenceRule) -> Task {
    Task::new("Benchmark Task", anchor(), anchor()).recurring(rule)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bench_generation_by_range_length(c: &mut Criterion) {
    let ctx = CalendarContext::utc();
    let template = create_template(RecurrenceRule::daily(1));
    let start = date(2024, 1, 1);

    let mut group = c.benchmark_group("generation_by_range_length");
    for days in [7u64, 30, 90, 365].iter() {
        let end = start.checked_add_days(Days::new(*days)).unwrap();
        group.bench_with_input(BenchmarkId::new("days", days), days, |b, _| {
            b.iter(|| generate_instances(black_box(&template), black_box(start), black_box(end), &ctx))
        });
    }
    group.finish();
}

/// Ranges decades after the anchor exercise the fast-forward path.
fn bench_far_future_generation(c: &mut Criterion) {
    let ctx = CalendarContext::from_name("Europe/Berlin").unwrap();
    let weekdays = WeekdaySet::from_indices(&[1, 3, 5]).unwrap();
    let rules = vec![
        ("daily", RecurrenceRule::daily(2)),
        ("weekly_set", RecurrenceRule::weekly_on(3, weekdays)),
        ("monthly", RecurrenceRule::monthly(1)),
        ("yearly", RecurrenceRule::yearly(1)),
    ];
    let start = date(2090, 1, 1);
    let end = date(2090, 1, 31);

    let mut group = c.benchmark_group("far_future_generation");
    for (name, rule) in rules {
        let template = create_template(rule);
        group.bench_with_input(BenchmarkId::new("pattern", name), &template, |b, template| {
            b.iter(|| generate_instances(black_box(template), black_box(start), black_box(end), &ctx))
        });
    }
    group.finish();
}

fn bench_merge_with_exceptions(c: &mut Criterion) {
    let ctx = CalendarContext::utc();
    let now = anchor();
    let templates: Vec<Task> = (1..=20)
        .map(|interval| create_template(RecurrenceRule::daily(interval)))
        .collect();
    let start = date(2024, 3, 1);
    let end = date(2024, 3, 31);

    // Complete every occurrence of the first few series
    let mut persisted = templates.clone();
    for template in templates.iter().take(5) {
        for instance in generate_instances(template, start, end, &ctx) {
            let day = ctx.local_date(instance.due_at);
            if let Ok(done) = complete_occurrence(template, day, &ctx, now) {
                persisted.push(done);
            }
        }
    }

    c.bench_function("merge_month_twenty_templates", |b| {
        b.iter(|| merge(black_box(persisted.clone()), black_box(&templates), start, end, &ctx))
    });
}

fn bench_preview(c: &mut Criterion) {
    let weekdays = WeekdaySet::from_indices(&[1, 2, 3, 4, 5]).unwrap();
    let manager =
        RecurrenceManager::new(create_template(RecurrenceRule::weekly_on(2, weekdays)), CalendarContext::utc())
            .unwrap();
    let from = date(2030, 6, 1);

    c.bench_function("preview_occurrences", |b| {
        b.iter(|| manager.preview_occurrences(black_box(from), black_box(25)))
    });
}

criterion_group!(
    benches,
    bench_generation_by_range_length,
    bench_far_future_generation,
    bench_merge_with_exceptions,
    bench_preview
);
criterion_main!(benches);
