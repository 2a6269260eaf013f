use chrono::{Days, NaiveDate};
use criterion::{criterion_group, criterion_main, Criterion};
use fitsocial::models::{Activity, NewActivity};
use fitsocial::stats::{
    aggregate_by_sport, analyze_progression, personal_records, Dashboard, WeeklyAggregate,
};
use std::hint::black_box;

const SPORTS: [&str; 5] = ["Course", "Vélo", "Natation", "Randonnée", "Marche"];

/// Ten years of near-daily training spread over five sports.
fn history() -> Vec<Activity> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid date");
    (0..3650u64)
        .filter(|day| day % 7 != 3)
        .map(|day| {
            let sport = SPORTS[(day % SPORTS.len() as u64) as usize];
            NewActivity {
                user_id: 1,
                name: format!("{} #{}", sport, day),
                sport: sport.to_string(),
                date: start + Days::new(day),
                duration_seconds: Some(1800 + (day % 90) as i64 * 60),
                distance_meters: (day % 4 != 0).then_some(5000.0 + (day % 30) as f64 * 250.0),
                elevation_gain_meters: Some((day % 500) as i64),
                calories: Some(300 + (day % 400) as i64),
                ..NewActivity::default()
            }
            .into_activity(day + 1, "2025-01-01T00:00:00Z".to_string())
        })
        .collect()
}

fn benchmark_aggregators(c: &mut Criterion) {
    let activities = history();
    let today = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
    let courses: Vec<Activity> = activities
        .iter()
        .filter(|a| a.sport == "Course")
        .cloned()
        .collect();

    let mut group = c.benchmark_group("aggregators");

    group.bench_function("weekly", |b| {
        b.iter(|| WeeklyAggregate::from_activities(black_box(&activities)).totals(520))
    });

    group.bench_function("by_sport", |b| {
        b.iter(|| aggregate_by_sport(black_box(&activities)))
    });

    group.bench_function("records", |b| {
        b.iter(|| personal_records(black_box(&activities)))
    });

    group.bench_function("progression", |b| {
        b.iter(|| analyze_progression("Course", black_box(&courses), 520))
    });

    group.bench_function("dashboard", |b| {
        b.iter(|| Dashboard::build(black_box(&activities), today))
    });

    group.finish();
}

criterion_group!(benches, benchmark_aggregators);
criterion_main!(benches);
