use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use garmin_insights::config::InsightsConfig;
use garmin_insights::insights::{ActivityInsight, SleepInsight};
use garmin_insights::models::{RawActivityRecord, RawSleepRecord};
use std::hint::black_box;

fn benchmark_insights(c: &mut Criterion) {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
    let config = InsightsConfig::default();

    let day = RawActivityRecord {
        date,
        steps: 10_000,
        step_goal: 10_000,
        total_calories: 2200.0,
        active_calories: 400.0,
        distance_meters: 7200.0,
        active_minutes: 50.0,
        sedentary_minutes: 600.0,
        total_tracked_minutes: 720.0,
    };

    let night = RawSleepRecord {
        date,
        time_in_bed_minutes: 480.0,
        total_sleep_minutes: 420.0,
        awake_count: Some(5),
        awake_minutes: 60.0,
        deep_minutes: 80.0,
        rem_minutes: 90.0,
        light_minutes: 250.0,
        sleep_need_minutes: Some(450),
        stage_transitions: Some(24),
    };

    let mut group = c.benchmark_group("insights");

    group.bench_function("all_activity_insights", |b| {
        b.iter(|| {
            for insight in ActivityInsight::ALL {
                let _ = black_box(insight.evaluate(black_box(&day)));
            }
        })
    });

    group.bench_function("all_sleep_insights", |b| {
        b.iter(|| {
            for insight in SleepInsight::ALL {
                let _ = black_box(insight.evaluate(black_box(&night), &config));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_insights);
criterion_main!(benches);
