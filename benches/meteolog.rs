use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meteolog::{aggregate_log, predict_tomorrow, LogSchema, DEFAULT_MIN_RECORDS};
use std::fmt::Write;
use std::path::Path;

/// A year of history, eight samples a day.
fn write_history(path: &Path) {
    let mut text = LogSchema::Current.column_names().join(",");
    text.push('\n');
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for (day, date) in start.iter_days().take(365).enumerate() {
        for hour in (0..24).step_by(3) {
            let temp = 12.0 + 8.0 * ((day as f64) / 58.0).sin() + (hour as f64 - 12.0).abs() * -0.4;
            writeln!(
                text,
                "{}T{:02}:00:00.000000,Madrid,{:.2},{:.2},{:.2},{:.2},{},{:.1},cielo claro,40.4165,-3.7026,20,10000,0.0,0.0",
                date,
                hour,
                temp,
                temp - 1.0,
                temp - 2.0,
                temp + 2.0,
                50 + (day % 30),
                (hour as f64) * 0.7,
            )
            .unwrap();
        }
    }
    std::fs::write(path, text).unwrap();
}

fn bench_forecast(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Madrid.csv");
    write_history(&path);
    let days = aggregate_log(&path).unwrap();

    c.bench_function("aggregate_log", |b| b.iter(|| aggregate_log(black_box(&path))));
    c.bench_function("predict_tomorrow", |b| {
        b.iter(|| predict_tomorrow(black_box(&days), DEFAULT_MIN_RECORDS))
    });
}

criterion_group!(benches, bench_forecast);
criterion_main!(benches);
