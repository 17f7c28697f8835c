//! Criterion benchmarks for the in-memory stages of the pipeline.
//!
//! Run with: `cargo bench`
//!
//! Git and the external counter dominate real runs; these cover the parts that scale
//! with history length: log parsing, same-day collapse, sampling and series aggregation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BTreeMap;

use ccount::git::{collapse_same_day, parse_log};
use ccount::sample::sample;
use ccount::series::to_series;
use ccount::{Commit, CountRecord, LanguageCount};

// ─── Helpers ─────────────────────────────────────────────────────────

/// `git log` output for `n` commits, newest first, four commits per day.
fn synthetic_log(n: usize) -> String {
    let mut out = String::with_capacity(n * 80);
    for i in (0..n).rev() {
        let day = i / 4;
        let hour = 8 + (i % 4) * 3;
        let date = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(day as u64);
        out.push_str(&format!("{:040x}\t{}T{:02}:00:00+00:00\tcommit number {}\n", i, date, hour, i));
    }
    out
}

fn synthetic_records(commits: &[Commit]) -> Vec<CountRecord> {
    commits
        .iter()
        .enumerate()
        .map(|(i, commit)| {
            let mut counts = BTreeMap::new();
            counts.insert("Python".to_string(), LanguageCount { code: 1000 + i as u64, ..Default::default() });
            if i % 3 == 0 {
                counts.insert("Sass".to_string(), LanguageCount { code: 50, ..Default::default() });
            }
            CountRecord { commit: commit.clone(), counts }
        })
        .collect()
}

// ─── Benchmarks ──────────────────────────────────────────────────────

fn bench_parse_and_collapse(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");

    for &n in &[1_000usize, 20_000] {
        let log = synthetic_log(n);
        group.bench_with_input(BenchmarkId::new("parse_log", n), &log, |b, log| {
            b.iter(|| parse_log(black_box(log)).unwrap())
        });

        let commits = parse_log(&log).unwrap();
        group.bench_with_input(BenchmarkId::new("collapse_same_day", n), &commits, |b, commits| {
            b.iter(|| collapse_same_day(black_box(commits.clone())))
        });
    }

    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    let commits = parse_log(&synthetic_log(20_000)).unwrap();

    for &limit in &[0usize, 50, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.iter(|| sample(black_box(&commits), limit).unwrap())
        });
    }

    group.finish();
}

fn bench_to_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_series");
    let languages = vec!["Python".to_string(), "TypeScript".to_string(), "Sass".to_string()];

    for &n in &[50usize, 1_000] {
        let commits = parse_log(&synthetic_log(n)).unwrap();
        let records = synthetic_records(&commits);
        group.bench_with_input(BenchmarkId::from_parameter(n), &records, |b, records| {
            b.iter(|| to_series(black_box(records), &languages))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_and_collapse, bench_sample, bench_to_series);
criterion_main!(benches);
