//! Full pipeline benchmarks (load -> parse -> execute -> JSON).
//!
//! Run with: cargo bench -p wazbean

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Generate ledger text with N transactions.
fn generate_ledger(num_transactions: usize) -> String {
    let mut lines = vec![
        "option \"title\" \"Benchmark Ledger\"".to_string(),
        "option \"operating_currency\" \"USD\"".to_string(),
        String::new(),
        "2020-01-01 open Assets:Bank:Checking USD".to_string(),
        "2020-01-01 open Expenses:Food USD".to_string(),
        "2020-01-01 open Expenses:Coffee USD".to_string(),
        "2020-01-01 open Expenses:Groceries USD".to_string(),
        "2020-01-01 open Expenses:Transport USD".to_string(),
        "2020-01-01 open Expenses:Utilities USD".to_string(),
        String::new(),
    ];

    let categories = ["Food", "Coffee", "Groceries", "Transport", "Utilities"];
    let payees = ["Store A", "Store B", "Cafe", "Gas Station", "Supermarket"];
    let mut day = 2;
    let mut month = 1;
    let mut year = 2020;

    for i in 0..num_transactions {
        let category = categories[i % categories.len()];
        let payee = payees[i % payees.len()];
        let amount = format!("{:.2}", 10.0 + (i % 100) as f64);

        lines.push(format!(
            "{year:04}-{month:02}-{day:02} * \"{payee}\" \"Transaction {i}\" ; imported"
        ));
        lines.push(format!("  Expenses:{category}  {amount} USD"));
        lines.push("  Assets:Bank:Checking".to_string());
        lines.push(String::new());

        day += 1;
        if day > 28 {
            day = 1;
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
    }

    lines.join("\n")
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for size in [100, 1000, 10000] {
        let source = generate_ledger(size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| wazbean_loader::load(black_box(source)));
        });
    }

    group.finish();
}

fn bench_check_syntax(c: &mut Criterion) {
    let source = generate_ledger(1000);

    let mut group = c.benchmark_group("check_syntax");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("1000_transactions", |b| {
        b.iter(|| wazbean_loader::check_syntax(black_box(&source)));
    });
    group.finish();
}

fn bench_execute_query_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute_query_text");

    for size in [100, 1000] {
        let source = generate_ledger(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("group_by", size), &source, |b, source| {
            b.iter(|| {
                wazbean::execute_query_text(
                    black_box("SELECT account, SUM(amount) GROUP BY account ORDER BY sum(amount) DESC"),
                    black_box(source),
                )
            });
        });
        group.bench_with_input(BenchmarkId::new("where", size), &source, |b, source| {
            b.iter(|| {
                wazbean::execute_query_text(
                    black_box("SELECT date, account, amount WHERE payee = 'Cafe'"),
                    black_box(source),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_load,
    bench_check_syntax,
    bench_execute_query_text
);
criterion_main!(benches);
