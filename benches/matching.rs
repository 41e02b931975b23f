//! Benchmarks for the backlay clearing engine.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- clearing_run
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use backlay::book::OrderBook;
use backlay::engine::{MatchingEngine, NoopObserver};
use backlay::{Exchange, Order, Side};

// ============================================================================
// HELPER FUNCTIONS - Deterministic order generation
// ============================================================================

/// Generate a vector of deterministic orders for one event.
fn generate_order_batch(count: usize, seed: u64) -> Vec<Order> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let side = if rng.gen_bool(0.5) { Side::Back } else { Side::Lay };
            // Odds: 1.01 to 10.0, stake: 0.01 to 100.0 (in fixed-point)
            let odds: u64 = rng.gen_range(101_000_000..=1_000_000_000);
            let stake: u64 = rng.gen_range(1_000_000..=10_000_000_000);
            Order::new((i + 1) as u64, 1, 1, side, odds, stake).expect("generated order is valid")
        })
        .collect()
}

fn populated_book(orders: &[Order]) -> OrderBook {
    let mut book = OrderBook::with_capacity(orders.len());
    for order in orders {
        book.add(order.clone());
    }
    book
}

// ============================================================================
// BENCHMARK: Clearing run
// ============================================================================

fn bench_clearing_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("clearing_run");

    group.measurement_time(Duration::from_secs(10));
    group.sample_size(50);

    for size in [100, 1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("orders", size), &size, |b, &size| {
            let orders = generate_order_batch(size, 42);

            b.iter_batched(
                || populated_book(&orders),
                |mut book| {
                    let mut engine = MatchingEngine::with_observer(NoopObserver);
                    black_box(engine.match_book(&mut book))
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Rematch of an already cleared book
// ============================================================================

fn bench_rematch(c: &mut Criterion) {
    let mut group = c.benchmark_group("rematch");

    group.measurement_time(Duration::from_secs(5));

    group.bench_function("10k_cleared_book", |b| {
        let mut book = populated_book(&generate_order_batch(10_000, 7));
        let mut engine = MatchingEngine::with_observer(NoopObserver);
        engine.match_book(&mut book);

        b.iter(|| black_box(engine.match_book(&mut book)));
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Issuance through the exchange
// ============================================================================

fn bench_issuance(c: &mut Criterion) {
    let mut group = c.benchmark_group("issuance");

    group.measurement_time(Duration::from_secs(5));

    for size in [1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("orders", size), &size, |b, &size| {
            let orders = generate_order_batch(size, 12345);

            b.iter_batched(
                || {
                    let mut exchange = Exchange::with_observer(NoopObserver).with_book_capacity(size);
                    let agent = exchange.create_agent(0);
                    let event = exchange.create_event(50_000_000).expect("valid probability");
                    (exchange, agent, event)
                },
                |(mut exchange, agent, event)| {
                    for order in &orders {
                        black_box(
                            exchange
                                .issue_order(agent, event, order.side(), order.limit_odds(), order.stake())
                                .expect("valid order"),
                        );
                    }
                    exchange.event(event).map(|e| e.book().len())
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: State root
// ============================================================================

fn bench_state_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_root");

    group.measurement_time(Duration::from_secs(5));

    group.bench_function("10k_book", |b| {
        let book = populated_book(&generate_order_batch(10_000, 99));
        b.iter(|| black_box(book.compute_state_root()));
    });

    group.finish();
}

// ============================================================================
// CRITERION ENTRY POINT
// ============================================================================

criterion_group!(
    benches,
    bench_clearing_run,
    bench_rematch,
    bench_issuance,
    bench_state_root
);

criterion_main!(benches);
