// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 The lendit-rs Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Benchmarks for the rental engine.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Single booking lifecycle (create, create + decide)
//! - Listing throughput as booking history grows
//! - Parallel creates against one item and against many items
//! - Item view assembly with comments and scheduling context

use chrono::{Duration, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lendit_rs::store::NewBooking;
use lendit_rs::{ItemId, RentalEngine, Store, UserId};
use rayon::prelude::*;
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

/// Engine with one owner, one booker and `items` available items.
fn seeded_engine(items: usize) -> (RentalEngine, UserId, UserId, Vec<ItemId>) {
    let engine = RentalEngine::in_memory();
    let owner = engine.create_user("ann".into(), "ann@example.com".into()).id;
    let booker = engine.create_user("bob".into(), "bob@example.com".into()).id;
    let ids = (0..items)
        .map(|i| {
            engine
                .create_item(owner, format!("item-{i}"), "benchmark item".into(), true, None)
                .unwrap()
                .id
        })
        .collect();
    (engine, owner, booker, ids)
}

/// Seeds `count` waiting bookings spread over past and future hours.
fn seed_bookings(engine: &RentalEngine, booker: UserId, item: ItemId, count: usize) {
    let now = Utc::now();
    for i in 0..count {
        let offset = i as i64 - (count as i64 / 2);
        engine
            .store()
            .add_booking(NewBooking {
                start: now + Duration::hours(offset * 3),
                end: now + Duration::hours(offset * 3 + 2),
                item,
                booker,
            })
            .unwrap();
    }
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_create_booking(c: &mut Criterion) {
    c.bench_function("create_booking", |b| {
        let (engine, _, booker, items) = seeded_engine(1);
        let item = items[0];
        let start = Utc::now() + Duration::days(1);
        b.iter(|| {
            engine
                .create_booking(black_box(booker), item, start, start + Duration::days(1))
                .unwrap()
        })
    });
}

fn bench_create_and_decide(c: &mut Criterion) {
    c.bench_function("create_and_decide", |b| {
        let (engine, owner, booker, items) = seeded_engine(1);
        let item = items[0];
        let start = Utc::now() + Duration::days(1);
        b.iter(|| {
            let booking = engine
                .create_booking(booker, item, start, start + Duration::days(1))
                .unwrap();
            engine
                .decide_booking(owner, black_box(booking.id), true)
                .unwrap()
        })
    });
}

fn bench_listing_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing_throughput");

    for count in [100, 1_000, 10_000].iter() {
        let (engine, _, booker, items) = seeded_engine(1);
        seed_bookings(&engine, booker, items[0], *count);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let rows = engine
                    .bookings_for_booker(booker, "ALL", 0, i64::MAX)
                    .unwrap();
                black_box(rows)
            })
        });
    }
    group.finish();
}

fn bench_bucket_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucket_filters");
    let (engine, _, booker, items) = seeded_engine(1);
    seed_bookings(&engine, booker, items[0], 1_000);

    for state in ["ALL", "CURRENT", "PAST", "FUTURE", "WAITING"] {
        group.bench_with_input(BenchmarkId::from_parameter(state), &state, |b, &state| {
            b.iter(|| {
                let rows = engine.bookings_for_booker(booker, state, 0, 50).unwrap();
                black_box(rows)
            })
        });
    }
    group.finish();
}

fn bench_item_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("item_view");

    for comments in [0, 10, 100].iter() {
        let (engine, owner, booker, items) = seeded_engine(1);
        let item = items[0];
        seed_bookings(&engine, booker, item, 50);
        for i in 0..*comments {
            engine
                .add_comment(booker, item, format!("comment {i}"))
                .unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(comments), comments, |b, _| {
            b.iter(|| black_box(engine.get_item(owner, item).unwrap()))
        });
    }
    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_parallel_creates_same_item(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_creates_same_item");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let (engine, _, booker, items) = seeded_engine(1);
                let engine = Arc::new(engine);
                let item = items[0];
                let start = Utc::now() + Duration::days(1);

                (0..count).into_par_iter().for_each(|_| {
                    engine
                        .create_booking(booker, item, start, start + Duration::days(1))
                        .unwrap();
                });

                black_box(&engine);
            })
        });
    }
    group.finish();
}

fn bench_parallel_creates_different_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_creates_different_items");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let (engine, _, booker, items) = seeded_engine(100);
                let engine = Arc::new(engine);
                let start = Utc::now() + Duration::days(1);

                (0..count).into_par_iter().for_each(|i: usize| {
                    let item = items[i % items.len()];
                    engine
                        .create_booking(booker, item, start, start + Duration::days(1))
                        .unwrap();
                });

                black_box(&engine);
            })
        });
    }
    group.finish();
}

fn bench_parallel_decisions(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_decisions");

    for count in [100, 1_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || {
                    // Setup: one waiting booking per iteration slot.
                    let (engine, owner, booker, items) = seeded_engine(1);
                    let start = Utc::now() + Duration::days(1);
                    let ids: Vec<_> = (0..count)
                        .map(|_| {
                            engine
                                .create_booking(
                                    booker,
                                    items[0],
                                    start,
                                    start + Duration::days(1),
                                )
                                .unwrap()
                                .id
                        })
                        .collect();
                    (Arc::new(engine), owner, ids)
                },
                |(engine, owner, ids)| {
                    ids.par_iter().for_each(|&id| {
                        engine.decide_booking(owner, id, true).unwrap();
                    });
                    black_box(&engine);
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(
    single_threaded,
    bench_create_booking,
    bench_create_and_decide,
    bench_listing_throughput,
    bench_bucket_filters,
    bench_item_view,
);

criterion_group!(
    multi_threaded,
    bench_parallel_creates_same_item,
    bench_parallel_creates_different_items,
    bench_parallel_decisions,
);

criterion_main!(single_threaded, multi_threaded);
