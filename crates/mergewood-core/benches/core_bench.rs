//! Criterion benchmarks for the engine's hot paths.
//!
//! Three groups:
//! - `ring_search`: worst-case expanding-ring scan on a saturated board
//! - `fulfillment_scan`: full order board against a full grid
//! - `persistence`: snapshot encode/decode of a played session

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use mergewood_core::grid::Grid;
use mergewood_core::item::Item;
use mergewood_core::order::{Difficulty, Order, OrderBoard, Requirement, Reward};
use mergewood_core::registry::Tuning;
use mergewood_core::rng::GameRng;
use mergewood_core::serialize::{decode_snapshot, encode_snapshot};
use mergewood_core::test_utils::*;
use std::hint::black_box;

/// A 9x7 board with every cell occupied except the far corner.
fn saturated_grid() -> Grid {
    let mut grid = Grid::new(9, 7, &[]);
    for index in 0..grid.len() {
        grid.set(index, Some(Item::piece(woodland(), 1)));
    }
    grid.take(grid.index(8, 6).unwrap());
    grid
}

fn bench_ring_search(c: &mut Criterion) {
    let grid = saturated_grid();
    c.bench_function("ring_search_far_corner", |b| {
        // From (0,0): the only empty cell sits 8 shells away.
        b.iter(|| black_box(grid.find_empty_cell_near(black_box(0), black_box(0))))
    });

    let mut full = saturated_grid();
    full.set(full.index(8, 6).unwrap(), Some(Item::piece(woodland(), 1)));
    c.bench_function("ring_search_full_board", |b| {
        b.iter(|| black_box(full.find_empty_cell_near(black_box(4), black_box(3))))
    });
}

fn bench_fulfillment_scan(c: &mut Criterion) {
    // A full board of mixed pieces and a board of three maxed-out orders.
    let mut grid = Grid::new(9, 7, &[]);
    for index in 0..grid.len() {
        let chain = mergewood_core::id::ChainId((index % 3) as u32);
        let level = (index % 7) as u8 + 1;
        grid.set(index, Some(Item::piece(chain, level)));
    }
    let mut board = OrderBoard::new(3);
    let mut rng = GameRng::new(17);
    board.fill_empty(&[woodland(), riverside(), orchard()], &mut rng);

    c.bench_function("fulfillment_scan_full_board", |b| {
        b.iter(|| board.check_fulfillment(black_box(&grid)))
    });
}

fn bench_merge_resolution(c: &mut Criterion) {
    let registry = test_registry();
    let tuning = Tuning::default();
    let mut base = Grid::new(9, 7, &[]);
    base.set(10, Some(Item::piece(woodland(), 2)));
    base.set(24, Some(Item::piece(woodland(), 2)));

    c.bench_function("merge_resolve", |b| {
        b.iter_batched(
            || (base.clone(), GameRng::new(5)),
            |(mut grid, mut rng)| {
                mergewood_core::merge::resolve_merge(
                    &mut grid, &registry, &tuning, &mut rng, 10, 24, 0,
                )
                .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_persistence(c: &mut Criterion) {
    let mut session = new_session(42, 0);
    for _ in 0..12 {
        session.tap(0, 0).unwrap();
    }
    let save = session.snapshot(0);
    let bytes = encode_snapshot(&save).unwrap();

    c.bench_function("snapshot_encode", |b| {
        b.iter(|| encode_snapshot(black_box(&save)).unwrap())
    });
    c.bench_function("snapshot_decode", |b| {
        b.iter(|| decode_snapshot(black_box(&bytes)).unwrap())
    });
}

fn bench_order_completion(c: &mut Criterion) {
    let mut grid = Grid::new(9, 7, &[]);
    for index in 0..grid.len() {
        grid.set(index, Some(Item::piece(woodland(), 4)));
    }
    let order = Order {
        requirements: (0..3)
            .map(|_| Requirement {
                chain: woodland(),
                level: 2,
                fulfilled: false,
            })
            .collect(),
        reward: Reward { coins: 30, stars: 4 },
        difficulty: Difficulty::Hard,
    };

    c.bench_function("order_complete", |b| {
        b.iter_batched(
            || {
                (
                    OrderBoard::from_saved(&[Some(order.clone())], 1),
                    grid.clone(),
                )
            },
            |(mut board, mut grid)| board.complete(0, &mut grid).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_ring_search,
    bench_fulfillment_scan,
    bench_merge_resolution,
    bench_persistence,
    bench_order_completion,
);
criterion_main!(benches);
