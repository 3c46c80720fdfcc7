//! Benchmarks for the limit order protocol engine.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark
//! cargo bench -- fill_order
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use limit_order_protocol::config::ProtocolConfig;
use limit_order_protocol::engine::{
    get_taker_amount, FillRequest, LimitOrderProtocol, PredicateBuilder,
};
use limit_order_protocol::hashing::sign_digest;
use limit_order_protocol::sandbox::{Sandbox, TokenFlavor};
use limit_order_protocol::types::{Order, OrderBuilder};

const EXCHANGE: Address = Address::new([0xEE; 20]);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

struct Market {
    exchange: LimitOrderProtocol,
    sandbox: Sandbox,
    maker: PrivateKeySigner,
    taker: Address,
    maker_asset: Address,
    taker_asset: Address,
}

/// Exchange plus two funded tokens with unlimited allowances
fn market() -> Market {
    let mut sandbox = Sandbox::new();
    let maker = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).expect("valid key");
    let taker = Address::repeat_byte(0x22);
    let maker_asset = sandbox.deploy_token(TokenFlavor::Standard);
    let taker_asset = sandbox.deploy_token(TokenFlavor::Standard);

    sandbox.mint(maker_asset, maker.address(), U256::MAX >> 1usize).expect("mint");
    sandbox.mint(taker_asset, taker, U256::MAX >> 1usize).expect("mint");
    sandbox
        .approve(maker_asset, maker.address(), EXCHANGE, U256::MAX)
        .expect("approve");
    sandbox
        .approve(taker_asset, taker, EXCHANGE, U256::MAX)
        .expect("approve");

    Market {
        exchange: LimitOrderProtocol::new(ProtocolConfig::new(1, EXCHANGE)),
        sandbox,
        maker,
        taker,
        maker_asset,
        taker_asset,
    }
}

/// Deterministic signed orders
fn signed_orders(m: &Market, count: usize, seed: u64) -> Vec<(Order, Bytes)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let making: u64 = rng.gen_range(1_000_000..=100_000_000);
            let taking: u64 = rng.gen_range(1_000_000..=100_000_000);
            let order = OrderBuilder::new(EXCHANGE, m.maker.address())
                .assets(m.maker_asset, m.taker_asset)
                .amounts(U256::from(making), U256::from(taking))
                .salt(U256::from(i))
                .build();
            let signature = sign_digest(&m.maker, m.exchange.hash_order(&order)).expect("sign");
            (order, signature)
        })
        .collect()
}

// ============================================================================
// BENCHMARK: Hashing
// ============================================================================

fn bench_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashing");
    let m = market();
    let (order, _) = signed_orders(&m, 1, 1).remove(0);

    group.bench_function("hash_order", |b| {
        b.iter(|| black_box(m.exchange.hash_order(black_box(&order))))
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Fills
// ============================================================================

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_order");
    group.measurement_time(Duration::from_secs(5));

    // First fill: signature recovery plus proportional getter
    group.bench_function("first_fill", |b| {
        b.iter_batched(
            || {
                let m = market();
                let (order, signature) = signed_orders(&m, 1, 2).remove(0);
                (m, order, signature)
            },
            |(mut m, order, signature)| {
                let request = FillRequest::making(
                    order.makingAmount / U256::from(2u64),
                    order.takingAmount,
                );
                black_box(m.exchange.fill_order(
                    &mut m.sandbox,
                    m.taker,
                    &order,
                    &signature,
                    &request,
                ))
            },
            BatchSize::SmallInput,
        );
    });

    // Follow-up fill: no signature check, predicate evaluated each time
    group.bench_function("partial_with_predicate", |b| {
        let mut m = market();
        let predicate = PredicateBuilder::new(EXCHANGE).and(vec![
            PredicateBuilder::new(EXCHANGE).timestamp_below(U256::MAX),
            PredicateBuilder::new(EXCHANGE).nonce_equals(m.maker.address(), U256::ZERO),
        ]);
        let size = U256::from(10u64).pow(U256::from(30u64));
        let order = OrderBuilder::new(EXCHANGE, m.maker.address())
            .assets(m.maker_asset, m.taker_asset)
            .amounts(size, size)
            .predicate(predicate)
            .build();
        let signature = sign_digest(&m.maker, m.exchange.hash_order(&order)).expect("sign");
        let request = FillRequest::making(U256::from(1_000u64), U256::from(1_000u64));
        m.exchange
            .fill_order(&mut m.sandbox, m.taker, &order, &signature, &request)
            .expect("seed fill");

        b.iter(|| {
            black_box(m.exchange.fill_order(
                &mut m.sandbox,
                m.taker,
                &order,
                &signature,
                &request,
            ))
        });
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Throughput
// ============================================================================

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    for count in [100usize, 1_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("fills", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let m = market();
                    let orders = signed_orders(&m, count, 3);
                    (m, orders)
                },
                |(mut m, orders)| {
                    for (order, signature) in &orders {
                        let making = order.makingAmount;
                        let request = FillRequest::making(
                            making,
                            get_taker_amount(making, order.takingAmount, making)
                                .expect("amount"),
                        );
                        let _ = black_box(m.exchange.fill_order(
                            &mut m.sandbox,
                            m.taker,
                            order,
                            signature,
                            &request,
                        ));
                    }
                    m
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hashing, bench_fill, bench_throughput);
criterion_main!(benches);
