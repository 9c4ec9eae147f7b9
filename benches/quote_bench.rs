//! Quote Calculator Benchmarks
//!
//! The estimate is recomputed on every input change, so the hot path must
//! stay cheap: parse, two U256 ops, format.

use alloy::primitives::U256;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use djed_trade_gateway::domain::intent::TradeDirection;
use djed_trade_gateway::domain::quote::{estimate, PriceFeeds};
use djed_trade_gateway::domain::wad::parse_wad;

fn feeds() -> PriceFeeds {
    PriceFeeds {
        sc_price: Some(U256::from(3_000_000_000_000_000_000u128)),
        rc_target_price: Some(U256::from(1_250_000_000_000_000_000u128)),
    }
}

fn bench_quote(c: &mut Criterion) {
    let feeds = feeds();

    c.bench_function("quote_buy_stable", |b| {
        b.iter(|| {
            estimate(
                black_box(TradeDirection::MintStable),
                black_box("123.456789"),
                black_box(&feeds),
            )
        })
    });

    c.bench_function("quote_redeem_reserve", |b| {
        b.iter(|| {
            estimate(
                black_box(TradeDirection::RedeemReserve),
                black_box("0.000001"),
                black_box(&feeds),
            )
        })
    });

    c.bench_function("quote_unparsable_input", |b| {
        b.iter(|| {
            estimate(
                black_box(TradeDirection::MintStable),
                black_box("not a number"),
                black_box(&feeds),
            )
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_wad_18_digits", |b| {
        b.iter(|| parse_wad(black_box("123456.123456789012345678"), "amount"))
    });
}

criterion_group!(benches, bench_quote, bench_parse);
criterion_main!(benches);
