//! Price path and bid stream as seen through the instrument tables.
#![cfg(feature = "instrument")]

use polars::prelude::*;

use cca_core::instrument::Capture;
use cca_core::{
    Bidder, BidderId, BranchAndBoundWdp, CcaConfig, CcaMechanism, GoodSet, NonGenericCca, World,
    XorBidder, XorDemandQuery,
};

/// Good A contested by three bidders, good B wanted by one.
fn contested_auction() -> NonGenericCca {
    let mut world = World::new();
    let a = world.add_good("A");
    let b = world.add_good("B");

    let bidders: Vec<Box<dyn Bidder<GoodSet>>> = vec![
        Box::new(XorBidder::new(BidderId::new(1)).with_atom(GoodSet::new([a]), 12.0)),
        Box::new(XorBidder::new(BidderId::new(2)).with_atom(GoodSet::new([a]), 7.0)),
        Box::new(XorBidder::new(BidderId::new(3)).with_atom(GoodSet::new([a]), 4.0)),
        Box::new(XorBidder::new(BidderId::new(4)).with_atom(GoodSet::new([b]), 3.0)),
    ];

    CcaMechanism::new(
        world.good_supply(),
        bidders,
        Box::new(XorDemandQuery),
        Box::new(BranchAndBoundWdp::default()),
        CcaConfig::default(),
    )
    .unwrap()
}

fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

#[test]
fn clock_round_table_has_one_row_per_good_and_round() {
    let mut capture = Capture::start();
    let mut cca = contested_auction();
    cca.run_clock_phase().unwrap();
    let rounds = cca.round_history().len();

    let table = capture.table("clock_round");
    assert_eq!(table.len(), rounds * 2);

    let df = table.to_dataframe().unwrap();
    assert_eq!(df.height(), rounds * 2);
    for column in ["round", "unit", "price", "demand", "supply"] {
        assert!(df.column(column).is_ok(), "missing column {column}");
    }

    let frames = capture.recorder().to_dataframes();
    assert!(frames.contains_key("bid"));
    assert!(frames.contains_key("price_update"));
}

#[test]
fn contested_price_rises_until_one_bidder_is_left() {
    let mut capture = Capture::start();
    let mut cca = contested_auction();
    cca.run_clock_phase().unwrap();
    let a = *cca.round_history()[0]
        .over_demanded
        .first()
        .unwrap();

    let recorder = capture.recorder();
    let unit_a = format!("{a:?}");
    let path = recorder.table("clock_round").filter_eq("unit", &unit_a);
    let df = path.to_dataframe().unwrap();

    let prices = f64_values(&df, "price");
    assert!(prices.windows(2).all(|w| w[1] > w[0]));
    // Bidder 2 drops out once A costs at least 7
    let last = *prices.last().unwrap();
    assert!((7.0..7.0 * 1.1).contains(&last));

    let updates = recorder.table("price_update");
    assert_eq!(updates.len(), prices.len() - 1);
    let olds = updates.f64_column("old_price");
    let news = updates.f64_column("new_price");
    assert!(olds.iter().zip(&news).all(|(old, new)| new > old));
}

#[test]
fn uncontested_good_never_moves() {
    let mut capture = Capture::start();
    let mut cca = contested_auction();
    cca.run_clock_phase().unwrap();

    let b = cca
        .supply()
        .keys()
        .copied()
        .find(|&good| cca.round_history()[0].over_demanded.binary_search(&good).is_err())
        .unwrap();

    let path = capture
        .table("clock_round")
        .filter_eq("unit", &format!("{b:?}"));
    let prices = path.f64_column("price");
    assert!(!prices.is_empty());
    assert!(prices.iter().all(|&p| p == 0.0));
}

#[test]
fn bid_stream_separates_phases() {
    let mut capture = Capture::start();
    let mut cca = contested_auction();
    let total = cca.run().unwrap().total_value;
    assert_eq!(total, 15.0);

    let bids = capture.table("bid");
    let clock = bids.filter_eq("phase", "clock");
    let supplementary = bids.filter_eq("phase", "supplementary");
    assert_eq!(clock.len() + supplementary.len(), bids.len());
    assert_eq!(bids.len(), cca.bids().total_entries());

    let allocations = capture.table("allocation");
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations.f64_column("total_value"), vec![15.0]);
}
