//! Winner determination: pick at most one bid per bidder so that the total
//! bid value is maximal and no unit is allocated beyond supply.
//!
//! In production this is an external MIP solve behind `WinnerDetermination`.
//! `BranchAndBoundWdp` is an exact in-process solver for small instances.

use std::collections::{BTreeMap, HashMap};

use anyhow::anyhow;

use crate::bids::{BidCollection, BundleBid};
use crate::error::{AuctionError, AuctionResult};
use crate::types::{BidderId, Bundle, Price, Supply};

/// Winning bid per bidder. Bidders without an entry win nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<B: Bundle> {
    pub winners: BTreeMap<BidderId, BundleBid<B>>,
    /// Sum of winning bid values
    pub total_value: Price,
}

impl<B: Bundle> Default for Allocation<B> {
    fn default() -> Self {
        Self {
            winners: BTreeMap::new(),
            total_value: 0.0,
        }
    }
}

impl<B: Bundle> Allocation<B> {
    pub fn bundle_of(&self, bidder: BidderId) -> Option<&B> {
        self.winners.get(&bidder).map(|bid| &bid.bundle)
    }

    /// Units allocated across all winners
    pub fn allocated(&self) -> HashMap<B::Unit, u32> {
        let mut out = HashMap::new();
        for bid in self.winners.values() {
            for (unit, q) in bid.bundle.quantities() {
                *out.entry(unit).or_insert(0) += q;
            }
        }
        out
    }
}

pub trait WinnerDetermination<B: Bundle>: Send {
    fn calculate_allocation(
        &self,
        bids: &BidCollection<B>,
        supply: &Supply<B::Unit>,
    ) -> AuctionResult<Allocation<B>>;
}

// === BRANCH AND BOUND ===

#[derive(Debug, Clone, Copy)]
pub struct BranchAndBoundWdp {
    /// Give up after visiting this many search nodes
    pub node_limit: u64,
}

impl Default for BranchAndBoundWdp {
    fn default() -> Self {
        Self {
            node_limit: 5_000_000,
        }
    }
}

/// Per bidder: distinct non-empty bundles at their highest bid, best first.
fn xor_options<B: Bundle>(bids: &[BundleBid<B>], supply: &Supply<B::Unit>) -> Vec<BundleBid<B>> {
    let mut best: BTreeMap<&B, Price> = BTreeMap::new();
    for bid in bids {
        if bid.bundle.is_empty() || !bid.bundle.fits(supply) {
            continue;
        }
        let entry = best.entry(&bid.bundle).or_insert(bid.value);
        if bid.value > *entry {
            *entry = bid.value;
        }
    }
    let mut options: Vec<BundleBid<B>> = best
        .into_iter()
        .filter(|&(_, value)| value >= 0.0)
        .map(|(bundle, value)| BundleBid::new(bundle.clone(), value))
        .collect();
    options.sort_by(|a, b| b.value.total_cmp(&a.value));
    options
}

struct Search<B: Bundle> {
    bidders: Vec<(BidderId, Vec<BundleBid<B>>)>,
    /// suffix_bound[i] = best possible value from bidders i..
    suffix_bound: Vec<Price>,
    remaining: Supply<B::Unit>,
    chosen: Vec<Option<usize>>,
    best_value: Price,
    best_choice: Option<Vec<Option<usize>>>,
    nodes: u64,
    node_limit: u64,
}

impl<B: Bundle> Search<B> {
    fn take(&mut self, bundle: &B) -> bool {
        if !bundle
            .quantities()
            .into_iter()
            .all(|(u, q)| self.remaining.get(&u).copied().unwrap_or(0) >= q)
        {
            return false;
        }
        for (u, q) in bundle.quantities() {
            if let Some(left) = self.remaining.get_mut(&u) {
                *left -= q;
            }
        }
        true
    }

    fn give_back(&mut self, bundle: &B) {
        for (u, q) in bundle.quantities() {
            *self.remaining.entry(u).or_insert(0) += q;
        }
    }

    fn visit(&mut self, depth: usize, value: Price) -> AuctionResult<()> {
        self.nodes += 1;
        if self.nodes > self.node_limit {
            return Err(AuctionError::WinnerDetermination(anyhow!(
                "branch and bound exceeded {} nodes",
                self.node_limit
            )));
        }

        if depth == self.bidders.len() {
            if self.best_choice.is_none() || value > self.best_value {
                self.best_value = value;
                self.best_choice = Some(self.chosen.clone());
            }
            return Ok(());
        }
        if self.best_choice.is_some() && value + self.suffix_bound[depth] <= self.best_value {
            return Ok(());
        }

        for i in 0..self.bidders[depth].1.len() {
            let bid = self.bidders[depth].1[i].clone();
            if self.take(&bid.bundle) {
                self.chosen[depth] = Some(i);
                self.visit(depth + 1, value + bid.value)?;
                self.chosen[depth] = None;
                self.give_back(&bid.bundle);
            }
        }
        self.visit(depth + 1, value)
    }
}

impl<B: Bundle> WinnerDetermination<B> for BranchAndBoundWdp {
    fn calculate_allocation(
        &self,
        bids: &BidCollection<B>,
        supply: &Supply<B::Unit>,
    ) -> AuctionResult<Allocation<B>> {
        let bidders: Vec<(BidderId, Vec<BundleBid<B>>)> = bids
            .iter()
            .map(|(&id, bids)| (id, xor_options(bids, supply)))
            .filter(|(_, options)| !options.is_empty())
            .collect();

        let mut suffix_bound = vec![0.0; bidders.len() + 1];
        for i in (0..bidders.len()).rev() {
            let top = bidders[i].1.first().map(|b| b.value).unwrap_or(0.0);
            suffix_bound[i] = suffix_bound[i + 1] + top.max(0.0);
        }

        let n = bidders.len();
        let mut search = Search {
            bidders,
            suffix_bound,
            remaining: supply.clone(),
            chosen: vec![None; n],
            best_value: 0.0,
            best_choice: None,
            nodes: 0,
            node_limit: self.node_limit,
        };
        search.visit(0, 0.0)?;

        let mut allocation = Allocation::default();
        if let Some(choice) = search.best_choice {
            for ((id, options), pick) in search.bidders.into_iter().zip(choice) {
                if let Some(i) = pick {
                    allocation.total_value += options[i].value;
                    allocation.winners.insert(id, options[i].clone());
                }
            }
        }
        Ok(allocation)
    }
}
