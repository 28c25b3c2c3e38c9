//! Demand queries: a bidder's profit-maximizing bundle(s) at given prices.
//!
//! Two realizations:
//! - `XorDemandQuery` enumerates the bidder's explicit XOR atoms. Only works
//!   for bidders that support the XOR bidding language.
//! - `OracleDemandQuery` hands the problem to a `DemandOptimizer` (typically
//!   an external MIP client). `ExhaustiveSearch` is a bounded in-process
//!   optimizer for small domains.
//!
//! Results are ranked by profit, then by bundle size (smaller first), then
//! by bundle order, so ties resolve the same way on every run.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::bidder::Bidder;
use crate::error::{AuctionError, AuctionResult};
use crate::types::{Bundle, Price, Prices, Supply, enumerate_bundles};

#[derive(Debug, Clone, PartialEq)]
pub struct DemandQueryResult<B: Bundle> {
    pub bundle: B,
    /// True value of the bundle to the bidder
    pub value: Price,
    /// `value - cost` at the queried prices
    pub profit: Price,
}

impl<B: Bundle> DemandQueryResult<B> {
    pub fn evaluate(bidder: &dyn Bidder<B>, bundle: B, prices: &Prices<B::Unit>) -> Self {
        let value = bidder.value(&bundle);
        let profit = value - bundle.cost(prices);
        Self {
            bundle,
            value,
            profit,
        }
    }

    pub fn empty() -> Self {
        Self {
            bundle: B::from_quantities(std::iter::empty()),
            value: 0.0,
            profit: 0.0,
        }
    }
}

fn ranking<B: Bundle>(a: &DemandQueryResult<B>, b: &DemandQueryResult<B>) -> Ordering {
    b.profit
        .total_cmp(&a.profit)
        .then_with(|| a.bundle.size().cmp(&b.bundle.size()))
        .then_with(|| a.bundle.cmp(&b.bundle))
}

/// Sort best-first, drop repeated bundles, keep at most `k`.
pub fn rank_results<B: Bundle>(
    mut results: Vec<DemandQueryResult<B>>,
    k: usize,
) -> Vec<DemandQueryResult<B>> {
    results.sort_by(ranking);
    let mut seen = BTreeSet::new();
    results.retain(|r| seen.insert(r.bundle.clone()));
    results.truncate(k);
    results
}

pub trait DemandQuery<B: Bundle>: Send + Sync {
    /// The `k` best distinct responses, best first. May include the empty
    /// bundle, which always has zero profit.
    fn best_responses(
        &self,
        bidder: &dyn Bidder<B>,
        prices: &Prices<B::Unit>,
        k: usize,
    ) -> AuctionResult<Vec<DemandQueryResult<B>>>;

    /// The single best response. The empty bundle when nothing is profitable.
    fn best_response(
        &self,
        bidder: &dyn Bidder<B>,
        prices: &Prices<B::Unit>,
    ) -> AuctionResult<DemandQueryResult<B>> {
        let best = self.best_responses(bidder, prices, 1)?.into_iter().next();
        Ok(best.unwrap_or_else(DemandQueryResult::empty))
    }
}

// === XOR ENUMERATION ===

#[derive(Debug, Clone, Copy, Default)]
pub struct XorDemandQuery;

impl<B: Bundle> DemandQuery<B> for XorDemandQuery {
    fn best_responses(
        &self,
        bidder: &dyn Bidder<B>,
        prices: &Prices<B::Unit>,
        k: usize,
    ) -> AuctionResult<Vec<DemandQueryResult<B>>> {
        let atoms = bidder.xor_atoms()?;

        // With non-negative prices, some atom (or nothing) is always a best
        // response under free disposal.
        let mut candidates: BTreeSet<B> = atoms.into_iter().map(|(bundle, _)| bundle).collect();
        candidates.insert(B::from_quantities(std::iter::empty()));

        let results = candidates
            .into_iter()
            .map(|bundle| DemandQueryResult::evaluate(bidder, bundle, prices))
            .collect();
        Ok(rank_results(results, k))
    }
}

// === OPTIMIZER-BACKED ===

/// One demand query as posed to an optimizer.
pub struct DemandProblem<'a, B: Bundle> {
    pub bidder: &'a dyn Bidder<B>,
    pub prices: &'a Prices<B::Unit>,
    /// Bundles must fit this supply
    pub supply: &'a Supply<B::Unit>,
    pub pool_size: usize,
}

/// External constrained-optimization oracle answering demand queries.
pub trait DemandOptimizer<B: Bundle>: Send + Sync {
    /// Up to `problem.pool_size` optimal or near-optimal solutions, in any order.
    fn solve(&self, problem: &DemandProblem<'_, B>) -> anyhow::Result<Vec<DemandQueryResult<B>>>;
}

pub struct OracleDemandQuery<B: Bundle, O> {
    optimizer: O,
    supply: Supply<B::Unit>,
}

impl<B: Bundle, O: DemandOptimizer<B>> OracleDemandQuery<B, O> {
    pub fn new(optimizer: O, supply: Supply<B::Unit>) -> Self {
        Self { optimizer, supply }
    }
}

impl<B: Bundle, O: DemandOptimizer<B>> DemandQuery<B> for OracleDemandQuery<B, O> {
    fn best_responses(
        &self,
        bidder: &dyn Bidder<B>,
        prices: &Prices<B::Unit>,
        k: usize,
    ) -> AuctionResult<Vec<DemandQueryResult<B>>> {
        let problem = DemandProblem {
            bidder,
            prices,
            supply: &self.supply,
            pool_size: k,
        };
        let solutions = self
            .optimizer
            .solve(&problem)
            .map_err(|source| AuctionError::DemandOracle {
                bidder: bidder.id(),
                source,
            })?;
        Ok(rank_results(solutions, k))
    }
}

/// Evaluates every bundle that fits supply. Refuses domains larger than `limit`.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveSearch {
    pub limit: u64,
}

impl Default for ExhaustiveSearch {
    fn default() -> Self {
        Self { limit: 1 << 16 }
    }
}

impl<B: Bundle> DemandOptimizer<B> for ExhaustiveSearch {
    fn solve(&self, problem: &DemandProblem<'_, B>) -> anyhow::Result<Vec<DemandQueryResult<B>>> {
        let bundles: Vec<B> = enumerate_bundles(problem.supply, self.limit)?;
        let results = bundles
            .into_iter()
            .map(|bundle| DemandQueryResult::evaluate(problem.bidder, bundle, problem.prices))
            .collect();
        Ok(rank_results(results, problem.pool_size))
    }
}
