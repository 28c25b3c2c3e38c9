//! Supplementary round: one extra batch of bids per bidder after the clock
//! phase has converged.

use std::collections::BTreeSet;

use crate::bidder::Bidder;
use crate::bids::{Bid, BundleBid};
use crate::demand::DemandQuery;
use crate::error::AuctionResult;
use crate::types::{Bundle, Prices};

pub const DEFAULT_SUPPLEMENTARY_BIDS: usize = 500;

/// What a strategy gets to see for one bidder.
pub struct SupplementaryContext<'a, B: Bundle> {
    pub bidder: &'a dyn Bidder<B>,
    /// The bidder's bids so far (clock phase only at this point)
    pub history: &'a Bid<B>,
    /// Final clock prices
    pub prices: &'a Prices<B::Unit>,
    pub demand_query: &'a dyn DemandQuery<B>,
}

pub trait SupplementaryRound<B: Bundle>: Send {
    /// Candidate bids to append, in submission order.
    fn supplementary_bids(&self, ctx: &SupplementaryContext<'_, B>) -> AuctionResult<Vec<BundleBid<B>>>;
}

/// Re-bid the bundles demanded during the clock phase at their true value,
/// most recent first.
#[derive(Debug, Clone, Copy)]
pub struct LastBidsTrueValue {
    pub number_of_supplementary_bids: usize,
}

impl Default for LastBidsTrueValue {
    fn default() -> Self {
        Self {
            number_of_supplementary_bids: DEFAULT_SUPPLEMENTARY_BIDS,
        }
    }
}

impl<B: Bundle> SupplementaryRound<B> for LastBidsTrueValue {
    fn supplementary_bids(&self, ctx: &SupplementaryContext<'_, B>) -> AuctionResult<Vec<BundleBid<B>>> {
        let mut seen = BTreeSet::new();
        Ok(ctx
            .history
            .recent_clock_bundles()
            .filter(|bundle| seen.insert((*bundle).clone()))
            .take(self.number_of_supplementary_bids)
            .map(|bundle| BundleBid::new(bundle.clone(), ctx.bidder.value(bundle)))
            .collect())
    }
}

/// Bid true value on the most profitable bundles at final clock prices.
#[derive(Debug, Clone, Copy)]
pub struct ProfitMaximizing {
    pub number_of_supplementary_bids: usize,
}

impl Default for ProfitMaximizing {
    fn default() -> Self {
        Self {
            number_of_supplementary_bids: DEFAULT_SUPPLEMENTARY_BIDS,
        }
    }
}

impl<B: Bundle> SupplementaryRound<B> for ProfitMaximizing {
    fn supplementary_bids(&self, ctx: &SupplementaryContext<'_, B>) -> AuctionResult<Vec<BundleBid<B>>> {
        // One extra slot so dropping the empty bundle still leaves a full pool.
        let pool = ctx.demand_query.best_responses(
            ctx.bidder,
            ctx.prices,
            self.number_of_supplementary_bids.saturating_add(1),
        )?;
        Ok(pool
            .into_iter()
            .filter(|r| !r.bundle.is_empty())
            .take(self.number_of_supplementary_bids)
            .map(|r| BundleBid::new(r.bundle, r.value))
            .collect())
    }
}
