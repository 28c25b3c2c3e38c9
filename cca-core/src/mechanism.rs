//! Combinatorial clock auction.
//!
//! State machine:
//!
//! ```text
//! Initializing -> ClockRound -> (ClockRound | Converged) -> SupplementaryRound -> Solved
//! ```
//!
//! Each clock round queries every bidder against the same frozen price
//! vector, appends the non-empty responses to the bid repository, and only
//! then aggregates demand. Either demand fits supply (converged) or the price
//! update policy produces next round's prices. After convergence the
//! supplementary round adds one batch of bids per bidder, and winner
//! determination runs over the collected bids.
//!
//! The same control flow serves both variants through the `Bundle` trait:
//! `CcaMechanism<GoodSet>` for single goods, `CcaMechanism<QuantityVector>`
//! for quantities per generic definition.

use std::collections::BTreeSet;

use crate::bidder::Bidder;
use crate::bids::{Bid, BidRepository, Snapshot};
use crate::config::CcaConfig;
use crate::demand::{DemandQuery, DemandQueryResult};
use crate::error::{AuctionError, AuctionResult, NonConvergence};
use crate::price::PriceUpdate;
use crate::supplementary::{SupplementaryContext, SupplementaryRound};
use crate::types::{BidderId, Bundle, Demand, GoodSet, Price, Prices, QuantityVector, Supply};
use crate::wdp::{Allocation, WinnerDetermination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcaState {
    Initializing,
    ClockRound,
    Converged,
    SupplementaryRound,
    Solved,
}

/// Prices and resulting demand of one clock round.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockRoundRecord<B: Bundle> {
    pub round: u32,
    pub prices: Prices<B::Unit>,
    pub demand: Demand<B::Unit>,
    /// Units whose demand exceeded supply by more than epsilon, ascending
    pub over_demanded: Vec<B::Unit>,
}

impl<B: Bundle> ClockRoundRecord<B> {
    pub fn converged(&self) -> bool {
        self.over_demanded.is_empty()
    }
}

pub type NonGenericCca = CcaMechanism<GoodSet>;
pub type GenericCca = CcaMechanism<QuantityVector>;

pub struct CcaMechanism<B: Bundle> {
    config: CcaConfig,
    supply: Supply<B::Unit>,
    bidders: Vec<Box<dyn Bidder<B>>>,

    // Strategies
    demand_query: Box<dyn DemandQuery<B>>,
    price_update: Box<dyn PriceUpdate<B::Unit>>,
    supplementary_round: Box<dyn SupplementaryRound<B>>,
    winner_determination: Box<dyn WinnerDetermination<B>>,

    // Run state
    state: CcaState,
    round: u32,
    prices: Prices<B::Unit>,
    bids: BidRepository<B>,
    history: Vec<ClockRoundRecord<B>>,
    clock_allocation: Option<Allocation<B>>,
    final_allocation: Option<Allocation<B>>,
    /// Set once the clock phase gives up; the run is over from then on
    stalled: Option<(u32, NonConvergence)>,
}

impl<B: Bundle> CcaMechanism<B> {
    /// Build a mechanism with the price update and supplementary strategies
    /// named in `config`. Invalid settings are rejected here, before any
    /// round runs.
    pub fn new(
        supply: Supply<B::Unit>,
        bidders: Vec<Box<dyn Bidder<B>>>,
        demand_query: Box<dyn DemandQuery<B>>,
        winner_determination: Box<dyn WinnerDetermination<B>>,
        config: CcaConfig,
    ) -> AuctionResult<Self> {
        config.validate()?;
        if bidders.is_empty() {
            return Err(AuctionError::InvalidConfig(
                "an auction needs at least one bidder".to_string(),
            ));
        }
        let ids: BTreeSet<BidderId> = bidders.iter().map(|b| b.id()).collect();
        if ids.len() != bidders.len() {
            return Err(AuctionError::InvalidConfig(
                "bidder ids must be unique".to_string(),
            ));
        }
        if supply.is_empty() || supply.values().all(|&c| c == 0) {
            return Err(AuctionError::InvalidConfig(
                "supply must contain at least one unit".to_string(),
            ));
        }
        if let Some(variant) = config.variant.filter(|&v| v != B::VARIANT) {
            return Err(AuctionError::InvalidConfig(format!(
                "configured for the {variant:?} variant but built over {:?} bundles",
                B::VARIANT
            )));
        }

        let price_update = config.price_update.build()?;
        let supplementary_round = config.supplementary_round.build();
        let prices = Prices::uniform(&supply, config.starting_price);

        Ok(Self {
            supply,
            bidders,
            demand_query,
            price_update,
            supplementary_round,
            winner_determination,
            state: CcaState::Initializing,
            round: 0,
            prices,
            bids: BidRepository::new(ids),
            history: Vec::new(),
            clock_allocation: None,
            final_allocation: None,
            stalled: None,
            config,
        })
    }

    /// Replace the configured price update policy.
    pub fn with_price_update(mut self, policy: Box<dyn PriceUpdate<B::Unit>>) -> Self {
        self.price_update = policy;
        self
    }

    /// Replace the configured supplementary round strategy.
    pub fn with_supplementary_round(mut self, strategy: Box<dyn SupplementaryRound<B>>) -> Self {
        self.supplementary_round = strategy;
        self
    }

    // === Accessors ===

    pub fn state(&self) -> CcaState {
        self.state
    }

    /// Current round number; the round whose prices are `prices()`
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn prices(&self) -> &Prices<B::Unit> {
        &self.prices
    }

    pub fn supply(&self) -> &Supply<B::Unit> {
        &self.supply
    }

    pub fn config(&self) -> &CcaConfig {
        &self.config
    }

    pub fn bids(&self) -> &BidRepository<B> {
        &self.bids
    }

    pub fn bids_for(&self, bidder: BidderId) -> Option<&Bid<B>> {
        self.bids.get(bidder)
    }

    pub fn round_history(&self) -> &[ClockRoundRecord<B>] {
        &self.history
    }

    /// Why the clock phase stopped, if it did not converge
    pub fn non_convergence(&self) -> Option<NonConvergence> {
        self.stalled.map(|(_, reason)| reason)
    }

    /// Price of each unit in the last round it was over-demanded, when the
    /// price update policy tracks it.
    pub fn last_prices(&self) -> Option<&Prices<B::Unit>> {
        self.price_update.last_prices()
    }

    // === Clock phase ===

    fn initialize(&mut self) {
        self.prices = Prices::uniform(&self.supply, self.config.starting_price);
        self.bids.clear();
        self.history.clear();
        self.round = 0;
        self.transition(CcaState::ClockRound);
    }

    fn transition(&mut self, next: CcaState) {
        #[cfg(feature = "instrument")]
        tracing::debug!(from = ?self.state, to = ?next, round = self.round, "cca state transition");
        self.state = next;
    }

    fn expect_state(&self, expected: CcaState) -> AuctionResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AuctionError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    /// Query every bidder at the current prices. Nothing is mutated, so a
    /// failing query leaves the round untouched.
    fn query_bidders(&self) -> AuctionResult<Vec<(BidderId, DemandQueryResult<B>)>> {
        self.bidders
            .iter()
            .map(|bidder| {
                let response = self
                    .demand_query
                    .best_response(bidder.as_ref(), &self.prices)?;
                Ok((bidder.id(), response))
            })
            .collect()
    }

    /// Play one clock round. The first call also initializes the run.
    ///
    /// Once the clock phase has failed to converge, every later call returns
    /// the same `DidNotConverge` without querying bidders or recording bids.
    pub fn next_clock_round(&mut self) -> AuctionResult<ClockRoundRecord<B>> {
        if let Some((rounds, reason)) = self.stalled {
            return Err(AuctionError::DidNotConverge { rounds, reason });
        }
        if self.state == CcaState::Initializing {
            self.initialize();
        }
        self.expect_state(CcaState::ClockRound)?;

        let responses = self.query_bidders()?;

        // Barrier: all bidders have answered against the same prices.
        let mut demand: Demand<B::Unit> = self.supply.keys().map(|&u| (u, 0)).collect();
        for (bidder, response) in responses {
            if response.bundle.is_empty() {
                continue;
            }
            for (unit, q) in response.bundle.quantities() {
                *demand.entry(unit).or_insert(0) += q;
            }
            // The clock bid reports the bundle's cost at this round's prices.
            let reported = response.bundle.cost(&self.prices);
            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "bid",
                bidder = bidder.0,
                phase = "clock",
                round = self.round,
                value = reported,
                size = response.bundle.size(),
            );
            self.bids
                .get_mut(bidder)?
                .push_clock(self.round, response.bundle, reported)?;
        }

        let mut over_demanded: Vec<B::Unit> = demand
            .iter()
            .filter(|&(unit, &d)| {
                let cap = self.supply.get(unit).copied().unwrap_or(0);
                d as f64 > cap as f64 + self.config.epsilon
            })
            .map(|(&unit, _)| unit)
            .collect();
        over_demanded.sort();

        let record = ClockRoundRecord {
            round: self.round,
            prices: self.prices.clone(),
            demand,
            over_demanded,
        };
        self.log_round(&record);
        self.history.push(record.clone());

        if record.converged() {
            self.transition(CcaState::Converged);
            return Ok(record);
        }

        let rounds_played = self.round + 1;
        if rounds_played >= self.config.max_rounds {
            return Err(self.did_not_converge(rounds_played, NonConvergence::RoundCap));
        }

        let next = self
            .price_update
            .update(&self.prices, &record.demand, &self.supply);
        if next == self.prices {
            return Err(self.did_not_converge(rounds_played, NonConvergence::PricePlateau));
        }
        self.log_price_changes(&next);
        self.prices = next;
        self.round += 1;

        Ok(record)
    }

    /// Play clock rounds until demand fits supply. Returns the final round.
    pub fn run_clock_phase(&mut self) -> AuctionResult<u32> {
        while self.state != CcaState::Converged {
            self.next_clock_round()?;
        }
        Ok(self.round)
    }

    fn did_not_converge(&mut self, rounds: u32, reason: NonConvergence) -> AuctionError {
        #[cfg(feature = "instrument")]
        tracing::warn!(rounds, %reason, "clock phase did not converge");
        self.stalled = Some((rounds, reason));
        AuctionError::DidNotConverge { rounds, reason }
    }

    // === Supplementary round ===

    /// Ask every bidder's supplementary strategy for its extra bids at the
    /// final clock prices and append them.
    pub fn run_supplementary_round(&mut self) -> AuctionResult<()> {
        self.expect_state(CcaState::Converged)?;

        let mut batches = Vec::with_capacity(self.bidders.len());
        for bidder in &self.bidders {
            let history = self
                .bids
                .get(bidder.id())
                .ok_or(AuctionError::UnknownBidder(bidder.id()))?;
            let ctx = SupplementaryContext {
                bidder: bidder.as_ref(),
                history,
                prices: &self.prices,
                demand_query: self.demand_query.as_ref(),
            };
            batches.push((bidder.id(), self.supplementary_round.supplementary_bids(&ctx)?));
        }

        for (bidder, batch) in batches {
            let bid = self.bids.get_mut(bidder)?;
            for entry in batch {
                #[cfg(feature = "instrument")]
                tracing::info!(
                    target: "bid",
                    bidder = bidder.0,
                    phase = "supplementary",
                    round = self.round,
                    value = entry.value,
                    size = entry.bundle.size(),
                );
                bid.push_supplementary(entry);
            }
        }

        self.transition(CcaState::SupplementaryRound);
        Ok(())
    }

    // === Winner determination ===

    fn solve(&self, snapshot: Snapshot) -> AuctionResult<Allocation<B>> {
        let bids = self.bids.collect(snapshot);
        let allocation = self
            .winner_determination
            .calculate_allocation(&bids, &self.supply)?;
        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "allocation",
            snapshot = ?snapshot,
            total_value = allocation.total_value,
            winners = allocation.winners.len(),
        );
        Ok(allocation)
    }

    /// Allocation over clock-phase bids only. Solved once, then cached.
    pub fn allocation_after_clock_phase(&mut self) -> AuctionResult<&Allocation<B>> {
        if matches!(self.state, CcaState::Initializing | CcaState::ClockRound) {
            return Err(AuctionError::InvalidState {
                expected: CcaState::Converged,
                actual: self.state,
            });
        }
        let allocation = match self.clock_allocation.take() {
            Some(allocation) => allocation,
            None => self.solve(Snapshot::ClockPhase)?,
        };
        Ok(&*self.clock_allocation.insert(allocation))
    }

    /// Allocation over clock-phase plus supplementary bids. Solving it
    /// completes the run.
    pub fn allocation_after_supplementary_round(&mut self) -> AuctionResult<&Allocation<B>> {
        if self.state != CcaState::Solved {
            self.expect_state(CcaState::SupplementaryRound)?;
        }
        let allocation = match self.final_allocation.take() {
            Some(allocation) => allocation,
            None => self.solve(Snapshot::Full)?,
        };
        self.transition(CcaState::Solved);
        Ok(&*self.final_allocation.insert(allocation))
    }

    /// Run the whole auction and return the final allocation.
    pub fn run(&mut self) -> AuctionResult<&Allocation<B>> {
        self.run_clock_phase()?;
        self.run_supplementary_round()?;
        self.allocation_after_supplementary_round()
    }

    /// Value of an allocation under the bidders' true value functions.
    pub fn true_value(&self, allocation: &Allocation<B>) -> Price {
        self.bidders
            .iter()
            .filter_map(|bidder| {
                allocation
                    .bundle_of(bidder.id())
                    .map(|bundle| bidder.value(bundle))
            })
            .sum()
    }

    // === Instrumentation ===

    #[cfg(feature = "instrument")]
    fn log_round(&self, record: &ClockRoundRecord<B>) {
        let mut units: Vec<&B::Unit> = self.supply.keys().collect();
        units.sort();
        for unit in units {
            tracing::info!(
                target: "clock_round",
                round = record.round,
                unit = ?unit,
                price = record.prices.get(*unit),
                demand = record.demand.get(unit).copied().unwrap_or(0),
                supply = self.supply.get(unit).copied().unwrap_or(0),
            );
        }
    }

    #[cfg(not(feature = "instrument"))]
    fn log_round(&self, _record: &ClockRoundRecord<B>) {}

    #[cfg(feature = "instrument")]
    fn log_price_changes(&self, next: &Prices<B::Unit>) {
        for unit in next.units() {
            let (old, new) = (self.prices.get(unit), next.get(unit));
            if old != new {
                tracing::info!(
                    target: "price_update",
                    round = self.round,
                    unit = ?unit,
                    old_price = old,
                    new_price = new,
                );
            }
        }
    }

    #[cfg(not(feature = "instrument"))]
    fn log_price_changes(&self, _next: &Prices<B::Unit>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidder::{MarginalValueBidder, XorBidder};
    use crate::demand::{ExhaustiveSearch, OracleDemandQuery, XorDemandQuery};
    use crate::types::{DefinitionId, GoodId, Variant, World};
    use crate::wdp::BranchAndBoundWdp;

    /// One good, two bidders who both want it at low prices.
    fn contested(config: CcaConfig) -> (GoodId, NonGenericCca) {
        let mut world = World::new();
        let a = world.add_good("A");
        let bidders: Vec<Box<dyn Bidder<GoodSet>>> = vec![
            Box::new(XorBidder::new(BidderId(1)).with_atom(GoodSet::new([a]), 10.0)),
            Box::new(XorBidder::new(BidderId(2)).with_atom(GoodSet::new([a]), 6.0)),
        ];
        let cca = CcaMechanism::new(
            world.good_supply(),
            bidders,
            Box::new(XorDemandQuery),
            Box::new(BranchAndBoundWdp::default()),
            config,
        )
        .unwrap();
        (a, cca)
    }

    struct FrozenPrices;

    impl PriceUpdate<GoodId> for FrozenPrices {
        fn update(
            &mut self,
            prices: &Prices<GoodId>,
            _demand: &Demand<GoodId>,
            _supply: &Supply<GoodId>,
        ) -> Prices<GoodId> {
            prices.clone()
        }
    }

    #[test]
    fn contested_good_goes_to_the_higher_value() {
        let (a, mut cca) = contested(CcaConfig::default());

        let rounds = cca.run_clock_phase().unwrap();
        assert_eq!(cca.state(), CcaState::Converged);
        assert!(rounds > 0);
        // Price stops right after passing the lower valuation
        assert!(cca.prices().get(a) >= 6.0);
        assert!(cca.prices().get(a) < 6.0 * 1.1 + 1e-9);

        cca.run_supplementary_round().unwrap();
        let allocation = cca.allocation_after_supplementary_round().unwrap().clone();
        assert_eq!(allocation.bundle_of(BidderId(1)), Some(&GoodSet::new([a])));
        assert_eq!(allocation.total_value, 10.0);
        assert_eq!(cca.true_value(&allocation), 10.0);
        assert_eq!(cca.state(), CcaState::Solved);
    }

    #[test]
    fn history_records_every_round() {
        let (a, mut cca) = contested(CcaConfig::default());
        cca.run_clock_phase().unwrap();

        let history = cca.round_history();
        assert_eq!(history.len() as u32, cca.round() + 1);
        assert!(history[..history.len() - 1].iter().all(|r| r.over_demanded == vec![a]));
        assert!(history.last().unwrap().converged());
        assert!(history.windows(2).all(|w| w[1].prices.get(a) > w[0].prices.get(a)));
        assert!(cca.last_prices().unwrap().get(a) > 0.0);
    }

    #[test]
    fn clock_bids_report_cost_at_round_prices() {
        let (a, mut cca) = contested(CcaConfig::default());
        cca.run_clock_phase().unwrap();

        let bid = cca.bids_for(BidderId(1)).unwrap();
        for record in cca.round_history() {
            let entry = bid.clock_bid_at(record.round).unwrap();
            assert_eq!(entry.value, record.prices.get(a));
        }
    }

    #[test]
    fn round_cap_reports_non_convergence() {
        let config = CcaConfig {
            max_rounds: 3,
            ..CcaConfig::default()
        };
        let (_, mut cca) = contested(config);

        let err = cca.run_clock_phase().unwrap_err();
        assert!(matches!(
            err,
            AuctionError::DidNotConverge {
                rounds: 3,
                reason: NonConvergence::RoundCap
            }
        ));
        assert_eq!(cca.round_history().len(), 3);
    }

    #[test]
    fn non_convergence_ends_the_clock_phase() {
        let config = CcaConfig {
            max_rounds: 2,
            ..CcaConfig::default()
        };
        let (_, mut cca) = contested(config);
        assert!(cca.run_clock_phase().is_err());
        assert_eq!(cca.non_convergence(), Some(NonConvergence::RoundCap));

        let entries = cca.bids().total_entries();
        let rounds = cca.round_history().len();
        for _ in 0..2 {
            assert!(matches!(
                cca.next_clock_round(),
                Err(AuctionError::DidNotConverge {
                    rounds: 2,
                    reason: NonConvergence::RoundCap
                })
            ));
        }
        assert!(cca.run_clock_phase().is_err());
        assert_eq!(cca.bids().total_entries(), entries);
        assert_eq!(cca.round_history().len(), rounds);
        assert!(cca.run_supplementary_round().is_err());
    }

    #[test]
    fn frozen_prices_report_plateau() {
        let (_, cca) = contested(CcaConfig::default());
        let mut cca = cca.with_price_update(Box::new(FrozenPrices));

        let err = cca.next_clock_round().unwrap_err();
        assert!(matches!(
            err,
            AuctionError::DidNotConverge {
                rounds: 1,
                reason: NonConvergence::PricePlateau
            }
        ));
        assert_eq!(cca.non_convergence(), Some(NonConvergence::PricePlateau));
        assert!(cca.next_clock_round().is_err());
        assert_eq!(cca.round_history().len(), 1);
    }

    #[test]
    fn operations_out_of_order_are_rejected() {
        let (_, mut cca) = contested(CcaConfig::default());

        assert!(matches!(
            cca.run_supplementary_round(),
            Err(AuctionError::InvalidState {
                expected: CcaState::Converged,
                actual: CcaState::Initializing
            })
        ));
        assert!(cca.allocation_after_clock_phase().is_err());
        assert!(cca.allocation_after_supplementary_round().is_err());

        cca.run_clock_phase().unwrap();
        assert!(matches!(
            cca.next_clock_round(),
            Err(AuctionError::InvalidState {
                expected: CcaState::ClockRound,
                actual: CcaState::Converged
            })
        ));
        assert!(cca.allocation_after_supplementary_round().is_err());
    }

    #[test]
    fn clock_allocation_is_cached_and_never_beats_final() {
        let (_, mut cca) = contested(CcaConfig::default());
        cca.run_clock_phase().unwrap();

        let first = cca.allocation_after_clock_phase().unwrap().clone();
        let second = cca.allocation_after_clock_phase().unwrap().clone();
        assert_eq!(first, second);

        cca.run_supplementary_round().unwrap();
        let last = cca.allocation_after_supplementary_round().unwrap().clone();
        assert!(cca.true_value(&first) <= cca.true_value(&last));
    }

    #[test]
    fn invalid_setups_are_rejected() {
        let mut world = World::new();
        let a = world.add_good("A");
        let supply = world.good_supply();
        let build = |bidders: Vec<Box<dyn Bidder<GoodSet>>>, supply: Supply<GoodId>, config| {
            CcaMechanism::new(
                supply,
                bidders,
                Box::new(XorDemandQuery),
                Box::new(BranchAndBoundWdp::default()),
                config,
            )
        };
        let one = || -> Vec<Box<dyn Bidder<GoodSet>>> {
            vec![Box::new(XorBidder::new(BidderId(1)).with_atom(GoodSet::new([a]), 1.0))]
        };

        let no_bidders = build(Vec::new(), supply.clone(), CcaConfig::default());
        assert!(matches!(no_bidders, Err(AuctionError::InvalidConfig(_))));

        let mut twice = one();
        twice.extend(one());
        assert!(build(twice, supply.clone(), CcaConfig::default()).is_err());

        assert!(build(one(), Supply::new(), CcaConfig::default()).is_err());

        let generic = CcaConfig {
            variant: Some(Variant::Generic),
            ..CcaConfig::default()
        };
        assert!(matches!(
            build(one(), supply.clone(), generic),
            Err(AuctionError::InvalidConfig(_))
        ));

        let non_generic = CcaConfig {
            variant: Some(Variant::NonGeneric),
            ..CcaConfig::default()
        };
        assert!(build(one(), supply, non_generic).is_ok());
    }

    fn generic_auction(
        demand_query: impl FnOnce(Supply<DefinitionId>) -> Box<dyn DemandQuery<QuantityVector>>,
    ) -> (DefinitionId, GenericCca) {
        let mut world = World::new();
        let band = world.add_definition("band", 2);
        let supply = world.definition_supply();
        let bidders: Vec<Box<dyn Bidder<QuantityVector>>> = vec![
            Box::new(MarginalValueBidder::new(BidderId(1)).with_marginals(band, vec![8.0, 4.0])),
            Box::new(MarginalValueBidder::new(BidderId(2)).with_marginals(band, vec![6.0])),
        ];
        let cca = CcaMechanism::new(
            supply.clone(),
            bidders,
            demand_query(supply),
            Box::new(BranchAndBoundWdp::default()),
            CcaConfig::default(),
        )
        .unwrap();
        (band, cca)
    }

    #[test]
    fn generic_variant_splits_licenses() {
        let (band, mut cca) = generic_auction(|supply| {
            Box::new(OracleDemandQuery::<QuantityVector, _>::new(
                ExhaustiveSearch::default(),
                supply,
            ))
        });

        let allocation = cca.run().unwrap().clone();
        // 8 + 6 for one license each beats 8 + 4 for both
        assert_eq!(allocation.total_value, 14.0);
        assert_eq!(
            allocation.bundle_of(BidderId(1)),
            Some(&QuantityVector::new([(band, 1)]))
        );
        assert_eq!(
            allocation.bundle_of(BidderId(2)),
            Some(&QuantityVector::new([(band, 1)]))
        );
    }

    #[test]
    fn unsupported_language_fails_the_round_without_side_effects() {
        let (_, mut cca) = generic_auction(|_| Box::new(XorDemandQuery));

        let err = cca.next_clock_round().unwrap_err();
        assert!(matches!(err, AuctionError::UnsupportedBiddingLanguage { .. }));
        assert_eq!(cca.bids().total_entries(), 0);
        assert!(cca.round_history().is_empty());
        assert_eq!(cca.round(), 0);
    }
}
