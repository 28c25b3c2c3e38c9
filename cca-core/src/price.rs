//! Clock price updates.
//!
//! A policy sees the prices of the round just played and the aggregate
//! demand those prices produced, and returns the prices for the next round.
//!
//! - `SimpleRelative`: over-demanded units go up by a fixed fraction (or to a
//!   floor when still free). Everything else holds. Prices never fall.
//! - `DemandDependent`: every unit moves by excess demand times a step that
//!   cools with the round count, so prices can fall as well as rise.

use std::marker::PhantomData;

use crate::error::{AuctionError, AuctionResult};
use crate::types::{Demand, Price, Prices, Supply, Unit};

pub trait PriceUpdate<U: Unit>: Send {
    fn update(&mut self, prices: &Prices<U>, demand: &Demand<U>, supply: &Supply<U>) -> Prices<U>;

    /// For each unit, its price in the last round it was over-demanded.
    /// Only policies that track this return it.
    fn last_prices(&self) -> Option<&Prices<U>> {
        None
    }
}

/// Units demanded beyond capacity (negative when under-demanded)
pub fn excess_demand<U: Unit>(unit: U, demand: &Demand<U>, supply: &Supply<U>) -> i64 {
    let d = demand.get(&unit).copied().unwrap_or(0) as i64;
    let s = supply.get(&unit).copied().unwrap_or(0) as i64;
    d - s
}

fn all_units<U: Unit>(prices: &Prices<U>, supply: &Supply<U>) -> Vec<U> {
    let mut units = prices.units();
    units.extend(supply.keys().copied());
    units.sort();
    units.dedup();
    units
}

// === SIMPLE RELATIVE ===

#[derive(Debug, Clone)]
pub struct SimpleRelative<U: Unit> {
    alpha: f64,
    initial_update: Price,
    last_prices: Prices<U>,
}

impl<U: Unit> SimpleRelative<U> {
    /// `alpha` is the relative increment, `initial_update` the price an
    /// over-demanded unit jumps to while its price is still zero.
    pub fn new(alpha: f64, initial_update: Price) -> AuctionResult<Self> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(AuctionError::InvalidConfig(format!(
                "relative price increment must be positive, got {alpha}"
            )));
        }
        if !(initial_update.is_finite() && initial_update > 0.0) {
            return Err(AuctionError::InvalidConfig(format!(
                "initial price update must be positive, got {initial_update}"
            )));
        }
        Ok(Self {
            alpha,
            initial_update,
            last_prices: Prices::default(),
        })
    }
}

impl<U: Unit> PriceUpdate<U> for SimpleRelative<U> {
    fn update(&mut self, prices: &Prices<U>, demand: &Demand<U>, supply: &Supply<U>) -> Prices<U> {
        all_units(prices, supply)
            .into_iter()
            .map(|unit| {
                let old = prices.get(unit);
                if excess_demand(unit, demand, supply) <= 0 {
                    return (unit, old);
                }
                self.last_prices.set(unit, old);
                let new = if old > 0.0 {
                    old * (1.0 + self.alpha)
                } else {
                    self.initial_update
                };
                (unit, new)
            })
            .collect()
    }

    fn last_prices(&self) -> Option<&Prices<U>> {
        Some(&self.last_prices)
    }
}

// === DEMAND DEPENDENT ===

#[derive(Debug, Clone)]
pub struct DemandDependent<U: Unit> {
    constant: f64,
    /// Cooling exponent: the step in round `r` is `constant / r^gamma`
    gamma: f64,
    round: u32,
    _unit: PhantomData<fn() -> U>,
}

impl<U: Unit> DemandDependent<U> {
    /// The step in round `r` is `constant / r^gamma`. The default
    /// `gamma = 0.5` is the classic `constant / sqrt(round)` schedule.
    /// `gamma` must lie in `(0, 1]`: at zero the step would never cool.
    pub fn new(constant: f64, gamma: f64) -> AuctionResult<Self> {
        if !(constant.is_finite() && constant > 0.0) {
            return Err(AuctionError::InvalidConfig(format!(
                "demand-dependent step constant must be positive, got {constant}"
            )));
        }
        if !(gamma > 0.0 && gamma <= 1.0) {
            return Err(AuctionError::InvalidConfig(format!(
                "cooling exponent must lie in (0, 1], got {gamma}"
            )));
        }
        Ok(Self {
            constant,
            gamma,
            round: 0,
            _unit: PhantomData,
        })
    }

    /// Step size used on the `round`-th call (1-based)
    pub fn step_size(&self, round: u32) -> f64 {
        self.constant / (round.max(1) as f64).powf(self.gamma)
    }

    pub fn round(&self) -> u32 {
        self.round
    }
}

impl<U: Unit> PriceUpdate<U> for DemandDependent<U> {
    fn update(&mut self, prices: &Prices<U>, demand: &Demand<U>, supply: &Supply<U>) -> Prices<U> {
        self.round += 1;
        let step = self.step_size(self.round);
        all_units(prices, supply)
            .into_iter()
            .map(|unit| {
                let excess = excess_demand(unit, demand, supply) as f64;
                // Prices are floored at zero
                (unit, (prices.get(unit) + step * excess).max(0.0))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GoodId, World};

    fn two_goods() -> (GoodId, GoodId, Supply<GoodId>) {
        let mut world = World::new();
        let a = world.add_good("A");
        let b = world.add_good("B");
        (a, b, world.good_supply())
    }

    fn demand(pairs: &[(GoodId, u32)]) -> Demand<GoodId> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn simple_relative_bumps_only_over_demanded() {
        let (a, b, supply) = two_goods();
        let mut policy = SimpleRelative::new(0.1, 1.0).unwrap();
        let mut prices = Prices::uniform(&supply, 0.0);
        prices.set(b, 4.0);

        let next = policy.update(&prices, &demand(&[(a, 2), (b, 1)]), &supply);
        assert_eq!(next.get(a), 1.0, "zero price jumps to the initial update");
        assert_eq!(next.get(b), 4.0, "satisfied good holds its price");

        let after = policy.update(&next, &demand(&[(a, 3), (b, 2)]), &supply);
        assert!((after.get(a) - 1.1).abs() < 1e-12);
        assert!((after.get(b) - 4.4).abs() < 1e-12);
    }

    #[test]
    fn simple_relative_records_last_over_demanded_price() {
        let (a, _, supply) = two_goods();
        let mut policy = SimpleRelative::new(0.5, 2.0).unwrap();
        let p0 = Prices::uniform(&supply, 0.0);

        let p1 = policy.update(&p0, &demand(&[(a, 2)]), &supply);
        let p2 = policy.update(&p1, &demand(&[(a, 2)]), &supply);
        let _p3 = policy.update(&p2, &demand(&[(a, 1)]), &supply);

        let last = policy.last_prices().unwrap();
        assert_eq!(last.get(a), 2.0, "price before the final increase");
        assert_eq!(last.units(), vec![a], "b was never over-demanded");
    }

    #[test]
    fn simple_relative_rejects_bad_constants() {
        assert!(SimpleRelative::<GoodId>::new(0.0, 1.0).is_err());
        assert!(SimpleRelative::<GoodId>::new(0.1, -1.0).is_err());
        assert!(SimpleRelative::<GoodId>::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn demand_dependent_step_cools() {
        let policy = DemandDependent::<GoodId>::new(2.0, 0.5).unwrap();
        let steps: Vec<f64> = (1..=6).map(|r| policy.step_size(r)).collect();
        assert!(steps.windows(2).all(|w| w[1] < w[0]));
        assert!((steps[3] - 1.0).abs() < 1e-12, "2 / sqrt(4) = 1");
    }

    #[test]
    fn demand_dependent_moves_both_ways_and_floors_at_zero() {
        let (a, b, supply) = two_goods();
        let mut policy = DemandDependent::new(1.0, 0.5).unwrap();
        let mut prices = Prices::uniform(&supply, 0.0);
        prices.set(b, 0.5);

        // Round 1: step 1. a has excess 2, b excess -1.
        let next = policy.update(&prices, &demand(&[(a, 3)]), &supply);
        assert_eq!(next.get(a), 2.0);
        assert_eq!(next.get(b), 0.0);
        assert_eq!(policy.round(), 1);

        // Round 2: step 1/sqrt(2). a excess -1 lowers it.
        let after = policy.update(&next, &demand(&[(a, 0)]), &supply);
        assert!((after.get(a) - (2.0 - 1.0 / 2f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn demand_dependent_rejects_gamma_outside_unit_interval() {
        assert!(DemandDependent::<GoodId>::new(1.0, 0.0).is_err());
        assert!(DemandDependent::<GoodId>::new(1.0, 1.5).is_err());
        assert!(DemandDependent::<GoodId>::new(1.0, -0.2).is_err());
        assert!(DemandDependent::<GoodId>::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn default_gamma_is_the_square_root_schedule() {
        let config = crate::config::CcaConfig::from_json(
            r#"{ "price_update": { "policy": "demand_dependent", "constant": 3.0 } }"#,
        )
        .unwrap();
        let crate::config::PriceUpdateConfig::DemandDependent { constant, gamma } =
            config.price_update
        else {
            panic!("expected the demand-dependent policy");
        };

        let policy = DemandDependent::<GoodId>::new(constant, gamma).unwrap();
        for round in 1..=50 {
            let expected = 3.0 / (round as f64).sqrt();
            assert!((policy.step_size(round) - expected).abs() < 1e-12);
        }
    }
}
