//! Bidders as the mechanism sees them: an id and a value function.
//!
//! How values are computed is up to the implementor. The two bidders here
//! are small reference models for tests and demos; real instances plug in
//! their own value-function models through the `Bidder` trait.

use std::collections::HashMap;

use crate::error::{AuctionError, AuctionResult};
use crate::types::{BidderId, Bundle, DefinitionId, Price, QuantityVector};

/// Name of the explicit XOR bidding language, as reported in errors.
pub const XOR_LANGUAGE: &str = "xor";

pub trait Bidder<B: Bundle>: Send + Sync {
    fn id(&self) -> BidderId;

    /// True value of a bundle to this bidder
    fn value(&self, bundle: &B) -> Price;

    /// Explicit XOR atoms: the bundles this bidder places value on.
    ///
    /// Only bidders whose valuation is small enough to list support this;
    /// the default reports the language as unsupported.
    fn xor_atoms(&self) -> AuctionResult<Vec<(B, Price)>> {
        Err(AuctionError::UnsupportedBiddingLanguage {
            bidder: self.id(),
            language: XOR_LANGUAGE,
        })
    }
}

// === XOR BIDDER ===

/// Explicit XOR valuation with free disposal: a bundle is worth the most
/// valuable atom it contains.
#[derive(Debug, Clone)]
pub struct XorBidder<B: Bundle> {
    pub id: BidderId,
    pub atoms: Vec<(B, Price)>,
}

impl<B: Bundle> XorBidder<B> {
    pub fn new(id: BidderId) -> Self {
        Self {
            id,
            atoms: Vec::new(),
        }
    }

    pub fn with_atom(mut self, bundle: B, value: Price) -> Self {
        self.atoms.push((bundle, value));
        self
    }
}

impl<B: Bundle> Bidder<B> for XorBidder<B> {
    fn id(&self) -> BidderId {
        self.id
    }

    fn value(&self, bundle: &B) -> Price {
        self.atoms
            .iter()
            .filter(|(atom, _)| bundle.contains(atom))
            .map(|&(_, v)| v)
            .fold(0.0, f64::max)
    }

    fn xor_atoms(&self) -> AuctionResult<Vec<(B, Price)>> {
        Ok(self.atoms.clone())
    }
}

// === MARGINAL VALUE BIDDER ===

/// Generic bidder with a list of per-unit marginal values for each
/// definition; units past the end of a list are worth nothing. Answers value
/// queries only.
#[derive(Debug, Clone)]
pub struct MarginalValueBidder {
    pub id: BidderId,
    pub marginals: HashMap<DefinitionId, Vec<Price>>,
}

impl MarginalValueBidder {
    pub fn new(id: BidderId) -> Self {
        Self {
            id,
            marginals: HashMap::new(),
        }
    }

    pub fn with_marginals(mut self, definition: DefinitionId, values: Vec<Price>) -> Self {
        self.marginals.insert(definition, values);
        self
    }
}

impl Bidder<QuantityVector> for MarginalValueBidder {
    fn id(&self) -> BidderId {
        self.id
    }

    fn value(&self, bundle: &QuantityVector) -> Price {
        bundle
            .quantities()
            .into_iter()
            .map(|(def, q)| {
                self.marginals
                    .get(&def)
                    .map(|values| values.iter().take(q as usize).sum::<Price>())
                    .unwrap_or(0.0)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GoodSet, World};

    #[test]
    fn xor_value_is_best_contained_atom() {
        let mut world = World::new();
        let a = world.add_good("A");
        let b = world.add_good("B");
        let c = world.add_good("C");

        let bidder = XorBidder::new(BidderId(1))
            .with_atom(GoodSet::new([a]), 4.0)
            .with_atom(GoodSet::new([a, b]), 9.0);

        assert_eq!(bidder.value(&GoodSet::new([a])), 4.0);
        assert_eq!(bidder.value(&GoodSet::new([a, b, c])), 9.0);
        assert_eq!(bidder.value(&GoodSet::new([b])), 0.0);
        assert_eq!(bidder.value(&GoodSet::default()), 0.0);
    }

    #[test]
    fn marginal_bidder_sums_leading_marginals() {
        let mut world = World::new();
        let d = world.add_definition("band", 4);
        let bidder = MarginalValueBidder::new(BidderId(2)).with_marginals(d, vec![5.0, 3.0, 1.0]);

        assert_eq!(bidder.value(&QuantityVector::new([(d, 2)])), 8.0);
        assert_eq!(bidder.value(&QuantityVector::new([(d, 4)])), 9.0);
    }

    #[test]
    fn marginal_bidder_rejects_xor_enumeration() {
        let bidder = MarginalValueBidder::new(BidderId(7));
        let err = bidder.xor_atoms().unwrap_err();
        assert!(matches!(
            err,
            AuctionError::UnsupportedBiddingLanguage {
                bidder: BidderId(7),
                language: XOR_LANGUAGE,
            }
        ));
    }
}
