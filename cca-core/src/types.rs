use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::error::{AuctionError, AuctionResult};

// ============================================================================
// IDs
// ============================================================================

new_key_type! {
    pub struct GoodId;
    pub struct DefinitionId;
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BidderId(pub u32);

impl BidderId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for BidderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bidder#{}", self.0)
    }
}

pub type Price = f64;

/// Units available per allocation unit (1 per good, `number_of_licenses` per definition).
pub type Supply<U> = HashMap<U, u32>;

/// Aggregate units demanded per allocation unit in one clock round.
pub type Demand<U> = HashMap<U, u32>;

/// Anything prices and supply are expressed over: a single good in the
/// non-generic variant, a generic definition in the generic one.
pub trait Unit: Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> Unit for T where T: Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {}

// ============================================================================
// World - goods and generic definitions
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Good {
    pub name: String,
    /// The generic definition this good is interchangeable within, if any
    pub definition: Option<DefinitionId>,
}

/// A category of interchangeable goods. Generic bids name quantities of a
/// definition rather than specific goods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericDefinition {
    pub name: String,
    pub goods: Vec<GoodId>,
}

impl GenericDefinition {
    pub fn number_of_licenses(&self) -> u32 {
        self.goods.len() as u32
    }
}

#[derive(Debug, Clone, Default)]
pub struct World {
    pub goods: SlotMap<GoodId, Good>,
    pub definitions: SlotMap<DefinitionId, GenericDefinition>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a standalone good (not part of any definition)
    pub fn add_good(&mut self, name: impl Into<String>) -> GoodId {
        self.goods.insert(Good {
            name: name.into(),
            definition: None,
        })
    }

    /// Add a definition with `number_of_licenses` fresh goods in it
    pub fn add_definition(&mut self, name: impl Into<String>, number_of_licenses: u32) -> DefinitionId {
        let name = name.into();
        let id = self.definitions.insert(GenericDefinition {
            name: name.clone(),
            goods: Vec::new(),
        });
        for i in 0..number_of_licenses {
            let good = self.goods.insert(Good {
                name: format!("{name}-{i}"),
                definition: Some(id),
            });
            self.definitions[id].goods.push(good);
        }
        id
    }

    pub fn good_by_name(&self, name: &str) -> Option<GoodId> {
        self.goods
            .iter()
            .find(|(_, g)| g.name == name)
            .map(|(id, _)| id)
    }

    /// Supply for the non-generic variant: every good is a single unit.
    pub fn good_supply(&self) -> Supply<GoodId> {
        self.goods.keys().map(|id| (id, 1)).collect()
    }

    /// Supply for the generic variant: capacity of each definition.
    pub fn definition_supply(&self) -> Supply<DefinitionId> {
        self.definitions
            .iter()
            .map(|(id, def)| (id, def.number_of_licenses()))
            .collect()
    }
}

// ============================================================================
// Prices
// ============================================================================

/// Price per allocation unit. Units without an entry are priced at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Prices<U: Unit> {
    map: HashMap<U, Price>,
}

impl<U: Unit> Default for Prices<U> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<U: Unit> Prices<U> {
    /// Every unit in `supply` at the same price
    pub fn uniform(supply: &Supply<U>, price: Price) -> Self {
        Self {
            map: supply.keys().map(|&u| (u, price)).collect(),
        }
    }

    pub fn get(&self, unit: U) -> Price {
        self.map.get(&unit).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, unit: U, price: Price) {
        self.map.insert(unit, price);
    }

    pub fn iter(&self) -> impl Iterator<Item = (U, Price)> + '_ {
        self.map.iter().map(|(&u, &p)| (u, p))
    }

    /// Units in ascending order, for deterministic iteration
    pub fn units(&self) -> Vec<U> {
        let mut units: Vec<U> = self.map.keys().copied().collect();
        units.sort();
        units
    }
}

impl<U: Unit> FromIterator<(U, Price)> for Prices<U> {
    fn from_iter<I: IntoIterator<Item = (U, Price)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Bundles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Single indivisible goods
    NonGeneric,
    /// Quantities of interchangeable goods per definition
    Generic,
}

/// What a bidder bids on. Shared control flow in the mechanism is written
/// once against this trait; `GoodSet` and `QuantityVector` are the two
/// variants.
pub trait Bundle: Clone + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    type Unit: Unit;

    const VARIANT: Variant;

    /// Non-zero quantities per unit
    fn quantities(&self) -> Vec<(Self::Unit, u32)>;

    fn quantity(&self, unit: Self::Unit) -> u32;

    /// Build from per-unit quantities; zero quantities are dropped.
    fn from_quantities(quantities: impl IntoIterator<Item = (Self::Unit, u32)>) -> Self;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Total number of units in the bundle
    fn size(&self) -> u32 {
        self.quantities().iter().map(|&(_, q)| q).sum()
    }

    /// True if every unit quantity of `other` is covered by `self`
    fn contains(&self, other: &Self) -> bool {
        other
            .quantities()
            .into_iter()
            .all(|(u, q)| self.quantity(u) >= q)
    }

    fn cost(&self, prices: &Prices<Self::Unit>) -> Price {
        self.quantities()
            .into_iter()
            .map(|(u, q)| prices.get(u) * q as f64)
            .sum()
    }

    fn fits(&self, supply: &Supply<Self::Unit>) -> bool {
        self.quantities()
            .into_iter()
            .all(|(u, q)| supply.get(&u).copied().unwrap_or(0) >= q)
    }
}

/// Number of distinct bundles that fit `supply`, saturating.
pub fn domain_size<U: Unit>(supply: &Supply<U>) -> u64 {
    supply
        .values()
        .fold(1u64, |acc, &cap| acc.saturating_mul(cap as u64 + 1))
}

/// Every bundle (the empty one included) that fits `supply`, or an error if
/// there are more than `limit` of them.
pub fn enumerate_bundles<B: Bundle>(supply: &Supply<B::Unit>, limit: u64) -> AuctionResult<Vec<B>> {
    let size = domain_size(supply);
    if size > limit {
        return Err(AuctionError::SearchSpaceTooLarge { size, limit });
    }

    let mut units: Vec<(B::Unit, u32)> = supply.iter().map(|(&u, &c)| (u, c)).collect();
    units.sort();

    let mut out = Vec::with_capacity(size as usize);
    let mut counts = vec![0u32; units.len()];
    loop {
        out.push(B::from_quantities(
            units.iter().zip(&counts).map(|(&(u, _), &q)| (u, q)),
        ));

        // Odometer increment over per-unit capacities
        let mut i = 0;
        loop {
            if i == units.len() {
                return Ok(out);
            }
            if counts[i] < units[i].1 {
                counts[i] += 1;
                break;
            }
            counts[i] = 0;
            i += 1;
        }
    }
}

/// Non-generic bundle: a set of specific goods.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoodSet(pub BTreeSet<GoodId>);

impl GoodSet {
    pub fn new(goods: impl IntoIterator<Item = GoodId>) -> Self {
        Self(goods.into_iter().collect())
    }
}

impl Bundle for GoodSet {
    type Unit = GoodId;

    const VARIANT: Variant = Variant::NonGeneric;

    fn quantities(&self) -> Vec<(GoodId, u32)> {
        self.0.iter().map(|&g| (g, 1)).collect()
    }

    fn quantity(&self, unit: GoodId) -> u32 {
        u32::from(self.0.contains(&unit))
    }

    fn from_quantities(quantities: impl IntoIterator<Item = (GoodId, u32)>) -> Self {
        Self(
            quantities
                .into_iter()
                .filter(|&(_, q)| q > 0)
                .map(|(g, _)| g)
                .collect(),
        )
    }

    fn size(&self) -> u32 {
        self.0.len() as u32
    }

    fn contains(&self, other: &Self) -> bool {
        other.0.is_subset(&self.0)
    }
}

/// Generic bundle: a quantity per definition. Zero entries are never stored,
/// so equal demand always compares equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuantityVector(pub BTreeMap<DefinitionId, u32>);

impl QuantityVector {
    pub fn new(quantities: impl IntoIterator<Item = (DefinitionId, u32)>) -> Self {
        Self::from_quantities(quantities)
    }
}

impl Bundle for QuantityVector {
    type Unit = DefinitionId;

    const VARIANT: Variant = Variant::Generic;

    fn quantities(&self) -> Vec<(DefinitionId, u32)> {
        self.0.iter().map(|(&d, &q)| (d, q)).collect()
    }

    fn quantity(&self, unit: DefinitionId) -> u32 {
        self.0.get(&unit).copied().unwrap_or(0)
    }

    fn from_quantities(quantities: impl IntoIterator<Item = (DefinitionId, u32)>) -> Self {
        let mut map = BTreeMap::new();
        for (d, q) in quantities {
            if q > 0 {
                *map.entry(d).or_insert(0) += q;
            }
        }
        Self(map)
    }
}
