//! Per-bidder, append-only bid records.
//!
//! Each bidder's `Bid` is an ordered sequence of entries. Clock-phase entries
//! come first, one per round in which the bidder demanded something;
//! supplementary entries follow. Once the first supplementary entry is in,
//! the clock-phase part is closed, so the clock-phase entries are always a
//! prefix of the full sequence.

use std::collections::BTreeMap;

use crate::error::{AuctionError, AuctionResult};
use crate::types::{BidderId, Bundle, Price};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidPhase {
    Clock { round: u32 },
    Supplementary,
}

impl BidPhase {
    pub fn label(&self) -> &'static str {
        match self {
            BidPhase::Clock { .. } => "clock",
            BidPhase::Supplementary => "supplementary",
        }
    }
}

/// A bundle together with the amount bid for it.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleBid<B: Bundle> {
    pub bundle: B,
    pub value: Price,
}

impl<B: Bundle> BundleBid<B> {
    pub fn new(bundle: B, value: Price) -> Self {
        Self { bundle, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BidEntry<B: Bundle> {
    pub bundle: B,
    pub value: Price,
    pub phase: BidPhase,
}

impl<B: Bundle> BidEntry<B> {
    pub fn as_bundle_bid(&self) -> BundleBid<B> {
        BundleBid::new(self.bundle.clone(), self.value)
    }
}

/// All entries submitted by one bidder so far.
#[derive(Debug, Clone)]
pub struct Bid<B: Bundle> {
    bidder: BidderId,
    entries: Vec<BidEntry<B>>,
    /// Number of leading clock-phase entries
    clock_len: usize,
}

impl<B: Bundle> Bid<B> {
    pub fn new(bidder: BidderId) -> Self {
        Self {
            bidder,
            entries: Vec::new(),
            clock_len: 0,
        }
    }

    pub fn bidder(&self) -> BidderId {
        self.bidder
    }

    pub fn push_clock(&mut self, round: u32, bundle: B, value: Price) -> AuctionResult<()> {
        if self.clock_len != self.entries.len() {
            return Err(AuctionError::ClockPhaseClosed(self.bidder));
        }
        self.entries.push(BidEntry {
            bundle,
            value,
            phase: BidPhase::Clock { round },
        });
        self.clock_len += 1;
        Ok(())
    }

    pub fn push_supplementary(&mut self, bid: BundleBid<B>) {
        self.entries.push(BidEntry {
            bundle: bid.bundle,
            value: bid.value,
            phase: BidPhase::Supplementary,
        });
    }

    pub fn entries(&self) -> &[BidEntry<B>] {
        &self.entries
    }

    pub fn clock_phase(&self) -> &[BidEntry<B>] {
        &self.entries[..self.clock_len]
    }

    pub fn supplementary(&self) -> &[BidEntry<B>] {
        &self.entries[self.clock_len..]
    }

    /// The clock-phase entry submitted in `round`, if the bidder demanded
    /// anything that round
    pub fn clock_bid_at(&self, round: u32) -> Option<&BidEntry<B>> {
        self.clock_phase()
            .iter()
            .find(|e| e.phase == BidPhase::Clock { round })
    }

    /// Clock-phase bundles, most recent first
    pub fn recent_clock_bundles(&self) -> impl Iterator<Item = &B> + '_ {
        self.clock_phase().iter().rev().map(|e| &e.bundle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bids handed to winner determination: each bidder's bundle bids, with
/// XOR semantics across one bidder's bids.
pub type BidCollection<B> = BTreeMap<BidderId, Vec<BundleBid<B>>>;

/// Which part of the repository a snapshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    ClockPhase,
    Full,
}

#[derive(Debug, Clone)]
pub struct BidRepository<B: Bundle> {
    bids: BTreeMap<BidderId, Bid<B>>,
}

impl<B: Bundle> BidRepository<B> {
    pub fn new(bidders: impl IntoIterator<Item = BidderId>) -> Self {
        Self {
            bids: bidders.into_iter().map(|id| (id, Bid::new(id))).collect(),
        }
    }

    pub fn get(&self, bidder: BidderId) -> Option<&Bid<B>> {
        self.bids.get(&bidder)
    }

    pub fn get_mut(&mut self, bidder: BidderId) -> AuctionResult<&mut Bid<B>> {
        self.bids
            .get_mut(&bidder)
            .ok_or(AuctionError::UnknownBidder(bidder))
    }

    pub fn iter(&self) -> impl Iterator<Item = (BidderId, &Bid<B>)> + '_ {
        self.bids.iter().map(|(&id, bid)| (id, bid))
    }

    /// Drop every entry, keeping the bidder set.
    pub fn clear(&mut self) {
        for (id, bid) in self.bids.iter_mut() {
            *bid = Bid::new(*id);
        }
    }

    pub fn collect(&self, snapshot: Snapshot) -> BidCollection<B> {
        self.bids
            .iter()
            .map(|(&id, bid)| {
                let entries = match snapshot {
                    Snapshot::ClockPhase => bid.clock_phase(),
                    Snapshot::Full => bid.entries(),
                };
                (id, entries.iter().map(BidEntry::as_bundle_bid).collect())
            })
            .collect()
    }

    pub fn total_entries(&self) -> usize {
        self.bids.values().map(Bid::len).sum()
    }
}
