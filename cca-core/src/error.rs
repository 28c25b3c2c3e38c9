use std::fmt;

use thiserror::Error;

use crate::mechanism::CcaState;
use crate::types::BidderId;

/// Why the clock phase stopped without demand fitting supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonConvergence {
    /// The configured round cap was reached
    RoundCap,
    /// The price update left every price unchanged while goods were still over-demanded
    PricePlateau,
}

impl fmt::Display for NonConvergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonConvergence::RoundCap => write!(f, "round cap reached"),
            NonConvergence::PricePlateau => write!(f, "prices stopped moving"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AuctionError {
    #[error("{bidder} does not support the {language} bidding language")]
    UnsupportedBiddingLanguage {
        bidder: BidderId,
        language: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Demand query failed for {bidder}: {source}")]
    DemandOracle {
        bidder: BidderId,
        #[source]
        source: anyhow::Error,
    },

    #[error("Winner determination failed: {0}")]
    WinnerDetermination(#[source] anyhow::Error),

    #[error("Search space of {size} bundles exceeds the limit of {limit}")]
    SearchSpaceTooLarge { size: u64, limit: u64 },

    #[error("Clock phase did not converge after {rounds} rounds: {reason}")]
    DidNotConverge { rounds: u32, reason: NonConvergence },

    #[error("Mechanism is {actual:?}, expected {expected:?}")]
    InvalidState { expected: CcaState, actual: CcaState },

    #[error("Clock phase is closed for {0}; only supplementary bids may be appended")]
    ClockPhaseClosed(BidderId),

    #[error("Unknown {0}")]
    UnknownBidder(BidderId),
}

pub type AuctionResult<T> = Result<T, AuctionError>;
