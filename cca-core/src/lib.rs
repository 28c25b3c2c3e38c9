//! Combinatorial clock auction engine.
//!
//! Bidders answer demand queries at clock prices, over-demanded goods get
//! more expensive round by round, and once demand fits supply a
//! supplementary round collects extra bids before winner determination
//! picks the final allocation.
//!
//! Strategy seams are traits injected into [`CcaMechanism`]:
//! [`DemandQuery`], [`PriceUpdate`], [`SupplementaryRound`] and
//! [`WinnerDetermination`]. The non-generic variant bids on sets of goods
//! ([`GoodSet`]); the generic variant bids on quantities per definition
//! ([`QuantityVector`]).

pub mod bidder;
pub mod bids;
pub mod config;
pub mod demand;
pub mod error;
pub mod mechanism;
pub mod price;
pub mod supplementary;
pub mod types;
pub mod wdp;

pub use bidder::*;
pub use bids::*;
pub use config::*;
pub use demand::*;
pub use error::*;
pub use mechanism::*;
pub use price::*;
pub use supplementary::*;
pub use types::*;
pub use wdp::*;

#[cfg(feature = "instrument")]
pub use instrument;
