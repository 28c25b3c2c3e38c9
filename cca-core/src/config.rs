use serde::{Deserialize, Serialize};

use crate::error::{AuctionError, AuctionResult};
use crate::price::{DemandDependent, PriceUpdate, SimpleRelative};
use crate::supplementary::{
    DEFAULT_SUPPLEMENTARY_BIDS, LastBidsTrueValue, ProfitMaximizing, SupplementaryRound,
};
use crate::types::{Bundle, Price, Unit, Variant};

/// Which price update policy the clock uses, with its constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PriceUpdateConfig {
    SimpleRelative {
        #[serde(default = "default_alpha")]
        alpha: f64,
        #[serde(default = "default_initial_update")]
        initial_update: Price,
    },
    DemandDependent {
        constant: f64,
        #[serde(default = "default_gamma")]
        gamma: f64,
    },
}

fn default_alpha() -> f64 {
    0.1
}

fn default_initial_update() -> Price {
    1.0
}

fn default_gamma() -> f64 {
    0.5
}

impl Default for PriceUpdateConfig {
    fn default() -> Self {
        PriceUpdateConfig::SimpleRelative {
            alpha: default_alpha(),
            initial_update: default_initial_update(),
        }
    }
}

impl PriceUpdateConfig {
    pub fn build<U: Unit>(&self) -> AuctionResult<Box<dyn PriceUpdate<U>>> {
        Ok(match *self {
            PriceUpdateConfig::SimpleRelative {
                alpha,
                initial_update,
            } => Box::new(SimpleRelative::new(alpha, initial_update)?),
            PriceUpdateConfig::DemandDependent { constant, gamma } => {
                Box::new(DemandDependent::new(constant, gamma)?)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SupplementaryRoundConfig {
    ProfitMaximizing {
        #[serde(default = "default_supplementary_bids")]
        number_of_supplementary_bids: usize,
    },
    LastBidsTrueValue {
        #[serde(default = "default_supplementary_bids")]
        number_of_supplementary_bids: usize,
    },
}

fn default_supplementary_bids() -> usize {
    DEFAULT_SUPPLEMENTARY_BIDS
}

impl Default for SupplementaryRoundConfig {
    fn default() -> Self {
        SupplementaryRoundConfig::ProfitMaximizing {
            number_of_supplementary_bids: DEFAULT_SUPPLEMENTARY_BIDS,
        }
    }
}

impl SupplementaryRoundConfig {
    pub fn build<B: Bundle>(&self) -> Box<dyn SupplementaryRound<B>> {
        match *self {
            SupplementaryRoundConfig::ProfitMaximizing {
                number_of_supplementary_bids,
            } => Box::new(ProfitMaximizing {
                number_of_supplementary_bids,
            }),
            SupplementaryRoundConfig::LastBidsTrueValue {
                number_of_supplementary_bids,
            } => Box::new(LastBidsTrueValue {
                number_of_supplementary_bids,
            }),
        }
    }
}

/// Settings for one CCA run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CcaConfig {
    /// Clock price of every unit in the first round
    pub starting_price: Price,
    /// Demand counts as satisfied when `demand <= supply + epsilon`
    pub epsilon: f64,
    /// Clock rounds allowed before the run is reported as not converging
    pub max_rounds: u32,
    pub price_update: PriceUpdateConfig,
    pub supplementary_round: SupplementaryRoundConfig,
    /// When set, must match the bundle type the mechanism is built for
    pub variant: Option<Variant>,
}

impl Default for CcaConfig {
    fn default() -> Self {
        Self {
            starting_price: 0.0,
            epsilon: 1e-6,
            max_rounds: 1000,
            price_update: PriceUpdateConfig::default(),
            supplementary_round: SupplementaryRoundConfig::default(),
            variant: None,
        }
    }
}

impl CcaConfig {
    pub fn from_json(json: &str) -> AuctionResult<Self> {
        let config: CcaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could use. Policy constants are checked by
    /// building the policy.
    pub fn validate(&self) -> AuctionResult<()> {
        if !(self.starting_price.is_finite() && self.starting_price >= 0.0) {
            return Err(AuctionError::InvalidConfig(format!(
                "starting price must be a non-negative number, got {}",
                self.starting_price
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(AuctionError::InvalidConfig(format!(
                "epsilon must be a non-negative number, got {}",
                self.epsilon
            )));
        }
        if self.max_rounds == 0 {
            return Err(AuctionError::InvalidConfig(
                "max_rounds must allow at least one clock round".to_string(),
            ));
        }
        // Unit type is irrelevant for validation
        self.price_update.build::<u32>()?;
        Ok(())
    }
}
