//! Market selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single market whose threshold set applies to a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    /// Developed market (US listings)
    Us,
    /// Growth market (NSE/BSE listings)
    India,
}

impl Market {
    /// Infer the market from a ticker's exchange suffix.
    pub fn from_ticker(ticker: &str) -> Self {
        let upper = ticker.to_ascii_uppercase();
        if upper.ends_with(".NS") || upper.ends_with(".BO") {
            Self::India
        } else {
            Self::Us
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Us => write!(f, "US"),
            Self::India => write!(f, "INDIA"),
        }
    }
}

/// Market scope of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketSelection {
    #[default]
    Us,
    India,
    Both,
}

impl MarketSelection {
    /// Market whose thresholds apply to `ticker`.
    ///
    /// An explicit single-market selection wins; `Both` falls back to the
    /// ticker suffix.
    pub fn market_for(&self, ticker: &str) -> Market {
        match self {
            Self::Us => Market::Us,
            Self::India => Market::India,
            Self::Both => Market::from_ticker(ticker),
        }
    }
}

impl fmt::Display for MarketSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Us => write!(f, "US"),
            Self::India => write!(f, "INDIA"),
            Self::Both => write!(f, "BOTH"),
        }
    }
}

impl FromStr for MarketSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::Us),
            "INDIA" | "IN" => Ok(Self::India),
            "BOTH" | "ALL" => Ok(Self::Both),
            other => Err(format!("unknown market '{}', expected US, INDIA or BOTH", other)),
        }
    }
}
