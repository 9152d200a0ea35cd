use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::offer::FlightOffer;
use crate::CoreError;

/// Which offers the results view keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    All,
    Direct,
    Connections,
}

impl FilterMode {
    pub fn matches(&self, offer: &FlightOffer) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Direct => offer.direct,
            FilterMode::Connections => !offer.direct,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Direct => "direct",
            FilterMode::Connections => "connections",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterMode::All),
            "direct" => Ok(FilterMode::Direct),
            "connections" => Ok(FilterMode::Connections),
            other => Err(CoreError::ValidationError(format!("unknown filter '{}'", other))),
        }
    }
}

/// Ordering applied after filtering. All keys sort ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Price,
    Duration,
    Departure,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Price => "price",
            SortKey::Duration => "duration",
            SortKey::Departure => "departure",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(SortKey::Price),
            "duration" => Ok(SortKey::Duration),
            "departure" => Ok(SortKey::Departure),
            other => Err(CoreError::ValidationError(format!("unknown sort key '{}'", other))),
        }
    }
}

pub fn filter_offers(offers: &[FlightOffer], mode: FilterMode) -> Vec<&FlightOffer> {
    offers.iter().filter(|offer| mode.matches(offer)).collect()
}

/// Stable sort: equal keys keep their input order. Departure times compare
/// as text, which is chronological for zero-padded `HH:MM`. Durations that
/// fail to parse go last.
pub fn sort_offers(offers: &mut [&FlightOffer], key: SortKey) {
    match key {
        SortKey::Price => offers.sort_by_key(|offer| offer.price),
        SortKey::Duration => offers.sort_by_key(|offer| {
            let minutes = offer.duration_minutes();
            (minutes.is_none(), minutes)
        }),
        SortKey::Departure => offers.sort_by(|a, b| a.departure_time.cmp(&b.departure_time)),
    }
}

/// Filters then sorts, borrowing from the input.
pub fn arrange(offers: &[FlightOffer], mode: FilterMode, key: SortKey) -> Vec<&FlightOffer> {
    let mut kept = filter_offers(offers, mode);
    sort_offers(&mut kept, key);
    kept
}
