use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fallback;
use crate::intake::TripQuery;
use crate::offer::FlightOffer;

/// Age sent to the search service when the form does not ask for one.
pub const DEFAULT_USER_AGE: u32 = 30;

/// Body posted to the natural-language search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub user_age: u32,
    pub user_location: String,
    pub user_query: String,
}

impl SearchRequest {
    pub fn from_query(query: &TripQuery, user_age: u32) -> Self {
        Self {
            user_age,
            user_location: query.origin().to_string(),
            user_query: describe_trip(query),
        }
    }
}

/// The query as one sentence for the search service.
pub fn describe_trip(query: &TripQuery) -> String {
    let mut sentence = format!(
        "Найти рейсы из {} в {} на {}",
        query.origin(),
        query.destination(),
        query.departure_date()
    );
    if let Some(back) = query.return_date() {
        sentence.push_str(&format!(" и обратно {}", back));
    }
    sentence.push_str(&format!(" для {} пассажиров", query.passengers()));
    sentence.push_str(if query.baggage() { " с багажом" } else { " без багажа" });
    sentence
}

/// Response of the search service. The record schema is not enforced, so
/// `results` stays untyped until [`SearchResponse::into_results`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamResults {
    /// No usable result list: field missing, null, not an array, or an
    /// array in which no record parsed.
    Absent,
    Records { offers: Vec<FlightOffer>, skipped: usize },
}

impl SearchResponse {
    pub fn into_results(self) -> UpstreamResults {
        let records = match self.results {
            serde_json::Value::Array(records) => records,
            _ => return UpstreamResults::Absent,
        };

        let total = records.len();
        let offers: Vec<FlightOffer> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(offer) => Some(offer),
                Err(e) => {
                    warn!("Skipping malformed result record {}: {}", index, e);
                    None
                }
            })
            .collect();
        let skipped = total - offers.len();
        if total > 0 && offers.is_empty() {
            return UpstreamResults::Absent;
        }

        UpstreamResults::Records { offers, skipped }
    }
}

/// Offers to present for a search, and whether they are the example set.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOffers {
    pub offers: Vec<FlightOffer>,
    pub fallback: bool,
}

/// Absent results become the example dataset when `allow_fallback` is set.
/// An empty list is a real answer and stays empty.
pub fn resolve_offers(results: UpstreamResults, query: &TripQuery, allow_fallback: bool) -> ResolvedOffers {
    match results {
        UpstreamResults::Records { offers, .. } => ResolvedOffers { offers, fallback: false },
        UpstreamResults::Absent if allow_fallback => {
            warn!("Search service returned no result list, showing example flights");
            ResolvedOffers { offers: fallback::example_flights(Some(query)), fallback: true }
        }
        UpstreamResults::Absent => ResolvedOffers { offers: Vec::new(), fallback: false },
    }
}
